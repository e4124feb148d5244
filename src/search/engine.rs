//! Query engine - free text to a bounded candidate set, then ranked / 查询引擎
//!
//! The engine only builds the predicate and calls the store; ordering is
//! left entirely to the scorer.

use std::sync::Arc;

use crate::error::{LexiconError, Result};
use crate::models::{LexiconRecord, ScoredRecord};
use crate::store::LexiconSource;

use super::schema::{FieldPredicate, SearchOptions};
use super::scorer;

pub struct QueryEngine {
    source: Arc<dyn LexiconSource>,
}

impl QueryEngine {
    pub fn new(source: Arc<dyn LexiconSource>) -> Self {
        Self { source }
    }

    /// Unordered candidates for the query / 获取候选词条
    ///
    /// An empty query returns nothing without touching the store.
    pub async fn candidates(&self, options: &SearchOptions) -> Result<Vec<LexiconRecord>> {
        if options.query.is_empty() {
            return Ok(Vec::new());
        }

        let state = self.source.state();
        if !state.is_ready() {
            return Err(LexiconError::StoreUnavailable(format!(
                "store is {:?}",
                state
            )));
        }

        let predicate = FieldPredicate::contains_any(&options.query);
        self.source
            .fetch_matching(&predicate, options.candidate_limit)
            .await
    }

    /// Candidates scored and ranked, top `result_limit` / 搜索并排序
    pub async fn search(&self, options: &SearchOptions) -> Result<Vec<ScoredRecord>> {
        let candidates = self.candidates(options).await?;
        let candidate_count = candidates.len();
        let ranked = scorer::rank(candidates, &options.query, options.result_limit);
        tracing::debug!(
            "Search {:?}: {} candidates, {} ranked",
            options.query,
            candidate_count,
            ranked.len()
        );
        Ok(ranked)
    }
}
