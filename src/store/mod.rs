//! Lexicon store - loaded once per session, queried by field predicates / 词库
//!
//! Lifecycle / 生命周期:
//! - Unloaded → Loading → Ready
//! - Loading → Failed (persistent until the process restarts)
//!
//! Only one load ever runs; a second call is ignored.

pub mod decode;
pub mod snapshot;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::error::{LexiconError, Result};
use crate::models::LexiconRecord;
use crate::search::schema::FieldPredicate;

pub use snapshot::SnapshotSource;

/// Store lifecycle state / 词库状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StoreState {
    Unloaded,
    Loading,
    Ready,
    Failed(String),
}

impl StoreState {
    pub fn is_ready(&self) -> bool {
        matches!(self, StoreState::Ready)
    }
}

/// Anything that can answer field-predicate queries / 可查询的词条来源
#[async_trait]
pub trait LexiconSource: Send + Sync {
    fn state(&self) -> StoreState;

    /// Records matching the predicate, at most `limit`, in no particular order
    async fn fetch_matching(
        &self,
        predicate: &FieldPredicate,
        limit: usize,
    ) -> Result<Vec<LexiconRecord>>;
}

/// SQLite-backed store / 基于 SQLite 的词库
pub struct LexiconStore {
    table: String,
    state: RwLock<StoreState>,
    opened: RwLock<Option<Arc<snapshot::OpenedSnapshot>>>,
}

impl LexiconStore {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            state: RwLock::new(StoreState::Unloaded),
            opened: RwLock::new(None),
        }
    }

    /// Fetch the snapshot and build the store. Not retried on failure.
    pub async fn load(&self, source: &SnapshotSource) -> Result<()> {
        {
            let mut state = self.state.write();
            if *state != StoreState::Unloaded {
                tracing::warn!("Lexicon store load ignored, state is {:?}", *state);
                return Ok(());
            }
            *state = StoreState::Loading;
        }

        match self.build(source).await {
            Ok(opened) => {
                *self.opened.write() = Some(Arc::new(opened));
                *self.state.write() = StoreState::Ready;
                tracing::info!("Lexicon store ready (table `{}`)", self.table);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Lexicon store load failed: {}", e);
                *self.state.write() = StoreState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn build(&self, source: &SnapshotSource) -> Result<snapshot::OpenedSnapshot> {
        let bytes = snapshot::fetch(source).await?;
        snapshot::open(&bytes, &self.table).await
    }

    fn opened(&self) -> Result<Arc<snapshot::OpenedSnapshot>> {
        self.opened
            .read()
            .clone()
            .ok_or_else(|| LexiconError::StoreUnavailable("store has not finished loading".to_string()))
    }

    /// Number of entries in the store / 词条数量
    pub async fn entry_count(&self) -> Result<u64> {
        let opened = self.opened()?;
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", self.table))
            .fetch_one(&opened.pool)
            .await
            .map_err(|e| LexiconError::QueryExecution(e.to_string()))?;
        Ok(count as u64)
    }

    /// Close the pool and drop the temp file / 关闭连接池
    pub async fn close(&self) {
        let opened = self.opened.write().take();
        if let Some(opened) = opened {
            opened.pool.close().await;
        }
    }
}

#[async_trait]
impl LexiconSource for LexiconStore {
    fn state(&self) -> StoreState {
        self.state.read().clone()
    }

    async fn fetch_matching(
        &self,
        predicate: &FieldPredicate,
        limit: usize,
    ) -> Result<Vec<LexiconRecord>> {
        let opened = self.opened()?;
        let pattern = predicate.like_pattern();

        let sql = format!(
            "SELECT rowid AS rowid, * FROM {} WHERE {} LIMIT ?",
            self.table,
            predicate.where_clause()
        );

        let mut query = sqlx::query(&sql);
        for _ in &predicate.fields {
            query = query.bind(pattern.clone());
        }
        let rows = query
            .bind(limit as i64)
            .fetch_all(&opened.pool)
            .await
            .map_err(|e| LexiconError::QueryExecution(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            match decode::decode_row(row) {
                Ok(record) => records.push(record),
                Err(e) if e.is_record_local() => tracing::warn!("Skipping undecodable row: {}", e),
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(
            "Store matched {} rows for {:?} ({} decoded)",
            rows.len(),
            predicate.needle,
            records.len()
        );
        Ok(records)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    /// Build a small SQLite snapshot and return its bytes / 构建测试快照
    pub(crate) async fn fixture_snapshot(rows: &[(&str, &str, &str, &str, &str, i64)]) -> Vec<u8> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.db");
        let url = format!("sqlite:{}?mode=rwc", path.to_string_lossy());
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE words (word TEXT, reading TEXT, romaji TEXT, meaning TEXT, pitch_pattern TEXT, accent_type INTEGER)",
        )
        .execute(&pool)
        .await
        .unwrap();

        for (word, reading, romaji, meaning, pitch, accent) in rows {
            sqlx::query("INSERT INTO words VALUES (NULLIF(?, ''), ?, ?, ?, NULLIF(?, ''), ?)")
                .bind(*word)
                .bind(*reading)
                .bind(*romaji)
                .bind(*meaning)
                .bind(*pitch)
                .bind(*accent)
                .execute(&pool)
                .await
                .unwrap();
        }
        pool.close().await;

        std::fs::read(&path).unwrap()
    }

    pub(crate) async fn ready_store() -> LexiconStore {
        let bytes = fixture_snapshot(&[
            ("猫", "ねこ", "neko", "cat", "HL", 1),
            ("", "こねこ", "koneko", "kitten", "LHH", 0),
            ("犬", "いぬ", "inu", "dog", "LH", 2),
            ("", "ネコ科", "nekoka", "Felidae (100% feline)", "", 0),
        ])
        .await;
        let store = LexiconStore::new("words");
        store.load(&SnapshotSource::Bytes(bytes)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_load_and_query() {
        let store = ready_store().await;
        assert_eq!(store.state(), StoreState::Ready);
        assert_eq!(store.entry_count().await.unwrap(), 4);

        let records = store
            .fetch_matching(&FieldPredicate::contains_any("NEKO"), 100)
            .await
            .unwrap();
        let mut ids: Vec<i64> = records.iter().map(|r| r.row_id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 4]);

        let cat = records.iter().find(|r| r.row_id == 1).unwrap();
        assert_eq!(cat.surface_form.as_deref(), Some("猫"));
        assert_eq!(cat.accent_type, Some(1));
    }

    #[tokio::test]
    async fn test_non_ascii_query_finds_exact_spelling() {
        let bytes = fixture_snapshot(&[
            ("Ｔシャツ", "ティーシャツ", "tiishatsu", "T-shirt", "", 1),
            ("", "エクレア", "ekurea", "Éclair (pastry)", "", 1),
            ("猫", "ねこ", "neko", "cat", "HL", 1),
        ])
        .await;
        let store = LexiconStore::new("words");
        store.load(&SnapshotSource::Bytes(bytes)).await.unwrap();

        let shirt = store
            .fetch_matching(&FieldPredicate::contains_any("Ｔシャツ"), 100)
            .await
            .unwrap();
        assert_eq!(shirt.len(), 1);
        assert_eq!(shirt[0].reading, "ティーシャツ");

        let eclair = store
            .fetch_matching(&FieldPredicate::contains_any("Éclair"), 100)
            .await
            .unwrap();
        assert_eq!(eclair.len(), 1);
        assert_eq!(eclair[0].reading, "エクレア");

        // ASCII letters still fold on both sides
        let upper = store
            .fetch_matching(&FieldPredicate::contains_any("ÉCLAIR"), 100)
            .await
            .unwrap();
        assert_eq!(upper.len(), 1);
    }

    #[tokio::test]
    async fn test_row_without_reading_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.db");
        let url = format!("sqlite:{}?mode=rwc", path.to_string_lossy());
        let pool = SqlitePoolOptions::new().max_connections(1).connect(&url).await.unwrap();
        sqlx::query("CREATE TABLE words (word TEXT, reading TEXT, romaji TEXT, meaning TEXT)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO words VALUES ('猫', 'ねこ', 'neko', 'cat'), ('猫又', NULL, 'nekomata', 'cat spirit')")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let store = LexiconStore::new("words");
        store
            .load(&SnapshotSource::Bytes(std::fs::read(&path).unwrap()))
            .await
            .unwrap();
        let records = store
            .fetch_matching(&FieldPredicate::contains_any("neko"), 100)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reading, "ねこ");
    }

    #[tokio::test]
    async fn test_query_respects_limit() {
        let store = ready_store().await;
        let records = store
            .fetch_matching(&FieldPredicate::contains_any("n"), 2)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_wildcards_match_literally() {
        let store = ready_store().await;
        let records = store
            .fetch_matching(&FieldPredicate::contains_any("100%"), 100)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reading, "ネコ科");

        let none = store
            .fetch_matching(&FieldPredicate::contains_any("_"), 100)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_query_before_load() {
        let store = LexiconStore::new("words");
        assert_eq!(store.state(), StoreState::Unloaded);
        let result = store.fetch_matching(&FieldPredicate::contains_any("ねこ"), 100).await;
        assert!(matches!(result, Err(LexiconError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_failed_load_is_terminal() {
        let store = LexiconStore::new("words");
        let result = store.load(&SnapshotSource::Bytes(b"garbage".to_vec())).await;
        assert!(result.is_err());
        assert!(matches!(store.state(), StoreState::Failed(_)));

        // A second load does not run / 不会再次加载
        let bytes = fixture_snapshot(&[("", "ねこ", "neko", "cat", "", 0)]).await;
        store.load(&SnapshotSource::Bytes(bytes)).await.unwrap();
        assert!(matches!(store.state(), StoreState::Failed(_)));
    }

    #[tokio::test]
    async fn test_missing_table() {
        let bytes = fixture_snapshot(&[]).await;
        let store = LexiconStore::new("entries");
        let result = store.load(&SnapshotSource::Bytes(bytes)).await;
        assert!(matches!(result, Err(LexiconError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_load_gzip_snapshot() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let bytes = fixture_snapshot(&[("", "ねこ", "neko", "cat", "HL", 1)]).await;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(&bytes).unwrap();
        let compressed = encoder.finish().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dictionary.db.gz");
        std::fs::write(&path, compressed).unwrap();

        let store = LexiconStore::new("words");
        store.load(&SnapshotSource::Path(path)).await.unwrap();
        assert_eq!(store.entry_count().await.unwrap(), 1);
        store.close().await;
    }
}
