//! Search query schema / 搜索查询定义

use serde::{Deserialize, Serialize};

use super::normalize::{escape_like, fold_ascii};

/// Searchable columns of the word store / 可搜索字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchField {
    SurfaceForm,
    Reading,
    Romaji,
    Meaning,
}

impl SearchField {
    /// All fields, in predicate order / 全部字段
    pub const ALL: [SearchField; 4] = [
        SearchField::SurfaceForm,
        SearchField::Reading,
        SearchField::Romaji,
        SearchField::Meaning,
    ];

    /// Column name in the `words` table / 列名
    pub fn column(self) -> &'static str {
        match self {
            SearchField::SurfaceForm => "word",
            SearchField::Reading => "reading",
            SearchField::Romaji => "romaji",
            SearchField::Meaning => "meaning",
        }
    }
}

/// Case-insensitive substring predicate, OR-combined over its fields / 子串匹配谓词
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    /// Query text with ASCII letters lowercased, matched literally
    pub needle: String,
    pub fields: Vec<SearchField>,
}

impl FieldPredicate {
    pub fn contains_any(query: &str) -> Self {
        Self {
            needle: fold_ascii(query),
            fields: SearchField::ALL.to_vec(),
        }
    }

    /// LIKE pattern with wildcards escaped by `\` / LIKE 模式
    pub fn like_pattern(&self) -> String {
        format!("%{}%", escape_like(&self.needle))
    }

    /// WHERE clause body, one placeholder per field / WHERE 子句
    pub fn where_clause(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("lower({}) LIKE ? ESCAPE '\\'", f.column()))
            .collect::<Vec<_>>()
            .join(" OR ")
    }

    /// In-memory evaluation with the same semantics as the SQL clause
    pub fn matches(&self, record: &crate::models::LexiconRecord) -> bool {
        self.fields.iter().any(|field| {
            let value = match field {
                SearchField::SurfaceForm => record.surface_form.as_deref(),
                SearchField::Reading => Some(record.reading.as_str()),
                SearchField::Romaji => record.romaji.as_deref(),
                SearchField::Meaning => record.meaning.as_deref(),
            };
            value.is_some_and(|v| fold_ascii(v).contains(&self.needle))
        })
    }
}

/// Search options / 搜索选项
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub query: String,
    /// Max candidates fetched from the store / 候选上限
    pub candidate_limit: usize,
    /// Max ranked results kept / 结果上限
    pub result_limit: usize,
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            candidate_limit: 100,
            result_limit: 30,
        }
    }

    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit;
        self
    }

    pub fn with_result_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit;
        self
    }
}
