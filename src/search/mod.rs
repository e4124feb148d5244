//! Search module - candidate retrieval and relevance ranking / 搜索模块
//!
//! Flow / 流程：
//! - QueryEngine builds a case-insensitive substring predicate over
//!   word, reading, romaji and meaning, and asks the store for candidates
//! - scorer assigns each candidate a score and keeps the top results

pub mod engine;
pub mod normalize;
pub mod schema;
pub mod scorer;

pub use engine::QueryEngine;
pub use schema::{FieldPredicate, SearchField, SearchOptions};
pub use scorer::{rank, score};
