pub mod accent;
pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod search;
pub mod store;
pub mod theme;

pub use error::{LexiconError, Result};
