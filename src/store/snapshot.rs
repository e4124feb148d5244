//! Snapshot acquisition / 词库快照获取
//!
//! Two suspension points: fetching the bytes, then building the store
//! from them. Nothing is retried and nothing outlives the session: the
//! temporary database file is removed when the store is dropped.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use flate2::read::GzDecoder;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tempfile::NamedTempFile;

use crate::error::{LexiconError, Result};

const SQLITE_MAGIC: &[u8] = b"SQLite format 3\0";
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// Where the snapshot comes from / 快照来源
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    Url { url: String, timeout: Duration },
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl SnapshotSource {
    /// Pick the source from config: a local path wins over the URL
    pub fn from_config(config: &crate::config::StoreConfig) -> Self {
        match &config.snapshot_path {
            Some(path) if !path.is_empty() => SnapshotSource::Path(PathBuf::from(path)),
            _ => SnapshotSource::Url {
                url: config.snapshot_url.clone(),
                timeout: Duration::from_secs(config.fetch_timeout_secs),
            },
        }
    }
}

/// Fetch the raw snapshot and inflate it if gzip-compressed / 获取快照
pub async fn fetch(source: &SnapshotSource) -> Result<Vec<u8>> {
    let bytes = match source {
        SnapshotSource::Url { url, timeout } => download(url, *timeout).await?,
        SnapshotSource::Path(path) => tokio::fs::read(path).await.map_err(|e| {
            LexiconError::StoreUnavailable(format!("Failed to read snapshot {:?}: {}", path, e))
        })?,
        SnapshotSource::Bytes(bytes) => bytes.clone(),
    };
    // Decompression is CPU-bound, keep it off the runtime thread
    tokio::task::spawn_blocking(move || inflate(bytes))
        .await
        .map_err(|e| LexiconError::StoreUnavailable(format!("Snapshot inflate task failed: {}", e)))?
}

async fn download(url: &str, timeout: Duration) -> Result<Vec<u8>> {
    tracing::info!("Downloading lexicon snapshot: {}", url);

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LexiconError::StoreUnavailable(format!("Failed to create HTTP client: {}", e)))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| LexiconError::StoreUnavailable(format!("Download failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(LexiconError::StoreUnavailable(format!(
            "Download failed: HTTP {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| LexiconError::StoreUnavailable(format!("Failed to read response: {}", e)))?;

    tracing::info!("Snapshot downloaded: {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

/// Gzip is detected by magic bytes, not by file name / 按魔数识别 gzip
fn inflate(bytes: Vec<u8>) -> Result<Vec<u8>> {
    if !bytes.starts_with(GZIP_MAGIC) {
        return Ok(bytes);
    }
    let mut decoder = GzDecoder::new(&bytes[..]);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| LexiconError::StoreUnavailable(format!("Failed to decompress snapshot: {}", e)))?;
    tracing::debug!("Snapshot inflated: {} -> {} bytes", bytes.len(), decompressed.len());
    Ok(decompressed)
}

/// Store built from a snapshot. The temp file lives as long as the pool.
pub struct OpenedSnapshot {
    pub pool: Pool<Sqlite>,
    pub file: NamedTempFile,
}

/// Write the bytes to a private temp file and open it read-only / 构建数据库
pub async fn open(bytes: &[u8], table: &str) -> Result<OpenedSnapshot> {
    if !bytes.starts_with(SQLITE_MAGIC) {
        return Err(LexiconError::StoreUnavailable(
            "Snapshot is not a SQLite database".to_string(),
        ));
    }

    let file = tempfile::Builder::new()
        .prefix("moji-lexicon-")
        .suffix(".db")
        .tempfile()?;
    tokio::fs::write(file.path(), bytes).await?;

    let options = SqliteConnectOptions::new()
        .filename(file.path())
        .read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| LexiconError::StoreUnavailable(format!("Failed to open snapshot: {}", e)))?;

    let exists: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_optional(&pool)
            .await
            .map_err(|e| LexiconError::StoreUnavailable(e.to_string()))?;

    if exists.is_none() {
        pool.close().await;
        return Err(LexiconError::StoreUnavailable(format!(
            "Snapshot has no `{}` table",
            table
        )));
    }

    Ok(OpenedSnapshot { pool, file })
}
