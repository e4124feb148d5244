//! Row decoding / 行解码
//!
//! Columns are looked up by name. Optional columns that are missing or NULL
//! decode to None; a row without `reading` fails on its own and the caller
//! skips it.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::{LexiconError, Result};
use crate::models::LexiconRecord;

/// Decode one row into a record / 将一行解码为词条
pub fn decode_row(row: &SqliteRow) -> Result<LexiconRecord> {
    let row_id: i64 = row
        .try_get("rowid")
        .map_err(|_| LexiconError::MissingField { field: "rowid", row_id: None })?;

    let reading = text(row, "reading")?
        .ok_or(LexiconError::MissingField { field: "reading", row_id: Some(row_id) })?;

    Ok(LexiconRecord {
        row_id,
        surface_form: text(row, "word")?,
        reading,
        romaji: text(row, "romaji")?,
        meaning: text(row, "meaning")?,
        pitch_pattern: text(row, "pitch_pattern")?,
        accent_type: integer(row, "accent_type")?,
    })
}

fn text(row: &SqliteRow, column: &str) -> Result<Option<String>> {
    match row.try_get::<Option<String>, _>(column) {
        Ok(value) => Ok(value),
        Err(sqlx::Error::ColumnNotFound(_)) => Ok(None),
        // Numbers stored in a text column / 文本列中存了数字
        Err(sqlx::Error::ColumnDecode { .. }) => match row.try_get::<Option<i64>, _>(column) {
            Ok(value) => Ok(value.map(|v| v.to_string())),
            Err(e) => Err(LexiconError::QueryExecution(e.to_string())),
        },
        Err(e) => Err(LexiconError::QueryExecution(e.to_string())),
    }
}

fn integer(row: &SqliteRow, column: &str) -> Result<Option<i64>> {
    match row.try_get::<Option<i64>, _>(column) {
        Ok(value) => Ok(value),
        Err(sqlx::Error::ColumnNotFound(_)) => Ok(None),
        Err(sqlx::Error::ColumnDecode { .. }) => match row.try_get::<Option<String>, _>(column) {
            Ok(value) => Ok(value.and_then(|v| v.trim().parse().ok())),
            Err(e) => Err(LexiconError::QueryExecution(e.to_string())),
        },
        Err(e) => Err(LexiconError::QueryExecution(e.to_string())),
    }
}
