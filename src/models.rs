use serde::{Deserialize, Serialize};

/// One dictionary entry, as materialized from the word store / 词条
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconRecord {
    pub row_id: i64,
    /// Display form, e.g. a kanji spelling (column `word`)
    pub surface_form: Option<String>,
    /// Kana reading, one character per mora
    pub reading: String,
    pub romaji: Option<String>,
    pub meaning: Option<String>,
    /// H/L contour, one letter per mora (column `pitch_pattern`)
    pub pitch_pattern: Option<String>,
    /// 0 keeps the particle high, anything else drops it. NULL counts as a drop.
    pub accent_type: Option<i64>,
}

impl LexiconRecord {
    pub fn new(row_id: i64, reading: impl Into<String>) -> Self {
        Self {
            row_id,
            surface_form: None,
            reading: reading.into(),
            romaji: None,
            meaning: None,
            pitch_pattern: None,
            accent_type: None,
        }
    }

    pub fn with_surface_form(mut self, surface_form: impl Into<String>) -> Self {
        self.surface_form = Some(surface_form.into());
        self
    }

    pub fn with_romaji(mut self, romaji: impl Into<String>) -> Self {
        self.romaji = Some(romaji.into());
        self
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }

    pub fn with_pitch(mut self, pattern: impl Into<String>, accent_type: i64) -> Self {
        self.pitch_pattern = Some(pattern.into());
        self.accent_type = Some(accent_type);
        self
    }

    /// Pitch pattern if present and non-empty / 非空的声调模式
    pub fn pitch(&self) -> Option<&str> {
        self.pitch_pattern.as_deref().filter(|p| !p.is_empty())
    }

    /// Number of moras, counted as characters of the reading
    pub fn mora_count(&self) -> usize {
        self.reading.chars().count()
    }
}

/// Record with its relevance score / 带分数的词条
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: LexiconRecord,
    /// May go negative after the length penalty
    pub score: f64,
}
