//! Result cards / 结果卡片

use serde::Serialize;

use crate::models::ScoredRecord;

/// What the accent graph of a card needs / 声调图参数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSpec {
    pub pitch_pattern: String,
    pub accent_type: Option<i64>,
    pub reading: String,
}

/// One rendered search result / 单条搜索结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultCard {
    pub row_id: i64,
    /// Surface form, or the reading when there is none
    pub title: String,
    /// "(reading)" when the title is a different spelling
    pub reading_hint: Option<String>,
    pub meaning: String,
    pub score: f64,
    /// Present when the record has a non-empty pitch pattern
    pub graph: Option<GraphSpec>,
    /// Drawn graph, filled in on the next frame
    pub graph_svg: Option<String>,
}

impl ResultCard {
    pub fn from_scored(scored: &ScoredRecord) -> Self {
        let record = &scored.record;
        let surface = record.surface_form.as_deref().filter(|s| !s.is_empty());

        let title = surface.unwrap_or(&record.reading).to_string();
        let reading_hint = surface
            .filter(|s| *s != record.reading)
            .map(|_| format!("({})", record.reading));

        let graph = record.pitch().map(|pattern| GraphSpec {
            pitch_pattern: pattern.to_string(),
            accent_type: record.accent_type,
            reading: record.reading.clone(),
        });

        Self {
            row_id: record.row_id,
            title,
            reading_hint,
            meaning: record.meaning.clone().unwrap_or_default(),
            score: scored.score,
            graph,
            graph_svg: None,
        }
    }

    /// Identifier the deferred draw looks the card up by / 画布标识
    pub fn graph_id(&self) -> Option<String> {
        self.graph.as_ref().map(|_| graph_id(self.row_id))
    }

    /// Plain-text rendering for the terminal / 终端文本
    pub fn render_text(&self) -> String {
        let mut out = self.title.clone();
        if let Some(hint) = &self.reading_hint {
            out.push(' ');
            out.push_str(hint);
        }
        if let Some(graph) = &self.graph {
            out.push_str("  [");
            out.push_str(&graph.pitch_pattern);
            out.push(']');
        }
        if !self.meaning.is_empty() {
            out.push_str("\n    ");
            out.push_str(&self.meaning);
        }
        out
    }
}

pub fn graph_id(row_id: i64) -> String {
    format!("canvas-{}", row_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LexiconRecord;

    fn card(record: LexiconRecord) -> ResultCard {
        ResultCard::from_scored(&ScoredRecord { record, score: 1.0 })
    }

    #[test]
    fn test_title_prefers_surface_form() {
        let c = card(LexiconRecord::new(7, "ねこ").with_surface_form("猫").with_meaning("cat"));
        assert_eq!(c.title, "猫");
        assert_eq!(c.reading_hint.as_deref(), Some("(ねこ)"));
        assert_eq!(c.render_text(), "猫 (ねこ)\n    cat");
    }

    #[test]
    fn test_no_hint_when_surface_equals_reading() {
        let c = card(LexiconRecord::new(1, "すし").with_surface_form("すし"));
        assert_eq!(c.title, "すし");
        assert!(c.reading_hint.is_none());
        assert_eq!(c.meaning, "");
    }

    #[test]
    fn test_reading_only() {
        let c = card(LexiconRecord::new(1, "ねこ").with_surface_form(""));
        assert_eq!(c.title, "ねこ");
        assert!(c.reading_hint.is_none());
    }

    #[test]
    fn test_graph_only_with_pitch() {
        let plain = card(LexiconRecord::new(3, "ねこ"));
        assert!(plain.graph.is_none());
        assert!(plain.graph_id().is_none());

        let empty = card(LexiconRecord::new(3, "ねこ").with_pitch("", 1));
        assert!(empty.graph.is_none());

        let pitched = card(LexiconRecord::new(3, "ねこ").with_pitch("HL", 1));
        assert_eq!(pitched.graph_id().as_deref(), Some("canvas-3"));
        assert_eq!(pitched.graph.unwrap().accent_type, Some(1));
    }
}
