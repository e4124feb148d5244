//! Relevance scoring / 相关性评分
//!
//! Rules are additive and not mutually exclusive: an exact reading match
//! also counts as a prefix and a substring match.
//!
//! - Exact (word, reading, or case-folded romaji): +100
//! - Prefix, per field (word, reading, romaji): +50 each
//! - Substring, per field (word, reading, romaji): +20 each; meaning: +5
//! - Length proximity: when the total is positive, minus 0.5 per character
//!   of difference between reading and query

use crate::models::{LexiconRecord, ScoredRecord};

use super::normalize::{char_len, fold_case};

const EXACT_BONUS: f64 = 100.0;
const PREFIX_BONUS: f64 = 50.0;
const SUBSTRING_BONUS: f64 = 20.0;
const MEANING_BONUS: f64 = 5.0;
const LENGTH_PENALTY: f64 = 0.5;

/// Score one record against the query. Pure: same inputs, same value.
pub fn score(record: &LexiconRecord, query: &str) -> f64 {
    let query_lower = fold_case(query);
    let surface = record.surface_form.as_deref();
    let reading = record.reading.as_str();
    let romaji_lower = record.romaji.as_deref().map(fold_case);

    let mut total = 0.0;

    if surface == Some(query)
        || reading == query
        || romaji_lower.as_deref() == Some(query_lower.as_str())
    {
        total += EXACT_BONUS;
    }

    if surface.is_some_and(|s| s.starts_with(query)) {
        total += PREFIX_BONUS;
    }
    if reading.starts_with(query) {
        total += PREFIX_BONUS;
    }
    if romaji_lower.as_deref().is_some_and(|r| r.starts_with(&query_lower)) {
        total += PREFIX_BONUS;
    }

    if surface.is_some_and(|s| s.contains(query)) {
        total += SUBSTRING_BONUS;
    }
    if reading.contains(query) {
        total += SUBSTRING_BONUS;
    }
    if romaji_lower.as_deref().is_some_and(|r| r.contains(&query_lower)) {
        total += SUBSTRING_BONUS;
    }
    if record
        .meaning
        .as_deref()
        .is_some_and(|m| fold_case(m).contains(&query_lower))
    {
        total += MEANING_BONUS;
    }

    if total > 0.0 {
        let diff = char_len(reading).abs_diff(char_len(query));
        total -= LENGTH_PENALTY * diff as f64;
    }

    total
}

/// Score, sort by descending score and keep the top `limit`.
///
/// `sort_by` is stable, so equal scores keep the order the store returned them in.
pub fn rank(candidates: Vec<LexiconRecord>, query: &str, limit: usize) -> Vec<ScoredRecord> {
    let mut scored: Vec<ScoredRecord> = candidates
        .into_iter()
        .map(|record| {
            let score = score(&record, query);
            ScoredRecord { record, score }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neko() -> LexiconRecord {
        LexiconRecord::new(1, "ねこ").with_romaji("neko").with_meaning("cat")
    }

    #[test]
    fn test_exact_reading_match() {
        // 100 exact + 50 prefix + 20 substring, no length difference
        assert_eq!(score(&neko(), "ねこ"), 170.0);
    }

    #[test]
    fn test_romaji_is_case_insensitive() {
        // exact + prefix + substring on romaji, penalty |2 - 4| * 0.5
        assert_eq!(score(&neko(), "NEKO"), 170.0 - 1.0);
    }

    #[test]
    fn test_surface_form_contributes() {
        let record = LexiconRecord::new(2, "ねこ").with_surface_form("猫");
        // exact + prefix + substring on the surface form, penalty |2 - 1| * 0.5
        assert_eq!(score(&record, "猫"), 169.5);
    }

    #[test]
    fn test_meaning_only_match() {
        let record = LexiconRecord::new(3, "いぬ").with_meaning("Dog, hound");
        // 5 - 0.5 * |2 - 3|
        assert_eq!(score(&record, "dog"), 4.5);
    }

    #[test]
    fn test_penalty_can_go_negative() {
        let record = LexiconRecord::new(4, "あ").with_meaning("see: word with many characters in it");
        let query = "word with many characters in it";
        let expected = 5.0 - 0.5 * (char_len(query) - 1) as f64;
        assert!(expected < 0.0);
        assert_eq!(score(&record, query), expected);
    }

    #[test]
    fn test_no_match_has_no_penalty() {
        let record = LexiconRecord::new(5, "いぬ");
        assert_eq!(score(&record, "cat"), 0.0);
    }

    #[test]
    fn test_absent_fields_never_panic() {
        let record = LexiconRecord::new(6, "");
        assert_eq!(score(&record, "x"), 0.0);
        // Empty reading equals empty query: exact + prefix + substring
        assert_eq!(score(&record, ""), 170.0);
    }

    #[test]
    fn test_score_is_deterministic() {
        let record = neko();
        let first = score(&record, "ね");
        for _ in 0..10 {
            assert_eq!(score(&record, "ね"), first);
        }
    }

    #[test]
    fn test_exact_match_dominates() {
        let record = LexiconRecord::new(7, "たべる").with_romaji("taberu");
        let s = score(&record, "TABERU");
        let penalty = 0.5 * (6usize.abs_diff(3)) as f64;
        assert!(s >= 100.0 - penalty);
    }

    #[test]
    fn test_rank_orders_by_score() {
        let candidates = vec![
            LexiconRecord::new(1, "こねこ").with_meaning("kitten"),
            LexiconRecord::new(2, "ねこ"),
            LexiconRecord::new(3, "ねこぜ"),
        ];
        let ranked = rank(candidates, "ねこ", 30);
        let ids: Vec<i64> = ranked.iter().map(|r| r.record.row_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_rank_keeps_store_order_on_ties() {
        let candidates: Vec<LexiconRecord> = (0..5)
            .map(|i| LexiconRecord::new(i, "やま").with_meaning("mountain"))
            .collect();
        let ranked = rank(candidates, "mountain", 30);
        let ids: Vec<i64> = ranked.iter().map(|r| r.record.row_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_rank_truncates() {
        let candidates: Vec<LexiconRecord> =
            (0..50).map(|i| LexiconRecord::new(i, "ねこ")).collect();
        assert_eq!(rank(candidates.clone(), "ねこ", 30).len(), 30);
        assert_eq!(rank(candidates[..12].to_vec(), "ねこ", 30).len(), 12);
        assert!(rank(Vec::new(), "ねこ", 30).is_empty());
    }
}
