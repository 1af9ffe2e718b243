//! Score submission and the filtered, sorted, paginated leaderboard query.
//!
//! Submission is append-only and gated by an authenticated identity; the
//! record is always tagged with the verified handle, never a caller-supplied
//! one. Reads are unauthenticated and never fail: an out-of-range page yields
//! an empty slice.

use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::storage::{Identity, ScoreRecord, SharedStore};

/// Fixed leaderboard window per page.
pub const PAGE_SIZE: usize = 20;

/// Decoded body of a score submission. Fields are optional so that absence is
/// distinguishable from present-but-zero values; `submit` enforces presence.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPayload {
    pub level: Option<String>,
    pub score: Option<f64>,
    pub timestamp: Option<i64>,
}

/// Append one score record on behalf of an authenticated identity.
pub fn submit(store: &SharedStore, identity: &Identity, payload: &SubmitPayload) -> AppResult<()> {
    let level = payload.level.as_deref().filter(|l| !l.is_empty());
    let (Some(level), Some(score), Some(timestamp)) = (level, payload.score, payload.timestamp) else {
        return Err(AppError::user(
            "missing_fields",
            "All fields (level, userHandle, score, timestamp) are required.",
        ));
    };
    let record = ScoreRecord {
        level: level.to_string(),
        user_handle: identity.handle.clone(),
        score,
        timestamp,
    };
    store.0.lock().push_score(record);
    debug!(target: "podium::leaderboard", "score recorded handle='{}' level='{}'", identity.handle, level);
    Ok(())
}

/// Coerce a raw `page` query value to a 1-based page number.
///
/// Absent, non-numeric, zero, or negative input all fall back to page 1; an
/// unparsable page is an intentional default, not an error.
pub fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

/// Filtered, sorted window of score records for one page.
///
/// An empty `level` filter means no filter. Scores sort descending; the sort
/// is stable, so equal scores keep their insertion order.
pub fn query(store: &SharedStore, level: Option<&str>, page: usize) -> Vec<ScoreRecord> {
    let level = level.filter(|l| !l.is_empty());
    let mut matched: Vec<ScoreRecord> = {
        let guard = store.0.lock();
        guard
            .scores()
            .iter()
            .filter(|record| level.map_or(true, |wanted| record.level == wanted))
            .cloned()
            .collect()
    };
    matched.sort_by(|a, b| b.score.total_cmp(&a.score));
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
    matched.into_iter().skip(start).take(PAGE_SIZE).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(handle: &str) -> Identity {
        Identity { handle: handle.to_string(), password_hash: "$argon2id$stub".to_string() }
    }

    fn payload(level: Option<&str>, score: Option<f64>, timestamp: Option<i64>) -> SubmitPayload {
        SubmitPayload { level: level.map(str::to_string), score, timestamp }
    }

    fn seed(store: &SharedStore, entries: &[(&str, &str, f64)]) {
        for (i, (level, handle, score)) in entries.iter().enumerate() {
            submit(store, &identity(handle), &payload(Some(level), Some(*score), Some(i as i64)))
                .expect("seed submit");
        }
    }

    #[test]
    fn submit_requires_all_fields() {
        let store = SharedStore::new();
        let author = identity("player_one");
        for bad in [
            payload(None, Some(10.0), Some(1)),
            payload(Some(""), Some(10.0), Some(1)),
            payload(Some("L1"), None, Some(1)),
            payload(Some("L1"), Some(10.0), None),
        ] {
            let err = submit(&store, &author, &bad).unwrap_err();
            assert_eq!(err.code_str(), "missing_fields");
            assert_eq!(err.http_status(), 400);
        }
        assert_eq!(store.0.lock().score_count(), 0);
    }

    #[test]
    fn submit_accepts_zero_and_negative_scores() {
        let store = SharedStore::new();
        let author = identity("player_one");
        submit(&store, &author, &payload(Some("L1"), Some(0.0), Some(0))).expect("zero score");
        submit(&store, &author, &payload(Some("L1"), Some(-12.5), Some(1))).expect("negative score");
        assert_eq!(store.0.lock().score_count(), 2);
    }

    #[test]
    fn submit_tags_record_with_authenticated_handle() {
        let store = SharedStore::new();
        submit(&store, &identity("player_one"), &payload(Some("L1"), Some(10.0), Some(1))).unwrap();
        let guard = store.0.lock();
        assert_eq!(guard.scores()[0].user_handle, "player_one");
    }

    #[test]
    fn query_filters_and_sorts_descending() {
        let store = SharedStore::new();
        seed(&store, &[("L1", "player_aaa", 10.0), ("L1", "player_bbb", 30.0), ("L2", "player_ccc", 5.0)]);
        let rows = query(&store, Some("L1"), 1);
        let got: Vec<(&str, f64)> = rows.iter().map(|r| (r.user_handle.as_str(), r.score)).collect();
        assert_eq!(got, vec![("player_bbb", 30.0), ("player_aaa", 10.0)]);
    }

    #[test]
    fn query_without_filter_returns_all_levels() {
        let store = SharedStore::new();
        seed(&store, &[("L1", "player_aaa", 10.0), ("L2", "player_bbb", 30.0)]);
        assert_eq!(query(&store, None, 1).len(), 2);
        // Empty filter string behaves like no filter.
        assert_eq!(query(&store, Some(""), 1).len(), 2);
    }

    #[test]
    fn equal_scores_keep_insertion_order() {
        let store = SharedStore::new();
        seed(&store, &[("L1", "player_aaa", 10.0), ("L1", "player_bbb", 10.0), ("L1", "player_ccc", 10.0)]);
        let rows = query(&store, Some("L1"), 1);
        let handles: Vec<&str> = rows.iter().map(|r| r.user_handle.as_str()).collect();
        assert_eq!(handles, vec!["player_aaa", "player_bbb", "player_ccc"]);
    }

    #[test]
    fn pagination_windows_are_fixed_size() {
        let store = SharedStore::new();
        let author = identity("player_one");
        for i in 0..25 {
            submit(&store, &author, &payload(Some("L1"), Some(i as f64), Some(i))).unwrap();
        }
        let page1 = query(&store, Some("L1"), 1);
        let page2 = query(&store, Some("L1"), 2);
        let page3 = query(&store, Some("L1"), 3);
        assert_eq!(page1.len(), PAGE_SIZE);
        assert_eq!(page2.len(), 5);
        assert!(page3.is_empty());
        // Ranks 1-20 on page one, 21-25 on page two.
        assert_eq!(page1[0].score, 24.0);
        assert_eq!(page1[19].score, 5.0);
        assert_eq!(page2[0].score, 4.0);
        assert_eq!(page2[4].score, 0.0);
    }

    #[test]
    fn invalid_page_values_coerce_to_one() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("")), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-3")), 1);
        assert_eq!(parse_page(Some("2.5")), 1);
        assert_eq!(parse_page(Some("2")), 2);
        assert_eq!(parse_page(Some(" 7 ")), 7);
    }

    #[test]
    fn query_on_empty_store_is_empty() {
        let store = SharedStore::new();
        assert!(query(&store, None, 1).is_empty());
        assert!(query(&store, Some("L1"), 9999).is_empty());
    }
}
