//! Match summary extraction.
//!
//! Watch match files are free text, not a schema. The scorer writes lines
//! like `Start Time: 10:02` and per-end score lines like `End 21: 15-12`,
//! so the summary is a best-effort line scan: markers that are missing stay
//! "Unknown" and malformed input never fails, it just degrades.

use chrono::{DateTime, Utc};

pub const NO_DATA_SUMMARY: &str = "No match data available";

const UNKNOWN: &str = "Unknown";

/// Build a short display summary from raw match text and the epoch-millis
/// timestamp the file arrived with.
///
/// Scans for `Start Time:`, `End Time:`, `Elapsed Time:` and per-end score
/// lines. When several score lines are present the last one wins; that is
/// the final score of the match, since the scorer appends ends in order.
pub fn summarize(raw: &str, timestamp_ms: i64) -> String {
    if raw.trim().is_empty() {
        return NO_DATA_SUMMARY.to_string();
    }

    let mut start_time = UNKNOWN.to_string();
    let mut end_time = UNKNOWN.to_string();
    let mut duration = UNKNOWN.to_string();
    let mut final_score = UNKNOWN.to_string();

    for line in raw.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("Start Time:") {
            start_time = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("End Time:") {
            end_time = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("Elapsed Time:") {
            duration = value.trim().to_string();
        } else if let Some(score) = end_score(line) {
            final_score = score.to_string();
        }
    }

    format!(
        "Match: {}\nStart: {}\nEnd: {}\nDuration: {}\nFinal Score: {}",
        format_timestamp(timestamp_ms),
        start_time,
        end_time,
        duration,
        final_score
    )
}

/// Format an epoch-millis timestamp as local-style wall clock text.
pub fn format_timestamp(timestamp_ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(timestamp_ms) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => UNKNOWN.to_string(),
    }
}

/// Extract the `<x>-<y>` pair from a per-end score line.
///
/// Matches `End <digits>: <digits>-<digits>` only. `End Time:` has no
/// digits after `End` and "Game Scores" headers never start with `End `,
/// so both fall out naturally; the explicit header check guards lines
/// that mention the header mid-text.
fn end_score(line: &str) -> Option<&str> {
    if line.contains("Game Scores") {
        return None;
    }
    let rest = line.strip_prefix("End ")?;
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = rest[digits..].strip_prefix(':')?;
    let score = rest.trim();
    let (left, right) = score.split_once('-')?;
    if left.is_empty() || right.is_empty() {
        return None;
    }
    if left.chars().all(|c| c.is_ascii_digit()) && right.chars().all(|c| c.is_ascii_digit()) {
        Some(score)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Bowls Scorer Match\n\
        Start Time: 10:00\n\
        End Time: 11:00\n\
        Elapsed Time: 1:00:00\n\
        Game Scores\n\
        End 1: 1-0\n\
        End 21: 15-12\n";

    #[test]
    fn test_all_markers_extracted() {
        let summary = summarize(SAMPLE, 0);
        assert!(summary.contains("Start: 10:00"));
        assert!(summary.contains("End: 11:00"));
        assert!(summary.contains("Duration: 1:00:00"));
        assert!(summary.contains("Final Score: 15-12"));
    }

    #[test]
    fn test_blank_input_returns_fixed_summary() {
        assert_eq!(summarize("", 0), NO_DATA_SUMMARY);
        assert_eq!(summarize("   \n\t\n", 1_700_000_000_000), NO_DATA_SUMMARY);
        // Independent of timestamp
        assert_eq!(summarize("", 123), summarize("", 456));
    }

    #[test]
    fn test_missing_marker_defaults_to_unknown() {
        let input = "Start Time: 09:30\nEnd 5: 4-2\n";
        let summary = summarize(input, 0);
        assert!(summary.contains("Start: 09:30"));
        assert!(summary.contains("End: Unknown"));
        assert!(summary.contains("Duration: Unknown"));
        assert!(summary.contains("Final Score: 4-2"));
    }

    #[test]
    fn test_last_score_line_wins() {
        let input = "End 1: 2-1\nEnd 2: 3-3\nEnd 3: 7-5\n";
        let summary = summarize(input, 0);
        assert!(summary.contains("Final Score: 7-5"));
        assert!(!summary.contains("Final Score: 2-1"));
    }

    #[test]
    fn test_end_time_line_is_not_a_score() {
        let summary = summarize("End Time: 11:00\n", 0);
        assert!(summary.contains("End: 11:00"));
        assert!(summary.contains("Final Score: Unknown"));
    }

    #[test]
    fn test_game_scores_header_ignored() {
        let summary = summarize("End 3 Game Scores: 1-2\n", 0);
        assert!(summary.contains("Final Score: Unknown"));
    }

    #[test]
    fn test_malformed_score_ignored() {
        for input in ["End : 1-2", "End 3: one-two", "End 3: 1-", "End 3 1-2"] {
            let summary = summarize(input, 0);
            assert!(
                summary.contains("Final Score: Unknown"),
                "should ignore {input:?}"
            );
        }
    }

    #[test]
    fn test_indented_markers_are_found() {
        let input = "  Start Time: 10:15\n\tEnd 2: 6-4\n";
        let summary = summarize(input, 0);
        assert!(summary.contains("Start: 10:15"));
        assert!(summary.contains("Final Score: 6-4"));
    }

    #[test]
    fn test_timestamp_formatting() {
        let summary = summarize(SAMPLE, 1_700_000_000_000);
        assert!(summary.contains("Match: 2023-11-14 22:13:20"));
    }
}
