//! Phone-side match aggregation.
//!
//! Per-match data items are parsed and accumulated into an in-memory list
//! that lives only as long as the screen session. The list is held in an
//! explicit state container mutated through [`MatchListEvent`]s, so the UI
//! never touches shared mutable state directly.
//!
//! The aggregator only consumes events while attached (screen in the
//! foreground). Events arriving while detached are dropped, not queued —
//! an accepted data-loss window.

use chrono::Utc;

use crate::summary::summarize;
use crate::transport::{DataEvent, MATCH_FILE_ITEM_PREFIX};

/// One received match, held in memory for the current session.
#[derive(Debug, Clone)]
pub struct MatchFile {
    pub summary: String,
    pub raw_content: String,
    pub timestamp_ms: i64,
}

#[derive(Debug)]
pub enum MatchListEvent {
    AppendMatch(MatchFile),
    ClearList,
    SetRequesting(bool),
}

#[derive(Debug, Default)]
pub struct MatchListState {
    pub matches: Vec<MatchFile>,
    pub requesting: bool,
}

impl MatchListState {
    pub fn apply(&mut self, event: MatchListEvent) {
        match event {
            MatchListEvent::AppendMatch(m) => self.matches.push(m),
            MatchListEvent::ClearList => self.matches.clear(),
            MatchListEvent::SetRequesting(flag) => self.requesting = flag,
        }
    }
}

#[derive(Default)]
pub struct MatchAggregator {
    state: MatchListState,
    attached: bool,
}

impl MatchAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start consuming events (screen resumed).
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stop consuming events (screen paused). Events delivered while
    /// detached are lost.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn state(&self) -> &MatchListState {
        &self.state
    }

    pub fn set_requesting(&mut self, flag: bool) {
        self.state.apply(MatchListEvent::SetRequesting(flag));
    }

    pub fn clear(&mut self) {
        self.state.apply(MatchListEvent::ClearList);
    }

    /// Consume one batch of data-change events.
    ///
    /// Appends a parsed match for every per-match item in the batch, then
    /// marks any in-flight request complete whether or not anything
    /// matched — the watch has answered, even if with nothing usable.
    pub fn process_batch(&mut self, events: &[DataEvent]) {
        if !self.attached {
            tracing::debug!("dropping {} events received while detached", events.len());
            return;
        }
        for event in events {
            if !event.path.starts_with(MATCH_FILE_ITEM_PREFIX) {
                continue;
            }
            let Some(raw) = event.data.text("match_data") else {
                tracing::warn!("match item {} has no match_data, skipping", event.path);
                continue;
            };
            let timestamp_ms = event
                .data
                .long("timestamp")
                .unwrap_or_else(|| Utc::now().timestamp_millis());
            self.state.apply(MatchListEvent::AppendMatch(MatchFile {
                summary: summarize(raw, timestamp_ms),
                raw_content: raw.to_string(),
                timestamp_ms,
            }));
        }
        self.state.apply(MatchListEvent::SetRequesting(false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::DataMap;

    fn match_event(id: &str, raw: &str, timestamp_ms: i64) -> DataEvent {
        DataEvent {
            path: format!("{MATCH_FILE_ITEM_PREFIX}{id}"),
            data: DataMap::new()
                .with_text("match_data", raw)
                .with_long("timestamp", timestamp_ms),
        }
    }

    #[test]
    fn test_appends_parsed_matches() {
        let mut agg = MatchAggregator::new();
        agg.attach();
        agg.set_requesting(true);

        agg.process_batch(&[
            match_event("B1", "End 21: 15-12", 1_700_000_000_000),
            match_event("B2", "Start Time: 09:00", 1_700_000_100_000),
        ]);

        let state = agg.state();
        assert_eq!(state.matches.len(), 2);
        assert!(state.matches[0].summary.contains("Final Score: 15-12"));
        assert_eq!(state.matches[1].raw_content, "Start Time: 09:00");
        assert!(!state.requesting);
    }

    #[test]
    fn test_all_miss_batch_still_clears_requesting() {
        let mut agg = MatchAggregator::new();
        agg.attach();
        agg.set_requesting(true);

        agg.process_batch(&[DataEvent {
            path: "/heart_rate".to_string(),
            data: DataMap::new(),
        }]);

        assert!(agg.state().matches.is_empty());
        assert!(!agg.state().requesting);
    }

    #[test]
    fn test_detached_aggregator_drops_events() {
        let mut agg = MatchAggregator::new();
        agg.set_requesting(true);

        agg.process_batch(&[match_event("B1", "End 1: 1-0", 0)]);

        assert!(agg.state().matches.is_empty());
        // Untouched while detached; the screen is not there to observe it.
        assert!(agg.state().requesting);
    }

    #[test]
    fn test_missing_match_data_is_skipped() {
        let mut agg = MatchAggregator::new();
        agg.attach();

        agg.process_batch(&[DataEvent {
            path: format!("{MATCH_FILE_ITEM_PREFIX}B1"),
            data: DataMap::new().with_long("timestamp", 5),
        }]);

        assert!(agg.state().matches.is_empty());
    }

    #[test]
    fn test_blank_match_data_gets_error_summary() {
        let mut agg = MatchAggregator::new();
        agg.attach();

        agg.process_batch(&[match_event("B1", "", 0)]);

        assert_eq!(agg.state().matches.len(), 1);
        assert_eq!(agg.state().matches[0].summary, crate::summary::NO_DATA_SUMMARY);
    }

    #[test]
    fn test_clear_list() {
        let mut agg = MatchAggregator::new();
        agg.attach();
        agg.process_batch(&[match_event("B1", "End 1: 1-0", 0)]);
        assert_eq!(agg.state().matches.len(), 1);

        agg.clear();
        assert!(agg.state().matches.is_empty());
    }
}
