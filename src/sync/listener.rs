//! Data-change listener for pushed match files.
//!
//! Every event on the match-files path counts as contact with the watch, so
//! the last-connection timestamp is bumped before the payload is even
//! looked at. Payload problems and write failures are logged and swallowed;
//! nothing here ever propagates an error or rolls the timestamp back.

use chrono::Utc;

use crate::prefs::PrefsDb;
use crate::store::MatchStore;
use crate::transport::{DataEvent, MATCH_FILES_PATH};

/// What handling one data event amounted to. Mirrors the log lines so
/// callers can surface the distinction without scraping logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Path did not match; no side effects at all.
    Ignored,
    /// Matching path but a missing payload field; timestamp bumped, no write.
    Skipped,
    /// File written (or overwritten) under this name.
    Saved(String),
    /// Write failed; timestamp stays bumped.
    WriteFailed(String),
}

pub fn receive_file_event(
    event: &DataEvent,
    store: &MatchStore,
    prefs: &PrefsDb,
) -> ReceiveOutcome {
    if event.path != MATCH_FILES_PATH {
        tracing::debug!("ignoring data item with path {}", event.path);
        return ReceiveOutcome::Ignored;
    }

    let now_ms = Utc::now().timestamp_millis();
    if let Err(e) = prefs.set_last_connection_time(now_ms) {
        tracing::warn!("failed to record last connection time: {e:#}");
    }

    let Some(file_name) = event.data.text("file_name") else {
        tracing::error!("file_name missing, skipping file write");
        return ReceiveOutcome::Skipped;
    };
    let Some(file_content) = event.data.text("file_content") else {
        tracing::error!("file_content missing for {file_name}, skipping file write");
        return ReceiveOutcome::Skipped;
    };

    match store.write(file_name, file_content) {
        Ok(()) => {
            tracing::debug!("saved match file {file_name}");
            ReceiveOutcome::Saved(file_name.to_string())
        }
        Err(e) => {
            tracing::error!("failed to save match file {file_name}: {e:#}");
            ReceiveOutcome::WriteFailed(file_name.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::DataMap;
    use tempfile::TempDir;

    fn setup() -> (TempDir, MatchStore, PrefsDb) {
        let tmp = TempDir::new().unwrap();
        let store = MatchStore::with_dir(tmp.path().join("matches")).unwrap();
        let prefs = PrefsDb::new_in_memory().unwrap();
        (tmp, store, prefs)
    }

    fn file_event(path: &str, name: Option<&str>, content: Option<&str>) -> DataEvent {
        let mut data = DataMap::new();
        if let Some(name) = name {
            data = data.with_text("file_name", name);
        }
        if let Some(content) = content {
            data = data.with_text("file_content", content);
        }
        DataEvent {
            path: path.to_string(),
            data,
        }
    }

    #[test]
    fn test_valid_event_writes_file_and_bumps_timestamp() {
        let (_tmp, store, prefs) = setup();
        let event = file_event(MATCH_FILES_PATH, Some("B1"), Some("Start Time: 10:00"));

        let outcome = receive_file_event(&event, &store, &prefs);

        assert_eq!(outcome, ReceiveOutcome::Saved("B1".to_string()));
        assert_eq!(store.read("B1").unwrap(), "Start Time: 10:00");
        assert!(prefs.last_connection_time().unwrap().is_some());
    }

    #[test]
    fn test_missing_file_name_skips_write_but_bumps_timestamp() {
        let (_tmp, store, prefs) = setup();
        let event = file_event(MATCH_FILES_PATH, None, Some("content"));

        let outcome = receive_file_event(&event, &store, &prefs);

        assert_eq!(outcome, ReceiveOutcome::Skipped);
        assert!(store.list().unwrap().is_empty());
        assert!(prefs.last_connection_time().unwrap().is_some());
    }

    #[test]
    fn test_missing_content_skips_write_but_bumps_timestamp() {
        let (_tmp, store, prefs) = setup();
        let event = file_event(MATCH_FILES_PATH, Some("B1"), None);

        let outcome = receive_file_event(&event, &store, &prefs);

        assert_eq!(outcome, ReceiveOutcome::Skipped);
        assert!(store.list().unwrap().is_empty());
        assert!(prefs.last_connection_time().unwrap().is_some());
    }

    #[test]
    fn test_other_path_has_no_side_effects() {
        let (_tmp, store, prefs) = setup();
        let event = file_event("/heart_rate", Some("B1"), Some("content"));

        let outcome = receive_file_event(&event, &store, &prefs);

        assert_eq!(outcome, ReceiveOutcome::Ignored);
        assert!(store.list().unwrap().is_empty());
        assert_eq!(prefs.last_connection_time().unwrap(), None);
    }

    #[test]
    fn test_last_write_wins() {
        let (_tmp, store, prefs) = setup();

        let first = file_event(MATCH_FILES_PATH, Some("B1"), Some("old"));
        let second = file_event(MATCH_FILES_PATH, Some("B1"), Some("new"));
        receive_file_event(&first, &store, &prefs);
        receive_file_event(&second, &store, &prefs);

        assert_eq!(store.read("B1").unwrap(), "new");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_write_failure_keeps_timestamp_bump() {
        let (_tmp, store, prefs) = setup();
        // Break the store by removing its directory out from under it.
        std::fs::remove_dir_all(store.dir()).unwrap();
        let event = file_event(MATCH_FILES_PATH, Some("B1"), Some("content"));

        let outcome = receive_file_event(&event, &store, &prefs);

        assert_eq!(outcome, ReceiveOutcome::WriteFailed("B1".to_string()));
        assert!(prefs.last_connection_time().unwrap().is_some());
    }
}
