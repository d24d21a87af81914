pub mod state;

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::prefs::PrefsDb;
use crate::store::MatchStore;
use crate::summary::format_timestamp;
use crate::sync::{
    cancellation, is_watch_connected, receive_file_event, request_match_files, CancelHandle,
    MatchAggregator, ReceiveOutcome, RequestOutcome, RetryPolicy,
};
use crate::transport::{DataEvent, Transport};

pub use state::{DialogMode, FileScreenState, StatusMessage};

pub struct App {
    pub config: Config,
    pub transport: Arc<dyn Transport>,
    pub store: MatchStore,
    pub prefs: PrefsDb,
    pub aggregator: MatchAggregator,
    pub screen: FileScreenState,
    pub dialog: DialogMode,
    pub status_message: Option<StatusMessage>,
    pub debug_log: VecDeque<String>,
    pub show_debug: bool,

    data_events: mpsc::UnboundedReceiver<DataEvent>,
    outcome_tx: mpsc::UnboundedSender<RequestOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<RequestOutcome>,
    cancel: Option<CancelHandle>,
}

impl App {
    /// Build the app over default stores for the configured directories.
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let store = match config.storage.match_dir.as_deref() {
            Some(dir) => MatchStore::with_dir(dir)?,
            None => MatchStore::new()?,
        };
        let prefs = PrefsDb::new()?;
        Ok(Self::with_parts(config, transport, store, prefs))
    }

    pub fn with_parts(
        config: Config,
        transport: Arc<dyn Transport>,
        store: MatchStore,
        prefs: PrefsDb,
    ) -> Self {
        let data_events = transport.subscribe();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let mut aggregator = MatchAggregator::new();
        // The screen is in the foreground for the whole process lifetime,
        // so attach once here and detach on shutdown.
        aggregator.attach();
        let show_debug = config.ui.show_debug_log;
        Self {
            config,
            transport,
            store,
            prefs,
            aggregator,
            screen: FileScreenState::default(),
            dialog: DialogMode::None,
            status_message: None,
            debug_log: VecDeque::new(),
            show_debug,
            data_events,
            outcome_tx,
            outcome_rx,
            cancel: None,
        }
    }

    pub fn add_debug(&mut self, msg: String) {
        self.debug_log.push_back(msg);
        while self.debug_log.len() > 100 {
            self.debug_log.pop_front();
        }
    }

    pub fn set_status_error(&mut self, msg: String) {
        self.status_message = Some(StatusMessage {
            message: msg.clone(),
            is_error: true,
            timestamp: std::time::Instant::now(),
        });
        self.add_debug(msg);
    }

    pub fn set_status_info(&mut self, msg: String) {
        self.status_message = Some(StatusMessage {
            message: msg,
            is_error: false,
            timestamp: std::time::Instant::now(),
        });
    }

    pub fn clear_expired_status(&mut self) {
        if let Some(ref msg) = self.status_message {
            if msg.timestamp.elapsed() > std::time::Duration::from_secs(5) {
                self.status_message = None;
            }
        }
    }

    pub fn is_requesting(&self) -> bool {
        self.aggregator.state().requesting
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog != DialogMode::None
    }

    /// "Never" until the listener has heard from the watch at least once.
    pub fn last_connected_label(&self) -> String {
        match self.screen.last_connected_ms {
            Some(ms) => format_timestamp(ms),
            None => "Never".to_string(),
        }
    }

    /// Re-read the stored file listing. Errors degrade to an empty list.
    pub fn refresh_file_list(&mut self) {
        match self.store.list() {
            Ok(files) => self.screen.set_files(files),
            Err(e) => {
                self.add_debug(format!("File list error: {e:#}"));
                self.screen.set_files(Vec::new());
            }
        }
    }

    /// Recompute connectivity and re-read the last-connection timestamp.
    pub async fn update_connection_status(&mut self) {
        self.screen.connected = is_watch_connected(self.transport.as_ref()).await;
        self.screen.last_connected_ms = match self.prefs.last_connection_time() {
            Ok(ms) => ms,
            Err(e) => {
                self.add_debug(format!("Prefs read error: {e:#}"));
                None
            }
        };
    }

    /// The periodic tick and the manual refresh key both land here.
    pub async fn refresh(&mut self) {
        self.update_connection_status().await;
        self.refresh_file_list();
    }

    /// Kick off a file request on a background task. Single-flight: ignored
    /// while a previous request is still outstanding.
    pub fn request_files(&mut self) {
        if self.is_requesting() {
            self.add_debug("Request already in flight, ignoring".to_string());
            return;
        }
        self.aggregator.set_requesting(true);
        let (handle, token) = cancellation();
        self.cancel = Some(handle);

        let transport = self.transport.clone();
        let policy = RetryPolicy::from(&self.config.sync);
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = request_match_files(transport.as_ref(), &policy, token).await;
            let _ = tx.send(outcome);
        });
        self.add_debug("Requesting match files from watch".to_string());
    }

    /// Apply outcomes of finished request tasks.
    pub fn poll_request_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.cancel = None;
            match outcome {
                RequestOutcome::Sent => {
                    // Stay in the requesting state until the data batch
                    // from the watch clears it.
                    self.add_debug("Request sent, waiting for files".to_string());
                }
                RequestOutcome::NoDevice => {
                    self.aggregator.set_requesting(false);
                    self.set_status_error("Watch not reachable".to_string());
                }
                RequestOutcome::GaveUp => {
                    self.aggregator.set_requesting(false);
                    self.set_status_error("Stopped requesting: send failed".to_string());
                }
                RequestOutcome::Cancelled => {
                    self.aggregator.set_requesting(false);
                    self.add_debug("Request cancelled".to_string());
                }
            }
        }
    }

    /// Drain pending data-change notifications through the file listener
    /// and the match aggregator.
    pub fn poll_data_events(&mut self) {
        let mut batch = Vec::new();
        while let Ok(event) = self.data_events.try_recv() {
            batch.push(event);
        }
        if batch.is_empty() {
            return;
        }

        for event in &batch {
            match receive_file_event(event, &self.store, &self.prefs) {
                ReceiveOutcome::Saved(name) => self.add_debug(format!("Received file: {name}")),
                ReceiveOutcome::Skipped => {
                    self.add_debug("Skipped data item with missing fields".to_string())
                }
                ReceiveOutcome::WriteFailed(name) => {
                    self.add_debug(format!("Failed to save file: {name}"))
                }
                ReceiveOutcome::Ignored => {}
            }
        }
        self.aggregator.process_batch(&batch);
        self.refresh_file_list();
    }

    pub fn view_selected(&mut self) {
        let Some(name) = self.screen.selected_file().map(String::from) else {
            return;
        };
        match self.store.read(&name) {
            Ok(content) => self.dialog = DialogMode::ViewFile { name, content },
            Err(e) => self.set_status_error(format!("Cannot read {name}: {e:#}")),
        }
    }

    pub fn share_selected(&mut self) {
        let Some(name) = self.screen.selected_file().map(String::from) else {
            return;
        };
        match self.store.share_payload(&name) {
            Ok(payload) => {
                self.dialog = DialogMode::Share {
                    subject: payload.subject,
                    body: payload.body,
                }
            }
            Err(e) => self.set_status_error(format!("Cannot share {name}: {e:#}")),
        }
    }

    pub fn export_selected(&mut self) {
        let Some(name) = self.screen.selected_file().map(String::from) else {
            return;
        };
        match self.store.export_to_downloads(&name) {
            Ok(path) => self.set_status_info(format!("Saved to {}", path.display())),
            Err(e) => self.set_status_error(format!("Export failed: {e:#}")),
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(name) = self.screen.selected_file().map(String::from) else {
            return;
        };
        if let Err(e) = self.store.delete(&name) {
            self.set_status_error(format!("Delete failed: {e:#}"));
        }
        self.refresh_file_list();
    }

    pub fn close_dialog(&mut self) {
        self.dialog = DialogMode::None;
    }

    /// Cancel any in-flight request and stop consuming data events.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.cancel.take() {
            handle.cancel();
        }
        self.aggregator.detach();
    }
}
