//! In-process channel transport.
//!
//! Pairs a phone-side [`ChannelTransport`] with a [`WatchEnd`] handle over
//! tokio channels. The watch end can push data events, observe sent
//! messages, and toggle reachability or inject send failures, which makes
//! it both the loopback demo backend and the transport double for tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;

use super::{
    DataEvent, DataMap, Node, Transport, BOWLS_SCORER_CAPABILITY, MATCH_FILES_PATH,
    MATCH_FILE_ITEM_PREFIX, REQUEST_MATCH_FILES_PATH,
};
use crate::store::MATCH_FILE_PREFIX;

/// A message the phone sent through the transport.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub node_id: String,
    pub path: String,
    pub payload: Vec<u8>,
}

struct Inner {
    node: Node,
    reachable: AtomicBool,
    fail_node_queries: AtomicBool,
    fail_sends: AtomicU32,
    send_attempts: AtomicU32,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<DataEvent>>>,
}

pub struct ChannelTransport {
    inner: Arc<Inner>,
    // Held by the phone side only so the watch sees EOF when the app exits.
    outbound_tx: mpsc::UnboundedSender<SentMessage>,
}

/// Watch-side handle of a transport pair.
pub struct WatchEnd {
    inner: Arc<Inner>,
    outbound_rx: mpsc::UnboundedReceiver<SentMessage>,
}

impl ChannelTransport {
    /// Create a connected phone/watch pair. The watch starts reachable.
    pub fn pair() -> (Self, WatchEnd) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let inner = Arc::new(Inner {
            node: Node {
                id: "loopback-watch".to_string(),
                display_name: "Loopback Watch".to_string(),
            },
            reachable: AtomicBool::new(true),
            fail_node_queries: AtomicBool::new(false),
            fail_sends: AtomicU32::new(0),
            send_attempts: AtomicU32::new(0),
            subscribers: Mutex::new(Vec::new()),
        });
        (
            Self {
                inner: inner.clone(),
                outbound_tx,
            },
            WatchEnd { inner, outbound_rx },
        )
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    fn backend_name(&self) -> &str {
        "loopback"
    }

    async fn connected_nodes(&self) -> Result<Vec<Node>> {
        if self.inner.fail_node_queries.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("transport unavailable"));
        }
        if self.inner.reachable.load(Ordering::SeqCst) {
            Ok(vec![self.inner.node.clone()])
        } else {
            Ok(Vec::new())
        }
    }

    async fn capable_nodes(&self, capability: &str) -> Result<Vec<Node>> {
        let nodes = self.connected_nodes().await?;
        if capability == BOWLS_SCORER_CAPABILITY {
            Ok(nodes)
        } else {
            Ok(Vec::new())
        }
    }

    async fn send_message(&self, node_id: &str, path: &str, payload: &[u8]) -> Result<()> {
        self.inner.send_attempts.fetch_add(1, Ordering::SeqCst);
        if !self.inner.reachable.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("node {node_id} is not reachable"));
        }
        if self.inner.fail_sends.load(Ordering::SeqCst) > 0 {
            self.inner.fail_sends.fetch_sub(1, Ordering::SeqCst);
            return Err(anyhow::anyhow!("send to {node_id} failed"));
        }
        self.outbound_tx
            .send(SentMessage {
                node_id: node_id.to_string(),
                path: path.to_string(),
                payload: payload.to_vec(),
            })
            .map_err(|_| anyhow::anyhow!("watch end of transport is gone"))
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<DataEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(tx);
        rx
    }
}

impl WatchEnd {
    pub fn set_reachable(&self, reachable: bool) {
        self.inner.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Make node/capability queries fail until reset (simulates a transport
    /// layer error rather than an empty node list).
    pub fn fail_node_queries(&self, fail: bool) {
        self.inner.fail_node_queries.store(fail, Ordering::SeqCst);
    }

    /// Fail the next `n` message sends.
    pub fn fail_next_sends(&self, n: u32) {
        self.inner.fail_sends.store(n, Ordering::SeqCst);
    }

    /// Total send attempts made by the phone, failed ones included.
    pub fn send_attempts(&self) -> u32 {
        self.inner.send_attempts.load(Ordering::SeqCst)
    }

    /// Deliver a data-change notification to every live subscriber.
    pub fn push_data(&self, event: DataEvent) {
        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Push a match file the way the watch app does: one file-push item
    /// plus one per-match item carrying the same content.
    pub fn push_match_file(&self, file_name: &str, content: &str, timestamp_ms: i64) {
        self.push_data(DataEvent {
            path: MATCH_FILES_PATH.to_string(),
            data: DataMap::new()
                .with_text("file_name", file_name)
                .with_text("file_content", content),
        });
        self.push_data(DataEvent {
            path: format!("{MATCH_FILE_ITEM_PREFIX}{file_name}"),
            data: DataMap::new()
                .with_text("match_data", content)
                .with_long("timestamp", timestamp_ms),
        });
    }

    /// Await the next message from the phone. None once the phone end drops.
    pub async fn recv_message(&mut self) -> Option<SentMessage> {
        self.outbound_rx.recv().await
    }

    pub fn try_recv_message(&mut self) -> Option<SentMessage> {
        self.outbound_rx.try_recv().ok()
    }
}

/// Run a watch simulator that serves match files from a local directory.
///
/// Answers each file request by pushing every prefix-named file found in
/// `source_dir` through the data channel, the same shape the real watch app
/// replicates. Ends when the phone side of the pair is dropped.
pub fn spawn_loopback_watch(mut watch: WatchEnd, source_dir: PathBuf) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = watch.recv_message().await {
            if msg.path != REQUEST_MATCH_FILES_PATH {
                tracing::debug!("loopback watch ignoring message on {}", msg.path);
                continue;
            }
            match list_source_files(&source_dir) {
                Ok(files) => {
                    tracing::debug!("loopback watch serving {} files", files.len());
                    let now_ms = Utc::now().timestamp_millis();
                    for (name, content) in files {
                        watch.push_match_file(&name, &content, now_ms);
                    }
                }
                Err(e) => tracing::warn!("loopback watch cannot read source dir: {e:#}"),
            }
        }
    })
}

fn list_source_files(dir: &PathBuf) -> Result<Vec<(String, String)>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
    {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(String::from) else {
            continue;
        };
        if !name.starts_with(MATCH_FILE_PREFIX) || !entry.file_type()?.is_file() {
            continue;
        }
        let content = std::fs::read_to_string(entry.path())
            .with_context(|| format!("Failed to read {name}"))?;
        files.push((name, content));
    }
    files.sort();
    Ok(files)
}
