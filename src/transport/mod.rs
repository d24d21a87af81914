//! Device-pairing transport abstraction.
//!
//! - [`ChannelTransport`](memory::ChannelTransport): in-process channel pair
//!   (loopback demo harness, test double)
//!
//! The `App` holds a `Box<dyn Transport>` and all watch traffic goes through
//! it: node/capability lookup, fire-and-forget messages, and the stream of
//! data-change notifications the paired device replicates over.

pub mod memory;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Capability the watch app advertises.
pub const BOWLS_SCORER_CAPABILITY: &str = "bowls_scorer";

/// Message path the phone uses to ask the watch for its match files.
pub const REQUEST_MATCH_FILES_PATH: &str = "/request_match_files";

/// Data path carrying a pushed match file (`file_name` + `file_content`).
pub const MATCH_FILES_PATH: &str = "/match_files";

/// Path prefix for per-match data items (`match_data` + `timestamp`).
pub const MATCH_FILE_ITEM_PREFIX: &str = "/match_files/";

/// A paired device currently known to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub display_name: String,
}

/// Key-value payload of a replicated data item. Fields are typed the way
/// the wire carries them: text or 64-bit integers.
#[derive(Debug, Clone, Default)]
pub struct DataMap {
    text: HashMap<String, String>,
    longs: HashMap<String, i64>,
}

impl DataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, key: &str, value: impl Into<String>) -> Self {
        self.text.insert(key.to_string(), value.into());
        self
    }

    pub fn with_long(mut self, key: &str, value: i64) -> Self {
        self.longs.insert(key.to_string(), value);
        self
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.text.get(key).map(String::as_str)
    }

    pub fn long(&self, key: &str) -> Option<i64> {
        self.longs.get(key).copied()
    }
}

/// One data-change notification from the paired device.
#[derive(Debug, Clone)]
pub struct DataEvent {
    pub path: String,
    pub data: DataMap,
}

/// Core transport trait for all watch communication.
///
/// All methods are async to support both the in-process loopback and a real
/// device-pairing backend behind the same seam.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Human-readable backend name (e.g., "loopback").
    fn backend_name(&self) -> &str;

    /// All currently reachable paired nodes.
    async fn connected_nodes(&self) -> Result<Vec<Node>>;

    /// Reachable nodes advertising the given capability.
    async fn capable_nodes(&self, capability: &str) -> Result<Vec<Node>>;

    /// Send a fire-and-forget message to a node on a logical path.
    async fn send_message(&self, node_id: &str, path: &str, payload: &[u8]) -> Result<()>;

    /// Subscribe to data-change notifications. Events delivered before the
    /// subscription exists are not replayed.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<DataEvent>;
}
