//! Watch synchronization: connectivity checks, the bounded-retry file
//! request, the file-receiving listener, and the in-memory match aggregator.

pub mod aggregator;
pub mod listener;
pub mod requester;

pub use aggregator::{MatchAggregator, MatchFile, MatchListEvent, MatchListState};
pub use listener::{receive_file_event, ReceiveOutcome};
pub use requester::{
    cancellation, is_watch_connected, request_match_files, CancelHandle, CancelToken,
    RequestOutcome, RetryPolicy,
};
