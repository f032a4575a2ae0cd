//! Progress feed for the UI collaborator.
//!
//! The controller emits a [`ProgressEvent`] when a run starts, after every
//! cycle, and when it ends. Events flow through a `tokio::sync::broadcast`
//! channel so any number of renderers can subscribe; with no subscriber the
//! event is dropped.

use serde::{Deserialize, Serialize};

use crate::types::TargetSpec;

/// One entry of the progress feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Monotonically increasing within a run.
    pub seq: u64,
    pub event: ProgressEventKind,
}

/// The specific kind of progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEventKind {
    /// A run was accepted and is about to issue its first scroll.
    Started {
        target: TargetSpec,
        max_retries: u32,
    },
    /// State after one scroll/snapshot/scan cycle.
    Cycle(CycleProgress),
    /// The run reached a terminal state.
    Finished { outcome: String, summary: String },
}

/// What the panel shows after each cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleProgress {
    /// Newest date in the last scanned window, formatted for display.
    pub current_date: Option<String>,
    pub loaded_count: usize,
    pub scroll_count: u32,
    pub retry_count: u32,
    pub max_retries: u32,
    pub status: String,
}

pub type ProgressSender = tokio::sync::broadcast::Sender<ProgressEvent>;
pub type ProgressReceiver = tokio::sync::broadcast::Receiver<ProgressEvent>;

/// Create a progress channel. 256 events covers several minutes of cycles
/// for a slow subscriber.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::broadcast::channel(256)
}

/// Emit an event, ignoring the error raised when nobody listens.
pub fn emit(tx: &Option<ProgressSender>, seq: &mut u64, event: ProgressEventKind) {
    if let Some(ref sender) = tx {
        *seq += 1;
        let _ = sender.send(ProgressEvent { seq: *seq, event });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_event_serialization() {
        let event = ProgressEvent {
            seq: 3,
            event: ProgressEventKind::Cycle(CycleProgress {
                current_date: Some("2023年5月1日".to_string()),
                loaded_count: 48,
                scroll_count: 3,
                retry_count: 1,
                max_retries: 10,
                status: "no new items (1/10)".to_string(),
            }),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"Cycle""#));
        assert!(json.contains(r#""loaded_count":48"#));

        let parsed: ProgressEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.seq, 3);
    }

    #[test]
    fn test_emit_increments_seq() {
        let (tx, mut rx) = channel();
        let tx = Some(tx);
        let mut seq = 0;
        emit(
            &tx,
            &mut seq,
            ProgressEventKind::Finished {
                outcome: "found".to_string(),
                summary: "ok".to_string(),
            },
        );
        emit(&tx, &mut seq, ProgressEventKind::Cycle(CycleProgress::default()));
        assert_eq!(seq, 2);
        assert_eq!(rx.try_recv().unwrap().seq, 1);
        assert_eq!(rx.try_recv().unwrap().seq, 2);
    }

    #[test]
    fn test_emit_without_receivers() {
        let (tx, rx) = channel();
        drop(rx);
        let mut seq = 0;
        emit(
            &Some(tx),
            &mut seq,
            ProgressEventKind::Cycle(CycleProgress::default()),
        );
        assert_eq!(seq, 1);
    }

    #[test]
    fn test_emit_none_sender() {
        let mut seq = 0;
        emit(&None, &mut seq, ProgressEventKind::Cycle(CycleProgress::default()));
        assert_eq!(seq, 0);
    }
}
