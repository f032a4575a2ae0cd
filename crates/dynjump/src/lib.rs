//! dynjump: scroll-driven search that locates a calendar period in an
//! infinite-scroll activity feed.

pub mod controller;
pub mod detector;
pub mod events;
pub mod outcome;
pub mod policy;
pub mod scroll;
pub mod snapshot;
pub mod time_parser;
pub mod types;

pub use controller::{ControllerState, SearchController, StopHandle};
pub use detector::{classify, LoadProgress, SearchState};
pub use events::{CycleProgress, ProgressEvent, ProgressEventKind, ProgressReceiver, ProgressSender};
pub use outcome::SearchOutcome;
pub use policy::{scan, ScanResult, DEFAULT_WINDOW};
pub use scroll::ScrollDriver;
pub use snapshot::{parse_feed_html, FeedDocument, FeedSelectors, FeedSnapshotReader, RawFeedItem};
pub use time_parser::TimeParser;
pub use types::*;
