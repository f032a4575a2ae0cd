//! Terminal outcomes of a run and their human-readable summaries.

use serde::{Deserialize, Serialize};

use crate::types::{ParsedDate, TargetSpec};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// An item in the target period was found and highlighted.
    Found {
        index: usize,
        date: ParsedDate,
        loaded_count: usize,
        scroll_count: u32,
    },
    /// Loaded items are already older than the target period.
    Overshoot {
        passed_date: ParsedDate,
        loaded_count: usize,
    },
    /// The retry budget ran out while items were loaded.
    Exhausted {
        /// Date of the last (oldest) rendered item, if readable.
        last_date: Option<ParsedDate>,
        loaded_count: usize,
        max_retries: u32,
    },
    /// The retry budget ran out before any item rendered.
    NoContent { max_retries: u32 },
    /// `stop()` was called.
    UserStopped { loaded_count: usize, scroll_count: u32 },
}

impl SearchOutcome {
    /// Short machine label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Found { .. } => "found",
            Self::Overshoot { .. } => "overshoot",
            Self::Exhausted { .. } => "exhausted",
            Self::NoContent { .. } => "no_content",
            Self::UserStopped { .. } => "user_stopped",
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Message shown to the operator when the run ends.
    pub fn summary(&self, target: &TargetSpec) -> String {
        match self {
            Self::Found { date, .. } => {
                format!("Found a post in the target period.\n\nDate: {date}\n\nThe post has been highlighted.")
            }
            Self::Overshoot { passed_date, .. } => format!(
                "Passed the target period.\n\n\
                 Current position: {passed_date}\n\
                 Target: {target}\n\n\
                 No posts from {target} were found around this position.\n\n\
                 Try scrolling back up manually; the author may not have posted in the target period."
            ),
            Self::Exhausted {
                last_date,
                loaded_count,
                ..
            } => match last_date {
                Some(last) => format!(
                    "Reached the search limit.\n\n\
                     Earliest loaded post: {last}\n\
                     Target: {target}\n\
                     Posts loaded: {loaded_count}\n\n\
                     Possible causes:\n\
                     - the author posted nothing in the target period\n\
                     - early posts were deleted\n\
                     - the site limits how far back the feed goes\n\n\
                     Suggestions:\n\
                     - raise max retries to 20-30\n\
                     - use the extreme scroll mode\n\
                     - raise the scroll delay to 3000-4000 ms"
                ),
                None => format!(
                    "Reached the search limit, but could not read the time of the last loaded post.\n\n\
                     Target: {target}\n\
                     Posts loaded: {loaded_count}"
                ),
            },
            Self::NoContent { .. } => {
                "Failed to load any content. Refresh the page and try again.".to_string()
            }
            Self::UserStopped { .. } => "Stopped by user.".to_string(),
        }
    }
}
