mod actor;
mod handle;
pub mod time;
mod timer;

pub use actor::{TrackerCommand, TrackerSnapshot, UpcomingTracker};
pub use handle::TrackerHandle;

/// Fixed reminder lead time: the overlay fires this many seconds before
/// the upcoming event starts.
pub const REMINDER_LEAD_SECS: i64 = 60;
