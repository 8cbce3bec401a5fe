mod http;
pub mod models;
pub mod signals;

pub use http::HttpCalendarProvider;
pub use models::{CalendarEvent, CalendarSource};
pub use signals::ChangeSignal;

use crate::error::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result of asking the provider whether we may read calendar data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Granted,
    Denied,
    Unknown,
}

/// Capability interface to the external calendar provider.
///
/// The tracker only ever talks to this trait, so tests substitute a
/// scripted implementation.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// All calendar sources known to the provider
    async fn sources(&self) -> AppResult<Vec<CalendarSource>>;

    /// Current authorization state, without prompting
    async fn authorization_status(&self) -> AppResult<AuthorizationStatus>;

    /// Ask for access; may show a user-facing prompt on the provider side
    async fn request_access(&self) -> AppResult<bool>;

    /// All events in the given sources whose time range intersects [start, end)
    async fn events_between(
        &self,
        source_ids: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarEvent>>;
}
