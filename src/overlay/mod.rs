mod console;

pub use console::ConsoleOverlay;

use crate::conference;
use crate::error::AppResult;
use crate::provider::models::CalendarEvent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use url::Url;

/// Display data for the reminder overlay
#[derive(Debug, Clone)]
pub struct OverlayContent {
    pub title: String,
    pub conference_url: Option<Url>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl OverlayContent {
    pub fn for_event(event: &CalendarEvent) -> Self {
        Self {
            title: event.title.clone(),
            conference_url: conference::event_conference_url(event),
            start: event.start,
            end: event.end,
        }
    }
}

/// Presentation surface for the full-screen reminder.
///
/// The tracker invokes this; it never drives the tracker. A GUI
/// implementation would take over the display here.
#[async_trait]
pub trait OverlayPresenter: Send + Sync {
    /// Show the reminder for the given event data
    async fn show(&self, content: OverlayContent) -> AppResult<()>;

    /// Dismiss the reminder
    async fn hide(&self) -> AppResult<()>;
}

/// Open a conference link in the user's default browser
pub fn open_conference(url: &Url) -> AppResult<()> {
    webbrowser::open(url.as_str())
        .map_err(|e| crate::error::overlay_error(&format!("Failed to open {}: {}", url, e)))
}
