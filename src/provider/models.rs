use chrono::{DateTime, Utc};

/// A calendar account/source the user can opt into monitoring.
/// Owned by the external provider; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CalendarSource {
    pub id: String,
    pub title: String,
}

/// Simplified calendar event representation
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
}

impl CalendarEvent {
    /// Events are compared by identity, not field equality.
    pub fn same_identity(&self, other: &CalendarEvent) -> bool {
        self.id == other.id
    }
}
