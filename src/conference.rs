use crate::provider::models::CalendarEvent;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref URL_PATTERN: Regex =
        Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"')\]]+"#).expect("valid URL pattern");
}

/// Best-guess meeting link for an event.
///
/// Checked in strict priority order: the explicit URL field, the first
/// URL-like substring in the notes, then the first one in the location.
/// Returns None when no source yields a link.
pub fn conference_url(
    url: Option<&str>,
    notes: Option<&str>,
    location: Option<&str>,
) -> Option<Url> {
    if let Some(parsed) = url.and_then(|raw| Url::parse(raw).ok()) {
        return Some(parsed);
    }

    if let Some(detected) = notes.and_then(detect_url) {
        return Some(detected);
    }

    location.and_then(detect_url)
}

/// Conference link for a calendar event's fields
pub fn event_conference_url(event: &CalendarEvent) -> Option<Url> {
    conference_url(
        event.url.as_deref(),
        event.notes.as_deref(),
        event.location.as_deref(),
    )
}

/// First URL-like substring in free text, normalized to a parsed URL
fn detect_url(text: &str) -> Option<Url> {
    for found in URL_PATTERN.find_iter(text) {
        let raw = found.as_str().trim_end_matches(['.', ',', ';']);
        let candidate = if raw.len() >= 4 && raw[..4].eq_ignore_ascii_case("www.") {
            format!("https://{}", raw)
        } else {
            raw.to_string()
        };
        if let Ok(parsed) = Url::parse(&candidate) {
            return Some(parsed);
        }
    }
    None
}
