use super::models::{CalendarEvent, CalendarSource};
use super::{AuthorizationStatus, CalendarProvider};
use crate::config::Config;
use crate::error::{provider_error, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use url::Url;

/// Calendar provider backed by a REST service.
///
/// Endpoints:
/// - `GET  /v1/sources`       -> `{ "sources": [{ "id", "title" }] }`
/// - `GET  /v1/auth/status`   -> `{ "status": "granted" | "denied" | "unknown" }`
/// - `POST /v1/auth/request`  -> `{ "granted": bool }`
/// - `GET  /v1/events?calendars=..&start=..&end=..` -> `{ "events": [..] }`
pub struct HttpCalendarProvider {
    base_url: String,
    token: Option<String>,
    client: Client,
}

#[derive(serde::Deserialize)]
struct SourcesResponse {
    sources: Vec<CalendarSource>,
}

#[derive(serde::Deserialize)]
struct AuthStatusResponse {
    status: String,
}

#[derive(serde::Deserialize)]
struct AuthRequestResponse {
    granted: bool,
}

#[derive(serde::Deserialize)]
struct EventsResponse {
    events: Vec<CalendarEvent>,
}

impl HttpCalendarProvider {
    /// Create a provider from the application config
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.provider_url.trim_end_matches('/').to_string(),
            token: config.provider_token.clone(),
            client: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| provider_error(&format!("Failed to build provider URL: {}", e)))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> AppResult<T> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| provider_error(&format!("Provider request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(provider_error(&format!(
                "Provider returned HTTP {} - {}",
                status, body
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| provider_error(&format!("Failed to parse provider response: {}", e)))
    }
}

#[async_trait]
impl CalendarProvider for HttpCalendarProvider {
    async fn sources(&self) -> AppResult<Vec<CalendarSource>> {
        let url = self.endpoint("/v1/sources")?;
        let response: SourcesResponse = self.get_json(url).await?;
        Ok(response.sources)
    }

    async fn authorization_status(&self) -> AppResult<AuthorizationStatus> {
        let url = self.endpoint("/v1/auth/status")?;
        let response: AuthStatusResponse = self.get_json(url).await?;
        Ok(match response.status.as_str() {
            "granted" => AuthorizationStatus::Granted,
            "denied" => AuthorizationStatus::Denied,
            _ => AuthorizationStatus::Unknown,
        })
    }

    async fn request_access(&self) -> AppResult<bool> {
        let url = self.endpoint("/v1/auth/request")?;
        let mut request = self.client.post(url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| provider_error(&format!("Access request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(provider_error(&format!(
                "Access request returned HTTP {}",
                response.status()
            )));
        }

        let body: AuthRequestResponse = response
            .json()
            .await
            .map_err(|e| provider_error(&format!("Failed to parse access response: {}", e)))?;
        Ok(body.granted)
    }

    async fn events_between(
        &self,
        source_ids: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarEvent>> {
        if source_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = self.endpoint("/v1/events")?;
        url.query_pairs_mut()
            .append_pair("calendars", &source_ids.join(","))
            .append_pair("start", &start.to_rfc3339())
            .append_pair("end", &end.to_rfc3339());

        let response: EventsResponse = self.get_json(url).await?;
        Ok(response.events)
    }
}
