//! Verification query API.
//!
//! Read-only JSON lookups over the capture store, consumed by tests and
//! developers rather than the SDK. Not part of the mocked wire protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snsmock_core::{CaptureError, CapturedMessage};
use snsmock_store::CaptureStore;
use std::sync::Arc;

/// Content type of every verification API response.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Filters accepted by the list endpoint. All are optional and compose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    /// Exact topic match.
    pub topic: Option<String>,
    /// Inclusive lower timestamp bound.
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper timestamp bound.
    pub until: Option<DateTime<Utc>>,
    /// Substring match within the message body.
    pub contains: Option<String>,
}

impl MessageFilter {
    /// Parses a filter from a raw URL query string. Unknown parameters are
    /// ignored; present-but-empty parameters count as absent.
    pub fn from_query(query: Option<&str>) -> Result<Self, CaptureError> {
        let mut filter = Self::default();
        let Some(query) = query else {
            return Ok(filter);
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "topic" => filter.topic = Some(value.into_owned()),
                "since" => filter.since = Some(parse_instant("since", &value)?),
                "until" => filter.until = Some(parse_instant("until", &value)?),
                "contains" => filter.contains = Some(value.into_owned()),
                _ => {}
            }
        }

        Ok(filter)
    }

    /// Returns true when `message` passes every set filter.
    fn matches(&self, message: &CapturedMessage) -> bool {
        if let Some(topic) = &self.topic {
            if &message.topic != topic {
                return false;
            }
        }
        if let Some(since) = self.since {
            if message.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if message.timestamp > until {
                return false;
            }
        }
        if let Some(contains) = &self.contains {
            if !message.body.contains(contains.as_str()) {
                return false;
            }
        }
        true
    }
}

fn parse_instant(parameter: &str, value: &str) -> Result<DateTime<Utc>, CaptureError> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|_| CaptureError::invalid_parameter(parameter))
}

/// Error body shape of the verification API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonError {
    pub code: String,
    pub message: String,
}

impl From<&CaptureError> for JsonError {
    fn from(error: &CaptureError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Read-only lookups over the store.
pub struct QueryApi {
    store: Arc<CaptureStore>,
}

impl QueryApi {
    /// Creates a query surface over `store`.
    pub fn new(store: Arc<CaptureStore>) -> Self {
        Self { store }
    }

    /// Lists captured messages matching `filter`, oldest first.
    pub fn list(&self, filter: &MessageFilter) -> Result<Vec<Arc<CapturedMessage>>, CaptureError> {
        let base = match filter.topic.as_deref() {
            Some(topic) => self.store.get_by_topic(topic)?,
            None if filter.since.is_some() || filter.until.is_some() => {
                let start = filter.since.unwrap_or(DateTime::<Utc>::MIN_UTC);
                let end = filter.until.unwrap_or(DateTime::<Utc>::MAX_UTC);
                self.store.get_by_time_range(start, end)
            }
            None => self.store.get_all(),
        };

        Ok(base
            .into_iter()
            .filter(|message| filter.matches(message))
            .collect())
    }

    /// Returns the captured message with `id`.
    pub fn get(&self, id: &str) -> Result<Arc<CapturedMessage>, CaptureError> {
        self.store.get_by_id(id)
    }

    /// Drops every captured message.
    pub fn clear(&self) {
        self.store.clear();
        tracing::debug!("capture store cleared");
    }

    /// Lists matching messages as a JSON array.
    pub fn list_json(&self, filter: &MessageFilter) -> Result<Vec<u8>, CaptureError> {
        let messages = self.list(filter)?;
        let views: Vec<&CapturedMessage> = messages.iter().map(|m| m.as_ref()).collect();
        serde_json::to_vec(&views).map_err(|e| CaptureError::internal(e.to_string()))
    }

    /// Returns one message as JSON.
    pub fn get_json(&self, id: &str) -> Result<Vec<u8>, CaptureError> {
        let message = self.get(id)?;
        serde_json::to_vec(message.as_ref()).map_err(|e| CaptureError::internal(e.to_string()))
    }
}
