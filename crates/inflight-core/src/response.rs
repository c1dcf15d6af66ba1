use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message of the catch-all error response
pub const GENERIC_ERROR: &str = "Failed to parse or handle request.";

/// Outcome reported in every response
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// The action succeeded
    Ok,
    /// The request was malformed or a business rule rejected it
    Error,
    /// The referenced entity does not exist
    NotFound,
}

/// Response envelope: a `status` plus action-specific fields
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Response {
    /// Outcome of the request
    pub status: Status,
    /// Action-specific payload fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Response {
    fn with_status(status: Status) -> Self {
        Self {
            status,
            fields: Map::new(),
        }
    }

    /// An `OK` response without payload
    pub fn ok() -> Self {
        Self::with_status(Status::Ok)
    }

    /// A `NOT_FOUND` response without payload
    pub fn not_found() -> Self {
        Self::with_status(Status::NotFound)
    }

    /// An `ERROR` response carrying a human-readable `message`
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_status(Status::Error).with("message", message.into())
    }

    /// The catch-all `ERROR` response
    pub fn generic_error() -> Self {
        Self::error(GENERIC_ERROR)
    }

    /// Add the payload field `key`
    ///
    /// Values that cannot be represented as JSON are stored as `null`.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.insert(key.to_owned(), value);
        self
    }

    /// Decode the payload field `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        T::deserialize(self.fields.get(key)?).ok()
    }

    /// The `message` field, if any
    pub fn message(&self) -> Option<&str> {
        self.fields.get("message")?.as_str()
    }

    /// Whether the status is `OK`
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Serialize to a single JSON line (without the trailing newline)
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"status":"ERROR","message":"{GENERIC_ERROR}"}}"#)
        })
    }
}
