//! Error types for the rewards API client.
//!
//! # Design
//! One enum, one variant per failure class a caller would branch on.
//! `Validation` is raised before any network traffic, `Transport` wraps the
//! round trip itself, and `Api` means the provider answered but flagged the
//! call as failed — it keeps the request uri, the outbound payload, and the
//! raw response so a failed call can be diagnosed from the error alone.

use std::fmt;

use serde_json::Value;

/// Errors returned by `RaasClient` operations and `SchemaRegistry` loading.
#[derive(Debug)]
pub enum ApiError {
    /// The outbound payload does not conform to its registered schema.
    /// No request was issued.
    Validation {
        /// Operation name of the violated schema.
        schema: String,
        /// One entry per violation: instance path plus message.
        violations: Vec<String>,
    },

    /// The HTTP round trip itself failed (connect, DNS, TLS, read).
    Transport(String),

    /// The provider responded but the envelope's `success` field was false
    /// or missing.
    Api {
        /// Request path the call was issued against.
        uri: String,
        /// Outbound JSON payload, if the operation had one.
        payload: Option<Value>,
        /// The full parsed response body.
        response: Value,
    },

    /// An operation referenced a schema name that is not registered, or the
    /// schema set could not be loaded. Indicates a packaging defect.
    Configuration(String),

    /// The request payload could not be serialized to JSON.
    Serialization(String),

    /// The response body could not be parsed as JSON.
    Deserialization(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation { schema, violations } => {
                write!(f, "payload rejected by schema '{schema}': {}", violations.join("; "))
            }
            ApiError::Transport(msg) => write!(f, "transport failed: {msg}"),
            ApiError::Api { uri, payload, response } => {
                let payload = payload
                    .as_ref()
                    .map_or_else(|| "none".to_string(), |p| p.to_string());
                write!(f, "RaaS API error: uri={uri}, payload={payload}, response={response}")
            }
            ApiError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            ApiError::Serialization(msg) => write!(f, "serialization failed: {msg}"),
            ApiError::Deserialization(msg) => write!(f, "deserialization failed: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
