//! Transport-agnostic API handlers.
//!
//! Each handler takes already-extracted request parts and returns an
//! [`ApiResponse`] carrying the HTTP status code and the body. Binding the
//! handlers to a router is left to the embedding server.

pub mod handlers;
pub mod params;

pub use handlers::{
    create_transformation, get_status_details, get_trade_lanes, list_transformations,
    service_info, CreateTransformationRequest, ServiceInfo,
};
pub use params::ListTransformationsParams;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::TransformationError;

/// Response wrapper for API calls.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip)]
    pub status: u16,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::with_status(200, data)
    }

    pub fn created(data: T) -> Self {
        Self::with_status(201, data)
    }

    pub fn with_status(status: u16, data: T) -> Self {
        Self {
            status,
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Maps a service error to its status code and client-safe message.
    /// Server-side failures are logged in full here.
    pub fn from_error(error: &TransformationError) -> Self {
        let status = error.status_code();
        if status >= 500 {
            log::error!("Request failed: {}", error);
        } else {
            log::debug!("Request rejected ({}): {}", status, error);
        }
        Self::err(status, error.public_message())
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Wire body: the payload itself on success, `{"detail": ...}` on error.
    pub fn to_json_body(&self) -> Value {
        match (&self.data, &self.error) {
            (Some(data), _) => serde_json::to_value(data).unwrap_or_else(|e| {
                log::error!("Failed to serialize response body: {}", e);
                json!({ "detail": "Internal error: failed to encode response" })
            }),
            (None, Some(message)) => json!({ "detail": message }),
            (None, None) => Value::Null,
        }
    }
}
