//! Success response envelope
//!
//! `{ "status": "success", "data": ..., "message": ... }`, mirroring the
//! error envelope in [`crate::error`].

use serde::Serialize;

/// Standard success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps a payload
    pub fn ok(data: T) -> Self {
        Self {
            status: "success",
            message: None,
            data: Some(data),
        }
    }

    /// Wraps a payload with an accompanying message
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// A data-less acknowledgement
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            data: None,
        }
    }
}
