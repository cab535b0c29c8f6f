//! HTTP handlers.

pub mod auth;
pub mod profile;
pub mod publications;
pub mod recovery;
pub mod security;
pub mod verification;

use serde::Serialize;

/// Generic acknowledgement body for write endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
