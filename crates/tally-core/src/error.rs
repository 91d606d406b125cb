//! Error types for Tally
//!
//! Every variant here is recoverable from the advisor's point of view: the
//! `Advisor` converts any of them into a deterministic fallback result.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("AI backend error {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("AI backend timed out after {0:?}")]
    Timeout(Duration),

    #[error("AI backend returned an empty response")]
    EmptyResponse,
}

impl Error {
    /// Short failure label for logs (never shown to users)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(e) if e.is_decode() => "malformed_response",
            Self::Http(_) => "network",
            Self::Json(_) | Self::InvalidData(_) | Self::EmptyResponse => "malformed_response",
            Self::Io(_) => "io",
            Self::Config(_) => "config",
            Self::Backend { status: 429, .. } => "rate_limited",
            Self::Backend { .. } => "backend_status",
            Self::Timeout(_) => "timeout",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
