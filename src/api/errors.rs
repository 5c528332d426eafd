//! User service error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid user service URL: {0}")]
    InvalidBaseUrl(String),

    #[error("User service error (status {status_code}): {message}")]
    Status {
        status_code: u16,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}
