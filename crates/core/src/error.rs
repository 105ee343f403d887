//! Error types for Telepress operations.
//!
//! This module defines the main error type [`TelepressError`] covering
//! transport failures, non-success API envelopes, decoding mismatches, and
//! file-upload problems. HTML normalization itself never fails: malformed
//! input is recovered best-effort and unsupported content is silently
//! dropped by policy.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Telegraph API operations.
///
/// # Example
///
/// ```rust,no_run
/// use telepress_core::{Telegraph, TelepressError};
///
/// # async fn example() {
/// let client = Telegraph::new().unwrap();
/// match client.get_page("Sample-Page-12-15", true).await {
///     Ok(page) => println!("{}", page.title),
///     Err(TelepressError::Api(description)) => eprintln!("rejected: {}", description),
///     Err(e) => eprintln!("{}", e),
/// }
/// # }
/// ```
#[derive(Error, Debug)]
pub enum TelepressError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps network errors, DNS failures, connection issues, and other
    /// transport-level problems. Surfaced as-is, with no retry.
    #[cfg(feature = "client")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided, e.g. a malformed base URL override.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The API answered with `ok: false`.
    ///
    /// Carries the error description from the response envelope.
    #[error("Telegraph API error: {0}")]
    Api(String),

    /// A response (or request payload) did not match the expected shape.
    #[error("Failed to decode payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered with `ok: true` but no result payload.
    #[error("API response is missing the result payload")]
    MissingResult,

    /// File not found when uploading from a path.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// File read errors during upload.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Upload rejected locally: the extension is not accepted by telegra.ph.
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),
}

/// Result type alias for TelepressError.
pub type Result<T> = std::result::Result<T, TelepressError>;
