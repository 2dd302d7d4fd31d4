// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Flare SDK.

use thiserror::Error;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, FlareError>;

/// Errors that can occur in the Flare SDK.
#[derive(Debug, Error)]
pub enum FlareError {
	/// The client has been shut down.
	#[error("flare client has been shut down")]
	ClientShutdown,

	/// No API key was configured.
	#[error("an API key is required")]
	MissingApiKey,

	/// The configured endpoint is not a valid URL.
	#[error("invalid endpoint URL: {0}")]
	InvalidEndpoint(String),

	/// A configured path pattern failed to compile.
	#[error("invalid path pattern: {0}")]
	InvalidPattern(#[from] regex::Error),

	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Server returned an error.
	#[error("server error (status {status}): {message}")]
	ServerError {
		/// HTTP status code.
		status: u16,
		/// Error message from server.
		message: String,
	},

	/// Rate limited by server.
	#[error("rate limited, retry after {retry_after_secs:?} seconds")]
	RateLimited {
		/// Optional retry-after header value.
		retry_after_secs: Option<u64>,
	},

	/// Failed to serialize a report.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}
