// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for core type parsing.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur when parsing core types.
#[derive(Debug, Error)]
pub enum CoreError {
	/// Unknown severity string.
	#[error("invalid severity: {0}")]
	InvalidSeverity(String),

	/// Unknown breadcrumb type string.
	#[error("invalid breadcrumb type: {0}")]
	InvalidBreadcrumbType(String),
}
