// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stacktrace and severity types for error events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Severity of a reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	Info,
	Warning,
	Error,
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Info => write!(f, "info"),
			Self::Warning => write!(f, "warning"),
			Self::Error => write!(f, "error"),
		}
	}
}

impl FromStr for Severity {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"info" => Ok(Self::Info),
			"warning" => Ok(Self::Warning),
			"error" => Ok(Self::Error),
			_ => Err(CoreError::InvalidSeverity(s.to_string())),
		}
	}
}

/// A single frame of a stacktrace.
///
/// `abs_path` is the path as captured from the runtime; `filename` is the
/// display path after the configured strip-path prefix has been removed.
/// `in_project` marks frames originating from the application's own source
/// tree, as classified by the configured project-root pattern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frame {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub function: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub module: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub filename: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub abs_path: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub lineno: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub colno: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub context_line: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub pre_context: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub post_context: Vec<String>,
	#[serde(default)]
	pub in_project: bool,
}

/// An ordered collection of stack frames, outermost first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stacktrace {
	pub frames: Vec<Frame>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn severity_round_trips_through_display() {
		for severity in [Severity::Info, Severity::Warning, Severity::Error] {
			let parsed: Severity = severity.to_string().parse().unwrap();
			assert_eq!(parsed, severity);
		}
	}

	#[test]
	fn unknown_severity_is_rejected() {
		assert!(matches!(
			"fatal".parse::<Severity>(),
			Err(CoreError::InvalidSeverity(_))
		));
	}

	#[test]
	fn frame_serializes_without_absent_fields() {
		let frame = Frame {
			function: Some("app::main".to_string()),
			in_project: true,
			..Default::default()
		};
		let json = serde_json::to_value(&frame).unwrap();
		assert_eq!(json["function"], "app::main");
		assert!(json.get("filename").is_none());
		assert!(json.get("lineno").is_none());
	}
}
