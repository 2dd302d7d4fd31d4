// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Breadcrumb types recording the events leading up to an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A breadcrumb representing an event leading up to the error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breadcrumb {
	pub timestamp: DateTime<Utc>,
	/// Short human-readable label, e.g. "GET /api/users".
	pub name: String,
	#[serde(rename = "type")]
	pub breadcrumb_type: BreadcrumbType,
	pub metadata: serde_json::Value,
}

impl Default for Breadcrumb {
	fn default() -> Self {
		Self {
			timestamp: Utc::now(),
			name: String::new(),
			breadcrumb_type: BreadcrumbType::Manual,
			metadata: serde_json::Value::Object(serde_json::Map::new()),
		}
	}
}

/// Category of a breadcrumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreadcrumbType {
	Navigation,
	Request,
	Process,
	Log,
	User,
	State,
	Error,
	Manual,
}

impl fmt::Display for BreadcrumbType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Navigation => write!(f, "navigation"),
			Self::Request => write!(f, "request"),
			Self::Process => write!(f, "process"),
			Self::Log => write!(f, "log"),
			Self::User => write!(f, "user"),
			Self::State => write!(f, "state"),
			Self::Error => write!(f, "error"),
			Self::Manual => write!(f, "manual"),
		}
	}
}

impl FromStr for BreadcrumbType {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"navigation" => Ok(Self::Navigation),
			"request" => Ok(Self::Request),
			"process" => Ok(Self::Process),
			"log" => Ok(Self::Log),
			"user" => Ok(Self::User),
			"state" => Ok(Self::State),
			"error" => Ok(Self::Error),
			"manual" => Ok(Self::Manual),
			_ => Err(CoreError::InvalidBreadcrumbType(s.to_string())),
		}
	}
}
