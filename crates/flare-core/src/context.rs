// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Context types attached to error reports (request, user).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP request context for server-side errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub method: Option<String>,
	#[serde(default, skip_serializing_if = "HashMap::is_empty")]
	pub headers: HashMap<String, String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub query_string: Option<String>,
	/// Client IP, taken from forwarding headers when present.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub client_ip: Option<String>,
}

/// User context at notify time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}
