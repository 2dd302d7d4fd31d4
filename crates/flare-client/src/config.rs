// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client configuration.
//!
//! A [`Configuration`] is built once, at client construction time, and never
//! mutated afterwards. It owns the two resolved path patterns: the
//! project-root pattern classifies stacktrace frames as in-project, and the
//! strip-path pattern removes a filesystem prefix from reported paths so
//! reports do not leak the absolute filesystem layout.

use regex::Regex;

use crate::error::{FlareError, Result};

/// Default release stage when none is configured.
pub const DEFAULT_RELEASE_STAGE: &str = "production";

/// Default collector endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://flare.ghuntley.com/api/events";

/// Metadata keys redacted by default.
pub const DEFAULT_FILTERS: &[&str] = &["password", "cookie", "authorization"];

/// Immutable client configuration.
#[derive(Debug, Clone)]
pub struct Configuration {
	pub(crate) api_key: String,
	pub(crate) endpoint: String,
	pub(crate) app_type: Option<String>,
	pub(crate) app_version: Option<String>,
	pub(crate) code_version: Option<String>,
	pub(crate) hostname: Option<String>,
	pub(crate) release_stage: String,
	pub(crate) notify_release_stages: Option<Vec<String>>,
	pub(crate) filters: Vec<String>,
	pub(crate) send_code: bool,
	pub(crate) batch_sending: bool,
	pub(crate) capture_user: bool,
	pub(crate) capture_request: bool,
	pub(crate) auto_capture_panics: bool,
	pub(crate) project_root_regex: Option<Regex>,
	pub(crate) strip_path_regex: Option<Regex>,
}

impl Configuration {
	/// Creates a configuration with defaults for everything but the API key.
	pub fn new(api_key: impl Into<String>) -> Self {
		Self {
			api_key: api_key.into(),
			endpoint: DEFAULT_ENDPOINT.to_string(),
			app_type: None,
			app_version: None,
			code_version: None,
			hostname: None,
			release_stage: DEFAULT_RELEASE_STAGE.to_string(),
			notify_release_stages: None,
			filters: DEFAULT_FILTERS.iter().map(|s| s.to_string()).collect(),
			send_code: true,
			batch_sending: true,
			capture_user: true,
			capture_request: true,
			auto_capture_panics: false,
			project_root_regex: None,
			strip_path_regex: None,
		}
	}

	pub fn api_key(&self) -> &str {
		&self.api_key
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	pub fn release_stage(&self) -> &str {
		&self.release_stage
	}

	pub fn send_code(&self) -> bool {
		self.send_code
	}

	pub fn batch_sending(&self) -> bool {
		self.batch_sending
	}

	pub fn capture_user(&self) -> bool {
		self.capture_user
	}

	pub fn capture_request(&self) -> bool {
		self.capture_request
	}

	pub fn auto_capture_panics(&self) -> bool {
		self.auto_capture_panics
	}

	/// The resolved project-root pattern, as a regex source string.
	pub fn project_root_regex(&self) -> Option<&str> {
		self.project_root_regex.as_ref().map(Regex::as_str)
	}

	/// The resolved strip-path pattern, as a regex source string.
	pub fn strip_path_regex(&self) -> Option<&str> {
		self.strip_path_regex.as_ref().map(Regex::as_str)
	}

	/// Compiles and stores the project-root pattern.
	pub fn set_project_root_regex(&mut self, pattern: &str) -> Result<()> {
		self.project_root_regex = Some(Regex::new(pattern)?);
		Ok(())
	}

	/// Compiles and stores the strip-path pattern.
	pub fn set_strip_path_regex(&mut self, pattern: &str) -> Result<()> {
		self.strip_path_regex = Some(Regex::new(pattern)?);
		Ok(())
	}

	/// Whether the current release stage should be reported.
	///
	/// With no stage list configured, every stage notifies.
	pub fn should_notify(&self) -> bool {
		match &self.notify_release_stages {
			Some(stages) => stages.iter().any(|s| s == &self.release_stage),
			None => true,
		}
	}

	/// Whether a file path belongs to the application's own source tree.
	pub fn in_project(&self, path: &str) -> bool {
		self
			.project_root_regex
			.as_ref()
			.map(|re| re.is_match(path))
			.unwrap_or(false)
	}

	/// Removes the strip-path prefix from a file path.
	pub fn strip_path(&self, path: &str) -> String {
		match &self.strip_path_regex {
			Some(re) => re.replace(path, "").into_owned(),
			None => path.to_string(),
		}
	}

	/// Whether a metadata key should be redacted from reports.
	///
	/// Keys match case-insensitively against the configured filter
	/// substrings, so "Authorization" and "user_password" are both caught
	/// by the defaults.
	pub fn redact(&self, key: &str) -> bool {
		let key = key.to_lowercase();
		self
			.filters
			.iter()
			.any(|filter| key.contains(&filter.to_lowercase()))
	}

	pub(crate) fn validate(&self) -> Result<()> {
		if self.api_key.is_empty() {
			return Err(FlareError::MissingApiKey);
		}
		if reqwest::Url::parse(&self.endpoint).is_err() {
			return Err(FlareError::InvalidEndpoint(self.endpoint.clone()));
		}
		Ok(())
	}
}
