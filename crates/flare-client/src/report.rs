// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Report payloads sent to the Flare collector.
//!
//! A [`Report`] is built against an immutable [`Configuration`]: the
//! configured path patterns classify frames as in-project and shorten the
//! paths shown in the report, and the metadata filters redact sensitive
//! keys before anything leaves the process.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use flare_core::{Breadcrumb, RequestContext, Severity, Stacktrace, UserContext};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backtrace::source_context;
use crate::config::Configuration;

/// Replacement value for redacted metadata.
pub const REDACTED: &str = "[REDACTED]";

/// A single error event, ready for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
	pub event_id: Uuid,
	pub timestamp: DateTime<Utc>,
	pub severity: Severity,
	pub error_class: String,
	pub message: String,
	pub stacktrace: Stacktrace,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub request: Option<RequestContext>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user: Option<UserContext>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub breadcrumbs: Vec<Breadcrumb>,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub metadata: BTreeMap<String, serde_json::Value>,
	pub app: AppInfo,
	pub device: DeviceInfo,
}

/// Application identification attached to every report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfo {
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	pub app_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub code_version: Option<String>,
	pub release_stage: String,
}

/// Host identification attached to every report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hostname: Option<String>,
}

impl Report {
	/// Builds a report, applying the configuration's path patterns to the
	/// stacktrace.
	///
	/// Frames with a captured file path are classified via the project-root
	/// pattern and their display path shortened via the strip-path pattern.
	/// Source context is attached only to in-project frames, and only when
	/// `send_code` is enabled.
	pub fn new(
		config: &Configuration,
		severity: Severity,
		error_class: &str,
		message: &str,
		mut stacktrace: Stacktrace,
	) -> Self {
		for frame in &mut stacktrace.frames {
			if let Some(path) = frame.abs_path.clone() {
				frame.in_project = config.in_project(&path);
				frame.filename = Some(config.strip_path(&path));

				if config.send_code() && frame.in_project {
					if let Some(lineno) = frame.lineno {
						if let Some((pre, line, post)) = source_context(&path, lineno) {
							frame.pre_context = pre;
							frame.context_line = Some(line);
							frame.post_context = post;
						}
					}
				}
			}

			if !config.send_code() {
				frame.context_line = None;
				frame.pre_context.clear();
				frame.post_context.clear();
			}
		}

		Self {
			event_id: Uuid::now_v7(),
			timestamp: Utc::now(),
			severity,
			error_class: error_class.to_string(),
			message: message.to_string(),
			stacktrace,
			request: None,
			user: None,
			breadcrumbs: Vec::new(),
			metadata: BTreeMap::new(),
			app: AppInfo {
				app_type: config.app_type.clone(),
				version: config.app_version.clone(),
				code_version: config.code_version.clone(),
				release_stage: config.release_stage.clone(),
			},
			device: DeviceInfo {
				hostname: config.hostname.clone(),
			},
		}
	}

	/// Attaches HTTP request context.
	pub fn with_request(mut self, request: RequestContext) -> Self {
		self.request = Some(request);
		self
	}

	/// Attaches user context.
	pub fn with_user(mut self, user: UserContext) -> Self {
		self.user = Some(user);
		self
	}

	/// Overrides the severity.
	pub fn with_severity(mut self, severity: Severity) -> Self {
		self.severity = severity;
		self
	}

	/// Attaches a metadata entry.
	pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
		self.metadata.insert(key.into(), value);
		self
	}

	/// Redacts metadata entries and request headers whose keys match the
	/// configured filters.
	pub(crate) fn apply_filters(&mut self, config: &Configuration) {
		for (key, value) in self.metadata.iter_mut() {
			if config.redact(key) {
				*value = serde_json::Value::String(REDACTED.to_string());
			}
		}

		if let Some(request) = &mut self.request {
			for (key, value) in request.headers.iter_mut() {
				if config.redact(key) {
					*value = REDACTED.to_string();
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use flare_core::Frame;

	fn config() -> Configuration {
		let mut config = Configuration::new("key-123");
		config
			.set_project_root_regex(r"(?i)^/example/root/path/src[/\\]?")
			.unwrap();
		config
			.set_strip_path_regex(r"(?i)^/example/root/path[/\\]?")
			.unwrap();
		config
	}

	fn stacktrace() -> Stacktrace {
		Stacktrace {
			frames: vec![
				Frame {
					function: Some("app::handlers::create".to_string()),
					abs_path: Some("/example/root/path/src/handlers.rs".to_string()),
					lineno: Some(42),
					..Default::default()
				},
				Frame {
					function: Some("hyper::proto::dispatch".to_string()),
					abs_path: Some("/cargo/registry/hyper/src/proto.rs".to_string()),
					lineno: Some(7),
					..Default::default()
				},
			],
		}
	}

	#[test]
	fn frames_are_classified_and_stripped() {
		let report = Report::new(&config(), Severity::Error, "Oops", "it broke", stacktrace());

		let app_frame = &report.stacktrace.frames[0];
		assert!(app_frame.in_project);
		assert_eq!(app_frame.filename.as_deref(), Some("src/handlers.rs"));
		assert_eq!(
			app_frame.abs_path.as_deref(),
			Some("/example/root/path/src/handlers.rs")
		);

		let vendor_frame = &report.stacktrace.frames[1];
		assert!(!vendor_frame.in_project);
		assert_eq!(
			vendor_frame.filename.as_deref(),
			Some("/cargo/registry/hyper/src/proto.rs")
		);
	}

	#[test]
	fn send_code_disabled_drops_source_context() {
		let mut cfg = config();
		cfg.send_code = false;

		let mut trace = stacktrace();
		trace.frames[0].context_line = Some("let x = boom();".to_string());
		trace.frames[0].pre_context = vec!["fn create() {".to_string()];

		let report = Report::new(&cfg, Severity::Error, "Oops", "it broke", trace);
		let frame = &report.stacktrace.frames[0];
		assert!(frame.context_line.is_none());
		assert!(frame.pre_context.is_empty());
	}

	#[test]
	fn apply_filters_redacts_metadata_and_headers() {
		let mut report = Report::new(&config(), Severity::Error, "Oops", "it broke", stacktrace())
			.with_metadata("password", serde_json::json!("hunter2"))
			.with_metadata("request_id", serde_json::json!("req-1"));

		let mut request = RequestContext::default();
		request
			.headers
			.insert("Authorization".to_string(), "Bearer token".to_string());
		request
			.headers
			.insert("Accept".to_string(), "application/json".to_string());
		report = report.with_request(request);

		report.apply_filters(&config());

		assert_eq!(report.metadata["password"], REDACTED);
		assert_eq!(report.metadata["request_id"], "req-1");

		let headers = &report.request.as_ref().unwrap().headers;
		assert_eq!(headers["Authorization"], REDACTED);
		assert_eq!(headers["Accept"], "application/json");
	}

	#[test]
	fn report_round_trips_through_json() {
		let report = Report::new(&config(), Severity::Error, "Oops", "it broke", stacktrace())
			.with_metadata("request_id", serde_json::json!("req-1"));

		let json = serde_json::to_value(&report).unwrap();
		assert_eq!(json["event_id"], report.event_id.to_string());
		assert_eq!(json["severity"], "error");

		let parsed: Report = serde_json::from_value(json).unwrap();
		assert_eq!(parsed.event_id, report.event_id);
		assert_eq!(parsed.error_class, "Oops");
	}

	#[test]
	fn report_carries_app_and_device_sections() {
		let mut cfg = config();
		cfg.app_type = Some("worker".to_string());
		cfg.app_version = Some("1.2.3".to_string());
		cfg.hostname = Some("web-1".to_string());
		cfg.release_stage = "staging".to_string();

		let report = Report::new(&cfg, Severity::Warning, "Oops", "it broke", Stacktrace::default());
		assert_eq!(report.app.app_type.as_deref(), Some("worker"));
		assert_eq!(report.app.version.as_deref(), Some("1.2.3"));
		assert_eq!(report.app.release_stage, "staging");
		assert_eq!(report.device.hostname.as_deref(), Some("web-1"));
	}
}
