// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Framework configuration surface.
//!
//! Configuration is layered: built-in defaults, then a TOML file, then
//! `FLARE_*` environment variables, with later sources overriding earlier
//! ones. Every field is optional; absent values mean "use the default" and
//! are never an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Failed to read the config file.
	#[error("failed to read config file {path}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Failed to parse the config file.
	#[error("failed to parse config file {path}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// An environment variable held an unparseable value.
	#[error("invalid value {value:?} for {var}")]
	InvalidValue { var: String, value: String },
}

/// One layer of Flare configuration; all fields optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlareConfigLayer {
	pub key: Option<String>,
	pub endpoint: Option<String>,
	pub release_stage: Option<String>,
	pub notify_release_stages: Option<Vec<String>>,
	pub project_root: Option<String>,
	pub project_root_regex: Option<String>,
	pub strip_path: Option<String>,
	pub strip_path_regex: Option<String>,
	pub app_type: Option<String>,
	pub app_version: Option<String>,
	pub code_version: Option<String>,
	pub hostname: Option<String>,
	pub send_code: Option<bool>,
	pub batch_sending: Option<bool>,
	pub capture_user: Option<bool>,
	pub capture_request: Option<bool>,
	pub auto_capture_panics: Option<bool>,
	pub filters: Option<Vec<String>>,
}

impl FlareConfigLayer {
	/// Merges another layer into this one; set fields in `other` win.
	pub fn merge(&mut self, other: Self) {
		macro_rules! take_if_set {
			($($field:ident),* $(,)?) => {
				$(
					if other.$field.is_some() {
						self.$field = other.$field;
					}
				)*
			};
		}

		take_if_set!(
			key,
			endpoint,
			release_stage,
			notify_release_stages,
			project_root,
			project_root_regex,
			strip_path,
			strip_path_regex,
			app_type,
			app_version,
			code_version,
			hostname,
			send_code,
			batch_sending,
			capture_user,
			capture_request,
			auto_capture_panics,
			filters,
		);
	}

	/// Loads a layer from a TOML file. A missing file yields an empty layer.
	pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
		if !path.exists() {
			debug!(path = %path.display(), "config file not found, skipping");
			return Ok(Self::default());
		}

		debug!(path = %path.display(), "loading config file");
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
			path: path.to_path_buf(),
			source: e,
		})?;

		toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: path.to_path_buf(),
			source: e,
		})
	}

	/// Loads a layer from `FLARE_*` environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Ok(Self {
			key: env_string("FLARE_KEY"),
			endpoint: env_string("FLARE_ENDPOINT"),
			release_stage: env_string("FLARE_RELEASE_STAGE"),
			notify_release_stages: env_list("FLARE_NOTIFY_RELEASE_STAGES"),
			project_root: env_string("FLARE_PROJECT_ROOT"),
			project_root_regex: env_string("FLARE_PROJECT_ROOT_REGEX"),
			strip_path: env_string("FLARE_STRIP_PATH"),
			strip_path_regex: env_string("FLARE_STRIP_PATH_REGEX"),
			app_type: env_string("FLARE_APP_TYPE"),
			app_version: env_string("FLARE_APP_VERSION"),
			code_version: env_string("FLARE_CODE_VERSION"),
			hostname: env_string("FLARE_HOSTNAME"),
			send_code: env_bool("FLARE_SEND_CODE")?,
			batch_sending: env_bool("FLARE_BATCH_SENDING")?,
			capture_user: env_bool("FLARE_CAPTURE_USER")?,
			capture_request: env_bool("FLARE_CAPTURE_REQUEST")?,
			auto_capture_panics: env_bool("FLARE_AUTO_CAPTURE_PANICS")?,
			filters: env_list("FLARE_FILTERS"),
		})
	}
}

/// Loads configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`FLARE_*`)
/// 2. Config file, when a path is given
/// 3. Built-in defaults (an empty layer)
pub fn load_config(path: Option<&Path>) -> Result<FlareConfigLayer, ConfigError> {
	let mut merged = FlareConfigLayer::default();
	if let Some(path) = path {
		merged.merge(FlareConfigLayer::from_toml_file(path)?);
	}
	merged.merge(FlareConfigLayer::from_env()?);
	Ok(merged)
}

fn env_string(var: &str) -> Option<String> {
	std::env::var(var).ok().filter(|v| !v.is_empty())
}

fn env_list(var: &str) -> Option<Vec<String>> {
	env_string(var).map(|v| {
		v.split(',')
			.map(|s| s.trim().to_string())
			.filter(|s| !s.is_empty())
			.collect()
	})
}

fn env_bool(var: &str) -> Result<Option<bool>, ConfigError> {
	match env_string(var) {
		None => Ok(None),
		Some(value) => match value.as_str() {
			"true" | "1" => Ok(Some(true)),
			"false" | "0" => Ok(Some(false)),
			_ => Err(ConfigError::InvalidValue {
				var: var.to_string(),
				value,
			}),
		},
	}
}
