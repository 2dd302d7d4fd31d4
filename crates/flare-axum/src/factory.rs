// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client construction from framework configuration.

use std::sync::Arc;

use flare_client::{Client, FlareError, Result, ShutdownStrategy};
use tracing::debug;

use crate::config::FlareConfigLayer;
use crate::paths::resolve_path_patterns;

/// Builds one pre-configured, shared [`Client`] from the finalized
/// configuration layer.
///
/// The factory applies every configured field to the client builder, applies
/// the resolved path patterns last, and — when a shutdown strategy was
/// supplied — registers it against the constructed instance exactly once.
pub struct ClientFactory {
	config: FlareConfigLayer,
	application_root: String,
	shutdown_strategy: Option<Arc<dyn ShutdownStrategy>>,
}

impl ClientFactory {
	/// Creates a factory for the given configuration and application root.
	///
	/// The application root is supplied by the host application (typically
	/// `env!("CARGO_MANIFEST_DIR")` or the deploy directory), not by user
	/// configuration; path-pattern defaults derive from it.
	pub fn new(config: FlareConfigLayer, application_root: impl Into<String>) -> Self {
		Self {
			config,
			application_root: application_root.into(),
			shutdown_strategy: None,
		}
	}

	/// Supplies a shutdown strategy to register against the built client.
	pub fn with_shutdown_strategy(mut self, strategy: Arc<dyn ShutdownStrategy>) -> Self {
		self.shutdown_strategy = Some(strategy);
		self
	}

	/// Builds the client.
	pub fn make(&self) -> Result<Client> {
		let key = self.config.key.clone().ok_or(FlareError::MissingApiKey)?;

		let mut builder = Client::builder().api_key(key);

		if let Some(endpoint) = &self.config.endpoint {
			builder = builder.endpoint(endpoint);
		}
		if let Some(stage) = &self.config.release_stage {
			builder = builder.release_stage(stage);
		}
		if let Some(stages) = &self.config.notify_release_stages {
			builder = builder.notify_release_stages(stages.clone());
		}
		if let Some(app_type) = &self.config.app_type {
			builder = builder.app_type(app_type);
		}
		if let Some(version) = &self.config.app_version {
			builder = builder.app_version(version);
		}
		if let Some(version) = &self.config.code_version {
			builder = builder.code_version(version);
		}
		if let Some(hostname) = &self.config.hostname {
			builder = builder.hostname(hostname);
		}
		if let Some(send_code) = self.config.send_code {
			builder = builder.send_code(send_code);
		}
		if let Some(batch_sending) = self.config.batch_sending {
			builder = builder.batch_sending(batch_sending);
		}
		if let Some(capture_user) = self.config.capture_user {
			builder = builder.capture_user(capture_user);
		}
		if let Some(capture_request) = self.config.capture_request {
			builder = builder.capture_request(capture_request);
		}
		if let Some(auto_capture_panics) = self.config.auto_capture_panics {
			builder = builder.auto_capture_panics(auto_capture_panics);
		}
		if let Some(filters) = &self.config.filters {
			builder = builder.filters(filters.clone());
		}

		// Path patterns go on last so they land on the fully configured
		// instance.
		let patterns = resolve_path_patterns(
			&self.application_root,
			self.config.project_root.as_deref(),
			self.config.strip_path.as_deref(),
			self.config.project_root_regex.as_deref(),
			self.config.strip_path_regex.as_deref(),
		);
		debug!(
			project_root_regex = %patterns.project_root_regex,
			strip_path_regex = %patterns.strip_path_regex,
			"resolved path patterns"
		);
		builder = builder
			.project_root_regex(&patterns.project_root_regex)
			.strip_path_regex(&patterns.strip_path_regex);

		let client = builder.build()?;

		if client.config().auto_capture_panics() {
			client.install_panic_hook();
		}

		if let Some(strategy) = &self.shutdown_strategy {
			strategy.register(&client);
		}

		Ok(client)
	}
}
