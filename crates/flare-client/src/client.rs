// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flare client for capturing errors and delivering reports.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use flare_core::{Breadcrumb, BreadcrumbType, Severity};
use reqwest::Client as HttpClient;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::backtrace::capture_backtrace;
use crate::config::Configuration;
use crate::error::{FlareError, Result};
use crate::panic_hook::install_panic_hook;
use crate::report::Report;

/// SDK version for identification.
const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
/// SDK name for identification.
const SDK_NAME: &str = "flare-rust";
/// SDK homepage, sent in the notifier section of every envelope.
const SDK_URL: &str = "https://github.com/ghuntley/flare";

/// Maximum number of breadcrumbs to keep.
const MAX_BREADCRUMBS: usize = 25;

/// Timeout for report delivery requests.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for the synchronous delivery path used by the panic hook.
const SYNC_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Builder for constructing a [`Client`].
///
/// Every setter mirrors a field of [`Configuration`]; unset fields keep
/// their defaults.
#[derive(Debug, Default)]
pub struct ClientBuilder {
	api_key: Option<String>,
	endpoint: Option<String>,
	app_type: Option<String>,
	app_version: Option<String>,
	code_version: Option<String>,
	hostname: Option<String>,
	release_stage: Option<String>,
	notify_release_stages: Option<Vec<String>>,
	filters: Option<Vec<String>>,
	send_code: Option<bool>,
	batch_sending: Option<bool>,
	capture_user: Option<bool>,
	capture_request: Option<bool>,
	auto_capture_panics: Option<bool>,
	project_root_regex: Option<String>,
	strip_path_regex: Option<String>,
}

impl ClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the API key identifying the project at the collector.
	pub fn api_key(mut self, key: impl Into<String>) -> Self {
		self.api_key = Some(key.into());
		self
	}

	/// Sets the collector endpoint URL.
	pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = Some(endpoint.into());
		self
	}

	/// Sets the application type, e.g. "web" or "worker".
	pub fn app_type(mut self, app_type: impl Into<String>) -> Self {
		self.app_type = Some(app_type.into());
		self
	}

	/// Sets the application version.
	pub fn app_version(mut self, version: impl Into<String>) -> Self {
		self.app_version = Some(version.into());
		self
	}

	/// Sets the deployed code version, e.g. a git commit SHA.
	pub fn code_version(mut self, version: impl Into<String>) -> Self {
		self.code_version = Some(version.into());
		self
	}

	/// Overrides the reported hostname.
	pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
		self.hostname = Some(hostname.into());
		self
	}

	/// Sets the release stage, e.g. "production" or "staging".
	pub fn release_stage(mut self, stage: impl Into<String>) -> Self {
		self.release_stage = Some(stage.into());
		self
	}

	/// Restricts notification to the given release stages.
	pub fn notify_release_stages(mut self, stages: Vec<String>) -> Self {
		self.notify_release_stages = Some(stages);
		self
	}

	/// Replaces the default metadata filters.
	pub fn filters(mut self, filters: Vec<String>) -> Self {
		self.filters = Some(filters);
		self
	}

	/// Enables or disables source context in reports.
	pub fn send_code(mut self, send_code: bool) -> Self {
		self.send_code = Some(send_code);
		self
	}

	/// Enables or disables in-memory batching of reports.
	///
	/// When enabled, reports are buffered until [`Client::flush`] runs;
	/// when disabled, every notify delivers immediately.
	pub fn batch_sending(mut self, batch_sending: bool) -> Self {
		self.batch_sending = Some(batch_sending);
		self
	}

	/// Enables or disables attaching user context from the framework.
	pub fn capture_user(mut self, capture_user: bool) -> Self {
		self.capture_user = Some(capture_user);
		self
	}

	/// Enables or disables attaching request metadata from the framework.
	pub fn capture_request(mut self, capture_request: bool) -> Self {
		self.capture_request = Some(capture_request);
		self
	}

	/// Enables or disables the process-global panic hook.
	pub fn auto_capture_panics(mut self, auto_capture_panics: bool) -> Self {
		self.auto_capture_panics = Some(auto_capture_panics);
		self
	}

	/// Sets the resolved project-root pattern (a regex source string).
	pub fn project_root_regex(mut self, pattern: impl Into<String>) -> Self {
		self.project_root_regex = Some(pattern.into());
		self
	}

	/// Sets the resolved strip-path pattern (a regex source string).
	pub fn strip_path_regex(mut self, pattern: impl Into<String>) -> Self {
		self.strip_path_regex = Some(pattern.into());
		self
	}

	/// Builds the client.
	pub fn build(self) -> Result<Client> {
		let mut config = Configuration::new(self.api_key.unwrap_or_default());

		if let Some(endpoint) = self.endpoint {
			config.endpoint = endpoint.trim_end_matches('/').to_string();
		}
		config.app_type = self.app_type;
		config.app_version = self.app_version;
		config.code_version = self.code_version;
		config.hostname = self.hostname;
		if let Some(stage) = self.release_stage {
			config.release_stage = stage;
		}
		config.notify_release_stages = self.notify_release_stages;
		if let Some(filters) = self.filters {
			config.filters = filters;
		}
		if let Some(send_code) = self.send_code {
			config.send_code = send_code;
		}
		if let Some(batch_sending) = self.batch_sending {
			config.batch_sending = batch_sending;
		}
		if let Some(capture_user) = self.capture_user {
			config.capture_user = capture_user;
		}
		if let Some(capture_request) = self.capture_request {
			config.capture_request = capture_request;
		}
		if let Some(auto_capture_panics) = self.auto_capture_panics {
			config.auto_capture_panics = auto_capture_panics;
		}

		config.validate()?;

		if let Some(pattern) = &self.project_root_regex {
			config.set_project_root_regex(pattern)?;
		}
		if let Some(pattern) = &self.strip_path_regex {
			config.set_strip_path_regex(pattern)?;
		}

		let http_client = HttpClient::builder()
			.user_agent(format!("{}/{}", SDK_NAME, SDK_VERSION))
			.timeout(DELIVERY_TIMEOUT)
			.build()
			.map_err(FlareError::RequestFailed)?;

		let endpoint = config.endpoint.clone();
		let inner = Arc::new(ClientInner {
			config,
			http_client,
			queue: RwLock::new(Vec::new()),
			breadcrumbs: RwLock::new(Vec::new()),
			closed: AtomicBool::new(false),
		});

		info!(endpoint = %endpoint, "Flare client initialized");

		Ok(Client { inner })
	}
}

/// Internal client state.
struct ClientInner {
	config: Configuration,
	http_client: HttpClient,
	queue: RwLock<Vec<Report>>,
	breadcrumbs: RwLock<Vec<Breadcrumb>>,
	closed: AtomicBool,
}

/// Client for capturing errors and reporting them to a Flare collector.
///
/// The client is constructed once at application boot and shared, read-only,
/// across requests. Cloning is cheap; all clones share the same state.
#[derive(Clone)]
pub struct Client {
	inner: Arc<ClientInner>,
}

impl Client {
	/// Creates a new builder for constructing a client.
	pub fn builder() -> ClientBuilder {
		ClientBuilder::new()
	}

	/// The immutable configuration this client was built with.
	pub fn config(&self) -> &Configuration {
		&self.inner.config
	}

	/// Captures an error value and reports it.
	pub async fn capture_error(&self, error: &dyn std::error::Error) -> Result<()> {
		self
			.notify_error(std::any::type_name_of_val(error), &error.to_string())
			.await
	}

	/// Reports an error with an explicit class and message, capturing the
	/// current backtrace.
	pub async fn notify_error(&self, error_class: &str, message: &str) -> Result<()> {
		let report = Report::new(
			&self.inner.config,
			Severity::Error,
			error_class,
			message,
			capture_backtrace(),
		);
		self.notify(report).await
	}

	/// Reports a prepared [`Report`].
	///
	/// With batching enabled the report is queued for the next
	/// [`flush`](Self::flush); otherwise it is delivered immediately.
	pub async fn notify(&self, mut report: Report) -> Result<()> {
		self.check_closed()?;

		if !self.inner.config.should_notify() {
			debug!(
				release_stage = %self.inner.config.release_stage(),
				"release stage is not in notify_release_stages, dropping report"
			);
			return Ok(());
		}

		report.breadcrumbs = self.inner.breadcrumbs.read().await.clone();
		report.apply_filters(&self.inner.config);

		if self.inner.config.batch_sending() {
			self.inner.queue.write().await.push(report);
			return Ok(());
		}

		self.deliver(&[report]).await
	}

	/// Adds a breadcrumb to the trail attached to subsequent reports.
	pub async fn leave_breadcrumb(
		&self,
		name: impl Into<String>,
		breadcrumb_type: BreadcrumbType,
		metadata: serde_json::Value,
	) {
		let mut breadcrumbs = self.inner.breadcrumbs.write().await;
		breadcrumbs.push(Breadcrumb {
			name: name.into(),
			breadcrumb_type,
			metadata,
			..Default::default()
		});

		while breadcrumbs.len() > MAX_BREADCRUMBS {
			breadcrumbs.remove(0);
		}
	}

	/// Number of reports buffered and awaiting delivery.
	pub async fn pending_reports(&self) -> usize {
		self.inner.queue.read().await.len()
	}

	/// Removes and returns all buffered reports without delivering them.
	///
	/// Intended for integration tests and custom delivery loops.
	pub async fn drain_pending(&self) -> Vec<Report> {
		self.inner.queue.write().await.drain(..).collect()
	}

	/// Drains the report buffer and delivers its contents as one batch.
	pub async fn flush(&self) -> Result<()> {
		let batch: Vec<Report> = self.inner.queue.write().await.drain(..).collect();
		if batch.is_empty() {
			return Ok(());
		}

		debug!(count = batch.len(), "flushing buffered reports");
		self.deliver(&batch).await
	}

	/// Shuts down the client, flushing any buffered reports first.
	///
	/// Subsequent notifies fail with [`FlareError::ClientShutdown`]; calling
	/// shutdown again is a no-op.
	pub async fn shutdown(&self) -> Result<()> {
		if self.inner.closed.swap(true, Ordering::SeqCst) {
			return Ok(());
		}

		let result = self.flush().await;
		info!("Flare client shutdown");
		result
	}

	/// Returns true if the client has been shut down.
	pub fn is_closed(&self) -> bool {
		self.inner.closed.load(Ordering::SeqCst)
	}

	/// Installs a process-global panic hook that reports panics before the
	/// default hook runs.
	pub fn install_panic_hook(&self) {
		install_panic_hook(self.clone());
		info!("panic hook installed");
	}

	fn check_closed(&self) -> Result<()> {
		if self.inner.closed.load(Ordering::SeqCst) {
			return Err(FlareError::ClientShutdown);
		}
		Ok(())
	}

	async fn deliver(&self, reports: &[Report]) -> Result<()> {
		let envelope = Envelope {
			api_key: self.inner.config.api_key(),
			notifier: Notifier::current(),
			events: reports,
		};

		debug!(
			endpoint = %self.inner.config.endpoint(),
			count = reports.len(),
			"delivering reports"
		);

		let response = self
			.inner
			.http_client
			.post(self.inner.config.endpoint())
			.header("Flare-Api-Key", self.inner.config.api_key())
			.json(&envelope)
			.send()
			.await
			.map_err(FlareError::RequestFailed)?;

		if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
			let retry_after = response
				.headers()
				.get("Retry-After")
				.and_then(|v| v.to_str().ok())
				.and_then(|s| s.parse().ok());
			return Err(FlareError::RateLimited {
				retry_after_secs: retry_after,
			});
		}

		if !response.status().is_success() {
			let status = response.status().as_u16();
			let message = response.text().await.unwrap_or_default();
			error!(status, message = %message, "failed to deliver reports");
			return Err(FlareError::ServerError { status, message });
		}

		debug!(count = reports.len(), "reports delivered");
		Ok(())
	}

	/// Delivers a report synchronously. Only for use from panic hooks,
	/// where no runtime is available to await on.
	pub(crate) fn deliver_sync(&self, report: Report) -> Result<()> {
		let reports = [report];
		let envelope = Envelope {
			api_key: self.inner.config.api_key(),
			notifier: Notifier::current(),
			events: &reports,
		};

		let client = reqwest::blocking::Client::builder()
			.user_agent(format!("{}/{}", SDK_NAME, SDK_VERSION))
			.timeout(SYNC_DELIVERY_TIMEOUT)
			.build()
			.map_err(FlareError::RequestFailed)?;

		let response = client
			.post(self.inner.config.endpoint())
			.header("Flare-Api-Key", self.inner.config.api_key())
			.json(&envelope)
			.send()
			.map_err(FlareError::RequestFailed)?;

		if response.status().is_success() {
			debug!("panic reported");
			Ok(())
		} else {
			let status = response.status().as_u16();
			let message = response.text().unwrap_or_default();
			error!(status, message = %message, "failed to report panic");
			Err(FlareError::ServerError { status, message })
		}
	}

	/// Prepares a report outside of async context. Returns None when the
	/// client is closed or the release stage is muted.
	pub(crate) fn prepare_sync(&self, mut report: Report) -> Option<Report> {
		if self.inner.closed.load(Ordering::SeqCst) {
			return None;
		}
		if !self.inner.config.should_notify() {
			return None;
		}

		report.breadcrumbs = self.inner.breadcrumbs.blocking_read().clone();
		report.apply_filters(&self.inner.config);
		Some(report)
	}
}

/// Wire envelope wrapping a batch of reports.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
	api_key: &'a str,
	notifier: Notifier,
	events: &'a [Report],
}

/// Notifier identification sent with every envelope.
#[derive(Debug, Serialize)]
struct Notifier {
	name: &'static str,
	version: &'static str,
	url: &'static str,
}

impl Notifier {
	fn current() -> Self {
		Self {
			name: SDK_NAME,
			version: SDK_VERSION,
			url: SDK_URL,
		}
	}
}
