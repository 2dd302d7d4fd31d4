// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shutdown strategies for flushing buffered reports at process exit.

use tracing::{error, info};

use crate::client::Client;

/// A process-exit hook for a constructed client.
///
/// The client buffers reports in memory when batch sending is enabled; a
/// shutdown strategy guarantees that buffer is flushed before the process
/// terminates. Strategies are registered against a fully configured client,
/// exactly once, by whoever constructs it.
pub trait ShutdownStrategy: Send + Sync {
	/// Registers process-exit handling against the given client.
	fn register(&self, client: &Client);
}

/// Shutdown strategy that flushes on SIGINT (ctrl-c).
///
/// `register` spawns a background task, so it must be called from within a
/// tokio runtime.
#[derive(Debug, Default)]
pub struct SignalShutdown;

impl SignalShutdown {
	pub fn new() -> Self {
		Self
	}
}

impl ShutdownStrategy for SignalShutdown {
	fn register(&self, client: &Client) {
		let client = client.clone();
		tokio::spawn(async move {
			if tokio::signal::ctrl_c().await.is_err() {
				error!("failed to install interrupt handler");
				return;
			}

			info!("interrupt received, flushing buffered reports");
			if let Err(e) = client.shutdown().await {
				error!(error = %e, "failed to flush reports during shutdown");
			}
		});
	}
}
