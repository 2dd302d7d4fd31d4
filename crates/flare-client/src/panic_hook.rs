// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Process-global panic hook for automatic crash reporting.

use std::panic::{self, PanicHookInfo};

use flare_core::Severity;
use tracing::error;

use crate::backtrace::capture_backtrace;
use crate::client::Client;
use crate::report::Report;

/// Installs a panic hook that reports panics before the previous hook runs.
pub(crate) fn install_panic_hook(client: Client) {
	let previous = panic::take_hook();
	panic::set_hook(Box::new(move |info| {
		report_panic(&client, info);
		previous(info);
	}));
}

fn report_panic(client: &Client, info: &PanicHookInfo<'_>) {
	let message = panic_message(info);

	let mut report = Report::new(
		client.config(),
		Severity::Error,
		"Panic",
		&message,
		capture_backtrace(),
	);

	if let Some(location) = info.location() {
		report = report.with_metadata(
			"panic_location",
			serde_json::json!(format!("{}:{}", location.file(), location.line())),
		);
	}

	let Some(report) = client.prepare_sync(report) else {
		return;
	};

	// The process is going down; delivery has to happen synchronously.
	if let Err(e) = client.deliver_sync(report) {
		error!(error = %e, "failed to deliver panic report");
	}
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
	if let Some(s) = info.payload().downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = info.payload().downcast_ref::<String>() {
		s.clone()
	} else {
		"unknown panic payload".to_string()
	}
}
