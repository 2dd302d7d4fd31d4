// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error reporting SDK for Rust applications.
//!
//! This crate provides the Flare client: a long-lived, process-scoped handle
//! that captures errors together with request/user context and delivers them
//! to a Flare collector endpoint.
//!
//! # Overview
//!
//! - [`Client`] is cheap to clone and safe to share across tasks; all state
//!   lives behind an `Arc`.
//! - [`Configuration`] is immutable once the client is built. It owns the
//!   resolved project-root and strip-path patterns that classify and shorten
//!   stacktrace file paths.
//! - With `batch_sending` enabled (the default) reports are buffered in
//!   memory and drained by [`Client::flush`]; a [`ShutdownStrategy`] exists
//!   to guarantee the buffer is flushed before the process exits.
//!
//! # Example
//!
//! ```ignore
//! use flare_client::Client;
//!
//! let client = Client::builder()
//!     .api_key("key-123")
//!     .release_stage("production")
//!     .build()?;
//!
//! if let Err(e) = do_work() {
//!     client.notify_error("WorkError", &e.to_string()).await?;
//! }
//!
//! client.shutdown().await?;
//! ```

pub mod backtrace;
pub mod client;
pub mod config;
pub mod error;
pub mod report;
pub mod shutdown;

mod panic_hook;

pub use client::{Client, ClientBuilder};
pub use config::Configuration;
pub use error::{FlareError, Result};
pub use report::Report;
pub use shutdown::{ShutdownStrategy, SignalShutdown};

// Re-export the core types callers need to build and inspect reports.
pub use flare_core::{
	Breadcrumb, BreadcrumbType, Frame, RequestContext, Severity, Stacktrace, UserContext,
};
