// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Axum/tower integration for the Flare error reporting SDK.
//!
//! This crate is glue: it reads framework configuration, constructs a
//! pre-configured [`flare_client::Client`], and hooks a tower layer into the
//! request pipeline so that unhandled failures (panics and 5xx responses)
//! are forwarded to the client together with request metadata.
//!
//! # Overview
//!
//! - [`FlareConfigLayer`] is the configuration surface, loaded from a TOML
//!   file and `FLARE_*` environment variables.
//! - [`resolve_path_patterns`] derives the project-root and strip-path
//!   patterns from the configured paths and the application root.
//! - [`ClientFactory`] turns the finalized configuration into one shared
//!   [`Client`](flare_client::Client), registering an optional
//!   [`ShutdownStrategy`](flare_client::ShutdownStrategy) against it.
//! - [`FlareLayer`] wraps services so failures are reported without altering
//!   how they propagate.
//!
//! # Example
//!
//! ```ignore
//! use axum::{routing::get, Router};
//! use flare_axum::{load_config, ClientFactory, FlareLayer};
//! use flare_client::SignalShutdown;
//! use std::sync::Arc;
//!
//! let config = load_config(Some("/etc/flare/flare.toml".as_ref()))?;
//! let client = ClientFactory::new(config, env!("CARGO_MANIFEST_DIR"))
//!     .with_shutdown_strategy(Arc::new(SignalShutdown::new()))
//!     .make()?;
//!
//! let app: Router = Router::new()
//!     .route("/", get(handler))
//!     .layer(FlareLayer::new(client));
//! ```

pub mod config;
pub mod factory;
pub mod middleware;
pub mod paths;
pub mod request;

pub use config::{load_config, ConfigError, FlareConfigLayer};
pub use factory::ClientFactory;
pub use middleware::{FlareLayer, FlareService};
pub use paths::{path_to_regex, resolve_path_patterns, PathPatterns};
pub use request::extract_request_context;

/// Convenience for wiring an already-constructed client into a router.
///
/// Equivalent to `FlareLayer::new(client)`.
pub fn attach(client: flare_client::Client) -> FlareLayer {
	FlareLayer::new(client)
}
