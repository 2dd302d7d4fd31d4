// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: wire Flare into an axum application.
//!
//! Run with:
//!   FLARE_KEY=example-123 cargo run --example axum_app -p flare-axum

use std::sync::Arc;

use axum::{routing::get, Router};
use flare_axum::{load_config, ClientFactory, FlareLayer};
use flare_client::SignalShutdown;

async fn ok() -> &'static str {
	"ok"
}

async fn boom() -> &'static str {
	panic!("example panic, reported to Flare before the 500 goes out")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt::init();

	let config = load_config(None)?;
	let client = ClientFactory::new(config, env!("CARGO_MANIFEST_DIR"))
		.with_shutdown_strategy(Arc::new(SignalShutdown::new()))
		.make()?;

	let app = Router::new()
		.route("/", get(ok))
		.route("/boom", get(boom))
		.layer(FlareLayer::new(client));

	let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
	println!("listening on http://127.0.0.1:3000 (try /boom)");
	axum::serve(listener, app).await?;

	Ok(())
}
