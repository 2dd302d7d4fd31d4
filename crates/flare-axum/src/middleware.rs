// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tower middleware forwarding unhandled failures to the Flare client.
//!
//! [`FlareLayer`] wraps services in a [`FlareService`] that captures request
//! metadata before the inner service runs, then watches how the request
//! ends: a panic is reported and resumed unchanged, and a 5xx response is
//! reported and returned unchanged. The middleware never swallows or alters
//! the original failure's propagation — the framework's own error handling
//! still sees everything it would have seen without the layer.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use flare_client::{Client, Report, Severity, Stacktrace};
use flare_core::{RequestContext, UserContext};
use futures::future::{CatchUnwind, FutureExt};
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use tracing::debug;

use crate::request::extract_request_context;

/// Layer attaching failure reporting to every wrapped service.
///
/// # Example
///
/// ```ignore
/// Router::new()
///     .route("/", get(handler))
///     .layer(FlareLayer::new(client));
/// ```
#[derive(Clone)]
pub struct FlareLayer {
	client: Client,
}

impl FlareLayer {
	/// Creates a layer reporting to the given client.
	pub fn new(client: Client) -> Self {
		Self { client }
	}
}

impl<S> Layer<S> for FlareLayer {
	type Service = FlareService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		FlareService {
			inner,
			client: self.client.clone(),
		}
	}
}

/// Service wrapper for [`FlareLayer`].
#[derive(Clone)]
pub struct FlareService<S> {
	inner: S,
	client: Client,
}

impl<S> Service<Request<Body>> for FlareService<S>
where
	S: Service<Request<Body>, Response = Response>,
{
	type Response = Response;
	type Error = S::Error;
	type Future = FlareFuture<S::Future>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let config = self.client.config();

		let context = config
			.capture_request()
			.then(|| extract_request_context(&req));

		let user = if config.capture_user() {
			req.extensions().get::<UserContext>().cloned()
		} else {
			None
		};

		FlareFuture {
			inner: AssertUnwindSafe(self.inner.call(req)).catch_unwind(),
			client: self.client.clone(),
			context,
			user,
		}
	}
}

pin_project! {
	/// Response future for [`FlareService`].
	pub struct FlareFuture<F> {
		#[pin]
		inner: CatchUnwind<AssertUnwindSafe<F>>,
		client: Client,
		context: Option<RequestContext>,
		user: Option<UserContext>,
	}
}

impl<F, E> Future for FlareFuture<F>
where
	F: Future<Output = Result<Response, E>>,
{
	type Output = Result<Response, E>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		let this = self.project();

		match ready!(this.inner.poll(cx)) {
			Ok(Ok(response)) => {
				if response.status().is_server_error() {
					let report = Report::new(
						this.client.config(),
						Severity::Error,
						"HttpServerError",
						&format!("request completed with status {}", response.status()),
						Stacktrace::default(),
					);
					forward(this.client, report, this.context.take(), this.user.take());
				}
				Poll::Ready(Ok(response))
			}
			Ok(Err(e)) => Poll::Ready(Err(e)),
			Err(payload) => {
				// The unwind has already happened here; the panic-site
				// backtrace is only available via the client's panic hook.
				let message = panic_message(payload.as_ref());
				let report = Report::new(
					this.client.config(),
					Severity::Error,
					"Panic",
					&message,
					Stacktrace::default(),
				);
				forward(this.client, report, this.context.take(), this.user.take());
				std::panic::resume_unwind(payload)
			}
		}
	}
}

/// Hands a report to the client on a background task.
fn forward(
	client: &Client,
	mut report: Report,
	context: Option<RequestContext>,
	user: Option<UserContext>,
) {
	if let Some(context) = context {
		report = report.with_request(context);
	}
	if let Some(user) = user {
		report = report.with_user(user);
	}

	let client = client.clone();
	tokio::spawn(async move {
		if let Err(e) = client.notify(report).await {
			debug!(error = %e, "failed to forward failure to Flare");
		}
	});
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"unknown panic payload".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::convert::Infallible;
	use std::time::Duration;

	use axum::http::StatusCode;
	use tower::{service_fn, ServiceExt};

	fn client() -> Client {
		Client::builder()
			.api_key("key-123")
			.batch_sending(true)
			.build()
			.unwrap()
	}

	async fn wait_for_report(client: &Client) -> Vec<Report> {
		tokio::time::timeout(Duration::from_secs(2), async {
			loop {
				let pending = client.drain_pending().await;
				if !pending.is_empty() {
					return pending;
				}
				tokio::time::sleep(Duration::from_millis(10)).await;
			}
		})
		.await
		.expect("report was never forwarded")
	}

	fn response(status: StatusCode) -> Response {
		let mut response = Response::new(Body::empty());
		*response.status_mut() = status;
		response
	}

	#[tokio::test]
	async fn successful_responses_are_not_reported() {
		let client = client();
		let svc = FlareLayer::new(client.clone())
			.layer(service_fn(|_req: Request<Body>| async {
				Ok::<_, Infallible>(response(StatusCode::OK))
			}));

		let res = svc.oneshot(Request::new(Body::empty())).await.unwrap();
		assert_eq!(res.status(), StatusCode::OK);

		tokio::time::sleep(Duration::from_millis(50)).await;
		assert_eq!(client.pending_reports().await, 0);
	}

	#[tokio::test]
	async fn server_errors_are_reported_and_passed_through() {
		let client = client();
		let svc = FlareLayer::new(client.clone())
			.layer(service_fn(|_req: Request<Body>| async {
				Ok::<_, Infallible>(response(StatusCode::INTERNAL_SERVER_ERROR))
			}));

		let req = Request::builder()
			.method("GET")
			.uri("/boom?why=testing")
			.header("host", "example.com")
			.body(Body::empty())
			.unwrap();

		let res = svc.oneshot(req).await.unwrap();
		assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

		let reports = wait_for_report(&client).await;
		assert_eq!(reports.len(), 1);
		assert_eq!(reports[0].error_class, "HttpServerError");

		let request = reports[0].request.as_ref().unwrap();
		assert_eq!(request.method.as_deref(), Some("GET"));
		assert_eq!(request.url.as_deref(), Some("http://example.com/boom?why=testing"));
	}

	#[tokio::test]
	async fn client_errors_are_not_reported() {
		let client = client();
		let svc = FlareLayer::new(client.clone())
			.layer(service_fn(|_req: Request<Body>| async {
				Ok::<_, Infallible>(response(StatusCode::NOT_FOUND))
			}));

		let res = svc.oneshot(Request::new(Body::empty())).await.unwrap();
		assert_eq!(res.status(), StatusCode::NOT_FOUND);

		tokio::time::sleep(Duration::from_millis(50)).await;
		assert_eq!(client.pending_reports().await, 0);
	}

	#[tokio::test]
	async fn panics_are_reported_and_resumed() {
		let client = client();
		let svc = FlareLayer::new(client.clone())
			.layer(service_fn(|_req: Request<Body>| async {
				panic!("handler exploded");
				#[allow(unreachable_code)]
				Ok::<_, Infallible>(response(StatusCode::OK))
			}));

		let handle = tokio::spawn(svc.oneshot(Request::new(Body::empty())));
		let err = handle.await.unwrap_err();
		assert!(err.is_panic());

		let reports = wait_for_report(&client).await;
		assert_eq!(reports.len(), 1);
		assert_eq!(reports[0].error_class, "Panic");
		assert_eq!(reports[0].message, "handler exploded");
	}

	#[tokio::test]
	async fn user_context_is_taken_from_extensions() {
		let client = client();
		let svc = FlareLayer::new(client.clone())
			.layer(service_fn(|_req: Request<Body>| async {
				Ok::<_, Infallible>(response(StatusCode::INTERNAL_SERVER_ERROR))
			}));

		let mut req = Request::new(Body::empty());
		req.extensions_mut().insert(UserContext {
			id: Some("user-1".to_string()),
			email: Some("user@example.com".to_string()),
			name: None,
		});

		svc.oneshot(req).await.unwrap();

		let reports = wait_for_report(&client).await;
		let user = reports[0].user.as_ref().unwrap();
		assert_eq!(user.id.as_deref(), Some("user-1"));
	}

	#[tokio::test]
	async fn capture_request_disabled_omits_request_context() {
		let client = Client::builder()
			.api_key("key-123")
			.capture_request(false)
			.build()
			.unwrap();
		let svc = FlareLayer::new(client.clone())
			.layer(service_fn(|_req: Request<Body>| async {
				Ok::<_, Infallible>(response(StatusCode::INTERNAL_SERVER_ERROR))
			}));

		svc.oneshot(Request::new(Body::empty())).await.unwrap();

		let reports = wait_for_report(&client).await;
		assert!(reports[0].request.is_none());
	}
}
