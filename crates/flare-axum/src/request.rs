// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request metadata extraction.

use flare_core::RequestContext;
use http::header::HOST;
use http::Request;

/// Builds a [`RequestContext`] from an in-flight request's parts.
///
/// Header values are copied as-is; redaction of sensitive headers happens
/// when the report is filtered against the client configuration, not here.
pub fn extract_request_context<B>(req: &Request<B>) -> RequestContext {
	let uri = req.uri();

	let url = if uri.scheme().is_some() {
		Some(uri.to_string())
	} else {
		match req.headers().get(HOST).and_then(|h| h.to_str().ok()) {
			Some(host) => Some(format!("http://{}{}", host, uri)),
			None => Some(uri.to_string()),
		}
	};

	let headers = req
		.headers()
		.iter()
		.filter_map(|(name, value)| {
			value
				.to_str()
				.ok()
				.map(|v| (name.as_str().to_string(), v.to_string()))
		})
		.collect();

	let client_ip = forwarded_ip(req);

	RequestContext {
		url,
		method: Some(req.method().to_string()),
		headers,
		query_string: uri.query().map(str::to_string),
		client_ip,
	}
}

/// Client IP from forwarding headers, when present.
fn forwarded_ip<B>(req: &Request<B>) -> Option<String> {
	if let Some(forwarded) = req
		.headers()
		.get("x-forwarded-for")
		.and_then(|h| h.to_str().ok())
	{
		// The first entry is the originating client.
		if let Some(ip) = forwarded.split(',').next() {
			let ip = ip.trim();
			if !ip.is_empty() {
				return Some(ip.to_string());
			}
		}
	}

	req.headers()
		.get("x-real-ip")
		.and_then(|h| h.to_str().ok())
		.map(|ip| ip.trim().to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extracts_method_url_and_query() {
		let req = Request::builder()
			.method("POST")
			.uri("/api/users?page=2")
			.header("host", "example.com")
			.body(())
			.unwrap();

		let context = extract_request_context(&req);
		assert_eq!(context.method.as_deref(), Some("POST"));
		assert_eq!(context.url.as_deref(), Some("http://example.com/api/users?page=2"));
		assert_eq!(context.query_string.as_deref(), Some("page=2"));
	}

	#[test]
	fn absolute_uri_is_used_verbatim() {
		let req = Request::builder()
			.uri("https://example.com/api/users")
			.body(())
			.unwrap();

		let context = extract_request_context(&req);
		assert_eq!(context.url.as_deref(), Some("https://example.com/api/users"));
	}

	#[test]
	fn copies_headers() {
		let req = Request::builder()
			.uri("/")
			.header("accept", "application/json")
			.header("authorization", "Bearer token")
			.body(())
			.unwrap();

		let context = extract_request_context(&req);
		assert_eq!(context.headers["accept"], "application/json");
		// Not redacted here; filtering happens against the client config.
		assert_eq!(context.headers["authorization"], "Bearer token");
	}

	#[test]
	fn takes_first_forwarded_ip() {
		let req = Request::builder()
			.uri("/")
			.header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
			.body(())
			.unwrap();

		let context = extract_request_context(&req);
		assert_eq!(context.client_ip.as_deref(), Some("203.0.113.7"));
	}

	#[test]
	fn falls_back_to_real_ip_header() {
		let req = Request::builder()
			.uri("/")
			.header("x-real-ip", "203.0.113.9")
			.body(())
			.unwrap();

		let context = extract_request_context(&req);
		assert_eq!(context.client_ip.as_deref(), Some("203.0.113.9"));
	}

	#[test]
	fn no_forwarding_headers_means_no_ip() {
		let req = Request::builder().uri("/").body(()).unwrap();
		let context = extract_request_context(&req);
		assert_eq!(context.client_ip, None);
	}
}
