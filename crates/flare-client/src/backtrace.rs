// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Backtrace capture and parsing for Rust errors and panics.

use flare_core::{Frame, Stacktrace};
use rustc_demangle::demangle;
use std::backtrace::Backtrace;

/// Number of source lines captured either side of the failing line.
const SOURCE_CONTEXT_LINES: usize = 3;

/// Parse a Rust backtrace into a Stacktrace.
pub fn parse_backtrace(backtrace: &Backtrace) -> Stacktrace {
	let bt_string = format!("{:#}", backtrace);
	let frames = parse_backtrace_string(&bt_string);
	Stacktrace { frames }
}

/// Capture a fresh backtrace and parse it.
pub fn capture_backtrace() -> Stacktrace {
	let backtrace = Backtrace::force_capture();
	parse_backtrace(&backtrace)
}

/// Parse backtrace string output into frames.
///
/// The captured format interleaves symbol lines with `at path:line:col`
/// location lines describing the preceding symbol. Locations are attached to
/// the frame they belong to so the path patterns configured on the client
/// have something to classify.
fn parse_backtrace_string(bt_string: &str) -> Vec<Frame> {
	let mut frames: Vec<Frame> = Vec::new();

	for line in bt_string.lines() {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		if let Some(location) = parse_location_line(line) {
			if let Some(frame) = frames.last_mut() {
				frame.abs_path = Some(location.path.clone());
				frame.filename = Some(location.path);
				frame.lineno = location.lineno;
				frame.colno = location.colno;
			}
			continue;
		}

		if let Some(frame) = parse_frame_line(line) {
			frames.push(frame);
		}
	}

	frames
}

struct Location {
	path: String,
	lineno: Option<u32>,
	colno: Option<u32>,
}

/// Parse an `at path:line:col` location line.
fn parse_location_line(line: &str) -> Option<Location> {
	let rest = line.strip_prefix("at ")?.trim();

	// Split from the right so Windows drive prefixes survive.
	let mut parts = rest.rsplitn(3, ':');
	if let (Some(col), Some(lineno), Some(path)) = (parts.next(), parts.next(), parts.next()) {
		if let (Ok(lineno), Ok(col)) = (lineno.parse(), col.parse()) {
			return Some(Location {
				path: path.to_string(),
				lineno: Some(lineno),
				colno: Some(col),
			});
		}
	}

	Some(Location {
		path: rest.to_string(),
		lineno: None,
		colno: None,
	})
}

/// Parse a single symbol line into a Frame.
fn parse_frame_line(line: &str) -> Option<Frame> {
	// Symbol lines are typically "   N: function_name" or bare.
	let function_part = if let Some(idx) = line.find(':') {
		let prefix = &line[..idx];
		if prefix.trim().parse::<u32>().is_ok() {
			line[idx + 1..].trim()
		} else {
			line
		}
	} else {
		line
	};

	if function_part.is_empty() {
		return None;
	}

	let demangled = demangle(function_part).to_string();
	let module = demangled.rfind("::").map(|idx| demangled[..idx].to_string());

	Some(Frame {
		function: Some(demangled.clone()),
		module,
		// Provisional until the configured project-root pattern has a path
		// to classify against.
		in_project: is_app_frame(&demangled),
		..Default::default()
	})
}

/// Determine if a symbol is application code rather than runtime plumbing.
fn is_app_frame(function: &str) -> bool {
	const SYSTEM_PREFIXES: &[&str] = &[
		"std::",
		"core::",
		"alloc::",
		"<std::",
		"<core::",
		"<alloc::",
		"tokio::",
		"<tokio::",
		"futures::",
		"<futures::",
		"tower::",
		"<tower::",
		"tracing::",
		"<tracing::",
		"backtrace::",
		"<backtrace::",
		"panic_unwind::",
		"<panic_unwind::",
		"rust_begin_unwind",
		"rust_panic",
		"__rust_",
		"_rust_",
	];

	const SYSTEM_CONTAINS: &[&str] = &[
		"::panic::",
		"::panicking::",
		"::thread::",
		"::rt::",
		"::runtime::",
		"::sys_common::",
	];

	for prefix in SYSTEM_PREFIXES {
		if function.starts_with(prefix) {
			return false;
		}
	}

	for contains in SYSTEM_CONTAINS {
		if function.contains(contains) {
			return false;
		}
	}

	true
}

/// Read source lines surrounding `lineno` from the file at `path`.
///
/// Returns `(pre_context, context_line, post_context)`, or None when the
/// file cannot be read (stripped binaries, relocated sources).
pub(crate) fn source_context(
	path: &str,
	lineno: u32,
) -> Option<(Vec<String>, String, Vec<String>)> {
	let content = std::fs::read_to_string(path).ok()?;
	let lines: Vec<&str> = content.lines().collect();
	let index = (lineno as usize).checked_sub(1)?;
	let context_line = lines.get(index)?.to_string();

	let start = index.saturating_sub(SOURCE_CONTEXT_LINES);
	let pre_context = lines[start..index].iter().map(|l| l.to_string()).collect();
	let end = (index + 1 + SOURCE_CONTEXT_LINES).min(lines.len());
	let post_context = lines[index + 1..end].iter().map(|l| l.to_string()).collect();

	Some((pre_context, context_line, post_context))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn is_app_frame_excludes_runtime() {
		assert!(!is_app_frame("std::panic::panic_any"));
		assert!(!is_app_frame("core::panicking::panic"));
		assert!(!is_app_frame("tokio::runtime::Runtime::block_on"));
		assert!(!is_app_frame("tower::util::oneshot::Oneshot::poll"));
	}

	#[test]
	fn is_app_frame_includes_user_code() {
		assert!(is_app_frame("my_app::main"));
		assert!(is_app_frame("flare_client::client::Client::notify"));
	}

	#[test]
	fn parse_frame_line_demangles_and_extracts_module() {
		let frame = parse_frame_line("my_app::handlers::process").unwrap();
		assert_eq!(frame.function, Some("my_app::handlers::process".to_string()));
		assert_eq!(frame.module, Some("my_app::handlers".to_string()));
		assert!(frame.in_project);
	}

	#[test]
	fn parse_frame_line_strips_frame_number() {
		let frame = parse_frame_line("  5: my_app::main").unwrap();
		assert_eq!(frame.function, Some("my_app::main".to_string()));
	}

	#[test]
	fn location_lines_attach_to_preceding_frame() {
		let frames = parse_backtrace_string(
			"   0: my_app::handlers::create\n             at /app/src/handlers.rs:42:13\n   1: std::panicking::begin_panic\n",
		);
		assert_eq!(frames.len(), 2);
		assert_eq!(frames[0].abs_path.as_deref(), Some("/app/src/handlers.rs"));
		assert_eq!(frames[0].lineno, Some(42));
		assert_eq!(frames[0].colno, Some(13));
		assert!(frames[1].abs_path.is_none());
	}

	#[test]
	fn location_without_line_numbers_keeps_path() {
		let location = parse_location_line("at /app/src/main.rs").unwrap();
		assert_eq!(location.path, "/app/src/main.rs");
		assert_eq!(location.lineno, None);
	}

	#[test]
	fn capture_backtrace_does_not_panic() {
		let _stacktrace = capture_backtrace();
	}
}
