// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Path-pattern resolution.
//!
//! Stack-trace frames are classified as in-project and have their paths
//! shortened using two regex patterns. Users can configure each pattern as
//! a path string or as a regex; this module resolves those inputs, plus the
//! application root supplied by the host application, into the effective
//! pattern pair the client is built with.

/// The resolved pattern pair.
///
/// Both patterns are non-empty, start-anchored, case-insensitive regex
/// source strings matching a directory prefix with an optional trailing
/// separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPatterns {
	pub project_root_regex: String,
	pub strip_path_regex: String,
}

/// Converts a path into a pattern matching it literally, case-insensitively,
/// anchored at the start of the string, with an optional single trailing
/// path separator.
pub fn path_to_regex(path: &str) -> String {
	format!(r"(?i)^{}[/\\]?", regex::escape(path))
}

/// Resolves the effective project-root and strip-path patterns.
///
/// Each side resolves independently, with regex inputs taking precedence
/// over path strings:
///
/// 1. An explicit regex is used verbatim.
/// 2. Otherwise a configured path string is converted via [`path_to_regex`].
/// 3. Otherwise the default derives from the application root:
///    `<application_root>/src` for the project root, the application root
///    itself for the strip path.
///
/// Absent inputs mean "use the default"; the function is total and never
/// fails. An empty-string regex input counts as provided and is passed
/// through verbatim.
pub fn resolve_path_patterns(
	application_root: &str,
	project_root: Option<&str>,
	strip_path: Option<&str>,
	project_root_regex: Option<&str>,
	strip_path_regex: Option<&str>,
) -> PathPatterns {
	let project_root_regex = match (project_root_regex, project_root) {
		(Some(regex), _) => regex.to_string(),
		(None, Some(path)) => path_to_regex(path),
		(None, None) => path_to_regex(&format!("{}/src", application_root)),
	};

	let strip_path_regex = match (strip_path_regex, strip_path) {
		(Some(regex), _) => regex.to_string(),
		(None, Some(path)) => path_to_regex(path),
		(None, None) => path_to_regex(application_root),
	};

	PathPatterns {
		project_root_regex,
		strip_path_regex,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	const ROOT: &str = "/example/root/path";

	#[test]
	fn all_inputs_absent_derives_both_from_application_root() {
		let patterns = resolve_path_patterns(ROOT, None, None, None, None);

		assert_eq!(
			patterns.project_root_regex,
			r"(?i)^/example/root/path/src[/\\]?"
		);
		assert_eq!(patterns.strip_path_regex, r"(?i)^/example/root/path[/\\]?");
	}

	#[test]
	fn path_strings_are_converted() {
		let patterns = resolve_path_patterns(
			ROOT,
			Some("/example/project/root"),
			Some("/example/strip/path"),
			None,
			None,
		);

		assert_eq!(
			patterns.project_root_regex,
			path_to_regex("/example/project/root")
		);
		assert_eq!(patterns.strip_path_regex, path_to_regex("/example/strip/path"));
	}

	#[test]
	fn regexes_are_used_verbatim() {
		let patterns = resolve_path_patterns(
			ROOT,
			None,
			None,
			Some("^example project root regex"),
			Some("^example strip path regex"),
		);

		assert_eq!(patterns.project_root_regex, "^example project root regex");
		assert_eq!(patterns.strip_path_regex, "^example strip path regex");
	}

	#[test]
	fn only_project_root_string_leaves_strip_path_default() {
		let patterns =
			resolve_path_patterns(ROOT, Some("/example/project/root"), None, None, None);

		assert_eq!(
			patterns.project_root_regex,
			path_to_regex("/example/project/root")
		);
		assert_eq!(patterns.strip_path_regex, path_to_regex(ROOT));
	}

	#[test]
	fn only_project_root_regex_leaves_strip_path_default() {
		let patterns =
			resolve_path_patterns(ROOT, None, None, Some("^example project root regex"), None);

		assert_eq!(patterns.project_root_regex, "^example project root regex");
		assert_eq!(patterns.strip_path_regex, path_to_regex(ROOT));
	}

	#[test]
	fn only_strip_path_string_leaves_project_root_default() {
		let patterns = resolve_path_patterns(ROOT, None, Some("/example/strip/path"), None, None);

		assert_eq!(
			patterns.project_root_regex,
			path_to_regex(&format!("{}/src", ROOT))
		);
		assert_eq!(patterns.strip_path_regex, path_to_regex("/example/strip/path"));
	}

	#[test]
	fn only_strip_path_regex_leaves_project_root_default() {
		let patterns =
			resolve_path_patterns(ROOT, None, None, None, Some("^example strip path regex"));

		assert_eq!(
			patterns.project_root_regex,
			path_to_regex(&format!("{}/src", ROOT))
		);
		assert_eq!(patterns.strip_path_regex, "^example strip path regex");
	}

	#[test]
	fn regexes_take_precedence_over_strings() {
		let patterns = resolve_path_patterns(
			ROOT,
			Some("/example/project/root"),
			Some("/example/strip/path"),
			Some("^example project root regex"),
			Some("^example strip path regex"),
		);

		assert_eq!(patterns.project_root_regex, "^example project root regex");
		assert_eq!(patterns.strip_path_regex, "^example strip path regex");
	}

	#[test]
	fn empty_regex_counts_as_provided() {
		let patterns = resolve_path_patterns(ROOT, Some("/example/project/root"), None, Some(""), None);

		assert_eq!(patterns.project_root_regex, "");
	}

	#[test]
	fn converted_pattern_matches_path_and_subpaths() {
		let pattern = regex::Regex::new(&path_to_regex("/app/my-project (v2)")).unwrap();

		assert!(pattern.is_match("/app/my-project (v2)"));
		assert!(pattern.is_match("/app/my-project (v2)/src/main.rs"));
		assert!(pattern.is_match("/APP/MY-PROJECT (V2)/src/main.rs"));
		assert!(!pattern.is_match("/other/my-project (v2)"));
	}

	proptest! {
		#[test]
		fn converted_pattern_always_compiles_and_matches(path in "/[a-zA-Z0-9._ ()+/-]{1,40}") {
			let pattern = regex::Regex::new(&path_to_regex(&path)).unwrap();
			let subpath = format!("{}/sub/file.rs", path);
			prop_assert!(pattern.is_match(&path));
			prop_assert!(pattern.is_match(&subpath));
			prop_assert!(pattern.is_match(&path.to_uppercase()));
		}

		#[test]
		fn sides_resolve_independently(
			project in proptest::option::of("/[a-z]{1,10}"),
			strip in proptest::option::of("/[a-z]{1,10}"),
		) {
			let with_both = resolve_path_patterns(ROOT, project.as_deref(), strip.as_deref(), None, None);
			let project_only = resolve_path_patterns(ROOT, project.as_deref(), None, None, None);
			let strip_only = resolve_path_patterns(ROOT, None, strip.as_deref(), None, None);

			prop_assert_eq!(with_both.project_root_regex, project_only.project_root_regex);
			prop_assert_eq!(with_both.strip_path_regex, strip_only.strip_path_regex);
		}
	}
}
