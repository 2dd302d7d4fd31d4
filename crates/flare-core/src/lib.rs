// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Flare error reporting system.
//!
//! This crate provides the shared value types used by the Flare client SDK
//! and its web-framework integrations: stack frames and stacktraces, request
//! and user context captured at notify time, breadcrumbs, and severities.
//! It performs no I/O.

pub mod breadcrumb;
pub mod context;
pub mod error;
pub mod event;

pub use breadcrumb::{Breadcrumb, BreadcrumbType};
pub use context::{RequestContext, UserContext};
pub use error::{CoreError, Result};
pub use event::{Frame, Severity, Stacktrace};
