// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and recording trace sinks for airspace diagnostics.
//!
//! This crate provides [`TraceSink`](airspace_core::trace::TraceSink)
//! implementations for development and tests:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: in-memory recording shared between the
//!   installed sink and its clones, with JSON-lines export.

pub mod pretty;
pub mod recorder;
