// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event logging, pretty-printing, and Chrome trace export for halo
//! diagnostics.
//!
//! This crate provides [`TraceSink`](halo_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`log::EventLog`]: in-memory recording of owned events, stamped with
//!   the frame they happened in.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from an
//!   [`EventLog`](log::EventLog).

pub mod chrome;
pub mod log;
pub mod pretty;
