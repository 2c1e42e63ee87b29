// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test and demo tooling for halo.
//!
//! - [`loader::MemoryLoader`]: a caching [`AssetLoader`](halo_core::asset::AssetLoader)
//!   over in-memory templates, with configurable suspension and eviction.
//! - [`fixtures`]: the bench model and other templates.
//! - [`backend`]: [`RecordingPresenter`](backend::RecordingPresenter) and
//!   [`RecordingCompositor`](backend::RecordingCompositor) test doubles.
//! - [`stage::Stage`]: scene, scopes, loader, and backends wired into a
//!   frame loop.
//! - [`check`]: invariant checks returning [`InvariantError`](check::InvariantError).

pub mod backend;
pub mod check;
pub mod fixtures;
pub mod loader;
pub mod stage;
