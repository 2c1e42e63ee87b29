// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The scene graph uses multi-channel dirty tracking (via [`understory_dirty`])
//! keyed by node slot index.
//!
//! - **Propagating**: [`TRANSFORM`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) over child-to-parent
//!   dependency edges, so moving a group re-evaluates every descendant's
//!   world transform and effective visibility.
//! - **Local-only**: [`CONTENT`] marks a node whose mesh content (geometry
//!   or material handle) was swapped, and [`FLAGS`] marks a node whose
//!   raycast participation changed.
//! - **Structural**: [`TOPOLOGY`] is marked on attach, detach, creation,
//!   and destruction. It forces a traversal-order rebuild.
//!
//! Material property edits are not node-keyed; the material store queues
//! them separately and they surface as
//! [`SceneChanges::materials`](crate::scene::SceneChanges::materials).

use understory_dirty::Channel;

/// Local transform or hidden flag changed.
pub const TRANSFORM: Channel = Channel::new(0);

/// Mesh content (geometry or material handle) changed.
pub const CONTENT: Channel = Channel::new(1);

/// Raycast participation changed.
pub const FLAGS: Channel = Channel::new(2);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(3);
