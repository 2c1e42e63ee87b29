// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph data model.
//!
//! A *node* is either a group or a mesh. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that goes stale when
//!   the node is destroyed.
//! - Topology: parent, first-child, and sibling links forming an ordered tree.
//! - Local properties set by callers: [`transform`](SceneGraph::set_transform),
//!   [`flags`](SceneGraph::set_flags), [`material`](SceneGraph::set_material).
//! - Computed properties written by [`evaluate`](SceneGraph::evaluate):
//!   world transform and effective visibility.
//!
//! Materials live beside the nodes in the same graph, addressed by
//! [`MaterialId`]. Geometry is backend-owned and referenced by
//! [`GeometryId`].
//!
//! The graph is single-threaded: all mutation happens on the frame thread
//! between evaluations.

mod clone;
mod evaluate;
mod id;
mod materials;
mod store;
mod traverse;

pub use clone::Instantiation;
pub use evaluate::SceneChanges;
pub use id::{GeometryId, INVALID, MaterialId, NodeId};
pub use store::{Mesh, NodeFlags, SceneGraph};
pub use traverse::{Children, Descendants};
