// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scoped effect context.
//!
//! Components are arranged in a tree of [scopes](ScopeId) that mirrors how
//! the host nests them. An [`AssetInstance`](crate::instance::AssetInstance)
//! *provides* an [`EffectContext`] on its scope; any component created in
//! that scope or below it *consumes* the nearest provided context by walking
//! up the ancestor chain. Nested instances therefore shadow outer ones, and
//! siblings never see each other's data.
//!
//! Consuming with no provider in scope is a wiring mistake in the host, not
//! a data condition, so [`Scopes::effect_data`] panics instead of handing
//! back an empty mesh set.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Deref;

use crate::scene::{INVALID, NodeId};

/// The ordered mesh nodes of one instance clone.
///
/// Cloning a `MeshSet` is cheap and keeps its identity: two sets are
/// [`same`](Self::same) only when they come from the same computation, even
/// if they list identical nodes. Effects key their structural work on that
/// identity.
#[derive(Clone)]
pub struct MeshSet {
    nodes: Arc<[NodeId]>,
}

impl MeshSet {
    /// Wraps a freshly computed node list. The result is distinct from
    /// every other set, whatever it contains.
    #[must_use]
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self {
            nodes: nodes.into(),
        }
    }

    /// Returns whether both handles refer to the same computed set.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.nodes, &other.nodes)
    }
}

impl Deref for MeshSet {
    type Target = [NodeId];

    fn deref(&self) -> &[NodeId] {
        &self.nodes
    }
}

impl fmt::Debug for MeshSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.nodes.iter()).finish()
    }
}

/// What an instance publishes to the components nested inside it.
#[derive(Clone, Debug)]
pub struct EffectContext {
    /// The instance's mounted root group.
    pub root: NodeId,
    /// Mesh nodes of the current clone, depth-first.
    pub meshes: MeshSet,
}

/// A handle to a scope in [`Scopes`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    idx: u32,
    generation: u32,
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({}@gen{})", self.idx, self.generation)
    }
}

/// The component scope tree and the contexts provided on it.
#[derive(Debug, Default)]
pub struct Scopes {
    parent: Vec<u32>,
    provided: Vec<Option<EffectContext>>,
    generation: Vec<u32>,
    live: Vec<bool>,
    free_list: Vec<u32>,
}

impl Scopes {
    /// Creates an empty scope tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope nested under `parent`, or a top-level scope.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is stale.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "scope counts stay far below u32::MAX"
    )]
    pub fn create_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let p = match parent {
            Some(p) => {
                self.validate(p);
                p.idx
            }
            None => INVALID,
        };
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = p;
            self.provided[i] = None;
            self.live[i] = true;
            idx
        } else {
            let idx = self.parent.len() as u32;
            self.parent.push(p);
            self.provided.push(None);
            self.generation.push(0);
            self.live.push(true);
            idx
        };
        ScopeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a scope and whatever it provided.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the scope still has live children.
    pub fn destroy_scope(&mut self, id: ScopeId) {
        self.validate(id);
        let has_children = self
            .parent
            .iter()
            .zip(&self.live)
            .any(|(&p, &live)| live && p == id.idx);
        assert!(!has_children, "cannot destroy scope with children");
        let i = id.idx as usize;
        self.provided[i] = None;
        self.live[i] = false;
        self.generation[i] += 1;
        self.free_list.push(id.idx);
    }

    /// Returns whether the handle refers to a live scope.
    #[must_use]
    pub fn is_alive(&self, id: ScopeId) -> bool {
        self.generation
            .get(id.idx as usize)
            .is_some_and(|&g| g == id.generation)
            && self.live[id.idx as usize]
    }

    /// Publishes `context` to `scope` and everything nested in it,
    /// replacing any context the scope already provided.
    pub fn provide(&mut self, scope: ScopeId, context: EffectContext) {
        self.validate(scope);
        self.provided[scope.idx as usize] = Some(context);
    }

    /// Withdraws the context `scope` provides, returning it.
    pub fn revoke(&mut self, scope: ScopeId) -> Option<EffectContext> {
        self.validate(scope);
        self.provided[scope.idx as usize].take()
    }

    /// Returns the nearest context provided at or above `scope`.
    #[must_use]
    pub fn try_effect_data(&self, scope: ScopeId) -> Option<&EffectContext> {
        self.validate(scope);
        let mut idx = scope.idx;
        while idx != INVALID {
            if let Some(ctx) = &self.provided[idx as usize] {
                return Some(ctx);
            }
            idx = self.parent[idx as usize];
        }
        None
    }

    /// Returns the nearest context provided at or above `scope`.
    ///
    /// # Panics
    ///
    /// Panics if no enclosing scope provides a context: an effect component
    /// was mounted outside every asset instance.
    #[must_use]
    pub fn effect_data(&self, scope: ScopeId) -> &EffectContext {
        self.try_effect_data(scope).unwrap_or_else(|| {
            panic!("effect components must be mounted within an AssetInstance (consumer {scope:?})")
        })
    }

    fn validate(&self, id: ScopeId) {
        assert!(self.is_alive(id), "stale ScopeId: {id:?}");
    }
}
