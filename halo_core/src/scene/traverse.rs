// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};
use super::store::SceneGraph;

/// An iterator over the direct children of a node.
///
/// Created by [`SceneGraph::children`].
#[derive(Debug)]
pub struct Children<'a> {
    scene: &'a SceneGraph,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(scene: &'a SceneGraph, first: u32) -> Self {
        Self {
            scene,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.scene.next_sibling[idx as usize];
        Some(self.scene.handle(idx))
    }
}

/// A depth-first pre-order walk over a subtree.
///
/// Created by [`SceneGraph::descendants`]. Yields the root first, then each
/// child's subtree in sibling order. The walk follows sibling and parent
/// links, so it allocates nothing.
#[derive(Debug)]
pub struct Descendants<'a> {
    scene: &'a SceneGraph,
    root: u32,
    current: u32,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(scene: &'a SceneGraph, root: u32) -> Self {
        Self {
            scene,
            root,
            current: root,
        }
    }

    /// Returns the node visited after `idx`, never leaving the subtree.
    fn advance(&self, idx: u32) -> u32 {
        let s = self.scene;
        let child = s.first_child[idx as usize];
        if child != INVALID {
            return child;
        }
        let mut n = idx;
        while n != self.root {
            let next = s.next_sibling[n as usize];
            if next != INVALID {
                return next;
            }
            n = s.parent[n as usize];
        }
        INVALID
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.advance(idx);
        Some(self.scene.handle(idx))
    }
}
