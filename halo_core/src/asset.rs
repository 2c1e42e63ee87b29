// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loaded scene templates and the loader boundary.
//!
//! A [`SceneTemplate`] is what a format loader produces for one source: a
//! tree of groups and meshes plus a material table that meshes index into
//! (several meshes may name the same material, as exported files often do).
//! Templates are shared as [`SharedAsset`] and never mutated after loading;
//! [`AssetInstance`](crate::instance::AssetInstance) copies them into a
//! [`SceneGraph`](crate::scene::SceneGraph) with
//! [`instantiate`](crate::scene::SceneGraph::instantiate).
//!
//! Loading and caching are the loader's business. [`AssetLoader::load`]
//! returns [`Poll::Pending`] while the source is still in flight, and callers
//! simply ask again on a later frame.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::task::Poll;

use crate::material::Material;
use crate::scene::GeometryId;
use crate::transform::Transform3d;

/// Identifies a loadable asset (a URL or path).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(Arc<str>);

impl SourceId {
    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for SourceId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({:?})", &*self.0)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A loader-owned, read-only template shared by every instance of a source.
///
/// Identity is pointer identity: two `SharedAsset`s are the same asset iff
/// [`Arc::ptr_eq`] holds.
pub type SharedAsset = Arc<SceneTemplate>;

/// Index of a material in a [`SceneTemplate`]'s material table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TemplateMaterial(pub usize);

/// Mesh content of a template node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemplateMesh {
    /// Backend geometry shared by every instance.
    pub geometry: GeometryId,
    /// Entry in the template's material table.
    pub material: TemplateMaterial,
}

/// One node of a [`SceneTemplate`].
#[derive(Clone, Debug)]
pub struct TemplateNode {
    /// Node name from the source file.
    pub name: Option<Arc<str>>,
    /// Local transform.
    pub transform: Transform3d,
    /// Mesh content, `None` for groups.
    pub mesh: Option<TemplateMesh>,
    children: Vec<usize>,
}

impl TemplateNode {
    /// Indices of this node's children, in order.
    #[must_use]
    pub fn children(&self) -> &[usize] {
        &self.children
    }
}

/// An immutable-once-shared scene tree produced by a loader.
///
/// Node 0 is always the root group. Nodes are appended under an existing
/// parent, so a parent's index is always lower than its children's.
#[derive(Clone, Debug)]
pub struct SceneTemplate {
    nodes: Vec<TemplateNode>,
    materials: Vec<Material>,
}

impl SceneTemplate {
    /// Index of the root node.
    pub const ROOT: usize = 0;

    /// Creates a template holding only a root group.
    #[must_use]
    pub fn new(root_name: &str) -> Self {
        Self {
            nodes: alloc::vec![TemplateNode {
                name: Some(root_name.into()),
                transform: Transform3d::IDENTITY,
                mesh: None,
                children: Vec::new(),
            }],
            materials: Vec::new(),
        }
    }

    /// Adds an entry to the material table.
    pub fn add_material(&mut self, material: Material) -> TemplateMaterial {
        self.materials.push(material);
        TemplateMaterial(self.materials.len() - 1)
    }

    /// Appends a group under `parent` and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is out of range.
    pub fn add_group(&mut self, parent: usize, name: &str) -> usize {
        self.push(parent, name, None)
    }

    /// Appends a mesh under `parent` and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if `parent` or `material` is out of range.
    pub fn add_mesh(
        &mut self,
        parent: usize,
        name: &str,
        geometry: GeometryId,
        material: TemplateMaterial,
    ) -> usize {
        assert!(
            material.0 < self.materials.len(),
            "template material {} out of range",
            material.0
        );
        self.push(parent, name, Some(TemplateMesh { geometry, material }))
    }

    /// Sets a node's local transform.
    pub fn set_transform(&mut self, node: usize, transform: Transform3d) {
        self.nodes[node].transform = transform;
    }

    /// Returns the node at `index`.
    #[must_use]
    pub fn node(&self, index: usize) -> &TemplateNode {
        &self.nodes[index]
    }

    /// Returns every node in index order.
    #[must_use]
    pub fn nodes(&self) -> &[TemplateNode] {
        &self.nodes
    }

    /// Returns a material table entry.
    #[must_use]
    pub fn material(&self, material: TemplateMaterial) -> &Material {
        &self.materials[material.0]
    }

    /// Returns the number of nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a template has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of mesh nodes.
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.mesh.is_some()).count()
    }

    fn push(&mut self, parent: usize, name: &str, mesh: Option<TemplateMesh>) -> usize {
        assert!(parent < self.nodes.len(), "template parent {parent} out of range");
        let index = self.nodes.len();
        self.nodes.push(TemplateNode {
            name: Some(name.into()),
            transform: Transform3d::IDENTITY,
            mesh,
            children: Vec::new(),
        });
        self.nodes[parent].children.push(index);
        index
    }
}

/// Why a loader could not produce an asset.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// Nothing exists at the identifier.
    #[error("asset `{0}` not found")]
    NotFound(SourceId),
    /// The source exists but could not be decoded.
    #[error("failed to load `{id}`: {reason}")]
    Malformed {
        /// The source that failed.
        id: SourceId,
        /// Loader-specific detail.
        reason: String,
    },
}

/// Resolves source identifiers to shared templates.
///
/// Implementations own caching: repeated calls for the same identifier must
/// return the same [`SharedAsset`] (by pointer) for as long as the loader
/// keeps it cached, which is what lets instances skip re-cloning.
pub trait AssetLoader {
    /// Returns the asset, or [`Poll::Pending`] while it is still loading.
    fn load(&mut self, source: &SourceId) -> Poll<Result<SharedAsset, LoadError>>;
}
