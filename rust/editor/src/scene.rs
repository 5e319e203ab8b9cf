// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-backed scene graph.
//!
//! The [`SceneGraph`] owns every node the editor has created. A node is part
//! of the rendered scene when it, or one of its ancestors, is attached as a
//! root. Detaching keeps the node (and its key) alive so undo entries can
//! attach it again later.
//!
//! The graph also owns the placed-objects registry: the ordered list of
//! top-level user placements (rooms, doors, boxes, lamps) that delete and
//! undo operate on.

use envbuilder_geometry::{Mesh, WallRole};
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::keys::{NodeKey, WallId};
use crate::material::MaterialSlot;

/// Local transform: translation, XYZ Euler rotation (radians) and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl Transform {
    pub fn at(position: Point3<f64>) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            ..Self::default()
        }
    }

    /// Turn about the vertical axis so local +Z points along `direction`
    pub fn facing(mut self, direction: &Vector3<f64>) -> Self {
        if direction.x != 0.0 || direction.z != 0.0 {
            self.rotation = [0.0, direction.x.atan2(direction.z), 0.0];
        }
        self
    }

    pub fn matrix(&self) -> Matrix4<f64> {
        let [px, py, pz] = self.position;
        let [rx, ry, rz] = self.rotation;
        let [sx, sy, sz] = self.scale;

        Matrix4::new_translation(&Vector3::new(px, py, pz))
            * Matrix4::from_axis_angle(&Vector3::x_axis(), rx)
            * Matrix4::from_axis_angle(&Vector3::y_axis(), ry)
            * Matrix4::from_axis_angle(&Vector3::z_axis(), rz)
            * Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }
}

/// Wall identity and dimensions carried by a wall mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallInfo {
    pub id: WallId,
    pub role: WallRole,
    pub length: f64,
    pub height: f64,
    pub thickness: f64,
}

/// Triangle mesh with its material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub geometry: Mesh,
    pub material: MaterialSlot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall: Option<WallInfo>,
}

/// Point light fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub color: u32,
    pub intensity: f64,
    pub distance: f64,
}

/// What a node holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Group,
    Mesh(MeshNode),
    Light(PointLight),
    /// Externally loaded model, referenced by asset path
    Model { asset: String },
}

/// A scene node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, geometry: Mesh, material: MaterialSlot) -> Self {
        Self::new(
            name,
            NodeKind::Mesh(MeshNode {
                geometry,
                material,
                wall: None,
            }),
        )
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub fn as_mesh(&self) -> Option<&MeshNode> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut MeshNode> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn wall(&self) -> Option<&WallInfo> {
        self.as_mesh().and_then(|m| m.wall.as_ref())
    }
}

/// Owner of all nodes plus the scene roots and the placed-objects registry.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeKey, Node>,
    roots: Vec<NodeKey>,
    placed: Vec<NodeKey>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Store a node, detached from the scene.
    pub fn insert(&mut self, node: Node) -> NodeKey {
        self.nodes.insert(node)
    }

    pub fn get(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    pub fn node(&self, key: NodeKey) -> Result<&Node> {
        self.nodes.get(key).ok_or(Error::NodeNotFound(key))
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Result<&mut Node> {
        self.nodes.get_mut(key).ok_or(Error::NodeNotFound(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.nodes.iter()
    }

    /// Make `child` a child of `parent`, moving it from any previous parent.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        self.node(parent)?;
        let previous = self.node(child)?.parent;

        if let Some(old) = previous.and_then(|p| self.nodes.get_mut(p)) {
            old.children.retain(|&c| c != child);
        }
        self.roots.retain(|&r| r != child);

        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Add a node to the scene as a root. Returns false if already a root.
    pub fn attach(&mut self, key: NodeKey) -> Result<bool> {
        self.node(key)?;
        if self.roots.contains(&key) {
            return Ok(false);
        }
        self.roots.push(key);
        Ok(true)
    }

    /// Remove a root from the scene, keeping the node.
    pub fn detach(&mut self, key: NodeKey) -> bool {
        let before = self.roots.len();
        self.roots.retain(|&r| r != key);
        self.roots.len() != before
    }

    pub fn roots(&self) -> &[NodeKey] {
        &self.roots
    }

    /// Topmost ancestor of a node (the node itself when it has no parent).
    pub fn root_of(&self, key: NodeKey) -> NodeKey {
        let mut current = key;
        while let Some(parent) = self.nodes.get(current).and_then(|n| n.parent) {
            current = parent;
        }
        current
    }

    /// The node is part of the rendered scene.
    pub fn is_attached(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key) && self.roots.contains(&self.root_of(key))
    }

    /// The node and every node below it, depth first.
    pub fn descendants(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(current) {
                out.push(current);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Every node reachable from the scene roots.
    pub fn attached_nodes(&self) -> Vec<NodeKey> {
        self.roots.iter().flat_map(|&r| self.descendants(r)).collect()
    }

    /// Attached wall meshes.
    pub fn walls(&self) -> Vec<NodeKey> {
        self.attached_nodes()
            .into_iter()
            .filter(|&k| self.nodes.get(k).and_then(Node::wall).is_some())
            .collect()
    }

    /// Local-to-world matrix.
    pub fn world_matrix(&self, key: NodeKey) -> Result<Matrix4<f64>> {
        let mut matrix = self.node(key)?.transform.matrix();
        let mut current = self.node(key)?.parent;
        while let Some(parent) = current {
            let node = self.node(parent)?;
            matrix = node.transform.matrix() * matrix;
            current = node.parent;
        }
        Ok(matrix)
    }

    /// Delete a node and its subtree from the arena.
    pub fn remove_subtree(&mut self, key: NodeKey) -> Option<Node> {
        let parent = self.nodes.get(key)?.parent;
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(p)) {
            p.children.retain(|&c| c != key);
        }
        self.roots.retain(|&r| r != key);
        self.placed.retain(|&p| p != key);

        let keys = self.descendants(key);
        let mut removed = None;
        for k in keys {
            let node = self.nodes.remove(k);
            if k == key {
                removed = node;
            }
        }
        removed
    }

    pub fn placed(&self) -> &[NodeKey] {
        &self.placed
    }

    pub fn placed_index(&self, key: NodeKey) -> Option<usize> {
        self.placed.iter().position(|&p| p == key)
    }

    pub fn register_placed(&mut self, key: NodeKey) {
        self.placed.push(key);
    }

    /// Insert at `index`, or append when the index is past the end.
    pub fn insert_placed(&mut self, index: usize, key: NodeKey) {
        if index <= self.placed.len() {
            self.placed.insert(index, key);
        } else {
            self.placed.push(key);
        }
    }

    pub fn unregister_placed(&mut self, key: NodeKey) -> Option<usize> {
        let index = self.placed_index(key)?;
        self.placed.remove(index);
        Some(index)
    }

    /// Nearest ancestor (or the node itself) in the placed-objects registry.
    pub fn placed_owner(&self, key: NodeKey) -> Option<NodeKey> {
        let mut current = Some(key);
        while let Some(k) = current {
            if self.placed.contains(&k) {
                return Some(k);
            }
            current = self.nodes.get(k).and_then(|n| n.parent);
        }
        None
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.placed.clear();
    }
}
