// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON scene persistence.
//!
//! Only the attached scene is written: nodes reachable from the roots, the
//! placed-objects registry and the doorway table of the exported walls.
//! Nodes kept alive only by undo history are not part of the file. Wall names
//! keep their role name and any "Doorway" suffix, and [`WallId`]s are kept,
//! so a reloaded wall can be cut again.

use envbuilder_geometry::Doorway;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::keys::{NodeKey, WallId};
use crate::scene::{Node, NodeKind, Transform};

/// Current file format version.
pub const FORMAT_VERSION: u32 = 1;

/// Serializable representation of a scene.
#[derive(Debug, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub version: u32,
    pub nodes: Vec<NodeSnapshot>,
    pub roots: Vec<usize>,
    pub placed: Vec<usize>,
    #[serde(default)]
    pub doorways: Vec<DoorwayRecord>,
    #[serde(default)]
    pub next_wall_id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: usize,
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DoorwayRecord {
    pub wall: WallId,
    pub doorways: Vec<Doorway>,
}

impl Document {
    /// Serializes the attached scene to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = self.to_snapshot();
        serde_json::to_string_pretty(&snapshot).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Creates a serializable snapshot of the attached scene.
    ///
    /// Node keys are mapped to sequential integer IDs in depth-first order.
    pub fn to_snapshot(&self) -> SceneSnapshot {
        let order = self.graph.attached_nodes();
        let ids: FxHashMap<NodeKey, usize> = order.iter().enumerate().map(|(i, &k)| (k, i)).collect();

        let mut doorways = Vec::new();
        let nodes = order
            .iter()
            .enumerate()
            .filter_map(|(i, &key)| {
                let node = self.graph.get(key)?;
                if let Some(wall) = node.wall() {
                    let list = self.doorways.doorways(wall.id);
                    if !list.is_empty() {
                        doorways.push(DoorwayRecord {
                            wall: wall.id,
                            doorways: list.to_vec(),
                        });
                    }
                }
                Some(NodeSnapshot {
                    id: i,
                    name: node.name.clone(),
                    transform: node.transform,
                    kind: node.kind.clone(),
                    children: node.children().iter().filter_map(|c| ids.get(c).copied()).collect(),
                })
            })
            .collect();

        doorways.sort_by_key(|r| r.wall);

        SceneSnapshot {
            version: FORMAT_VERSION,
            nodes,
            roots: self.graph.roots().iter().filter_map(|r| ids.get(r).copied()).collect(),
            placed: self.graph.placed().iter().filter_map(|p| ids.get(p).copied()).collect(),
            doorways,
            next_wall_id: self.next_wall_id(),
        }
    }

    /// Deserializes a document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: SceneSnapshot =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }

    /// Reconstructs a document from a snapshot.
    pub fn from_snapshot(snap: SceneSnapshot) -> Result<Self> {
        if snap.version > FORMAT_VERSION {
            return Err(Error::Serialization(format!(
                "unsupported scene version {}",
                snap.version
            )));
        }

        let count = snap.nodes.len();
        let lookup = |id: usize| -> Result<usize> {
            if id < count {
                Ok(id)
            } else {
                Err(Error::Serialization(format!("node id {id} out of range")))
            }
        };

        // Snapshot ids are positions; reject files where they disagree
        for (i, node) in snap.nodes.iter().enumerate() {
            if node.id != i {
                return Err(Error::Serialization(format!(
                    "node at position {i} has id {}",
                    node.id
                )));
            }
        }

        let mut doc = Document::new();
        let mut max_wall_id = None;
        let mut keys = Vec::with_capacity(count);
        let mut links = Vec::new();

        for ns in snap.nodes {
            if let NodeKind::Mesh(mesh) = &ns.kind {
                if let Some(wall) = &mesh.wall {
                    max_wall_id = max_wall_id.max(Some(wall.id.0));
                }
            }
            for &child in &ns.children {
                links.push((ns.id, lookup(child)?));
            }
            let node = Node::new(ns.name, ns.kind).with_transform(ns.transform);
            keys.push(doc.graph.insert(node));
        }

        for (parent, child) in links {
            doc.graph.add_child(keys[parent], keys[child])?;
        }
        for root in snap.roots {
            doc.graph.attach(keys[lookup(root)?])?;
        }
        for placed in snap.placed {
            doc.graph.register_placed(keys[lookup(placed)?]);
        }
        for record in snap.doorways {
            doc.doorways.set_doorways(record.wall, record.doorways);
        }

        doc.reserve_wall_ids(snap.next_wall_id.max(max_wall_id.map_or(0, |id| id + 1)));

        info!(
            nodes = count,
            placed = doc.graph.placed().len(),
            "scene imported"
        );
        Ok(doc)
    }
}
