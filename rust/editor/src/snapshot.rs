// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Captured wall state for undo.

use envbuilder_geometry::{Doorway, Mesh};

use crate::doorway::DoorwayCutter;
use crate::error::{Error, Result};
use crate::keys::{NodeKey, WallId};
use crate::material::MaterialSlot;
use crate::scene::SceneGraph;

/// Deep copy of everything a doorway cut changes on one wall.
#[derive(Debug, Clone, PartialEq)]
pub struct WallSnapshot {
    pub node: NodeKey,
    pub wall: WallId,
    pub name: String,
    pub geometry: Mesh,
    pub material: MaterialSlot,
    pub doorways: Vec<Doorway>,
}

impl WallSnapshot {
    pub fn capture(graph: &SceneGraph, cutter: &DoorwayCutter, node: NodeKey) -> Result<Self> {
        let wall_node = graph.node(node)?;
        let mesh = wall_node.as_mesh().ok_or(Error::NotAWall(node))?;
        let info = mesh.wall.ok_or(Error::NotAWall(node))?;

        Ok(Self {
            node,
            wall: info.id,
            name: wall_node.name.clone(),
            geometry: mesh.geometry.clone(),
            material: mesh.material.clone(),
            doorways: cutter.doorways(info.id).to_vec(),
        })
    }

    /// Put the captured state back, verbatim.
    pub fn restore(&self, graph: &mut SceneGraph, cutter: &mut DoorwayCutter) -> Result<()> {
        let node = graph.node_mut(self.node)?;
        node.name = self.name.clone();
        let mesh = node.as_mesh_mut().ok_or(Error::NotAWall(self.node))?;
        mesh.geometry = self.geometry.clone();
        mesh.material = self.material.clone();

        cutter.set_doorways(self.wall, self.doorways.clone());
        Ok(())
    }
}
