// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Doorway cutting.
//!
//! The [`DoorwayCutter`] owns the doorway side table, keyed by [`WallId`].
//! Computing a cut is pure: [`DoorwayCutter::cut_doorway`] returns the wall's
//! new geometry, material, name and doorway list without touching the scene.
//! [`DoorwayCutter::commit`] then applies such a result, which is what
//! [`PlaceDoorCommand`](crate::commands::PlaceDoorCommand) does on execute.

use envbuilder_geometry::{
    local_offset, sort_doorways, wall_solid, Doorway, Mesh, Point3, DOORWAY_SUFFIX,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::keys::{NodeKey, WallId};
use crate::material::MaterialSlot;
use crate::scene::SceneGraph;

/// Size of a requested doorway.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorSize {
    pub width: f64,
    pub height: f64,
}

/// A wall's state after a cut, ready to be committed.
#[derive(Debug, Clone, PartialEq)]
pub struct CutWall {
    pub node: NodeKey,
    pub wall: WallId,
    pub name: String,
    pub geometry: Mesh,
    pub material: MaterialSlot,
    /// Full doorway list, sorted by offset
    pub doorways: Vec<Doorway>,
}

/// Per-wall doorway side table and cut computation.
#[derive(Debug, Default, Clone)]
pub struct DoorwayCutter {
    doorways: FxHashMap<WallId, Vec<Doorway>>,
}

impl DoorwayCutter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Doorways of a wall, sorted by offset.
    pub fn doorways(&self, wall: WallId) -> &[Doorway] {
        self.doorways.get(&wall).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace a wall's doorway list. An empty list removes the entry.
    pub fn set_doorways(&mut self, wall: WallId, mut doorways: Vec<Doorway>) {
        if doorways.is_empty() {
            self.doorways.remove(&wall);
        } else {
            sort_doorways(&mut doorways);
            self.doorways.insert(wall, doorways);
        }
    }

    /// Walls with at least one doorway, in id order.
    pub fn entries(&self) -> Vec<(WallId, &[Doorway])> {
        let mut entries: Vec<_> = self
            .doorways
            .iter()
            .map(|(id, list)| (*id, list.as_slice()))
            .collect();
        entries.sort_by_key(|(id, _)| *id);
        entries
    }

    pub fn clear(&mut self) {
        self.doorways.clear();
    }

    /// Compute the cut of a new doorway into a wall node.
    ///
    /// `world_point` is converted into the wall's local frame; only its
    /// position along the wall is used, the doorway always starts at the
    /// floor. Existing doorways of the wall are kept. Texture maps on the
    /// wall's material are re-tiled to `texture_repeat`.
    pub fn cut_doorway(
        &self,
        graph: &SceneGraph,
        node: NodeKey,
        world_point: &Point3<f64>,
        size: DoorSize,
        texture_repeat: [f64; 2],
    ) -> Result<CutWall> {
        let wall_node = graph.node(node)?;
        let mesh = wall_node.as_mesh().ok_or(Error::NotAWall(node))?;
        let info = mesh.wall.ok_or(Error::NotAWall(node))?;

        let to_local = graph
            .world_matrix(node)?
            .try_inverse()
            .ok_or(Error::SingularTransform(node))?;
        let local = to_local.transform_point(world_point);
        let x = local_offset(info.role, &Point3::origin(), &local);

        let doorway = Doorway::new(x, size.width, size.height);
        let mut doorways = self.doorways(info.id).to_vec();
        if doorways.iter().any(|d| d.overlaps(&doorway)) {
            debug!(wall = %info.id, offset = x, "doorway overlaps an existing opening");
        }
        doorways.push(doorway);
        sort_doorways(&mut doorways);

        let solid = wall_solid(info.role, info.length, info.height, info.thickness, &doorways)?;

        debug!(
            wall = %info.id,
            role = info.role.name(),
            offset = x,
            doorways = doorways.len(),
            "cut doorway"
        );

        Ok(CutWall {
            node,
            wall: info.id,
            name: doorway_name(&wall_node.name),
            geometry: solid.mesh,
            material: mesh.material.with_repeat(texture_repeat),
            doorways,
        })
    }

    /// Apply a computed cut to the scene and the side table.
    pub fn commit(&mut self, graph: &mut SceneGraph, cut: &CutWall) -> Result<()> {
        let node = graph.node_mut(cut.node)?;
        node.name = cut.name.clone();
        let mesh = node.as_mesh_mut().ok_or(Error::NotAWall(cut.node))?;
        mesh.geometry = cut.geometry.clone();
        mesh.material = cut.material.clone();

        self.set_doorways(cut.wall, cut.doorways.clone());
        Ok(())
    }
}

/// Name marking a wall with doorways; the suffix is added once.
pub fn doorway_name(name: &str) -> String {
    if name.ends_with(DOORWAY_SUFFIX) {
        name.to_string()
    } else {
        format!("{name}{DOORWAY_SUFFIX}")
    }
}

/// Name with the doorway suffix removed.
pub fn plain_name(name: &str) -> &str {
    name.strip_suffix(DOORWAY_SUFFIX).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Material, Texture};
    use crate::scene::{MeshNode, Node, NodeKind, Transform, WallInfo};
    use approx::assert_relative_eq;
    use envbuilder_geometry::WallRole;

    fn wall(graph: &mut SceneGraph, role: WallRole, center: Point3<f64>) -> NodeKey {
        let solid = wall_solid(role, 6.0, 3.0, 0.1, &[]).unwrap();
        let mut material = Material::default();
        material.map = Some(Texture::tiled("plaster.png", [1.0, 1.0]));
        graph.insert(
            Node::new(
                role.name(),
                NodeKind::Mesh(MeshNode {
                    geometry: solid.mesh,
                    material: material.into(),
                    wall: Some(WallInfo {
                        id: WallId(role as u64),
                        role,
                        length: 6.0,
                        height: 3.0,
                        thickness: 0.1,
                    }),
                }),
            )
            .with_transform(Transform::at(center)),
        )
    }

    const DOOR: DoorSize = DoorSize { width: 2.0, height: 2.5 };

    #[test]
    fn offset_uses_long_axis() {
        let mut graph = SceneGraph::new();
        let front = wall(&mut graph, WallRole::Front, Point3::new(3.0, 1.5, 0.0));
        let left = wall(&mut graph, WallRole::Left, Point3::new(0.0, 1.5, 3.0));
        let cutter = DoorwayCutter::new();

        let hit = Point3::new(4.0, 0.7, 4.0);
        let cut = cutter.cut_doorway(&graph, front, &hit, DOOR, [1.0, 1.0]).unwrap();
        assert_relative_eq!(cut.doorways[0].x, 1.0);

        let cut = cutter.cut_doorway(&graph, left, &hit, DOOR, [1.0, 1.0]).unwrap();
        assert_relative_eq!(cut.doorways[0].x, 1.0);
    }

    #[test]
    fn cut_is_pure_until_commit() {
        let mut graph = SceneGraph::new();
        let front = wall(&mut graph, WallRole::Front, Point3::new(0.0, 1.5, 0.0));
        let before = graph.node(front).unwrap().clone();
        let mut cutter = DoorwayCutter::new();

        let cut = cutter
            .cut_doorway(&graph, front, &Point3::new(1.0, 0.0, 0.0), DOOR, [2.0, 3.0])
            .unwrap();
        assert_eq!(graph.node(front).unwrap(), &before);
        assert!(cutter.doorways(WallId(0)).is_empty());

        cutter.commit(&mut graph, &cut).unwrap();
        let after = graph.node(front).unwrap();
        assert_eq!(after.name, "frontWallDoorway");
        assert_eq!(cutter.doorways(WallId(0)).len(), 1);

        let map = after.as_mesh().unwrap().material.materials()[0].map.clone().unwrap();
        assert_eq!(map.source, "plaster.png");
        assert_eq!(map.repeat, [2.0, 3.0]);
    }

    #[test]
    fn repeated_cuts_accumulate() {
        let mut graph = SceneGraph::new();
        let front = wall(&mut graph, WallRole::Front, Point3::new(0.0, 1.5, 0.0));
        let mut cutter = DoorwayCutter::new();

        for x in [2.0, -2.0] {
            let cut = cutter
                .cut_doorway(&graph, front, &Point3::new(x, 0.0, 0.0), DoorSize { width: 1.0, height: 2.0 }, [1.0, 1.0])
                .unwrap();
            cutter.commit(&mut graph, &cut).unwrap();
        }

        let doorways = cutter.doorways(WallId(0));
        assert_eq!(doorways.len(), 2);
        assert!(doorways[0].x < doorways[1].x);
        assert_eq!(graph.node(front).unwrap().name, "frontWallDoorway");
    }

    #[test]
    fn non_wall_is_rejected() {
        let mut graph = SceneGraph::new();
        let group = graph.insert(Node::group("room"));
        let cutter = DoorwayCutter::new();
        let err = cutter.cut_doorway(&graph, group, &Point3::origin(), DOOR, [1.0, 1.0]);
        assert!(matches!(err, Err(Error::NotAWall(_))));
    }

    #[test]
    fn names() {
        assert_eq!(doorway_name("backWall"), "backWallDoorway");
        assert_eq!(doorway_name("backWallDoorway"), "backWallDoorway");
        assert_eq!(plain_name("backWallDoorway"), "backWall");
        assert_eq!(plain_name("floor"), "floor");
    }
}
