// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Concrete scene mutations.

use tracing::debug;

use crate::command::{Command, Discarded};
use crate::doorway::CutWall;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::keys::NodeKey;
use crate::material::MaterialSlot;
use crate::scene::Node;
use crate::snapshot::WallSnapshot;

fn add_placed(doc: &mut Document, node: NodeKey) -> Result<()> {
    doc.graph.attach(node)?;
    if doc.graph.placed_index(node).is_none() {
        doc.graph.register_placed(node);
    }
    Ok(())
}

fn remove_placed(doc: &mut Document, node: NodeKey) {
    doc.graph.detach(node);
    doc.graph.unregister_placed(node);
}

/// Delete a node that can no longer return to the scene, along with the
/// doorway entries of any walls below it.
fn purge(doc: &mut Document, node: NodeKey) {
    if doc.graph.is_attached(node) {
        return;
    }
    for key in doc.graph.descendants(node) {
        if let Some(info) = doc.graph.get(key).and_then(Node::wall) {
            doc.doorways.set_doorways(info.id, Vec::new());
        }
    }
    if doc.graph.remove_subtree(node).is_some() {
        debug!(?node, "freed discarded node");
    }
}

/// Adds an object to the scene and the placed-objects registry.
#[derive(Debug)]
pub struct PlaceObjectCommand {
    node: NodeKey,
}

impl PlaceObjectCommand {
    pub fn new(node: NodeKey) -> Self {
        Self { node }
    }
}

impl Command for PlaceObjectCommand {
    fn name(&self) -> &'static str {
        "place_object"
    }

    fn execute(&mut self, doc: &mut Document) -> Result<()> {
        add_placed(doc, self.node)
    }

    fn undo(&mut self, doc: &mut Document) -> Result<()> {
        remove_placed(doc, self.node);
        Ok(())
    }

    fn discard(&mut self, doc: &mut Document, state: Discarded) {
        if state == Discarded::Undone {
            purge(doc, self.node);
        }
    }
}

/// Removes a placed object; undo puts it back at its registry position.
#[derive(Debug)]
pub struct RemoveObjectCommand {
    node: NodeKey,
    index: usize,
}

impl RemoveObjectCommand {
    /// Captures the object's current registry index.
    pub fn new(doc: &Document, node: NodeKey) -> Result<Self> {
        let index = doc.graph.placed_index(node).ok_or(Error::NotPlaced(node))?;
        Ok(Self { node, index })
    }
}

impl Command for RemoveObjectCommand {
    fn name(&self) -> &'static str {
        "remove_object"
    }

    fn execute(&mut self, doc: &mut Document) -> Result<()> {
        doc.graph.node(self.node)?;
        remove_placed(doc, self.node);
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> Result<()> {
        doc.graph.attach(self.node)?;
        doc.graph.insert_placed(self.index, self.node);
        Ok(())
    }

    fn discard(&mut self, doc: &mut Document, state: Discarded) {
        if state == Discarded::Executed {
            purge(doc, self.node);
        }
    }
}

/// Adds or removes a whole room group (floor and four walls).
#[derive(Debug)]
pub struct CreateRoomCommand {
    room: NodeKey,
}

impl CreateRoomCommand {
    pub fn new(room: NodeKey) -> Self {
        Self { room }
    }
}

impl Command for CreateRoomCommand {
    fn name(&self) -> &'static str {
        "create_room"
    }

    fn execute(&mut self, doc: &mut Document) -> Result<()> {
        add_placed(doc, self.room)
    }

    fn undo(&mut self, doc: &mut Document) -> Result<()> {
        remove_placed(doc, self.room);
        Ok(())
    }

    fn discard(&mut self, doc: &mut Document, state: Discarded) {
        if state == Discarded::Undone {
            purge(doc, self.room);
        }
    }
}

/// Places a door model and commits precomputed wall cuts.
///
/// The pre-cut state of every affected wall is captured when the command is
/// built; undo restores it verbatim.
#[derive(Debug)]
pub struct PlaceDoorCommand {
    door: NodeKey,
    before: Vec<WallSnapshot>,
    cuts: Vec<CutWall>,
}

impl PlaceDoorCommand {
    pub fn new(doc: &Document, door: NodeKey, cuts: Vec<CutWall>) -> Result<Self> {
        let before = cuts
            .iter()
            .map(|cut| WallSnapshot::capture(&doc.graph, &doc.doorways, cut.node))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { door, before, cuts })
    }
}

impl Command for PlaceDoorCommand {
    fn name(&self) -> &'static str {
        "place_door"
    }

    fn execute(&mut self, doc: &mut Document) -> Result<()> {
        for cut in &self.cuts {
            doc.doorways.commit(&mut doc.graph, cut)?;
        }
        add_placed(doc, self.door)
    }

    fn undo(&mut self, doc: &mut Document) -> Result<()> {
        remove_placed(doc, self.door);
        for snapshot in self.before.iter().rev() {
            snapshot.restore(&mut doc.graph, &mut doc.doorways)?;
        }
        Ok(())
    }

    fn discard(&mut self, doc: &mut Document, state: Discarded) {
        if state == Discarded::Undone {
            purge(doc, self.door);
        }
    }
}

/// Swaps the materials of a set of mesh nodes.
#[derive(Debug)]
pub struct ApplyMaterialCommand {
    /// (node, material before, material after)
    changes: Vec<(NodeKey, MaterialSlot, MaterialSlot)>,
}

impl ApplyMaterialCommand {
    /// Captures the current material of each node alongside its replacement.
    pub fn new(doc: &Document, targets: Vec<(NodeKey, MaterialSlot)>) -> Result<Self> {
        let changes = targets
            .into_iter()
            .map(|(node, after)| {
                let mesh = doc.graph.node(node)?.as_mesh().ok_or(Error::NotAMesh(node))?;
                Ok((node, mesh.material.clone(), after))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { changes })
    }

    fn set(doc: &mut Document, node: NodeKey, material: &MaterialSlot) -> Result<()> {
        if let Some(mesh) = doc.graph.node_mut(node)?.as_mesh_mut() {
            mesh.material = material.clone();
        }
        Ok(())
    }
}

impl Command for ApplyMaterialCommand {
    fn name(&self) -> &'static str {
        "apply_material"
    }

    fn execute(&mut self, doc: &mut Document) -> Result<()> {
        for (node, _, after) in &self.changes {
            Self::set(doc, *node, after)?;
        }
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> Result<()> {
        for (node, before, _) in &self.changes {
            Self::set(doc, *node, before)?;
        }
        Ok(())
    }
}
