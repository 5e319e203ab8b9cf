// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editor facade.
//!
//! [`Editor`] turns tool gestures (screen points) into geometry and pushes
//! the resulting scene mutations through the command stack. Pointer events
//! are routed by the active [`EditorMode`]; every tool operation can also be
//! called directly.

use envbuilder_geometry::{
    create_rectangle, extrude, screen_to_world, snap_to_grid, GroundProjector, Matrix4,
    PerspectiveCamera, Point2, Point3, RoomGeometry, Vector3,
};
use tracing::{debug, info};

use crate::command::{Command, CommandStack};
use crate::commands::{
    ApplyMaterialCommand, CreateRoomCommand, PlaceDoorCommand, PlaceObjectCommand,
    RemoveObjectCommand,
};
use crate::config::EditorConfig;
use crate::doorway::DoorSize;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::events::{EditorEvent, EventBus, EventKind, SubscriptionId};
use crate::keys::NodeKey;
use crate::material::{Material, MaterialSlot, Texture};
use crate::mode::{EditorMode, LampKind};
use crate::raycast::{BoundsRaycaster, RayHit, Raycaster};
use crate::scene::{MeshNode, Node, NodeKind, PointLight, SceneGraph, Transform, WallInfo};

/// Colour of placed boxes.
const BOX_COLOR: u32 = 0x0000ff;

/// A door click cuts at most this many walls.
const MAX_DOOR_WALLS: usize = 2;

#[derive(Debug)]
struct RoomDrag {
    start: Point3<f64>,
    preview: Option<NodeKey>,
}

/// Scene editor: document, history, active tool and notifications.
pub struct Editor {
    config: EditorConfig,
    doc: Document,
    history: CommandStack,
    mode: EditorMode,
    events: EventBus,
    camera: PerspectiveCamera,
    raycaster: Box<dyn Raycaster>,
    texture_repeat: [f64; 2],
    drag: Option<RoomDrag>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("mode", &self.mode)
            .field("nodes", &self.doc.graph.len())
            .field("undo", &self.history.undo_len())
            .field("redo", &self.history.redo_len())
            .finish()
    }
}

fn default_camera() -> PerspectiveCamera {
    PerspectiveCamera::new(
        Point3::new(0.0, 20.0, 20.0),
        Point3::origin(),
        75f64.to_radians(),
        (1280.0, 720.0),
    )
}

impl Editor {
    pub fn new(config: EditorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            history: CommandStack::new(config.history_limit),
            texture_repeat: config.texture_repeat,
            config,
            doc: Document::new(),
            mode: EditorMode::Idle,
            events: EventBus::new(),
            camera: default_camera(),
            raycaster: Box::new(BoundsRaycaster),
            drag: None,
        })
    }

    /// Replace the picking strategy.
    pub fn with_raycaster(mut self, raycaster: impl Raycaster + 'static) -> Self {
        self.raycaster = Box::new(raycaster);
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.doc.graph
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: PerspectiveCamera) {
        self.camera = camera;
    }

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&EditorEvent) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ------------------------------------------------------------------
    // Tool mode
    // ------------------------------------------------------------------

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EditorMode) {
        if mode == self.mode {
            return;
        }
        if self.mode == EditorMode::BuildingRoom {
            self.cancel_room_drag();
        }
        let from = self.mode;
        self.mode = mode;
        debug!(?from, to = ?mode, "mode changed");
        self.events.publish(&EditorEvent::ModeChanged { from, to: mode });
    }

    /// Activate a tool, or return to idle if it is already active.
    pub fn toggle_tool(&mut self, tool: EditorMode) -> EditorMode {
        self.set_mode(self.mode.toggle(tool));
        self.mode
    }

    // ------------------------------------------------------------------
    // Pointer routing
    // ------------------------------------------------------------------

    pub fn pointer_down(&mut self, screen: Point2<f64>) -> Result<()> {
        match self.mode {
            EditorMode::BuildingRoom => {
                self.begin_room_drag(screen)?;
            }
            EditorMode::PlacingDoor => {
                self.place_door(screen)?;
            }
            EditorMode::PlacingBox => {
                self.place_box(screen)?;
            }
            EditorMode::PlacingLight(kind) => {
                self.place_light(kind, screen)?;
            }
            EditorMode::Deleting => {
                self.delete_at(screen)?;
            }
            EditorMode::Idle => {}
        }
        Ok(())
    }

    pub fn pointer_move(&mut self, screen: Point2<f64>) -> Result<()> {
        if self.mode == EditorMode::BuildingRoom {
            self.update_room_drag(screen)?;
        }
        Ok(())
    }

    pub fn pointer_up(&mut self, screen: Point2<f64>) -> Result<()> {
        if self.mode == EditorMode::BuildingRoom {
            self.finish_room_drag(screen)?;
        }
        Ok(())
    }

    /// Ground point under the cursor, snapped to the grid.
    pub fn screen_to_world(&self, screen: Point2<f64>) -> Option<Point3<f64>> {
        screen_to_world(
            &self.camera,
            screen,
            self.config.ground_height,
            self.config.grid_step,
        )
    }

    // ------------------------------------------------------------------
    // Rooms
    // ------------------------------------------------------------------

    /// Start a room drag. Returns false when the point misses the ground.
    pub fn begin_room_drag(&mut self, screen: Point2<f64>) -> Result<bool> {
        self.cancel_room_drag();
        let Some(start) = self.screen_to_world(screen) else {
            return Ok(false);
        };
        self.drag = Some(RoomDrag {
            start,
            preview: None,
        });
        self.update_room_drag(screen)?;
        Ok(true)
    }

    /// Rebuild the ghost room for the current cursor position.
    pub fn update_room_drag(&mut self, screen: Point2<f64>) -> Result<Option<NodeKey>> {
        let Some(start) = self.drag.as_ref().map(|d| d.start) else {
            return Ok(None);
        };
        let Some(end) = self.screen_to_world(screen) else {
            return Ok(self.drag.as_ref().and_then(|d| d.preview));
        };

        self.discard_preview();
        let room = self.config.room_builder().build_room(&start, &end, true)?;
        let preview = self.insert_room(&room)?;
        self.doc.graph.attach(preview)?;

        if let Some(drag) = self.drag.as_mut() {
            drag.preview = Some(preview);
        }
        Ok(Some(preview))
    }

    /// Commit the dragged room. A room whose width or depth is not positive
    /// is discarded.
    pub fn finish_room_drag(&mut self, screen: Point2<f64>) -> Result<Option<NodeKey>> {
        self.discard_preview();
        let Some(drag) = self.drag.take() else {
            return Ok(None);
        };
        let Some(end) = self.screen_to_world(screen) else {
            return Ok(None);
        };
        self.create_room(&drag.start, &end)
    }

    /// Drop an in-progress drag. Returns false if none was active.
    pub fn cancel_room_drag(&mut self) -> bool {
        self.discard_preview();
        self.drag.take().is_some()
    }

    /// Live preview node of the current drag, if any.
    pub fn room_preview(&self) -> Option<NodeKey> {
        self.drag.as_ref().and_then(|d| d.preview)
    }

    /// Build a room between two ground points and add it through the
    /// command stack.
    pub fn create_room(
        &mut self,
        start: &Point3<f64>,
        end: &Point3<f64>,
    ) -> Result<Option<NodeKey>> {
        let room = self.config.room_builder().build_room(start, end, false)?;
        if !room.is_valid() {
            debug!(width = room.width, depth = room.depth, "discarding degenerate room");
            return Ok(None);
        }

        let key = self.insert_room(&room)?;
        self.run_owning(Box::new(CreateRoomCommand::new(key)), key)?;
        info!(width = room.width, depth = room.depth, "room created");
        self.events.publish(&EditorEvent::RoomCreated(key));
        Ok(Some(key))
    }

    fn discard_preview(&mut self) {
        if let Some(preview) = self.drag.as_mut().and_then(|d| d.preview.take()) {
            self.doc.graph.remove_subtree(preview);
        }
    }

    /// Store a room's floor and walls as a detached group.
    fn insert_room(&mut self, room: &RoomGeometry) -> Result<NodeKey> {
        let material = MaterialSlot::Single(Material::room(room.preview));
        let group = self.doc.graph.insert(Node::group("room"));

        let floor = self.doc.graph.insert(
            Node::mesh("floor", room.floor.mesh.clone(), material.clone())
                .with_transform(Transform::at(room.floor_center)),
        );
        self.doc.graph.add_child(group, floor)?;

        for wall in &room.walls {
            // Ghost walls are not cut targets
            let info = if room.preview {
                None
            } else {
                Some(WallInfo {
                    id: self.doc.allocate_wall_id(),
                    role: wall.role,
                    length: wall.length,
                    height: wall.height,
                    thickness: wall.thickness,
                })
            };
            let node = Node::new(
                wall.role.name(),
                NodeKind::Mesh(MeshNode {
                    geometry: wall.solid.mesh.clone(),
                    material: material.clone(),
                    wall: info,
                }),
            )
            .with_transform(Transform::at(wall.center));
            let key = self.doc.graph.insert(node);
            self.doc.graph.add_child(group, key)?;
        }
        Ok(group)
    }

    // ------------------------------------------------------------------
    // Doors
    // ------------------------------------------------------------------

    /// Place a door where the view ray through `screen` meets a wall.
    pub fn place_door(&mut self, screen: Point2<f64>) -> Result<Option<NodeKey>> {
        let ray = self.camera.ray(screen);
        let hits = self.raycaster.cast_walls(&self.doc, &ray);
        self.place_door_at(&hits)
    }

    /// Place a door at the nearest hit and cut a doorway into up to two of
    /// the hit walls.
    ///
    /// The door stands on the ground at the grid-snapped hit point, turned
    /// to face along the hit normal.
    pub fn place_door_at(&mut self, hits: &[RayHit]) -> Result<Option<NodeKey>> {
        let mut walls: Vec<&RayHit> = Vec::with_capacity(MAX_DOOR_WALLS);
        for hit in hits {
            if walls.len() == MAX_DOOR_WALLS {
                break;
            }
            let is_wall = self.doc.graph.get(hit.node).and_then(Node::wall).is_some();
            if is_wall && walls.iter().all(|w| w.node != hit.node) {
                walls.push(hit);
            }
        }
        let Some(first) = walls.first() else {
            return Ok(None);
        };

        let step = self.config.grid_step;
        let position = Point3::new(
            snap_to_grid(first.point.x, step),
            self.config.ground_height,
            snap_to_grid(first.point.z, step),
        );
        let size = DoorSize {
            width: self.config.door_width,
            height: self.config.door_height,
        };

        let cuts = walls
            .iter()
            .map(|hit| {
                self.doc
                    .doorways
                    .cut_doorway(&self.doc.graph, hit.node, &position, size, self.texture_repeat)
            })
            .collect::<Result<Vec<_>>>()?;
        let wall_keys: Vec<NodeKey> = cuts.iter().map(|c| c.node).collect();

        let door = self.doc.graph.insert(
            Node::new(
                "door",
                NodeKind::Model {
                    asset: self.config.door_asset.clone(),
                },
            )
            .with_transform(Transform::at(position).facing(&first.normal)),
        );

        match PlaceDoorCommand::new(&self.doc, door, cuts) {
            Ok(command) => self.run_owning(Box::new(command), door)?,
            Err(e) => {
                self.doc.graph.remove_subtree(door);
                return Err(e);
            }
        }

        info!(walls = wall_keys.len(), x = position.x, z = position.z, "door placed");
        self.events.publish(&EditorEvent::DoorPlaced {
            door,
            walls: wall_keys,
        });
        Ok(Some(door))
    }

    // ------------------------------------------------------------------
    // Boxes and lights
    // ------------------------------------------------------------------

    /// Place a box standing on the ground under the cursor.
    pub fn place_box(&mut self, screen: Point2<f64>) -> Result<Option<NodeKey>> {
        let ground = self.config.ground_height;
        let Some(hit) = self.camera.project_to_plane(screen, ground) else {
            return Ok(None);
        };

        let [w, h, d] = self.config.box_size;
        let mut solid = extrude(&create_rectangle(w, h), d)?;
        solid.transform(&Matrix4::new_translation(&Vector3::new(0.0, 0.0, -d / 2.0)));

        let mut material = Material::standard(BOX_COLOR);
        material.opacity = 0.2;

        let node = self.doc.graph.insert(
            Node::mesh("Box", solid.mesh, material.into())
                .with_transform(Transform::at(Point3::new(hit.x, ground + h / 2.0, hit.z))),
        );
        if let Err(e) = self.place(node) {
            self.doc.graph.remove_subtree(node);
            return Err(e);
        }
        Ok(Some(node))
    }

    /// Place a lamp fixture: a group holding the lamp model and a point light.
    pub fn place_light(&mut self, kind: LampKind, screen: Point2<f64>) -> Result<Option<NodeKey>> {
        let Some(hit) = self.screen_to_world(screen) else {
            return Ok(None);
        };
        let height = match kind {
            LampKind::Ceiling | LampKind::CeilingPendant => self.config.wall_height,
            LampKind::Floor | LampKind::Table => 0.0,
        };
        let position = Point3::new(hit.x, hit.y + height, hit.z);

        let group = self
            .doc
            .graph
            .insert(Node::group(kind.node_name()).with_transform(Transform::at(position)));
        let model = self.doc.graph.insert(Node::new(
            "lampModel",
            NodeKind::Model {
                asset: kind.asset().to_string(),
            },
        ));
        let light = self.config.light;
        let light = self.doc.graph.insert(Node::new(
            "pointLight",
            NodeKind::Light(PointLight {
                color: light.color,
                intensity: light.intensity,
                distance: light.distance,
            }),
        ));
        let placed = self
            .doc
            .graph
            .add_child(group, model)
            .and_then(|_| self.doc.graph.add_child(group, light))
            .and_then(|_| self.place(group));
        if let Err(e) = placed {
            for key in [group, model, light] {
                self.doc.graph.remove_subtree(key);
            }
            return Err(e);
        }
        Ok(Some(group))
    }

    /// Add an already built node through a PlaceObjectCommand.
    pub fn place(&mut self, node: NodeKey) -> Result<()> {
        self.doc.graph.node(node)?;
        self.run(Box::new(PlaceObjectCommand::new(node)))?;
        self.events.publish(&EditorEvent::ObjectPlaced(node));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Deletion and textures
    // ------------------------------------------------------------------

    /// Delete the placed object under the cursor. Returns the removed
    /// object, or `None` when the ray hits nothing deletable.
    pub fn delete_at(&mut self, screen: Point2<f64>) -> Result<Option<NodeKey>> {
        let ray = self.camera.ray(screen);
        let owner = self
            .raycaster
            .cast_nodes(&self.doc, &ray)
            .into_iter()
            .find_map(|hit| self.doc.graph.placed_owner(hit.node));
        let Some(owner) = owner else {
            return Ok(None);
        };
        self.delete_object(owner)?;
        Ok(Some(owner))
    }

    /// Remove the placed object owning `node`. Returns false when the node
    /// belongs to no placed object.
    pub fn delete_object(&mut self, node: NodeKey) -> Result<bool> {
        self.doc.graph.node(node)?;
        let Some(owner) = self.doc.graph.placed_owner(node) else {
            return Ok(false);
        };
        let command = RemoveObjectCommand::new(&self.doc, owner)?;
        self.run(Box::new(command))?;
        self.events.publish(&EditorEvent::ObjectRemoved(owner));
        Ok(true)
    }

    /// Map a texture, tiled with the current repeat settings, on `node` and
    /// every mesh below it.
    pub fn apply_texture(&mut self, node: NodeKey, source: &str) -> Result<usize> {
        self.doc.graph.node(node)?;
        let texture = Texture::tiled(source, self.texture_repeat);

        let targets: Vec<(NodeKey, MaterialSlot)> = self
            .doc
            .graph
            .descendants(node)
            .into_iter()
            .filter_map(|k| {
                let mesh = self.doc.graph.get(k)?.as_mesh()?;
                Some((k, mesh.material.with_texture(&texture)))
            })
            .collect();
        if targets.is_empty() {
            return Err(Error::NotAMesh(node));
        }

        let count = targets.len();
        let command = ApplyMaterialCommand::new(&self.doc, targets)?;
        self.run(Box::new(command))?;
        debug!(source, meshes = count, "texture applied");
        Ok(count)
    }

    pub fn texture_repeat(&self) -> [f64; 2] {
        self.texture_repeat
    }

    /// Tiling used by later texture applications and doorway cuts.
    pub fn set_texture_repeat(&mut self, u: f64, v: f64) {
        self.texture_repeat = [u, v];
        self.events.publish(&EditorEvent::TextureRepeatChanged { u, v });
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Run a command through the history.
    pub fn execute(&mut self, command: Box<dyn Command>) -> Result<()> {
        self.run(command)
    }

    fn run(&mut self, command: Box<dyn Command>) -> Result<()> {
        self.history.execute(command, &mut self.doc)?;
        self.publish_history();
        Ok(())
    }

    /// Run a command that adds `node`, freeing the node if it fails.
    fn run_owning(&mut self, command: Box<dyn Command>, node: NodeKey) -> Result<()> {
        let result = self.run(command);
        if result.is_err() {
            self.doc.graph.remove_subtree(node);
        }
        result
    }

    fn publish_history(&mut self) {
        self.events.publish(&EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    pub fn undo(&mut self) -> Result<bool> {
        let done = self.history.undo(&mut self.doc)?;
        if done {
            self.publish_history();
        }
        Ok(done)
    }

    pub fn redo(&mut self) -> Result<bool> {
        let done = self.history.redo(&mut self.doc)?;
        if done {
            self.publish_history();
        }
        Ok(done)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ------------------------------------------------------------------
    // Scene lifecycle
    // ------------------------------------------------------------------

    /// Empty the scene, the doorway table and the history.
    pub fn reset(&mut self) {
        self.drag = None;
        self.doc.clear();
        self.history.clear();
        info!("scene reset");
        self.events.publish(&EditorEvent::SceneReset);
        self.publish_history();
    }

    pub fn export_json(&self) -> Result<String> {
        let json = self.doc.to_json()?;
        info!(bytes = json.len(), objects = self.doc.graph.placed().len(), "scene exported");
        Ok(json)
    }

    /// Replace the scene with one loaded from JSON. History is cleared.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let doc = Document::from_json(json)?;
        self.drag = None;
        self.doc = doc;
        self.history.clear();

        let objects = self.doc.graph.placed().len();
        self.events.publish(&EditorEvent::SceneLoaded { objects });
        self.publish_history();
        Ok(())
    }
}
