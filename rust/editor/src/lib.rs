// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EnvironmentBuilder Editor
//!
//! Scene editing on top of `envbuilder-geometry`: a node arena holding rooms,
//! doors, boxes and lamps, doorway cutting with a per-wall side table, and an
//! undo/redo command stack.
//!
//! ## Overview
//!
//! - [`Editor`] routes pointer gestures by [`EditorMode`] into commands
//! - [`CommandStack`] records every scene mutation for undo and redo
//! - [`DoorwayCutter`] rebuilds cut walls from their full doorway list
//! - [`Document::to_json`] and [`Document::from_json`] persist the scene
//!
//! ## Example
//!
//! ```rust,ignore
//! use envbuilder_editor::{Editor, EditorConfig, EditorMode};
//! use envbuilder_geometry::Point3;
//!
//! let mut editor = Editor::new(EditorConfig::default())?;
//! editor.create_room(&Point3::new(0.0, 0.0, 0.0), &Point3::new(6.0, 0.0, 4.0))?;
//! editor.toggle_tool(EditorMode::PlacingDoor);
//! editor.undo()?;
//! ```

pub mod command;
pub mod commands;
pub mod config;
pub mod document;
pub mod doorway;
pub mod editor;
pub mod error;
pub mod events;
pub mod keys;
pub mod logging;
pub mod material;
pub mod mode;
pub mod persistence;
pub mod raycast;
pub mod scene;
pub mod snapshot;

pub use command::{Command, CommandStack, Discarded};
pub use commands::{
    ApplyMaterialCommand, CreateRoomCommand, PlaceDoorCommand, PlaceObjectCommand,
    RemoveObjectCommand,
};
pub use config::{EditorConfig, LightConfig};
pub use document::Document;
pub use doorway::{doorway_name, plain_name, CutWall, DoorSize, DoorwayCutter};
pub use editor::Editor;
pub use error::{Error, Result};
pub use events::{EditorEvent, EventBus, EventKind, SubscriptionId};
pub use keys::{NodeKey, WallId};
pub use material::{Material, MaterialSlot, Texture, TextureWrap};
pub use mode::{EditorMode, LampKind};
pub use persistence::{SceneSnapshot, FORMAT_VERSION};
pub use raycast::{BoundsRaycaster, RayHit, Raycaster};
pub use scene::{MeshNode, Node, NodeKind, PointLight, SceneGraph, Transform, WallInfo};
pub use snapshot::WallSnapshot;
