// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editor tool mode.
//!
//! Exactly one tool is active at a time. Switching goes through
//! [`EditorMode::toggle`], so selecting a tool implicitly deactivates the
//! previous one.

use serde::{Deserialize, Serialize};

/// Lamp model variants for the light tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LampKind {
    Floor,
    Ceiling,
    CeilingPendant,
    Table,
}

impl LampKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LampKind::Floor => "floor",
            LampKind::Ceiling => "ceiling",
            LampKind::CeilingPendant => "ceiling2",
            LampKind::Table => "table",
        }
    }

    pub fn asset(self) -> &'static str {
        match self {
            LampKind::Floor => "/models/Floor Lamp.glb",
            LampKind::Ceiling => "/models/Ceiling Lamp-zq1Fus3I15.glb",
            LampKind::CeilingPendant => "/models/Ceiling Lamp.glb",
            LampKind::Table => "/models/Table Lamp.glb",
        }
    }

    /// Name of the placed lamp group
    pub fn node_name(self) -> String {
        format!("{}Lamp [Lamp] [placeableObject]", self.as_str())
    }
}

/// The active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "lamp", rename_all = "snake_case")]
pub enum EditorMode {
    #[default]
    Idle,
    BuildingRoom,
    PlacingDoor,
    Deleting,
    PlacingBox,
    PlacingLight(LampKind),
}

impl EditorMode {
    /// Selecting the active tool again turns it off; any other tool replaces it.
    pub fn toggle(self, tool: EditorMode) -> EditorMode {
        if self == tool {
            EditorMode::Idle
        } else {
            tool
        }
    }

    pub fn is_idle(self) -> bool {
        self == EditorMode::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_transitions() {
        let mode = EditorMode::Idle.toggle(EditorMode::BuildingRoom);
        assert_eq!(mode, EditorMode::BuildingRoom);

        let mode = mode.toggle(EditorMode::PlacingDoor);
        assert_eq!(mode, EditorMode::PlacingDoor);

        assert!(mode.toggle(EditorMode::PlacingDoor).is_idle());
    }

    #[test]
    fn lamp_kinds_switch() {
        let floor = EditorMode::PlacingLight(LampKind::Floor);
        let table = EditorMode::PlacingLight(LampKind::Table);
        assert_eq!(floor.toggle(table), table);
        assert!(table.toggle(table).is_idle());
    }

    #[test]
    fn lamp_names() {
        assert_eq!(LampKind::Table.node_name(), "tableLamp [Lamp] [placeableObject]");
        assert_eq!(LampKind::CeilingPendant.asset(), "/models/Ceiling Lamp.glb");
    }
}
