// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The mutable state commands operate on.

use crate::doorway::DoorwayCutter;
use crate::keys::WallId;
use crate::scene::SceneGraph;

/// Scene graph plus the doorway side table.
#[derive(Debug, Default)]
pub struct Document {
    pub graph: SceneGraph,
    pub doorways: DoorwayCutter,
    next_wall_id: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_wall_id(&mut self) -> WallId {
        let id = WallId(self.next_wall_id);
        self.next_wall_id += 1;
        id
    }

    /// Next id [`allocate_wall_id`](Self::allocate_wall_id) will hand out.
    pub fn next_wall_id(&self) -> u64 {
        self.next_wall_id
    }

    /// Ensure later allocations start at or after `next`.
    pub fn reserve_wall_ids(&mut self, next: u64) {
        self.next_wall_id = self.next_wall_id.max(next);
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.doorways.clear();
        self.next_wall_id = 0;
    }
}
