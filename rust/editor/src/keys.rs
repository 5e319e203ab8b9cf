// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier types.
//!
//! Scene nodes are addressed by generational slotmap keys that stay valid
//! while a node is detached from the scene (for example, held by an undo
//! entry). Walls additionally carry a [`WallId`], which is independent of the
//! node's display name and survives export/import.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Key for a scene node.
    pub struct NodeKey;
}

/// Stable wall identity used by the doorway side table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WallId(pub u64);

impl std::fmt::Display for WallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "wall#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn keys_survive_other_removals() {
        let mut map: SlotMap<NodeKey, &str> = SlotMap::with_key();
        let a = map.insert("a");
        let b = map.insert("b");
        map.remove(a);
        assert_eq!(map.get(b), Some(&"b"));
        assert!(map.get(a).is_none());
    }

    #[test]
    fn wall_id_display() {
        assert_eq!(WallId(7).to_string(), "wall#7");
        assert!(WallId(1) < WallId(2));
    }
}
