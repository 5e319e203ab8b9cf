// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for editor operations.

use crate::keys::NodeKey;

/// Result type alias for editor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing a scene.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Geometry construction failed.
    #[error("geometry error: {0}")]
    Geometry(#[from] envbuilder_geometry::Error),

    /// A referenced node is not in the scene graph.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// The node is not a wall mesh.
    #[error("node is not a wall: {0:?}")]
    NotAWall(NodeKey),

    /// The node has no mesh.
    #[error("node is not a mesh: {0:?}")]
    NotAMesh(NodeKey),

    /// The node is not in the placed-objects registry.
    #[error("node is not a placed object: {0:?}")]
    NotPlaced(NodeKey),

    /// A node's world transform cannot be inverted.
    #[error("node has a singular transform: {0:?}")]
    SingularTransform(NodeKey),

    /// Scene export/import failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid editor configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}
