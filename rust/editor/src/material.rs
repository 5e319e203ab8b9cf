// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface materials and texture maps.

use serde::{Deserialize, Serialize};

/// Emissive tint of ghost rooms shown during a drag.
pub const PREVIEW_EMISSIVE: u32 = 0x00ff00;

/// White, the base colour of rooms and textured surfaces.
pub const WHITE: u32 = 0xffffff;

/// How texture coordinates outside 0..1 are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureWrap {
    #[default]
    ClampToEdge,
    Repeat,
}

/// Image texture referenced by source (URL or asset path).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    pub source: String,
    /// Tiling in (u, v)
    pub repeat: [f64; 2],
    pub wrap: TextureWrap,
}

impl Texture {
    /// Tiled texture with repeat wrapping in both directions
    pub fn tiled(source: impl Into<String>, repeat: [f64; 2]) -> Self {
        Self {
            source: source.into(),
            repeat,
            wrap: TextureWrap::Repeat,
        }
    }
}

/// Standard surface material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: u32,
    pub emissive: u32,
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<Texture>,
}

impl Material {
    pub fn standard(color: u32) -> Self {
        Self {
            color,
            emissive: 0x000000,
            opacity: 1.0,
            map: None,
        }
    }

    /// Room surface, tinted when shown as a drag preview
    pub fn room(preview: bool) -> Self {
        let mut material = Self::standard(WHITE);
        if preview {
            material.emissive = PREVIEW_EMISSIVE;
        }
        material
    }

    fn retile(&mut self, repeat: [f64; 2]) {
        if let Some(map) = self.map.as_mut() {
            map.repeat = repeat;
            map.wrap = TextureWrap::Repeat;
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::standard(WHITE)
    }
}

/// A mesh's material: one for the whole mesh or one per face group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "materials", rename_all = "snake_case")]
pub enum MaterialSlot {
    Single(Material),
    PerFace(Vec<Material>),
}

impl MaterialSlot {
    pub fn materials(&self) -> &[Material] {
        match self {
            MaterialSlot::Single(m) => std::slice::from_ref(m),
            MaterialSlot::PerFace(ms) => ms,
        }
    }

    pub fn materials_mut(&mut self) -> &mut [Material] {
        match self {
            MaterialSlot::Single(m) => std::slice::from_mut(m),
            MaterialSlot::PerFace(ms) => ms,
        }
    }

    /// Copy with every texture map re-tiled to `repeat` and set to wrap
    pub fn with_repeat(&self, repeat: [f64; 2]) -> Self {
        let mut slot = self.clone();
        slot.materials_mut().iter_mut().for_each(|m| m.retile(repeat));
        slot
    }

    /// Copy with `texture` mapped on every material and the colour reset to white
    pub fn with_texture(&self, texture: &Texture) -> Self {
        let mut slot = self.clone();
        for material in slot.materials_mut() {
            material.map = Some(texture.clone());
            material.color = WHITE;
        }
        slot
    }
}

impl From<Material> for MaterialSlot {
    fn from(material: Material) -> Self {
        MaterialSlot::Single(material)
    }
}
