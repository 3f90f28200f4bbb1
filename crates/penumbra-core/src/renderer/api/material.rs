// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Material, shader and mesh handles plus the light material feature key.

use crate::renderer::light::{Light2D, LightKind, NormalMapQuality, OverlapOperation};

/// An opaque handle to a material instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

/// An opaque handle to a loaded shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub usize);

/// An opaque handle to a GPU mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// A fixed-function blend factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// `1`.
    One,
    /// `0`.
    Zero,
    /// Source alpha.
    SrcAlpha,
    /// `1 - source alpha`.
    OneMinusSrcAlpha,
}

/// Source and destination blend factors for a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendMode {
    /// Factor applied to the incoming fragment.
    pub src: BlendFactor,
    /// Factor applied to the value already in the target.
    pub dst: BlendFactor,
}

impl BlendMode {
    /// Classic alpha blending.
    pub const ALPHA_BLEND: Self = Self {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
    };

    /// Additive accumulation.
    pub const ADDITIVE: Self = Self {
        src: BlendFactor::One,
        dst: BlendFactor::One,
    };
}

/// The material-relevant features of a light, packed into a cache key.
///
/// Bit layout, least significant first:
///
/// | bit | field                |
/// |-----|----------------------|
/// | 0   | `volume`             |
/// | 1   | `shape`              |
/// | 2   | `additive`           |
/// | 3   | `sprite`             |
/// | 4   | `point_cookie`       |
/// | 5   | `point_fast_quality` |
/// | 6   | `normal_map`         |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LightMaterialKey {
    /// Rendered by the volumetric pass.
    pub volume: bool,
    /// Any light that is not a point light.
    pub shape: bool,
    /// Additive overlap instead of alpha blending.
    pub additive: bool,
    /// A sprite light.
    pub sprite: bool,
    /// A point light sampling a cookie texture.
    pub point_cookie: bool,
    /// A point light using the fast normal-map path.
    pub point_fast_quality: bool,
    /// Normal mapping enabled at any quality.
    pub normal_map: bool,
}

impl LightMaterialKey {
    const VOLUME: u32 = 1 << 0;
    const SHAPE: u32 = 1 << 1;
    const ADDITIVE: u32 = 1 << 2;
    const SPRITE: u32 = 1 << 3;
    const POINT_COOKIE: u32 = 1 << 4;
    const POINT_FAST_QUALITY: u32 = 1 << 5;
    const NORMAL_MAP: u32 = 1 << 6;

    /// The number of meaningful bits; every packed key is below `1 << BITS`.
    pub const BITS: u32 = 7;

    /// Computes the key for `light` as drawn by the regular or volumetric pass.
    pub fn for_light(light: &Light2D, is_volume: bool) -> Self {
        let is_point = light.is_point();
        Self {
            volume: is_volume,
            shape: !is_point,
            additive: light.overlap != OverlapOperation::AlphaBlend,
            sprite: matches!(light.kind, LightKind::Sprite),
            point_cookie: is_point && light.cookie.is_some(),
            point_fast_quality: is_point && light.normal_map_quality == NormalMapQuality::Fast,
            normal_map: light.normal_map_quality != NormalMapQuality::Disabled,
        }
    }

    /// Packs the named fields into the integer cache key.
    pub const fn pack(&self) -> u32 {
        let mut bits = 0;
        if self.volume {
            bits |= Self::VOLUME;
        }
        if self.shape {
            bits |= Self::SHAPE;
        }
        if self.additive {
            bits |= Self::ADDITIVE;
        }
        if self.sprite {
            bits |= Self::SPRITE;
        }
        if self.point_cookie {
            bits |= Self::POINT_COOKIE;
        }
        if self.point_fast_quality {
            bits |= Self::POINT_FAST_QUALITY;
        }
        if self.normal_map {
            bits |= Self::NORMAL_MAP;
        }
        bits
    }

    /// Rebuilds the named fields from a packed key. Unknown bits are ignored.
    pub const fn unpack(bits: u32) -> Self {
        Self {
            volume: bits & Self::VOLUME != 0,
            shape: bits & Self::SHAPE != 0,
            additive: bits & Self::ADDITIVE != 0,
            sprite: bits & Self::SPRITE != 0,
            point_cookie: bits & Self::POINT_COOKIE != 0,
            point_fast_quality: bits & Self::POINT_FAST_QUALITY != 0,
            normal_map: bits & Self::NORMAL_MAP != 0,
        }
    }
}

/// The four shader families light materials are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LightShaders {
    /// Point lights, regular pass.
    pub point: Option<ShaderId>,
    /// Shape and sprite lights, regular pass.
    pub shape: Option<ShaderId>,
    /// Point lights, volumetric pass.
    pub point_volume: Option<ShaderId>,
    /// Shape and sprite lights, volumetric pass.
    pub shape_volume: Option<ShaderId>,
}

impl LightShaders {
    /// Picks the family for a key. `None` when that family was never loaded.
    pub fn family_for(&self, key: &LightMaterialKey) -> Option<ShaderId> {
        match (key.shape, key.volume) {
            (false, false) => self.point,
            (true, false) => self.shape,
            (false, true) => self.point_volume,
            (true, true) => self.shape_volume,
        }
    }
}

/// An immutable light material variant.
///
/// Keyword state is fixed at construction; the device consumer looks the
/// variant up by `id` when it executes a draw.
#[derive(Debug, Clone, PartialEq)]
pub struct LightMaterial {
    /// The handle used by draw commands.
    pub id: MaterialId,
    /// The key this variant was built for.
    pub key: LightMaterialKey,
    /// The shader family the variant instantiates.
    pub shader: ShaderId,
    /// Blend override; `None` for volumetric variants.
    pub blend: Option<BlendMode>,
    /// Enabled shader keywords.
    pub keywords: Vec<&'static str>,
}

impl LightMaterial {
    /// Returns `true` if `keyword` is enabled on this variant.
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| *k == keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::texture::TextureId;
    use crate::renderer::light::PointLightGeometry;

    #[test]
    fn test_pack_unpack_named_bits() {
        let key = LightMaterialKey {
            volume: true,
            additive: true,
            normal_map: true,
            ..Default::default()
        };
        assert_eq!(key.pack(), 0b100_0101);
        assert_eq!(LightMaterialKey::unpack(key.pack()), key);
        assert_eq!(LightMaterialKey::unpack(u32::MAX).pack(), (1 << LightMaterialKey::BITS) - 1);
    }

    #[test]
    fn test_key_for_point_light_with_cookie() {
        let light = Light2D {
            kind: LightKind::Point(PointLightGeometry::default()),
            cookie: Some(TextureId(3)),
            normal_map_quality: NormalMapQuality::Fast,
            ..Default::default()
        };
        let key = LightMaterialKey::for_light(&light, false);
        assert!(!key.shape && key.point_cookie && key.point_fast_quality && key.normal_map);
        assert!(!key.volume && !key.additive && !key.sprite);
    }

    #[test]
    fn test_cookie_only_counts_for_point_lights() {
        let light = Light2D {
            kind: LightKind::Sprite,
            cookie: Some(TextureId(1)),
            overlap: OverlapOperation::Additive,
            ..Default::default()
        };
        let key = LightMaterialKey::for_light(&light, true);
        assert!(key.shape && key.sprite && key.additive && key.volume);
        assert!(!key.point_cookie);
    }

    #[test]
    fn test_family_selection() {
        let shaders = LightShaders {
            point: Some(ShaderId(1)),
            shape: Some(ShaderId(2)),
            point_volume: None,
            shape_volume: Some(ShaderId(4)),
        };
        let point_volume = LightMaterialKey { volume: true, ..Default::default() };
        let shape = LightMaterialKey { shape: true, ..Default::default() };
        assert_eq!(shaders.family_for(&point_volume), None);
        assert_eq!(shaders.family_for(&shape), Some(ShaderId(2)));
    }
}
