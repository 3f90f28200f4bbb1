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

//! Defines the 2D light data model consumed by the lighting lanes.
//!
//! Lights are owned by the scene and are read-only to the engine. The only
//! per-light geometry the engine needs lives on the `Point` variant; shape,
//! sprite and global lights draw a mesh supplied by the mesh provider.

use crate::math::{Mat4, Quaternion, Vec3, LinearRgba};
use crate::renderer::api::texture::TextureId;

/// The radial and angular extent of a point light.
///
/// Angles are in degrees, in `[0, 360]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightGeometry {
    /// Radius inside which the light is at full intensity.
    pub inner_radius: f32,
    /// Radius at which the light reaches zero.
    pub outer_radius: f32,
    /// Full-intensity cone angle.
    pub inner_angle: f32,
    /// Total cone angle.
    pub outer_angle: f32,
}

impl Default for PointLightGeometry {
    fn default() -> Self {
        Self {
            inner_radius: 0.0,
            outer_radius: 1.0,
            inner_angle: 360.0,
            outer_angle: 360.0,
        }
    }
}

/// The kind of a 2D light, carrying only the data that kind needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// A radial light with optional spot cone.
    Point(PointLightGeometry),
    /// A freeform or parametric shape light.
    Shape,
    /// A light shaped by a sprite.
    Sprite,
    /// A light that tints the whole layer. Never drawn as a mesh.
    Global,
}

/// How a light combines with lights already in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapOperation {
    /// `SrcAlpha / OneMinusSrcAlpha`.
    #[default]
    AlphaBlend,
    /// `One / One`.
    Additive,
}

/// Shadow casting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShadowSettings {
    /// Casts shadows in the regular pass.
    pub enabled: bool,
    /// Shadow strength in the regular pass.
    pub intensity: f32,
    /// Casts shadows in the volumetric pass.
    pub volume_enabled: bool,
    /// Shadow strength in the volumetric pass.
    pub volume_intensity: f32,
}

/// Normal-map sampling quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalMapQuality {
    /// No normal mapping.
    #[default]
    Disabled,
    /// Cheaper approximation.
    Fast,
    /// Full per-pixel lighting direction.
    Full,
}

/// Volumetric rendering parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VolumeSettings {
    /// The light draws into the volume buffer.
    pub enabled: bool,
    /// Opacity of the volume.
    pub intensity: f32,
}

/// World transform of a light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightTransform {
    /// World position.
    pub position: Vec3,
    /// World rotation.
    pub rotation: Quaternion,
    /// World scale.
    pub scale: Vec3,
}

impl Default for LightTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quaternion::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl LightTransform {
    /// Creates an unrotated, unscaled transform at `position`.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

/// A 2D light as seen by the lighting engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Light2D {
    /// Kind and kind-specific geometry.
    pub kind: LightKind,
    /// Index of the blend style this light accumulates into.
    pub blend_style_index: usize,
    /// Intensity multiplier.
    pub intensity: f32,
    /// Light colour; alpha scales intensity.
    pub color: LinearRgba,
    /// Falloff curve strength.
    pub falloff_intensity: f32,
    /// Falloff size for shape lights.
    pub falloff_distance: f32,
    /// Blending against overlapping lights.
    pub overlap: OverlapOperation,
    /// Shadow parameters.
    pub shadows: ShadowSettings,
    /// Normal-map quality.
    pub normal_map_quality: NormalMapQuality,
    /// Distance of the light above the sprite plane for normal mapping.
    pub normal_map_distance: f32,
    /// Optional cookie texture.
    pub cookie: Option<TextureId>,
    /// World transform.
    pub transform: LightTransform,
    /// Sorting-layer values this light affects.
    pub lit_layers: Vec<i32>,
    /// Volumetric parameters.
    pub volume: VolumeSettings,
}

impl Default for Light2D {
    fn default() -> Self {
        Self {
            kind: LightKind::Shape,
            blend_style_index: 0,
            intensity: 1.0,
            color: LinearRgba::WHITE,
            falloff_intensity: 0.5,
            falloff_distance: 0.5,
            overlap: OverlapOperation::AlphaBlend,
            shadows: ShadowSettings::default(),
            normal_map_quality: NormalMapQuality::Disabled,
            normal_map_distance: 3.0,
            cookie: None,
            transform: LightTransform::default(),
            lit_layers: vec![0],
            volume: VolumeSettings::default(),
        }
    }
}

impl Light2D {
    /// Creates a point light with default settings.
    pub fn point(geometry: PointLightGeometry) -> Self {
        Self {
            kind: LightKind::Point(geometry),
            ..Default::default()
        }
    }

    /// Returns `true` for point lights.
    #[inline]
    pub fn is_point(&self) -> bool {
        matches!(self.kind, LightKind::Point(_))
    }

    /// Returns the point geometry, if this is a point light.
    #[inline]
    pub fn point_geometry(&self) -> Option<&PointLightGeometry> {
        match &self.kind {
            LightKind::Point(geometry) => Some(geometry),
            _ => None,
        }
    }

    /// Needs a shadow slot in the regular pass.
    #[inline]
    pub fn casts_shadows(&self) -> bool {
        self.shadows.enabled && self.shadows.intensity > 0.0
    }

    /// Needs a shadow slot in the volumetric pass.
    #[inline]
    pub fn casts_volume_shadows(&self) -> bool {
        self.shadows.volume_enabled && self.shadows.volume_intensity > 0.0
    }

    /// Contributes to the volume buffer.
    #[inline]
    pub fn has_volume(&self) -> bool {
        self.volume.enabled && self.volume.intensity > 0.0
    }

    /// Returns `true` if the light affects the sorting layer `layer`.
    pub fn is_lit_layer(&self, layer: i32) -> bool {
        self.lit_layers.contains(&layer)
    }

    /// The highest sorting-layer value this light affects, or `None` when it
    /// lights nothing.
    pub fn top_most_lit_layer(&self) -> Option<i32> {
        self.lit_layers.iter().copied().max()
    }

    /// The raw local-to-world matrix, used by shape and sprite lights.
    pub fn local_to_world(&self) -> Mat4 {
        let t = &self.transform;
        Mat4::from_trs(t.position, t.rotation, t.scale)
    }

    /// Position and rotation scaled uniformly by the outer radius, used to
    /// draw point lights and address their lookup texture.
    ///
    /// Returns `None` for non-point lights.
    pub fn point_light_matrix(&self) -> Option<Mat4> {
        let geometry = self.point_geometry()?;
        let t = &self.transform;
        Some(Mat4::from_trs(
            t.position,
            t.rotation,
            Vec3::splat(geometry.outer_radius),
        ))
    }
}
