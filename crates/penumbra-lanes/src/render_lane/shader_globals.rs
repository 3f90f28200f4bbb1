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

//! Pushes per-blend-style and per-light uniforms into the command stream.
//!
//! Nothing here branches on success except the point-light inverse: a light
//! whose radius-scaled transform is singular cannot address its lookup
//! texture and is skipped by the caller.

use crate::error::LightingError;
use penumbra_core::math::{LinearRgba, Mat4, Vec3, Vec4};
use penumbra_core::renderer::{
    CommandEncoder, Light2D, LightBlendStyle, PointLightGeometry, TextureId, TextureRef,
    MAX_BLEND_STYLES,
};

/// Shader property names written by this module.
#[allow(missing_docs)]
pub mod names {
    /// Per-style blend factors.
    pub const SHAPE_LIGHT_BLEND_FACTORS: [&str; 4] = [
        "_ShapeLightBlendFactors0",
        "_ShapeLightBlendFactors1",
        "_ShapeLightBlendFactors2",
        "_ShapeLightBlendFactors3",
    ];
    /// Per-style mask channel selector.
    pub const SHAPE_LIGHT_MASK_FILTER: [&str; 4] = [
        "_ShapeLightMaskFilter0",
        "_ShapeLightMaskFilter1",
        "_ShapeLightMaskFilter2",
        "_ShapeLightMaskFilter3",
    ];
    /// Per-style inverted mask selector.
    pub const SHAPE_LIGHT_INVERTED_FILTER: [&str; 4] = [
        "_ShapeLightInvertedFilter0",
        "_ShapeLightInvertedFilter1",
        "_ShapeLightInvertedFilter2",
        "_ShapeLightInvertedFilter3",
    ];
    /// Keyword enabling each blend style in sprite shaders.
    pub const USE_SHAPE_LIGHT_TYPE: [&str; 4] = [
        "USE_SHAPE_LIGHT_TYPE_0",
        "USE_SHAPE_LIGHT_TYPE_1",
        "USE_SHAPE_LIGHT_TYPE_2",
        "USE_SHAPE_LIGHT_TYPE_3",
    ];

    // Per-light uniforms.
    pub const FALLOFF_LOOKUP: &str = "_FalloffLookup";
    pub const FALLOFF_INTENSITY: &str = "_FalloffIntensity";
    pub const FALLOFF_DISTANCE: &str = "_FalloffDistance";
    pub const LIGHT_COLOR: &str = "_LightColor";
    pub const VOLUME_OPACITY: &str = "_VolumeOpacity";
    pub const COOKIE_TEX: &str = "_CookieTex";
    pub const LIGHT_POSITION: &str = "_LightPosition";
    pub const LIGHT_INV_MATRIX: &str = "_LightInvMatrix";
    pub const INNER_RADIUS_MULT: &str = "_InnerRadiusMult";
    pub const OUTER_ANGLE: &str = "_OuterAngle";
    pub const INNER_ANGLE_MULT: &str = "_InnerAngleMult";
    pub const LIGHT_LOOKUP: &str = "_LightLookup";
    pub const IS_FULL_SPOTLIGHT: &str = "_IsFullSpotlight";
    pub const LIGHT_Z_DISTANCE: &str = "_LightZDistance";
    pub const POINT_LIGHT_COOKIE_TEX: &str = "_PointLightCookieTex";
}

/// Lookup textures shared by every light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightLookups {
    /// Falloff curve lookup.
    pub falloff: TextureId,
    /// Point-light angle/radius lookup.
    pub light: TextureId,
}

/// `inner_radius / outer_radius`.
#[inline]
pub fn normalized_inner_radius(geometry: &PointLightGeometry) -> f32 {
    geometry.inner_radius / geometry.outer_radius
}

/// Maps an angle in degrees onto `[0, 1]` for angles in `[0, 360]`.
#[inline]
pub fn normalized_angle(degrees: f32) -> f32 {
    degrees / 360.0
}

/// `intensity * color.a * color`, with alpha forced to 1.
pub fn general_light_color(light: &Light2D) -> LinearRgba {
    let intensity = light.intensity * light.color.a;
    (light.color * intensity).with_alpha(1.0)
}

/// The uniform block of a point-light draw.
///
/// Non-point lights drawn with normal mapping use the default point geometry.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct PointLightParams {
    /// Inverse of `TRS(position, rotation, outer_radius)`.
    pub inv_matrix: [[f32; 4]; 4],
    /// World position, `w = 0`.
    pub position: [f32; 4],
    /// `1 / (1 - inner / outer)`.
    pub inner_radius_mult: f32,
    /// `outer_angle / 360`.
    pub outer_angle: f32,
    /// `1 / (outer - inner)` on normalized angles.
    pub inner_angle_mult: f32,
    /// 1 when the normalized inner angle is exactly 1.
    pub is_full_spotlight: f32,
    /// Falloff curve strength.
    pub falloff_intensity: f32,
    /// Height above the sprite plane for normal mapping.
    pub light_z_distance: f32,
    _padding: [f32; 2],
}

impl PointLightParams {
    /// Computes the block for `light`, or `None` when its scaled transform
    /// cannot be inverted.
    pub fn from_light(light: &Light2D) -> Option<Self> {
        let geometry = light.point_geometry().copied().unwrap_or_default();
        let t = &light.transform;
        let scaled = Mat4::from_trs(t.position, t.rotation, Vec3::splat(geometry.outer_radius));
        let inverse = scaled.inverse()?;

        let inner_radius = normalized_inner_radius(&geometry);
        let inner_angle = normalized_angle(geometry.inner_angle);
        let outer_angle = normalized_angle(geometry.outer_angle);

        Some(Self {
            inv_matrix: inverse.to_cols_array_2d(),
            position: [t.position.x, t.position.y, t.position.z, 0.0],
            inner_radius_mult: 1.0 / (1.0 - inner_radius),
            outer_angle,
            inner_angle_mult: 1.0 / (outer_angle - inner_angle),
            is_full_spotlight: if inner_angle == 1.0 { 1.0 } else { 0.0 },
            falloff_intensity: light.falloff_intensity,
            light_z_distance: light.normal_map_distance,
            _padding: [0.0; 2],
        })
    }

    /// The inverse matrix as a `Mat4`.
    pub fn inv_matrix(&self) -> Mat4 {
        let [c0, c1, c2, c3] = self.inv_matrix.map(|c| Vec4::new(c[0], c[1], c[2], c[3]));
        Mat4::from_cols(c0, c1, c2, c3)
    }
}

/// Pushes blend factors and mask filters for the first four styles, then the
/// falloff lookup.
pub fn set_shape_light_shader_globals(
    encoder: &mut dyn CommandEncoder,
    blend_styles: &[LightBlendStyle],
    falloff_lookup: TextureId,
) {
    for (i, style) in blend_styles.iter().take(MAX_BLEND_STYLES).enumerate() {
        encoder.set_global_vector(
            names::SHAPE_LIGHT_BLEND_FACTORS[i],
            style.blend_factors.to_vec4(),
        );
        encoder.set_global_vector(names::SHAPE_LIGHT_MASK_FILTER[i], style.mask_filter.mask());
        encoder.set_global_vector(
            names::SHAPE_LIGHT_INVERTED_FILTER[i],
            style.mask_filter.inverted(),
        );
    }
    encoder.set_global_texture(names::FALLOFF_LOOKUP, TextureRef::Texture(falloff_lookup));
}

/// Pushes falloff, colour and volume opacity for any light.
pub fn set_general_light_shader_globals(encoder: &mut dyn CommandEncoder, light: &Light2D) {
    encoder.set_global_float(names::FALLOFF_INTENSITY, light.falloff_intensity);
    encoder.set_global_float(names::FALLOFF_DISTANCE, light.falloff_distance);
    encoder.set_global_color(names::LIGHT_COLOR, general_light_color(light));
    encoder.set_global_float(names::VOLUME_OPACITY, light.volume.intensity);
}

/// Pushes the point-light block, plus the cookie if any.
///
/// Callers compute `params` first and skip the light when its transform is
/// singular, so nothing is recorded for a light that cannot be drawn.
pub fn write_point_light_params(
    encoder: &mut dyn CommandEncoder,
    params: &PointLightParams,
    cookie: Option<TextureId>,
    lookups: &LightLookups,
) {
    let [x, y, z, w] = params.position;
    encoder.set_global_vector(names::LIGHT_POSITION, Vec4::new(x, y, z, w));
    encoder.set_global_matrix(names::LIGHT_INV_MATRIX, params.inv_matrix());
    encoder.set_global_float(names::INNER_RADIUS_MULT, params.inner_radius_mult);
    encoder.set_global_float(names::OUTER_ANGLE, params.outer_angle);
    encoder.set_global_float(names::INNER_ANGLE_MULT, params.inner_angle_mult);
    encoder.set_global_texture(names::LIGHT_LOOKUP, TextureRef::Texture(lookups.light));
    encoder.set_global_texture(names::FALLOFF_LOOKUP, TextureRef::Texture(lookups.falloff));
    encoder.set_global_float(names::FALLOFF_INTENSITY, params.falloff_intensity);
    encoder.set_global_float(names::IS_FULL_SPOTLIGHT, params.is_full_spotlight);
    encoder.set_global_float(names::LIGHT_Z_DISTANCE, params.light_z_distance);

    if let Some(cookie) = cookie {
        encoder.set_global_texture(names::POINT_LIGHT_COOKIE_TEX, TextureRef::Texture(cookie));
    }
}

/// Toggles the sprite-shader keyword of blend style `index`.
pub fn enable_blend_style(
    encoder: &mut dyn CommandEncoder,
    index: usize,
    enabled: bool,
) -> Result<(), LightingError> {
    let keyword = names::USE_SHAPE_LIGHT_TYPE
        .get(index)
        .ok_or(LightingError::BlendStyleOutOfRange {
            index,
            limit: MAX_BLEND_STYLES,
        })?;
    encoder.set_global_keyword(keyword, enabled);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use penumbra_core::renderer::{CommandStream, GpuCommand, LightTransform};

    fn lookups() -> LightLookups {
        LightLookups {
            falloff: TextureId(1),
            light: TextureId(2),
        }
    }

    #[test]
    fn test_general_color_premultiplies_alpha() {
        let light = Light2D {
            intensity: 2.0,
            color: LinearRgba::new(0.5, 1.0, 0.25, 0.5),
            ..Default::default()
        };
        let color = general_light_color(&light);
        assert_relative_eq!(color.r, 0.5);
        assert_relative_eq!(color.g, 1.0);
        assert_relative_eq!(color.b, 0.25);
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn test_point_params_normalization() {
        let mut light = Light2D::point(PointLightGeometry {
            inner_radius: 1.0,
            outer_radius: 4.0,
            inner_angle: 90.0,
            outer_angle: 180.0,
        });
        light.transform = LightTransform::from_position(Vec3::new(2.0, 3.0, 0.0));
        let params = PointLightParams::from_light(&light).expect("invertible");

        assert_relative_eq!(params.inner_radius_mult, 1.0 / 0.75);
        assert_relative_eq!(params.outer_angle, 0.5);
        assert_relative_eq!(params.inner_angle_mult, 4.0);
        assert_eq!(params.is_full_spotlight, 0.0);

        let local = params.inv_matrix().transform_point(Vec3::new(6.0, 3.0, 0.0));
        assert_relative_eq!(local.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(local.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_full_spotlight_flag() {
        let light = Light2D::point(PointLightGeometry::default());
        let params = PointLightParams::from_light(&light).expect("invertible");
        assert_eq!(params.is_full_spotlight, 1.0);
    }

    #[test]
    fn test_zero_radius_is_skipped() {
        let light = Light2D::point(PointLightGeometry {
            outer_radius: 0.0,
            ..Default::default()
        });
        assert!(PointLightParams::from_light(&light).is_none());
    }

    #[test]
    fn test_cookie_is_bound_when_present() {
        let light = Light2D {
            cookie: Some(TextureId(9)),
            ..Light2D::point(PointLightGeometry::default())
        };
        let params = PointLightParams::from_light(&light).expect("invertible");
        let mut stream = CommandStream::new();
        write_point_light_params(&mut stream, &params, light.cookie, &lookups());
        assert!(stream.iter().any(|c| matches!(
            c,
            GpuCommand::SetGlobalTexture { name: names::POINT_LIGHT_COOKIE_TEX, texture: TextureRef::Texture(TextureId(9)) }
        )));
    }

    #[test]
    fn test_shape_globals_cover_at_most_four_styles() {
        let mut styles = LightBlendStyle::defaults();
        styles.push(styles[0].clone());
        let mut stream = CommandStream::new();
        set_shape_light_shader_globals(&mut stream, &styles, TextureId(5));
        assert_eq!(stream.len(), MAX_BLEND_STYLES * 3 + 1);
    }

    #[test]
    fn test_enable_blend_style_range() {
        let mut stream = CommandStream::new();
        assert!(enable_blend_style(&mut stream, 3, true).is_ok());
        assert!(matches!(
            enable_blend_style(&mut stream, 4, true),
            Err(LightingError::BlendStyleOutOfRange { index: 4, .. })
        ));
        assert_eq!(stream.len(), 1);
    }

    #[test]
    fn test_params_are_plain_old_data() {
        assert_eq!(std::mem::size_of::<PointLightParams>(), 112);
        let params = PointLightParams::from_light(&Light2D::default()).expect("default shape light");
        assert_eq!(bytemuck::bytes_of(&params).len(), 112);
    }
}
