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

//! The per-camera lighting lane: blend-style buffers, normals, light volumes.

use super::light_batch::{BatchStats, LightBatchScheduler, LightFrame};
use super::material_cache::MaterialVariantCache;
use super::render_targets::{
    clamp_light_scale, light_render_texture_format, Downsampling, RenderTargetAllocator,
    TargetKind, EMPTY_BLEND_STYLE_TARGET_SIZE,
};
use super::shader_globals::{self, LightLookups};
use crate::config::LightingConfig;
use crate::error::LightingError;
use penumbra_core::math::LinearRgba;
use penumbra_core::renderer::{
    Attachment, CameraTargetDescriptor, ClearFlags, CommandEncoder, FormatCapabilities,
    GpuCommand, Light2D, LightBlendStyle, LightKind, LightMeshProvider, LightProvider,
    LoadAction, RenderTargetBinding, RenderTargetId, ShadowCasterProvider, StoreAction,
    MAX_BLEND_STYLES,
};
use std::sync::Arc;

/// Profiling label of the normal pass.
pub const DRAW_NORMALS_SAMPLE_NAME: &str = "Draw Normals";

/// Shader pass tag drawn into the normal buffer.
pub const NORMALS_RENDERING_PASS: &str = "NormalsRendering";

/// The blend styles touched by one sorting-layer batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerBatch {
    /// Sorting-layer value being lit.
    pub layer: i32,
    /// Bit `i` set when style `i` is used on the layer, global lights included.
    pub blend_styles_used: u32,
    /// Bit `i` set when style `i` has at least one drawable light.
    pub blend_styles_with_lights: u32,
}

impl LayerBatch {
    /// Gathers the blend-style masks of `lights` on `layer`.
    pub fn from_lights(layer: i32, lights: &[Light2D]) -> Self {
        let mut batch = Self {
            layer,
            ..Default::default()
        };
        for light in lights.iter().filter(|l| l.is_lit_layer(layer)) {
            if light.blend_style_index >= MAX_BLEND_STYLES {
                continue;
            }
            let bit = 1u32 << light.blend_style_index;
            batch.blend_styles_used |= bit;
            if !matches!(light.kind, LightKind::Global) {
                batch.blend_styles_with_lights |= bit;
            }
        }
        batch
    }

    /// Returns `true` if style `index` is used.
    pub fn uses(&self, index: usize) -> bool {
        index < MAX_BLEND_STYLES && self.blend_styles_used & (1 << index) != 0
    }

    /// Returns `true` if style `index` has drawable lights.
    pub fn has_lights(&self, index: usize) -> bool {
        index < MAX_BLEND_STYLES && self.blend_styles_with_lights & (1 << index) != 0
    }
}

/// The scene collaborators a lighting call reads.
#[derive(Clone, Copy)]
pub struct LightingScene<'a> {
    /// Visible lights and global colours.
    pub lights: &'a dyn LightProvider,
    /// Light meshes.
    pub meshes: &'a dyn LightMeshProvider,
    /// Occluder geometry.
    pub shadow_casters: &'a dyn ShadowCasterProvider,
}

/// Renders the 2D lighting buffers of one camera.
///
/// Owns the camera's target table, shadow pool and blend-style dirty flags.
/// The material cache, and the shader set it owns, is shared between cameras.
pub struct LightingLane {
    config: LightingConfig,
    blend_styles: Vec<LightBlendStyle>,
    allocator: RenderTargetAllocator,
    scheduler: LightBatchScheduler,
    materials: Arc<MaterialVariantCache>,
    lookups: LightLookups,
}

impl LightingLane {
    /// Creates a lane for one camera.
    ///
    /// `config` is validated first; an unusable shadow pool is rejected here
    /// so later calls never record a partial frame.
    pub fn new(
        mut config: LightingConfig,
        caps: &dyn FormatCapabilities,
        materials: Arc<MaterialVariantCache>,
        lookups: LightLookups,
    ) -> Result<Self, LightingError> {
        config.validate()?;
        let blend_styles = config.blend_styles.clone();
        Ok(Self {
            allocator: RenderTargetAllocator::new(light_render_texture_format(caps)),
            scheduler: LightBatchScheduler::new(config.max_shadow_texture_count),
            blend_styles,
            config,
            materials,
            lookups,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &LightingConfig {
        &self.config
    }

    /// The blend styles with their dirty flags.
    pub fn blend_styles(&self) -> &[LightBlendStyle] {
        &self.blend_styles
    }

    /// The camera's target table.
    pub fn allocator(&self) -> &RenderTargetAllocator {
        &self.allocator
    }

    /// The shared material cache.
    pub fn materials(&self) -> &Arc<MaterialVariantCache> {
        &self.materials
    }

    /// The configured light scale clamped into `[0.01, 1]`.
    pub fn light_render_scale(&self) -> f32 {
        clamp_light_scale(self.config.light_render_texture_scale)
    }

    /// Descriptor of a blend-style buffer.
    fn blend_style_descriptor(
        &self,
        index: usize,
        camera: &CameraTargetDescriptor,
        any_lights: bool,
    ) -> penumbra_core::renderer::RenderTargetDescriptor {
        let descriptor = TargetKind::LightBlendStyle(index).resolve(
            camera,
            self.light_render_scale(),
            self.allocator.light_format(),
        );
        if any_lights {
            descriptor
        } else {
            descriptor.with_size(EMPTY_BLEND_STYLE_TARGET_SIZE, EMPTY_BLEND_STYLE_TARGET_SIZE)
        }
    }

    /// Renders every blend style used by `layer_batch` into its buffer.
    ///
    /// Each buffer is cleared to the layer's global light colour (black when
    /// none) before its lights are drawn. Styles without drawable lights get
    /// a 4x4 buffer and no draws.
    pub fn render_lights(
        &mut self,
        encoder: &mut dyn CommandEncoder,
        camera: &CameraTargetDescriptor,
        scene: LightingScene<'_>,
        layer_batch: &LayerBatch,
    ) -> Result<BatchStats, LightingError> {
        let mut total = BatchStats::default();
        let scale = self.light_render_scale();

        for index in 0..self.blend_styles.len() {
            if !layer_batch.uses(index) {
                continue;
            }
            encoder.begin_sample(&self.blend_styles[index].name);

            let clear_color = scene
                .lights
                .global_color(layer_batch.layer, index)
                .unwrap_or(LinearRgba::BLACK);
            let any_lights = layer_batch.has_lights(index);
            let descriptor = self.blend_style_descriptor(index, camera, any_lights);
            let target = self.allocator.acquire_with(
                encoder,
                TargetKind::LightBlendStyle(index),
                descriptor,
                scale,
            );

            encoder.set_render_target(RenderTargetBinding::color(Attachment::new(
                target,
                LoadAction::DontCare,
                StoreAction::Store,
            )));
            encoder.clear_render_target(ClearFlags::COLOR, clear_color);

            let result = if any_lights {
                let mut frame = LightFrame {
                    encoder: &mut *encoder,
                    allocator: &mut self.allocator,
                    camera,
                    shadow_scale: scale,
                    lights: scene.lights.visible_lights(),
                    meshes: scene.meshes,
                    shadow_casters: scene.shadow_casters,
                    materials: &self.materials,
                    lookups: &self.lookups,
                };
                self.scheduler
                    .render_light_set(&mut frame, index, layer_batch.layer, target)
            } else {
                Ok(BatchStats::default())
            };

            encoder.end_sample(&self.blend_styles[index].name);
            self.blend_styles[index].is_dirty = true;

            let stats = result?;
            total.batches += stats.batches;
            total.draws += stats.draws;
            total.slots_acquired += stats.slots_acquired;
            total.slots_released += stats.slots_released;
            total.max_concurrent_slots = total.max_concurrent_slots.max(stats.max_concurrent_slots);
        }
        Ok(total)
    }

    /// Renders the light volumes whose top-most lit layer is `end_layer`.
    #[allow(clippy::too_many_arguments)]
    pub fn render_light_volumes(
        &mut self,
        encoder: &mut dyn CommandEncoder,
        camera: &CameraTargetDescriptor,
        scene: LightingScene<'_>,
        layer: i32,
        end_layer: i32,
        target: RenderTargetId,
        depth: RenderTargetId,
    ) -> Result<BatchStats, LightingError> {
        let mut frame = LightFrame {
            encoder,
            allocator: &mut self.allocator,
            camera,
            shadow_scale: clamp_light_scale(self.config.light_render_texture_scale),
            lights: scene.lights.visible_lights(),
            meshes: scene.meshes,
            shadow_casters: scene.shadow_casters,
            materials: &self.materials,
            lookups: &self.lookups,
        };
        self.scheduler
            .render_light_volumes(&mut frame, layer, end_layer, target, depth)
    }

    /// Pushes the blend-style uniforms and the falloff lookup.
    pub fn set_shape_light_shader_globals(&self, encoder: &mut dyn CommandEncoder) {
        shader_globals::set_shape_light_shader_globals(
            encoder,
            &self.blend_styles,
            self.lookups.falloff,
        );
    }

    /// Clears the stale buffers of the styles in `blend_styles_used` to black.
    /// Returns the number cleared.
    pub fn clear_dirty_lighting(
        &mut self,
        encoder: &mut dyn CommandEncoder,
        blend_styles_used: u32,
    ) -> usize {
        let mut cleared = 0;
        for (index, style) in self.blend_styles.iter_mut().enumerate() {
            if blend_styles_used & (1 << index) == 0 || !style.is_dirty {
                continue;
            }
            if let Some(target) = self.allocator.get(TargetKind::LightBlendStyle(index)) {
                encoder.set_render_target(RenderTargetBinding::color(Attachment::new(
                    target,
                    LoadAction::Load,
                    StoreAction::Store,
                )));
                encoder.clear_render_target(ClearFlags::COLOR, LinearRgba::BLACK);
                cleared += 1;
            }
            style.is_dirty = false;
        }
        cleared
    }

    /// Returns the normal-map buffer at `scale`, reallocating it only when
    /// the scale changed.
    pub fn create_normal_map_target(
        &mut self,
        encoder: &mut dyn CommandEncoder,
        camera: &CameraTargetDescriptor,
        scale: f32,
    ) -> RenderTargetId {
        self.allocator
            .acquire(encoder, TargetKind::Normals, camera, scale)
    }

    /// Draws sprite normals into the normal buffer.
    ///
    /// With a depth target the buffer is full resolution and depth-tested;
    /// otherwise it follows the light scale.
    pub fn render_normals(
        &mut self,
        encoder: &mut dyn CommandEncoder,
        camera: &CameraTargetDescriptor,
        depth: Option<RenderTargetId>,
    ) -> RenderTargetId {
        encoder.begin_sample(DRAW_NORMALS_SAMPLE_NAME);
        let scale = if depth.is_some() {
            1.0
        } else {
            self.light_render_scale()
        };
        let normals = self.create_normal_map_target(encoder, camera, scale);

        let color = Attachment::new(normals, LoadAction::DontCare, StoreAction::Store);
        let binding = match depth {
            Some(depth) => RenderTargetBinding::with_depth(
                color,
                Attachment::new(depth, LoadAction::Load, StoreAction::DontCare),
            ),
            None => RenderTargetBinding::color(color),
        };
        encoder.set_render_target(binding);
        encoder.clear_render_target(ClearFlags::ALL, LinearRgba::NEUTRAL_NORMAL);
        encoder.record(GpuCommand::DrawRenderers {
            shader_pass: NORMALS_RENDERING_PASS,
        });
        encoder.end_sample(DRAW_NORMALS_SAMPLE_NAME);
        normals
    }

    /// Returns the capture target of the sorting layers rendered so far.
    pub fn create_camera_sorting_layer_target(
        &mut self,
        encoder: &mut dyn CommandEncoder,
        camera: &CameraTargetDescriptor,
        downsampling: Downsampling,
    ) -> RenderTargetId {
        self.allocator.acquire(
            encoder,
            TargetKind::CameraSortingLayer,
            camera,
            downsampling.scale(),
        )
    }

    /// Toggles the sprite-shader keyword of blend style `index`.
    pub fn enable_blend_style(
        &self,
        encoder: &mut dyn CommandEncoder,
        index: usize,
        enabled: bool,
    ) -> Result<(), LightingError> {
        shader_globals::enable_blend_style(encoder, index, enabled)
    }

    /// Releases every target this camera holds. Returns the count.
    pub fn release_all_targets(&mut self, encoder: &mut dyn CommandEncoder) -> usize {
        let released = self.allocator.release_all(encoder);
        log::debug!("Released {released} lighting targets");
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use penumbra_core::renderer::{CommandStream, LightShaders, TextureFormat, TextureUsage};

    struct NoFloatFormats;
    impl FormatCapabilities for NoFloatFormats {
        fn is_format_supported(&self, _format: TextureFormat, _usage: TextureUsage) -> bool {
            false
        }
    }

    fn lane(config: LightingConfig) -> Result<LightingLane, LightingError> {
        LightingLane::new(
            config,
            &NoFloatFormats,
            Arc::new(MaterialVariantCache::new(LightShaders::default())),
            LightLookups {
                falloff: penumbra_core::renderer::TextureId(1),
                light: penumbra_core::renderer::TextureId(2),
            },
        )
    }

    #[test]
    fn test_layer_batch_masks() {
        let lights = vec![
            Light2D {
                blend_style_index: 1,
                ..Default::default()
            },
            Light2D {
                kind: LightKind::Global,
                blend_style_index: 2,
                ..Default::default()
            },
            Light2D {
                blend_style_index: 3,
                lit_layers: vec![5],
                ..Default::default()
            },
        ];
        let batch = LayerBatch::from_lights(0, &lights);
        assert_eq!(batch.blend_styles_used, 0b0110);
        assert_eq!(batch.blend_styles_with_lights, 0b0010);
        assert!(batch.uses(2) && !batch.has_lights(2));
    }

    #[test]
    fn test_new_rejects_empty_shadow_pool() {
        let config = LightingConfig {
            max_shadow_texture_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            lane(config),
            Err(LightingError::InvalidShadowPoolSize(0))
        ));
    }

    #[test]
    fn test_normals_follow_depth_presence() {
        let mut lane = lane(LightingConfig {
            light_render_texture_scale: 0.5,
            ..Default::default()
        })
        .expect("valid config");
        let camera = CameraTargetDescriptor::new(100, 100, TextureFormat::Rgba8Unorm);
        let mut stream = CommandStream::new();

        lane.render_normals(&mut stream, &camera, None);
        assert_eq!(lane.allocator().bound_scale(TargetKind::Normals), Some(0.5));

        lane.render_normals(&mut stream, &camera, Some(RenderTargetId(77)));
        assert_eq!(lane.allocator().bound_scale(TargetKind::Normals), Some(1.0));
        assert!(stream.iter().any(|c| matches!(
            c,
            GpuCommand::DrawRenderers { shader_pass: NORMALS_RENDERING_PASS }
        )));
    }

    #[test]
    fn test_clear_dirty_lighting_resets_flags() {
        let mut lane = lane(LightingConfig::default()).expect("valid config");
        let camera = CameraTargetDescriptor::new(64, 64, TextureFormat::Rgba8Unorm);
        let mut stream = CommandStream::new();
        lane.allocator
            .acquire(&mut stream, TargetKind::LightBlendStyle(0), &camera, 1.0);
        lane.blend_styles[0].is_dirty = true;
        lane.blend_styles[1].is_dirty = true;

        assert_eq!(lane.clear_dirty_lighting(&mut stream, 0b0001), 1);
        assert!(!lane.blend_styles()[0].is_dirty);
        assert!(lane.blend_styles()[1].is_dirty, "unused styles keep their flag");
    }
}
