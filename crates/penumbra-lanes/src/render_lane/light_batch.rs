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

//! Splits a frame's visible lights into batches bounded by the shadow pool
//! and records each batch: shadow prerender, light draws, slot release.

use super::material_cache::MaterialVariantCache;
use super::render_targets::RenderTargetAllocator;
use super::shader_globals::{
    self, set_general_light_shader_globals, write_point_light_params, LightLookups,
    PointLightParams,
};
use super::shadow_slots::{
    bind_shadow_texture, disable_shadow_texture, prerender_shadows, ShadowSlot, ShadowSlotPool,
};
use crate::error::LightingError;
use penumbra_core::renderer::{
    Attachment, CameraTargetDescriptor, CommandEncoder, GpuCommand, Light2D, LightKind,
    LightMeshProvider, LoadAction, NormalMapQuality, RenderTargetBinding, RenderTargetId,
    ShadowCasterProvider, StoreAction, TextureRef,
};
use std::ops::Range;

/// A contiguous run of the visible-light list rendered between two shadow
/// pool flushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightBatch {
    /// Indices into the light list.
    pub lights: Range<usize>,
    /// Indices of the lights that need a shadow slot, in slot order.
    pub shadow_casters: Vec<usize>,
}

/// Where the scheduler is within a recording call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPhase {
    /// No recording in progress.
    #[default]
    Idle,
    /// Gathering the next batch.
    Batching,
    /// Rendering occluders into the given slot.
    ShadowRender(usize),
    /// Drawing the batch's lights.
    LightDraw,
    /// Returning the batch's slots to the pool.
    ShadowRelease,
    /// Every light was consumed.
    Done,
}

/// The two light passes. They differ in which shadow settings apply, which
/// lights are drawn and whether a depth attachment is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightPass {
    /// Flat accumulation into a blend-style target.
    Regular,
    /// Volumetric accumulation with depth.
    Volume,
}

impl LightPass {
    /// Returns `true` if `light` needs a shadow slot in this pass.
    pub fn needs_shadow(self, light: &Light2D) -> bool {
        match self {
            LightPass::Regular => light.casts_shadows(),
            LightPass::Volume => light.casts_volume_shadows(),
        }
    }

    fn shadow_intensity(self, light: &Light2D) -> f32 {
        match self {
            LightPass::Regular => light.shadows.intensity,
            LightPass::Volume => light.shadows.volume_intensity,
        }
    }

    fn is_volume(self) -> bool {
        self == LightPass::Volume
    }
}

/// Counters for one recording call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchStats {
    /// Batches recorded.
    pub batches: usize,
    /// Light draws recorded.
    pub draws: usize,
    /// Shadow slots acquired over the call.
    pub slots_acquired: usize,
    /// Shadow slots released over the call.
    pub slots_released: usize,
    /// Largest number of slots held at once.
    pub max_concurrent_slots: usize,
}

/// Everything a recording call reads from or writes to.
pub struct LightFrame<'a> {
    /// Destination of every recorded command.
    pub encoder: &'a mut dyn CommandEncoder,
    /// The camera's target table; shadow slots are allocated from it.
    pub allocator: &'a mut RenderTargetAllocator,
    /// The camera target the shadow slots are sized from.
    pub camera: &'a CameraTargetDescriptor,
    /// Scale applied to shadow slots.
    pub shadow_scale: f32,
    /// Visible lights in render order.
    pub lights: &'a [Light2D],
    /// Light mesh source.
    pub meshes: &'a dyn LightMeshProvider,
    /// Occluder source.
    pub shadow_casters: &'a dyn ShadowCasterProvider,
    /// Shared material variants.
    pub materials: &'a MaterialVariantCache,
    /// Falloff and point-light lookup textures.
    pub lookups: &'a LightLookups,
}

/// Partitions `lights` into batches.
///
/// Lights are admitted in order until the list is consumed or the batch
/// holds `max_shadow_texture_count` shadow casters. The batches form an
/// ordered, non-overlapping cover of the list.
///
/// # Errors
///
/// Returns [`LightingError::InvalidShadowPoolSize`], after logging once,
/// when the pool cannot hold a single shadow.
pub fn plan_batches<F>(
    lights: &[Light2D],
    max_shadow_texture_count: usize,
    needs_shadow: F,
) -> Result<Vec<LightBatch>, LightingError>
where
    F: Fn(&Light2D) -> bool,
{
    if max_shadow_texture_count < 1 {
        log::error!("max shadow texture count cannot be less than 1");
        return Err(LightingError::InvalidShadowPoolSize(
            max_shadow_texture_count,
        ));
    }

    let mut batches = Vec::new();
    let mut start = 0;
    while start < lights.len() {
        let mut end = start;
        let mut shadow_casters = Vec::new();
        while end < lights.len() && shadow_casters.len() < max_shadow_texture_count {
            if needs_shadow(&lights[end]) {
                shadow_casters.push(end);
            }
            end += 1;
        }
        batches.push(LightBatch {
            lights: start..end,
            shadow_casters,
        });
        start = end;
    }
    Ok(batches)
}

/// Records light sets batch by batch against a bounded shadow pool.
#[derive(Debug)]
pub struct LightBatchScheduler {
    pool: ShadowSlotPool,
    phase: BatchPhase,
}

impl LightBatchScheduler {
    /// Creates a scheduler whose pool holds `max_shadow_texture_count` slots.
    pub fn new(max_shadow_texture_count: usize) -> Self {
        Self {
            pool: ShadowSlotPool::new(max_shadow_texture_count),
            phase: BatchPhase::Idle,
        }
    }

    /// The phase reached by the last recording call.
    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    /// The shadow pool size.
    pub fn max_shadow_texture_count(&self) -> usize {
        self.pool.capacity()
    }

    /// Draws every light of `blend_style_index` that lights `layer` into
    /// `target`.
    pub fn render_light_set(
        &mut self,
        frame: &mut LightFrame<'_>,
        blend_style_index: usize,
        layer: i32,
        target: RenderTargetId,
    ) -> Result<BatchStats, LightingError> {
        let binding = RenderTargetBinding::color(Attachment::new(
            target,
            LoadAction::Load,
            StoreAction::Store,
        ));
        self.record(frame, LightPass::Regular, layer, binding, |light| {
            light.blend_style_index == blend_style_index && light.is_lit_layer(layer)
        })
    }

    /// Draws the volumes of lights whose top-most lit layer is `end_layer`,
    /// so a light spanning several layer ranges is drawn exactly once.
    pub fn render_light_volumes(
        &mut self,
        frame: &mut LightFrame<'_>,
        layer: i32,
        end_layer: i32,
        target: RenderTargetId,
        depth: RenderTargetId,
    ) -> Result<BatchStats, LightingError> {
        let binding = RenderTargetBinding::with_depth(
            Attachment::new(target, LoadAction::Load, StoreAction::Store),
            Attachment::new(depth, LoadAction::Load, StoreAction::Store),
        );
        self.record(frame, LightPass::Volume, layer, binding, |light| {
            light.has_volume() && light.top_most_lit_layer() == Some(end_layer)
        })
    }

    fn transition(&mut self, next: BatchPhase) {
        log::trace!("Light batch phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    fn record<F>(
        &mut self,
        frame: &mut LightFrame<'_>,
        pass: LightPass,
        layer: i32,
        binding: RenderTargetBinding,
        draws_light: F,
    ) -> Result<BatchStats, LightingError>
    where
        F: Fn(&Light2D) -> bool,
    {
        self.phase = BatchPhase::Idle;
        let lights = frame.lights;
        let batches = plan_batches(lights, self.pool.capacity(), |light| {
            pass.needs_shadow(light)
        })?;

        let mut stats = BatchStats::default();
        let mut requires_bind = true;
        let mut slots: Vec<(usize, ShadowSlot)> = Vec::with_capacity(self.pool.capacity());

        for batch in &batches {
            self.transition(BatchPhase::Batching);
            slots.clear();

            for &index in &batch.shadow_casters {
                let Some(slot) =
                    self.pool
                        .acquire(frame.encoder, frame.allocator, frame.camera, frame.shadow_scale)
                else {
                    break;
                };
                self.transition(BatchPhase::ShadowRender(slot.index));
                let light = &lights[index];
                prerender_shadows(
                    frame.encoder,
                    slot,
                    light,
                    layer,
                    frame.shadow_casters,
                    pass.shadow_intensity(light),
                );
                slots.push((index, slot));
            }
            stats.slots_acquired += slots.len();
            stats.max_concurrent_slots = stats.max_concurrent_slots.max(self.pool.in_use());

            if !batch.shadow_casters.is_empty() || requires_bind {
                frame.encoder.set_render_target(binding);
                requires_bind = false;
            }

            self.transition(BatchPhase::LightDraw);
            for index in batch.lights.clone() {
                let light = &lights[index];
                if matches!(light.kind, LightKind::Global) || !draws_light(light) {
                    continue;
                }
                let slot = slots.iter().find(|(i, _)| *i == index).map(|(_, s)| *s);
                if draw_light(frame, pass, light, slot) {
                    stats.draws += 1;
                }
            }

            self.transition(BatchPhase::ShadowRelease);
            stats.slots_released += self.pool.release_all(frame.encoder, frame.allocator);
            stats.batches += 1;
        }

        self.transition(BatchPhase::Done);
        Ok(stats)
    }
}

/// Records one light draw. Returns `false`, having recorded nothing, when
/// the light has no material, no mesh or a singular point transform.
fn draw_light(
    frame: &mut LightFrame<'_>,
    pass: LightPass,
    light: &Light2D,
    slot: Option<ShadowSlot>,
) -> bool {
    let Some(material) = frame
        .materials
        .resolve(light, pass.is_volume())
    else {
        log::trace!("Skipping light without a material variant");
        return false;
    };
    let Some(mesh) = frame.meshes.light_mesh(light) else {
        log::trace!("Skipping light without a mesh");
        return false;
    };

    let needs_point_globals =
        light.is_point() || light.normal_map_quality != NormalMapQuality::Disabled;
    let point_params = if needs_point_globals {
        let Some(params) = PointLightParams::from_light(light) else {
            log::trace!("Skipping light with a singular transform");
            return false;
        };
        Some(params)
    } else {
        None
    };
    let transform = match light.kind {
        LightKind::Point(_) => match light.point_light_matrix() {
            Some(matrix) => matrix,
            None => return false,
        },
        _ => light.local_to_world(),
    };

    match slot {
        Some(slot) => bind_shadow_texture(frame.encoder, slot, light),
        None => disable_shadow_texture(frame.encoder),
    }

    if let (LightKind::Sprite, Some(cookie)) = (light.kind, light.cookie) {
        frame
            .encoder
            .set_global_texture(shader_globals::names::COOKIE_TEX, TextureRef::Texture(cookie));
    }

    set_general_light_shader_globals(frame.encoder, light);
    if let Some(params) = &point_params {
        write_point_light_params(frame.encoder, params, light.cookie, frame.lookups);
    }

    frame.encoder.record(GpuCommand::DrawMesh {
        mesh,
        transform,
        material: material.id,
        pass: 0,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use penumbra_core::math::Mat4;
    use penumbra_core::renderer::{
        LightShaders, MeshId, PointLightGeometry, ShaderId, TextureFormat, TextureId,
    };

    fn shadowed() -> Light2D {
        let mut light = Light2D::default();
        light.shadows.enabled = true;
        light.shadows.intensity = 0.5;
        light
    }

    struct Meshes;
    impl LightMeshProvider for Meshes {
        fn light_mesh(&self, _light: &Light2D) -> Option<MeshId> {
            Some(MeshId(1))
        }
    }

    struct Casters;
    impl ShadowCasterProvider for Casters {
        fn shadow_casters(&self, _light: &Light2D, _layer: i32) -> Vec<MeshId> {
            vec![MeshId(100)]
        }
    }

    #[test]
    fn test_plan_respects_pool_size() {
        let lights = vec![shadowed(), Light2D::default(), shadowed(), shadowed()];
        let batches = plan_batches(&lights, 2, Light2D::casts_shadows).expect("valid pool");
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].lights, 0..3);
        assert_eq!(batches[0].shadow_casters, vec![0, 2]);
        assert_eq!(batches[1].lights, 3..4);
        assert_eq!(batches[1].shadow_casters, vec![3]);
    }

    #[test]
    fn test_plan_without_shadows_is_one_batch() {
        let lights = vec![Light2D::default(); 5];
        let batches = plan_batches(&lights, 1, Light2D::casts_shadows).expect("valid pool");
        assert_eq!(batches, vec![LightBatch { lights: 0..5, shadow_casters: vec![] }]);
        assert!(plan_batches(&[], 1, Light2D::casts_shadows).expect("valid pool").is_empty());
    }

    #[test]
    fn test_plan_rejects_empty_pool() {
        assert!(matches!(
            plan_batches(&[Light2D::default()], 0, Light2D::casts_shadows),
            Err(LightingError::InvalidShadowPoolSize(0))
        ));
    }

    #[test]
    fn test_render_light_set_records_in_order() {
        let mut stream = penumbra_core::renderer::CommandStream::new();
        let mut allocator = RenderTargetAllocator::default();
        let camera = CameraTargetDescriptor::new(128, 128, TextureFormat::Rgba8Unorm);
        let materials = MaterialVariantCache::new(LightShaders {
            point: Some(ShaderId(1)),
            shape: Some(ShaderId(2)),
            ..Default::default()
        });
        let lookups = LightLookups {
            falloff: TextureId(1),
            light: TextureId(2),
        };
        let lights = vec![
            shadowed(),
            Light2D::point(PointLightGeometry::default()),
            Light2D {
                blend_style_index: 1,
                ..Default::default()
            },
            shadowed(),
        ];

        let mut scheduler = LightBatchScheduler::new(1);
        let mut frame = LightFrame {
            encoder: &mut stream,
            allocator: &mut allocator,
            camera: &camera,
            shadow_scale: 0.5,
            lights: &lights,
            meshes: &Meshes,
            shadow_casters: &Casters,
            materials: &materials,
            lookups: &lookups,
        };
        let stats = scheduler
            .render_light_set(&mut frame, 0, 0, RenderTargetId(999))
            .expect("valid pool");

        assert_eq!(stats.batches, 2);
        assert_eq!(stats.draws, 3);
        assert_eq!(stats.slots_acquired, 2);
        assert_eq!(stats.slots_released, 2);
        assert_eq!(stats.max_concurrent_slots, 1);
        assert_eq!(scheduler.phase(), BatchPhase::Done);

        let binds = stream
            .iter()
            .filter(|c| matches!(c, GpuCommand::SetRenderTarget(b) if b.color.target == RenderTargetId(999)))
            .count();
        assert_eq!(binds, 2, "one bind per batch with shadow casters");
    }

    #[test]
    fn test_point_globals_are_written_once_per_draw() {
        let mut stream = penumbra_core::renderer::CommandStream::new();
        let mut allocator = RenderTargetAllocator::default();
        let camera = CameraTargetDescriptor::new(64, 64, TextureFormat::Rgba8Unorm);
        let materials = MaterialVariantCache::new(LightShaders {
            point: Some(ShaderId(1)),
            shape: Some(ShaderId(2)),
            ..Default::default()
        });
        let lookups = LightLookups {
            falloff: TextureId(1),
            light: TextureId(2),
        };
        let point = Light2D::point(PointLightGeometry {
            outer_radius: 3.0,
            ..Default::default()
        });
        let normal_mapped = Light2D {
            normal_map_quality: NormalMapQuality::Full,
            ..Default::default()
        };
        let expected = [
            PointLightParams::from_light(&point).expect("invertible"),
            PointLightParams::from_light(&normal_mapped).expect("invertible"),
        ];
        let lights = vec![point, normal_mapped, Light2D::default()];

        let mut scheduler = LightBatchScheduler::new(1);
        let mut frame = LightFrame {
            encoder: &mut stream,
            allocator: &mut allocator,
            camera: &camera,
            shadow_scale: 1.0,
            lights: &lights,
            meshes: &Meshes,
            shadow_casters: &Casters,
            materials: &materials,
            lookups: &lookups,
        };
        let stats = scheduler
            .render_light_set(&mut frame, 0, 0, RenderTargetId(5))
            .expect("valid pool");
        assert_eq!(stats.draws, 3);

        let inverses: Vec<Mat4> = stream
            .iter()
            .filter_map(|c| match c {
                GpuCommand::SetGlobalMatrix { name, value }
                    if *name == shader_globals::names::LIGHT_INV_MATRIX =>
                {
                    Some(*value)
                }
                _ => None,
            })
            .collect();
        assert_eq!(inverses, vec![expected[0].inv_matrix(), expected[1].inv_matrix()]);
    }
}
