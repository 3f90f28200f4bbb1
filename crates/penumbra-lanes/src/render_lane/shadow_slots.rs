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

//! The bounded pool of shadow scratch targets used within one batch.

use super::render_targets::{RenderTargetAllocator, TargetKind};
use penumbra_core::math::LinearRgba;
use penumbra_core::renderer::{
    Attachment, CameraTargetDescriptor, ClearFlags, CommandEncoder, GpuCommand, Light2D,
    LoadAction, RenderTargetBinding, RenderTargetId, ShadowCasterProvider, StoreAction,
    TextureRef,
};

/// Shader property names written by the shadow pool.
pub mod names {
    /// The shadow texture sampled by the light shader.
    pub const SHADOW_TEX: &str = "_ShadowTex";
    /// `1 - shadow intensity` for the regular pass; 1 disables shadows.
    pub const SHADOW_INTENSITY: &str = "_ShadowIntensity";
    /// `1 - shadow intensity` for the volumetric pass; 1 disables shadows.
    pub const SHADOW_VOLUME_INTENSITY: &str = "_ShadowVolumeIntensity";
}

/// One acquired slot of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowSlot {
    /// Position in the pool, in acquisition order.
    pub index: usize,
    /// The scratch target backing the slot.
    pub target: RenderTargetId,
}

/// A bounded stack of shadow targets.
///
/// Slots are acquired in order and released in reverse order at the end of
/// each batch. At most `capacity` slots are ever held at once.
#[derive(Debug)]
pub struct ShadowSlotPool {
    capacity: usize,
    acquired: Vec<ShadowSlot>,
}

impl ShadowSlotPool {
    /// Creates an empty pool of `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            acquired: Vec::with_capacity(capacity),
        }
    }

    /// The maximum number of concurrently held slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held.
    pub fn in_use(&self) -> usize {
        self.acquired.len()
    }

    /// Returns `true` once every slot is held.
    pub fn is_exhausted(&self) -> bool {
        self.acquired.len() >= self.capacity
    }

    /// Acquires the next slot, allocating its target. `None` when exhausted.
    pub fn acquire(
        &mut self,
        encoder: &mut dyn CommandEncoder,
        allocator: &mut RenderTargetAllocator,
        camera: &CameraTargetDescriptor,
        scale: f32,
    ) -> Option<ShadowSlot> {
        if self.is_exhausted() {
            return None;
        }
        let index = self.acquired.len();
        let target = allocator.acquire(encoder, TargetKind::Shadow(index), camera, scale);
        let slot = ShadowSlot { index, target };
        self.acquired.push(slot);
        Some(slot)
    }

    /// Releases every held slot, last acquired first. Returns the count.
    pub fn release_all(
        &mut self,
        encoder: &mut dyn CommandEncoder,
        allocator: &mut RenderTargetAllocator,
    ) -> usize {
        let released = self.acquired.len();
        while let Some(slot) = self.acquired.pop() {
            allocator.release(encoder, TargetKind::Shadow(slot.index));
        }
        released
    }
}

/// Renders the occluders of `light` on `layer` into `slot`.
pub fn prerender_shadows(
    encoder: &mut dyn CommandEncoder,
    slot: ShadowSlot,
    light: &Light2D,
    layer: i32,
    casters: &dyn ShadowCasterProvider,
    intensity: f32,
) {
    encoder.set_render_target(RenderTargetBinding::color(Attachment::new(
        slot.target,
        LoadAction::DontCare,
        StoreAction::Store,
    )));
    encoder.clear_render_target(ClearFlags::COLOR, LinearRgba::BLACK);
    encoder.record(GpuCommand::DrawShadowCasters {
        target: slot.target,
        casters: casters.shadow_casters(light, layer),
        intensity,
    });
}

/// Points the light shader at `slot` with the light's shadow strengths.
pub fn bind_shadow_texture(encoder: &mut dyn CommandEncoder, slot: ShadowSlot, light: &Light2D) {
    encoder.set_global_texture(names::SHADOW_TEX, TextureRef::Target(slot.target));
    encoder.set_global_float(names::SHADOW_INTENSITY, 1.0 - light.shadows.intensity);
    encoder.set_global_float(
        names::SHADOW_VOLUME_INTENSITY,
        1.0 - light.shadows.volume_intensity,
    );
}

/// Turns shadow sampling off for the next draw.
pub fn disable_shadow_texture(encoder: &mut dyn CommandEncoder) {
    encoder.set_global_float(names::SHADOW_INTENSITY, 1.0);
    encoder.set_global_float(names::SHADOW_VOLUME_INTENSITY, 1.0);
}
