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

//! Per-camera render-target allocation.
//!
//! Each camera owns a [`RenderTargetAllocator`]: a small table of named slots,
//! each either unbound or bound to a target with the scale and descriptor it
//! was created with. Acquiring a slot again with the same scale and
//! descriptor records nothing and returns the same handle.

use penumbra_core::renderer::{
    CameraTargetDescriptor, CommandEncoder, FilterMode, FormatCapabilities, GpuCommand,
    RenderTargetDescriptor, RenderTargetId, TextureFormat, TextureUsage,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Lower bound of the light render-texture scale.
pub const MIN_LIGHT_RENDER_SCALE: f32 = 0.01;

/// Side of the placeholder target given to a blend style with no lights.
pub const EMPTY_BLEND_STYLE_TARGET_SIZE: u32 = 4;

static NEXT_TARGET_ID: AtomicUsize = AtomicUsize::new(1);
static LIGHT_TARGET_FORMAT: OnceLock<TextureFormat> = OnceLock::new();

fn next_target_id() -> RenderTargetId {
    RenderTargetId(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed))
}

/// Picks the lighting buffer format: the packed float format if the device can
/// filter and render to it, else half floats, else 8-bit UNorm.
pub fn select_light_format(caps: &dyn FormatCapabilities) -> TextureFormat {
    let usage = TextureUsage::LINEAR | TextureUsage::RENDER;
    [TextureFormat::B10G11R11Ufloat, TextureFormat::Rgba16Float]
        .into_iter()
        .find(|format| caps.is_format_supported(*format, usage))
        .unwrap_or(TextureFormat::Rgba8Unorm)
}

/// The process-wide lighting buffer format, selected on first use.
///
/// Later calls return the cached value without consulting `caps`.
pub fn light_render_texture_format(caps: &dyn FormatCapabilities) -> TextureFormat {
    *LIGHT_TARGET_FORMAT.get_or_init(|| {
        let format = select_light_format(caps);
        log::debug!("Light render texture format resolved to {format:?}");
        format
    })
}

/// Clamps the configured light scale into `[0.01, 1]`.
pub fn clamp_light_scale(scale: f32) -> f32 {
    scale.clamp(MIN_LIGHT_RENDER_SCALE, 1.0)
}

/// Downsampling presets for the camera-sorting-layer capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Downsampling {
    /// Full resolution.
    None,
    /// Half resolution, bilinear.
    #[default]
    X2Bilinear,
    /// Quarter resolution, box filtered.
    X4Box,
    /// Quarter resolution, bilinear.
    X4Bilinear,
}

impl Downsampling {
    /// The resolution scale of the preset.
    pub fn scale(&self) -> f32 {
        match self {
            Downsampling::None => 1.0,
            Downsampling::X2Bilinear => 0.5,
            Downsampling::X4Box | Downsampling::X4Bilinear => 0.25,
        }
    }
}

/// The named slots a camera can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Normal-map buffer.
    Normals,
    /// Light accumulation buffer of one blend style.
    LightBlendStyle(usize),
    /// Capture of the sorting layers rendered so far.
    CameraSortingLayer,
    /// Shadow scratch target of one slot.
    Shadow(usize),
    /// SSAO intermediate `1..=3`.
    SsaoOcclusion(u8),
    /// Depth of the depth-normal prepass.
    PrepassDepth,
    /// Normals of the depth-normal prepass.
    PrepassNormals,
}

impl TargetKind {
    /// Resolves the descriptor this kind uses at `scale`.
    ///
    /// `light_format` is the selected lighting format; kinds with a fixed format
    /// ignore it.
    pub fn resolve(
        &self,
        base: &CameraTargetDescriptor,
        scale: f32,
        light_format: TextureFormat,
    ) -> RenderTargetDescriptor {
        let scaled = RenderTargetDescriptor::scaled(base, scale);
        match self {
            TargetKind::Normals => scaled.with_format(light_format),
            TargetKind::LightBlendStyle(_) | TargetKind::Shadow(_) => {
                scaled.with_format(light_format).with_msaa(1)
            }
            TargetKind::CameraSortingLayer => scaled.with_msaa(1),
            TargetKind::SsaoOcclusion(_) => scaled.with_format(TextureFormat::Rgba8Unorm).with_msaa(1),
            TargetKind::PrepassDepth => scaled
                .with_format(TextureFormat::Depth32Float)
                .with_depth_bits(32)
                .with_msaa(1)
                .with_filter(FilterMode::Point),
            TargetKind::PrepassNormals => scaled
                .with_format(TextureFormat::Rg16Float)
                .with_msaa(1)
                .with_filter(FilterMode::Point),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SlotState {
    Unbound,
    Bound {
        id: RenderTargetId,
        scale: f32,
        descriptor: RenderTargetDescriptor,
    },
}

#[derive(Debug, Clone, Copy)]
struct TargetSlot {
    kind: TargetKind,
    state: SlotState,
}

/// Creates, reuses and releases the off-screen targets of one camera.
#[derive(Debug)]
pub struct RenderTargetAllocator {
    light_format: TextureFormat,
    slots: Vec<TargetSlot>,
}

impl Default for RenderTargetAllocator {
    fn default() -> Self {
        Self::new(TextureFormat::Rgba8Unorm)
    }
}

impl RenderTargetAllocator {
    /// Creates an empty table resolving lighting targets to `light_format`.
    pub fn new(light_format: TextureFormat) -> Self {
        Self {
            light_format,
            slots: Vec::new(),
        }
    }

    /// The format lighting targets are created with.
    pub fn light_format(&self) -> TextureFormat {
        self.light_format
    }

    /// Returns the target bound to `kind`, allocating it when unbound or when
    /// `scale` or the resolved descriptor changed since the last call.
    pub fn acquire(
        &mut self,
        encoder: &mut dyn CommandEncoder,
        kind: TargetKind,
        base: &CameraTargetDescriptor,
        scale: f32,
    ) -> RenderTargetId {
        let descriptor = kind.resolve(base, scale, self.light_format);
        self.acquire_with(encoder, kind, descriptor, scale)
    }

    /// Like [`acquire`](Self::acquire) with an explicit descriptor.
    pub fn acquire_with(
        &mut self,
        encoder: &mut dyn CommandEncoder,
        kind: TargetKind,
        descriptor: RenderTargetDescriptor,
        scale: f32,
    ) -> RenderTargetId {
        let index = self.slot_index(kind);
        let slot = &mut self.slots[index];

        if let SlotState::Bound {
            id,
            scale: bound_scale,
            descriptor: bound,
        } = slot.state
        {
            if bound_scale == scale && bound == descriptor {
                return id;
            }
            log::debug!("Reallocating {kind:?}: scale {bound_scale} -> {scale}");
            encoder.record(GpuCommand::ReleaseTarget { id });
        }

        let id = next_target_id();
        encoder.record(GpuCommand::AllocateTarget { id, descriptor });
        log::debug!(
            "Allocated {kind:?} as {id:?} ({}x{} {:?})",
            descriptor.width,
            descriptor.height,
            descriptor.format
        );
        slot.state = SlotState::Bound {
            id,
            scale,
            descriptor,
        };
        id
    }

    /// Releases the target bound to `kind`. Returns `false` if it was unbound.
    pub fn release(&mut self, encoder: &mut dyn CommandEncoder, kind: TargetKind) -> bool {
        let Some(slot) = self.slots.iter_mut().find(|s| s.kind == kind) else {
            return false;
        };
        match slot.state {
            SlotState::Bound { id, .. } => {
                encoder.record(GpuCommand::ReleaseTarget { id });
                slot.state = SlotState::Unbound;
                true
            }
            SlotState::Unbound => false,
        }
    }

    /// Releases every bound target in slot creation order. Returns the count.
    pub fn release_all(&mut self, encoder: &mut dyn CommandEncoder) -> usize {
        let mut released = 0;
        for slot in &mut self.slots {
            if let SlotState::Bound { id, .. } = slot.state {
                encoder.record(GpuCommand::ReleaseTarget { id });
                slot.state = SlotState::Unbound;
                released += 1;
            }
        }
        released
    }

    /// The handle bound to `kind`, if any.
    pub fn get(&self, kind: TargetKind) -> Option<RenderTargetId> {
        self.bound(kind).map(|(id, _, _)| id)
    }

    /// The scale `kind` was last allocated at, if bound.
    pub fn bound_scale(&self, kind: TargetKind) -> Option<f32> {
        self.bound(kind).map(|(_, scale, _)| scale)
    }

    /// The descriptor `kind` was last allocated with, if bound.
    pub fn bound_descriptor(&self, kind: TargetKind) -> Option<RenderTargetDescriptor> {
        self.bound(kind).map(|(_, _, descriptor)| descriptor)
    }

    /// Returns `true` if `kind` currently holds a target.
    pub fn is_bound(&self, kind: TargetKind) -> bool {
        self.bound(kind).is_some()
    }

    fn bound(&self, kind: TargetKind) -> Option<(RenderTargetId, f32, RenderTargetDescriptor)> {
        self.slots
            .iter()
            .find(|s| s.kind == kind)
            .and_then(|s| match s.state {
                SlotState::Bound {
                    id,
                    scale,
                    descriptor,
                } => Some((id, scale, descriptor)),
                SlotState::Unbound => None,
            })
    }

    fn slot_index(&mut self, kind: TargetKind) -> usize {
        match self.slots.iter().position(|s| s.kind == kind) {
            Some(index) => index,
            None => {
                self.slots.push(TargetSlot {
                    kind,
                    state: SlotState::Unbound,
                });
                self.slots.len() - 1
            }
        }
    }
}
