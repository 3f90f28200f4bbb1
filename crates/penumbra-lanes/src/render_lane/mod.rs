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

//! Lanes that record the 2D lighting frame.
//!
//! - **[`render_targets`]**: per-camera target allocation and the format selection.
//! - **[`light_batch`]**: shadow-bounded light batching.
//! - **[`shadow_slots`]**: the shadow scratch pool.
//! - **[`material_cache`]**: shared light material variants.
//! - **[`shader_globals`]**: blend-style and per-light uniforms.
//! - **[`lighting_lane`]**: the per-camera entry points.
//! - **[`ssao_lane`]** and **[`depth_normal_lane`]**: frame passes.

pub mod depth_normal_lane;
pub mod light_batch;
pub mod lighting_lane;
pub mod material_cache;
pub mod render_targets;
pub mod shader_globals;
pub mod shadow_slots;
pub mod ssao_lane;

pub use self::depth_normal_lane::DepthNormalPrepass;
pub use self::light_batch::{
    plan_batches, BatchPhase, BatchStats, LightBatch, LightBatchScheduler, LightFrame, LightPass,
};
pub use self::lighting_lane::{LayerBatch, LightingLane, LightingScene};
pub use self::material_cache::MaterialVariantCache;
pub use self::render_targets::{
    clamp_light_scale, light_render_texture_format, select_light_format, Downsampling,
    RenderTargetAllocator, TargetKind,
};
pub use self::shader_globals::{LightLookups, PointLightParams};
pub use self::shadow_slots::{ShadowSlot, ShadowSlotPool};
pub use self::ssao_lane::{
    DepthSource, EyeReconstruction, NormalQuality, SsaoPass, SsaoPassEvent, SsaoPassInput,
    SsaoSettings,
};
