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

//! Depth and view-space normals for renderers without a G-buffer.

use super::render_targets::{RenderTargetAllocator, TargetKind};
use penumbra_core::math::LinearRgba;
use penumbra_core::renderer::{
    Attachment, CameraData, ClearFlags, CommandEncoder, FramePass, GpuCommand, LoadAction,
    RenderTargetBinding, RenderTargetId, StoreAction,
};

/// Shader pass tag drawn by the prepass.
pub const DEPTH_NORMALS_PASS: &str = "DepthNormals";

/// Renders opaque geometry into a 32-bit depth target and an `Rg16Float`
/// normal target, both single-sampled and point-filtered.
#[derive(Debug, Default)]
pub struct DepthNormalPrepass {
    allocator: RenderTargetAllocator,
}

impl DepthNormalPrepass {
    /// Creates the prepass.
    pub fn new() -> Self {
        Self::default()
    }

    /// The depth target, once set up.
    pub fn depth_target(&self) -> Option<RenderTargetId> {
        self.allocator.get(TargetKind::PrepassDepth)
    }

    /// The normal target, once set up.
    pub fn normal_target(&self) -> Option<RenderTargetId> {
        self.allocator.get(TargetKind::PrepassNormals)
    }
}

impl FramePass for DepthNormalPrepass {
    fn name(&self) -> &'static str {
        "DepthNormalPrepass"
    }

    fn on_camera_setup(&mut self, encoder: &mut dyn CommandEncoder, camera: &CameraData) {
        let normals =
            self.allocator
                .acquire(encoder, TargetKind::PrepassNormals, &camera.target, 1.0);
        let depth = self
            .allocator
            .acquire(encoder, TargetKind::PrepassDepth, &camera.target, 1.0);

        encoder.set_render_target(RenderTargetBinding::with_depth(
            Attachment::new(normals, LoadAction::DontCare, StoreAction::Store),
            Attachment::new(depth, LoadAction::DontCare, StoreAction::Store),
        ));
        encoder.clear_render_target(ClearFlags::ALL, LinearRgba::BLACK);
    }

    fn execute(&mut self, encoder: &mut dyn CommandEncoder, _camera: &CameraData) {
        if self.depth_target().is_none() {
            log::warn!("Depth-normal prepass executed before camera setup");
            return;
        }
        encoder.begin_sample(self.name());
        encoder.record(GpuCommand::DrawRenderers {
            shader_pass: DEPTH_NORMALS_PASS,
        });
        encoder.end_sample(self.name());
    }

    fn on_camera_cleanup(&mut self, encoder: &mut dyn CommandEncoder) {
        self.allocator.release(encoder, TargetKind::PrepassNormals);
        self.allocator.release(encoder, TargetKind::PrepassDepth);
    }
}
