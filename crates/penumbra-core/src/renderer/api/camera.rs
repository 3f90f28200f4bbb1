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

//! Per-camera data handed to frame passes.

use crate::math::Mat4;
use crate::renderer::api::texture::{CameraTargetDescriptor, RenderTargetId};

/// View and projection of one eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeMatrices {
    /// World-to-view.
    pub view: Mat4,
    /// View-to-clip, with a [-1, 1] depth range.
    pub projection: Mat4,
}

/// How the owning renderer shades opaque geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingMode {
    /// Forward shading.
    #[default]
    Forward,
    /// Deferred shading; a normal buffer is always available.
    Deferred,
}

/// The renderer a pass is scheduled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RendererInfo {
    /// Active rendering mode.
    pub rendering_mode: RenderingMode,
}

impl RendererInfo {
    /// Returns `true` for deferred renderers.
    pub fn is_deferred(&self) -> bool {
        self.rendering_mode == RenderingMode::Deferred
    }
}

/// Everything a pass needs to know about the camera being rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraData {
    /// Description of the camera target.
    pub target: CameraTargetDescriptor,
    /// The camera colour target.
    pub color_target: RenderTargetId,
    /// The camera depth target, if one exists.
    pub depth_target: Option<RenderTargetId>,
    /// One entry for mono rendering, two for single-pass stereo.
    pub eyes: Vec<EyeMatrices>,
    /// Distance to the near clip plane.
    pub near_clip: f32,
    /// Orthographic projection.
    pub orthographic: bool,
}

impl CameraData {
    /// Creates mono camera data.
    pub fn mono(
        target: CameraTargetDescriptor,
        color_target: RenderTargetId,
        view: Mat4,
        projection: Mat4,
        near_clip: f32,
    ) -> Self {
        Self {
            target,
            color_target,
            depth_target: None,
            eyes: vec![EyeMatrices { view, projection }],
            near_clip,
            orthographic: false,
        }
    }

    /// Number of eyes rendered in this pass.
    pub fn eye_count(&self) -> usize {
        self.eyes.len()
    }
}
