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

use crate::renderer::api::camera::CameraData;
use crate::renderer::traits::CommandEncoder;

/// A pass scheduled once per camera by the frame graph.
///
/// The encoder argument is a reference, so a cleanup can never be handed a
/// missing stream.
pub trait FramePass {
    /// A short, stable name for logs and profiling scopes.
    fn name(&self) -> &'static str;

    /// Records per-camera uniforms and allocates the pass's targets.
    fn on_camera_setup(&mut self, encoder: &mut dyn CommandEncoder, camera: &CameraData);

    /// Records the pass itself.
    fn execute(&mut self, encoder: &mut dyn CommandEncoder, camera: &CameraData);

    /// Releases everything `on_camera_setup` allocated.
    fn on_camera_cleanup(&mut self, encoder: &mut dyn CommandEncoder);
}
