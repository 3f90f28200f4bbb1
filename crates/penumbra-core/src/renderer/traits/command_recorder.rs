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

use crate::math::{LinearRgba, Mat4, Vec4};
use crate::renderer::api::command::{ClearFlags, GpuCommand, PropertyName, RenderTargetBinding};
use crate::renderer::api::texture::TextureRef;

/// A trait for an object that records a sequence of GPU commands.
///
/// Recording never blocks and never fails; validation happens before a
/// command is built. Only [`record`](Self::record) is required, the other
/// methods are shorthands that build the matching [`GpuCommand`].
pub trait CommandEncoder {
    /// Appends a command to the stream.
    fn record(&mut self, command: GpuCommand);

    /// Records [`GpuCommand::SetRenderTarget`].
    fn set_render_target(&mut self, binding: RenderTargetBinding) {
        self.record(GpuCommand::SetRenderTarget(binding));
    }

    /// Records [`GpuCommand::ClearRenderTarget`].
    fn clear_render_target(&mut self, flags: ClearFlags, color: LinearRgba) {
        self.record(GpuCommand::ClearRenderTarget { flags, color });
    }

    /// Records [`GpuCommand::SetGlobalFloat`].
    fn set_global_float(&mut self, name: PropertyName, value: f32) {
        self.record(GpuCommand::SetGlobalFloat { name, value });
    }

    /// Records [`GpuCommand::SetGlobalVector`].
    fn set_global_vector(&mut self, name: PropertyName, value: Vec4) {
        self.record(GpuCommand::SetGlobalVector { name, value });
    }

    /// Records [`GpuCommand::SetGlobalColor`].
    fn set_global_color(&mut self, name: PropertyName, value: LinearRgba) {
        self.record(GpuCommand::SetGlobalColor { name, value });
    }

    /// Records [`GpuCommand::SetGlobalMatrix`].
    fn set_global_matrix(&mut self, name: PropertyName, value: Mat4) {
        self.record(GpuCommand::SetGlobalMatrix { name, value });
    }

    /// Records [`GpuCommand::SetGlobalTexture`].
    fn set_global_texture(&mut self, name: PropertyName, texture: TextureRef) {
        self.record(GpuCommand::SetGlobalTexture { name, texture });
    }

    /// Records [`GpuCommand::SetGlobalKeyword`].
    fn set_global_keyword(&mut self, keyword: PropertyName, enabled: bool) {
        self.record(GpuCommand::SetGlobalKeyword { keyword, enabled });
    }

    /// Records [`GpuCommand::BeginSample`].
    fn begin_sample(&mut self, name: &str) {
        self.record(GpuCommand::BeginSample {
            name: name.to_owned(),
        });
    }

    /// Records [`GpuCommand::EndSample`].
    fn end_sample(&mut self, name: &str) {
        self.record(GpuCommand::EndSample {
            name: name.to_owned(),
        });
    }
}
