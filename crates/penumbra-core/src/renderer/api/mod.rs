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

//! Backend-agnostic rendering API.
//!
//! - **[`texture`]**: texture and render-target handles and descriptors.
//! - **[`material`]**: material, shader and mesh handles, the light material key.
//! - **[`command`]**: the recorded command vocabulary.
//! - **[`camera`]**: per-camera data for frame passes.

pub mod camera;
pub mod command;
pub mod material;
pub mod texture;

pub use self::camera::{CameraData, EyeMatrices, RendererInfo, RenderingMode};
pub use self::command::{
    Attachment, ClearFlags, CommandStream, GpuCommand, LoadAction, PropertyName,
    RenderTargetBinding, StoreAction,
};
pub use self::material::{
    BlendFactor, BlendMode, LightMaterial, LightMaterialKey, LightShaders, MaterialId, MeshId,
    ShaderId,
};
pub use self::texture::{
    CameraTargetDescriptor, FilterMode, RenderTargetDescriptor, RenderTargetId, TextureFormat,
    TextureId, TextureRef, TextureUsage,
};
