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

//! The recorded GPU command vocabulary.
//!
//! Every state change the lighting engine makes (uniforms, keywords, target
//! binds) is a discrete command appended to a stream. Nothing here touches a
//! device; a separate consumer replays the stream.

use crate::math::{LinearRgba, Mat4, Vec4};
use crate::penumbra_bitflags;
use crate::renderer::api::material::{MaterialId, MeshId};
use crate::renderer::api::texture::{RenderTargetDescriptor, RenderTargetId, TextureRef};
use crate::renderer::traits::CommandEncoder;

/// What happens to an attachment's previous content when it is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadAction {
    /// Keep the existing content.
    Load,
    /// Content is undefined.
    DontCare,
}

/// What happens to an attachment's content when rendering ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreAction {
    /// Write the content back.
    Store,
    /// Content may be discarded.
    DontCare,
}

/// One attachment of a render target binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attachment {
    /// The bound target.
    pub target: RenderTargetId,
    /// Load behaviour.
    pub load: LoadAction,
    /// Store behaviour.
    pub store: StoreAction,
}

impl Attachment {
    /// Creates an attachment binding.
    pub const fn new(target: RenderTargetId, load: LoadAction, store: StoreAction) -> Self {
        Self {
            target,
            load,
            store,
        }
    }
}

/// A colour attachment with an optional depth attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetBinding {
    /// Colour attachment.
    pub color: Attachment,
    /// Depth attachment, if any.
    pub depth: Option<Attachment>,
}

impl RenderTargetBinding {
    /// Binds a colour target only.
    pub const fn color(color: Attachment) -> Self {
        Self { color, depth: None }
    }

    /// Binds a colour target together with a depth target.
    pub const fn with_depth(color: Attachment, depth: Attachment) -> Self {
        Self {
            color,
            depth: Some(depth),
        }
    }
}

penumbra_bitflags! {
    /// The buffers a clear affects.
    pub struct ClearFlags: u32 {
        /// Colour buffer.
        const COLOR = 1 << 0;
        /// Depth buffer.
        const DEPTH = 1 << 1;
        /// Colour and depth.
        const ALL = (1 << 0) | (1 << 1);
    }
}

/// A shader property or keyword name.
pub type PropertyName = &'static str;

/// A single recorded GPU command.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    /// Create a render target.
    AllocateTarget {
        /// Handle the target will be known by.
        id: RenderTargetId,
        /// Resolved description.
        descriptor: RenderTargetDescriptor,
    },
    /// Destroy a render target.
    ReleaseTarget {
        /// Target to destroy.
        id: RenderTargetId,
    },
    /// Bind the render destination.
    SetRenderTarget(RenderTargetBinding),
    /// Clear the bound destination.
    ClearRenderTarget {
        /// Buffers to clear.
        flags: ClearFlags,
        /// Colour clear value.
        color: LinearRgba,
    },
    /// Set a global float uniform.
    SetGlobalFloat {
        /// Property name.
        name: PropertyName,
        /// Value.
        value: f32,
    },
    /// Set a global vector uniform.
    SetGlobalVector {
        /// Property name.
        name: PropertyName,
        /// Value.
        value: Vec4,
    },
    /// Set a global colour uniform.
    SetGlobalColor {
        /// Property name.
        name: PropertyName,
        /// Value.
        value: LinearRgba,
    },
    /// Set a global matrix uniform.
    SetGlobalMatrix {
        /// Property name.
        name: PropertyName,
        /// Value.
        value: Mat4,
    },
    /// Bind a global texture.
    SetGlobalTexture {
        /// Property name.
        name: PropertyName,
        /// Texture to bind.
        texture: TextureRef,
    },
    /// Toggle a global shader keyword.
    SetGlobalKeyword {
        /// Keyword.
        keyword: PropertyName,
        /// New state.
        enabled: bool,
    },
    /// Set a vector on one material.
    SetMaterialVector {
        /// Target material.
        material: MaterialId,
        /// Property name.
        name: PropertyName,
        /// Value.
        value: Vec4,
    },
    /// Set a vector array on one material.
    SetMaterialVectorArray {
        /// Target material.
        material: MaterialId,
        /// Property name.
        name: PropertyName,
        /// Values.
        values: Vec<Vec4>,
    },
    /// Set a matrix array on one material.
    SetMaterialMatrixArray {
        /// Target material.
        material: MaterialId,
        /// Property name.
        name: PropertyName,
        /// Values.
        values: Vec<Mat4>,
    },
    /// Toggle a keyword on one material.
    SetMaterialKeyword {
        /// Target material.
        material: MaterialId,
        /// Keyword.
        keyword: PropertyName,
        /// New state.
        enabled: bool,
    },
    /// Draw a mesh with a material.
    DrawMesh {
        /// Mesh to draw.
        mesh: MeshId,
        /// Object-to-world transform.
        transform: Mat4,
        /// Material to draw with.
        material: MaterialId,
        /// Shader pass index.
        pass: u32,
    },
    /// Draw a fullscreen triangle with a material.
    DrawFullscreen {
        /// Material to draw with.
        material: MaterialId,
        /// Shader pass index.
        pass: u32,
    },
    /// Draw the camera's visible renderers with the named shader pass.
    DrawRenderers {
        /// Shader pass tag, e.g. `NormalsRendering`.
        shader_pass: PropertyName,
    },
    /// Rasterize occluder geometry into a shadow slot.
    DrawShadowCasters {
        /// Shadow slot target.
        target: RenderTargetId,
        /// Occluder meshes.
        casters: Vec<MeshId>,
        /// Shadow strength for this light.
        intensity: f32,
    },
    /// Destroy a material instance.
    DestroyMaterial {
        /// Material to destroy.
        material: MaterialId,
    },
    /// Open a named profiling scope.
    BeginSample {
        /// Scope label.
        name: String,
    },
    /// Close a named profiling scope.
    EndSample {
        /// Scope label.
        name: String,
    },
}

/// An append-only list of recorded commands.
#[derive(Debug, Default, Clone)]
pub struct CommandStream {
    commands: Vec<GpuCommand>,
}

impl CommandStream {
    /// Creates an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// The commands recorded so far, in order.
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Takes the recorded commands, leaving the stream empty.
    pub fn take(&mut self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Iterates over the recorded commands.
    pub fn iter(&self) -> std::slice::Iter<'_, GpuCommand> {
        self.commands.iter()
    }
}

impl CommandEncoder for CommandStream {
    fn record(&mut self, command: GpuCommand) {
        self.commands.push(command);
    }
}

impl<'a> IntoIterator for &'a CommandStream {
    type Item = &'a GpuCommand;
    type IntoIter = std::slice::Iter<'a, GpuCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
