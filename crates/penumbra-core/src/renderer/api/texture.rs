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

//! Defines texture handles, formats and render-target descriptors.

use crate::penumbra_bitflags;
use serde::{Deserialize, Serialize};

/// An opaque handle to an externally owned texture (cookies, lookup tables).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// An opaque handle to an off-screen render target.
///
/// Handles are minted by the allocator that records the matching
/// `AllocateTarget` command; the device consumer maps them to real textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetId(pub usize);

/// Anything a shader can sample from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureRef {
    /// A plain texture asset.
    Texture(TextureId),
    /// A render target written earlier in the frame.
    Target(RenderTargetId),
}

impl From<TextureId> for TextureRef {
    fn from(id: TextureId) -> Self {
        TextureRef::Texture(id)
    }
}

impl From<RenderTargetId> for TextureRef {
    fn from(id: RenderTargetId) -> Self {
        TextureRef::Target(id)
    }
}

/// The texel formats the lighting engine allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFormat {
    /// Packed 32-bit unsigned float (11/11/10 bits).
    B10G11R11Ufloat,
    /// Four 16-bit float channels.
    Rgba16Float,
    /// Four 8-bit normalized channels.
    Rgba8Unorm,
    /// Four 8-bit normalized channels in sRGB space.
    Rgba8UnormSrgb,
    /// Two 16-bit float channels, used for packed normals.
    Rg16Float,
    /// 32-bit float depth.
    Depth32Float,
}

impl TextureFormat {
    /// Returns `true` for depth formats.
    pub const fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::Depth32Float)
    }
}

penumbra_bitflags! {
    /// The usages a format must support for the capability query to accept it.
    pub struct TextureUsage: u32 {
        /// Sampled with linear filtering.
        const LINEAR = 1 << 0;
        /// Bound as a render attachment.
        const RENDER = 1 << 1;
        /// Bound for sampling in a shader.
        const SAMPLE = 1 << 2;
    }
}

/// How a render target is filtered when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest texel.
    Point,
    /// Bilinear interpolation.
    #[default]
    Bilinear,
}

/// The camera's own target description, the base every scaled target derives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraTargetDescriptor {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// The camera colour format.
    pub format: TextureFormat,
    /// MSAA sample count of the camera target.
    pub msaa_samples: u32,
    /// Depth bits of the camera target.
    pub depth_bits: u32,
}

impl CameraTargetDescriptor {
    /// Creates a single-sampled descriptor without depth.
    pub const fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
            msaa_samples: 1,
            depth_bits: 0,
        }
    }
}

/// The fully resolved description of a target, as carried by `AllocateTarget`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetDescriptor {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Texel format.
    pub format: TextureFormat,
    /// MSAA sample count.
    pub msaa_samples: u32,
    /// Depth buffer bits, 0 for colour-only targets.
    pub depth_bits: u32,
    /// Whether mip-maps are generated. The lighting engine always leaves this off.
    pub mip_maps: bool,
    /// Sampling filter.
    pub filter: FilterMode,
}

impl RenderTargetDescriptor {
    /// Derives a colour-only target from the camera descriptor at `scale`.
    ///
    /// Dimensions truncate toward zero. Format and MSAA are inherited; depth
    /// and mip-maps are off.
    pub fn scaled(base: &CameraTargetDescriptor, scale: f32) -> Self {
        Self {
            width: (base.width as f32 * scale) as u32,
            height: (base.height as f32 * scale) as u32,
            format: base.format,
            msaa_samples: base.msaa_samples,
            depth_bits: 0,
            mip_maps: false,
            filter: FilterMode::Bilinear,
        }
    }

    /// Returns a copy with the given format.
    #[must_use]
    pub fn with_format(mut self, format: TextureFormat) -> Self {
        self.format = format;
        self
    }

    /// Returns a copy with the given MSAA sample count.
    #[must_use]
    pub fn with_msaa(mut self, samples: u32) -> Self {
        self.msaa_samples = samples;
        self
    }

    /// Returns a copy with the given size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Returns a copy with the given depth bits.
    #[must_use]
    pub fn with_depth_bits(mut self, bits: u32) -> Self {
        self.depth_bits = bits;
        self
    }

    /// Returns a copy with the given filter.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_truncates_and_drops_depth() {
        let mut base = CameraTargetDescriptor::new(1921, 1081, TextureFormat::Rgba8Unorm);
        base.depth_bits = 24;
        base.msaa_samples = 4;
        let desc = RenderTargetDescriptor::scaled(&base, 0.5);
        assert_eq!((desc.width, desc.height), (960, 540));
        assert_eq!(desc.depth_bits, 0);
        assert_eq!(desc.msaa_samples, 4);
        assert!(!desc.mip_maps);
    }

    #[test]
    fn test_usage_flags() {
        let usage = TextureUsage::LINEAR | TextureUsage::RENDER;
        assert!(usage.contains(TextureUsage::RENDER));
        assert!(!usage.contains(TextureUsage::SAMPLE));
    }
}
