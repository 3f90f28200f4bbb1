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

//! Light blend styles: the independent lighting categories a sprite can receive.

use crate::math::Vec4;
use serde::{Deserialize, Serialize};

/// The maximum number of blend styles a renderer can use.
pub const MAX_BLEND_STYLES: usize = 4;

/// The mask texture channel that selects a blend style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaskChannel {
    /// No masking.
    #[default]
    None,
    /// Red channel.
    R,
    /// Green channel.
    G,
    /// Blue channel.
    B,
    /// Alpha channel.
    A,
}

/// The channel filter a blend style applies to the sprite mask texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaskChannelFilter {
    /// Selected channel.
    pub channel: MaskChannel,
    /// Whether the mask is inverted.
    #[serde(default)]
    pub inverted: bool,
}

impl MaskChannelFilter {
    /// Creates a filter on `channel`.
    pub const fn new(channel: MaskChannel, inverted: bool) -> Self {
        Self { channel, inverted }
    }

    /// One-hot selector for the mask channel, zero when unmasked.
    pub fn mask(&self) -> Vec4 {
        match self.channel {
            MaskChannel::None => Vec4::ZERO,
            MaskChannel::R => Vec4::X,
            MaskChannel::G => Vec4::Y,
            MaskChannel::B => Vec4::Z,
            MaskChannel::A => Vec4::W,
        }
    }

    /// The mask selector when inverted, otherwise zero.
    pub fn inverted(&self) -> Vec4 {
        if self.inverted {
            self.mask()
        } else {
            Vec4::ZERO
        }
    }
}

/// Multiplicative and additive weights of a blend style.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BlendFactors {
    /// Weight of the multiplicative term.
    pub multiplicative: f32,
    /// Weight of the additive term.
    pub additive: f32,
}

impl BlendFactors {
    /// The factors as a shader vector `(multiplicative, additive, 0, 0)`.
    pub fn to_vec4(&self) -> Vec4 {
        Vec4::new(self.multiplicative, self.additive, 0.0, 0.0)
    }
}

/// A lighting category with its own accumulation buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightBlendStyle {
    /// Display name, also used as the profiling sample label.
    pub name: String,
    /// Blend weights.
    pub blend_factors: BlendFactors,
    /// Mask channel filter.
    #[serde(default)]
    pub mask_filter: MaskChannelFilter,
    /// The buffer holds stale content and must be cleared before reuse.
    #[serde(skip)]
    pub is_dirty: bool,
}

impl LightBlendStyle {
    /// Creates a clean blend style.
    pub fn new(name: impl Into<String>, blend_factors: BlendFactors, mask_filter: MaskChannelFilter) -> Self {
        Self {
            name: name.into(),
            blend_factors,
            mask_filter,
            is_dirty: false,
        }
    }

    /// The four default styles: multiply and additive, each with and without
    /// a red-channel mask.
    pub fn defaults() -> Vec<Self> {
        let multiply = BlendFactors {
            multiplicative: 1.0,
            additive: 0.0,
        };
        let additive = BlendFactors {
            multiplicative: 0.0,
            additive: 1.0,
        };
        let red = MaskChannelFilter::new(MaskChannel::R, false);
        vec![
            Self::new("Multiply", multiply, MaskChannelFilter::default()),
            Self::new("Additive", additive, MaskChannelFilter::default()),
            Self::new("Multiply with Mask", multiply, red),
            Self::new("Additive with Mask", additive, red),
        ]
    }
}
