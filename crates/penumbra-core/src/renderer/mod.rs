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

//! Provides the backend-agnostic contracts of the 2D lighting engine.
//!
//! This module defines what the lanes record and consume: the command
//! vocabulary and handles in [`api`], the light and blend-style data model,
//! the error types, and the collaborator [`traits`]. Concrete scene culling,
//! mesh building and device execution live outside this crate.

pub mod api;
pub mod blend_style;
pub mod error;
pub mod light;
pub mod traits;

pub use self::api::*;
pub use self::blend_style::{
    BlendFactors, LightBlendStyle, MaskChannel, MaskChannelFilter, MAX_BLEND_STYLES,
};
pub use self::error::RenderError;
pub use self::light::{
    Light2D, LightKind, LightTransform, NormalMapQuality, OverlapOperation, PointLightGeometry,
    ShadowSettings, VolumeSettings,
};
pub use self::traits::{
    CommandEncoder, FormatCapabilities, FramePass, LightMeshProvider, LightProvider,
    ShadowCasterProvider,
};
