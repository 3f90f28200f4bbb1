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

//! Defines the core contracts the lighting engine is written against.
//!
//! - [`CommandEncoder`]: the sink for recorded [`GpuCommand`](crate::renderer::api::GpuCommand)s.
//! - [`LightProvider`], [`LightMeshProvider`], [`ShadowCasterProvider`]: scene-side collaborators.
//! - [`FormatCapabilities`]: the device format query.
//! - [`FramePass`]: a pass with a per-camera setup / execute / cleanup lifecycle.

mod capabilities;
mod command_recorder;
mod frame_pass;
mod providers;

pub use self::capabilities::FormatCapabilities;
pub use self::command_recorder::CommandEncoder;
pub use self::frame_pass::FramePass;
pub use self::providers::{LightMeshProvider, LightProvider, ShadowCasterProvider};
