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

//! # Penumbra Lanes
//!
//! Hot-path execution for the 2D lighting engine. Every lane records into a
//! [`CommandEncoder`](penumbra_core::renderer::CommandEncoder); none of them
//! touches a device.
//!
//! - [`render_lane`]: render-target allocation, light batching with shadow
//!   slots, the material-variant cache, shader globals, the per-camera
//!   lighting lane, SSAO and the depth-normal prepass.
//! - [`config`]: RON-backed configuration.
//! - [`error`]: the lane error type.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod render_lane;

pub use config::LightingConfig;
pub use error::LightingError;
pub use render_lane::*;
