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

//! Errors raised by the lighting lanes.

use penumbra_core::renderer::RenderError;
use thiserror::Error;

/// An error that aborts a lighting operation for the current frame.
///
/// None of these carry state across frames; the next frame retries cleanly.
#[derive(Debug, Error)]
pub enum LightingError {
    /// The shadow-slot pool cannot hold a single shadow.
    #[error("max shadow texture count cannot be less than 1 (got {0})")]
    InvalidShadowPoolSize(usize),

    /// A blend-style index past the supported range.
    #[error("blend style index {index} is out of range (limit {limit})")]
    BlendStyleOutOfRange {
        /// The offending index.
        index: usize,
        /// The number of usable blend styles.
        limit: usize,
    },

    /// A pass was asked to run without its material.
    #[error("missing material for {0}")]
    MissingMaterial(&'static str),

    /// A core contract was violated.
    #[error(transparent)]
    Render(#[from] RenderError),
}
