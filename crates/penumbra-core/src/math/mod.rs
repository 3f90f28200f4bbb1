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

//! Provides the small set of mathematics primitives the 2D lighting engine needs.
//!
//! Lights live on a 2D plane but their transforms, the SSAO view-ray
//! reconstruction and the shadow lookup textures all work on homogeneous
//! 4D coordinates, so the module stays 3D/4D under the hood.
//!
//! All angular arguments are in **radians**.

pub mod color;
pub mod matrix;
pub mod quaternion;
pub mod vector;

pub use self::color::LinearRgba;
pub use self::matrix::Mat4;
pub use self::quaternion::Quaternion;
pub use self::vector::{Vec3, Vec4};
