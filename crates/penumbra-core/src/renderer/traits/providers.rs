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

use crate::math::LinearRgba;
use crate::renderer::api::material::MeshId;
use crate::renderer::light::Light2D;

/// Supplies the culled lights of the camera being rendered.
///
/// The list must be stable across calls within one frame; batching relies on
/// its order to assign shadow slots deterministically.
pub trait LightProvider {
    /// The visible lights, in render order.
    fn visible_lights(&self) -> &[Light2D];

    /// The colour of the global light on `layer` for `blend_style`, if any.
    fn global_color(&self, layer: i32, blend_style: usize) -> Option<LinearRgba>;
}

/// Supplies the mesh a light is drawn with.
pub trait LightMeshProvider {
    /// The light's mesh, or `None` to skip the light.
    fn light_mesh(&self, light: &Light2D) -> Option<MeshId>;
}

/// Supplies occluder geometry for shadow rendering.
pub trait ShadowCasterProvider {
    /// Occluder meshes that shadow `light` on `layer`.
    fn shadow_casters(&self, light: &Light2D, layer: i32) -> Vec<MeshId>;
}
