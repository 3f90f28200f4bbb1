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

//! Ranges of the normalized point-light uniforms.

use penumbra_core::renderer::PointLightGeometry;
use penumbra_lanes::render_lane::shader_globals::{normalized_angle, normalized_inner_radius};
use proptest::prelude::*;

proptest! {
    #[test]
    fn inner_radius_stays_below_one(outer in 0.01f32..1000.0, t in 0.0f32..0.99) {
        let geometry = PointLightGeometry {
            inner_radius: outer * t,
            outer_radius: outer,
            ..Default::default()
        };
        let normalized = normalized_inner_radius(&geometry);
        prop_assert!((0.0..1.0).contains(&normalized));
    }

    #[test]
    fn angles_map_into_unit_range(degrees in 0.0f32..=360.0) {
        let normalized = normalized_angle(degrees);
        prop_assert!((0.0..=1.0).contains(&normalized));
    }
}
