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

//! Mock collaborators shared by the integration tests.

#![allow(dead_code)]

use penumbra_core::math::LinearRgba;
use penumbra_core::renderer::{
    FormatCapabilities, GpuCommand, Light2D, LightMeshProvider, LightProvider, LightShaders,
    MeshId, RenderTargetId, ShaderId, ShadowCasterProvider, TextureFormat, TextureId,
    TextureUsage,
};
use penumbra_lanes::LightLookups;
use std::collections::HashSet;

/// A scene with a fixed light list, one mesh per light and one occluder.
#[derive(Default)]
pub struct MockScene {
    pub lights: Vec<Light2D>,
    /// `(layer, blend style, colour)` of global lights.
    pub global_colors: Vec<(i32, usize, LinearRgba)>,
    /// Lights at these indices have no mesh.
    pub meshless: HashSet<usize>,
}

impl MockScene {
    pub fn new(lights: Vec<Light2D>) -> Self {
        Self {
            lights,
            ..Default::default()
        }
    }

    fn index_of(&self, light: &Light2D) -> Option<usize> {
        self.lights.iter().position(|l| std::ptr::eq(l, light))
    }
}

impl LightProvider for MockScene {
    fn visible_lights(&self) -> &[Light2D] {
        &self.lights
    }

    fn global_color(&self, layer: i32, blend_style: usize) -> Option<LinearRgba> {
        self.global_colors
            .iter()
            .find(|(l, s, _)| *l == layer && *s == blend_style)
            .map(|(_, _, c)| *c)
    }
}

impl LightMeshProvider for MockScene {
    fn light_mesh(&self, light: &Light2D) -> Option<MeshId> {
        match self.index_of(light) {
            Some(i) if self.meshless.contains(&i) => None,
            Some(i) => Some(MeshId(1000 + i)),
            None => Some(MeshId(0)),
        }
    }
}

impl ShadowCasterProvider for MockScene {
    fn shadow_casters(&self, _light: &Light2D, layer: i32) -> Vec<MeshId> {
        vec![MeshId(5000 + layer.unsigned_abs() as usize)]
    }
}

/// A device supporting every format.
pub struct AllFormats;

impl FormatCapabilities for AllFormats {
    fn is_format_supported(&self, _format: TextureFormat, _usage: TextureUsage) -> bool {
        true
    }
}

pub fn all_shaders() -> LightShaders {
    LightShaders {
        point: Some(ShaderId(1)),
        shape: Some(ShaderId(2)),
        point_volume: Some(ShaderId(3)),
        shape_volume: Some(ShaderId(4)),
    }
}

pub fn lookups() -> LightLookups {
    LightLookups {
        falloff: TextureId(1),
        light: TextureId(2),
    }
}

pub fn shadow_caster(intensity: f32) -> Light2D {
    let mut light = Light2D::default();
    light.shadows.enabled = true;
    light.shadows.intensity = intensity;
    light
}

/// Replays allocation commands and returns the largest number of targets
/// alive at once, failing if a release names an unknown target.
pub fn max_live_targets(commands: &[GpuCommand]) -> usize {
    let mut live: HashSet<RenderTargetId> = HashSet::new();
    let mut max = 0;
    for command in commands {
        match command {
            GpuCommand::AllocateTarget { id, .. } => {
                assert!(live.insert(*id), "{id:?} allocated twice");
                max = max.max(live.len());
            }
            GpuCommand::ReleaseTarget { id } => {
                assert!(live.remove(id), "{id:?} released while not alive");
            }
            _ => {}
        }
    }
    max
}

pub fn count<F: Fn(&GpuCommand) -> bool>(commands: &[GpuCommand], predicate: F) -> usize {
    commands.iter().filter(|c| predicate(c)).count()
}
