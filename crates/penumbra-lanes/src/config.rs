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

//! Lighting configuration, loaded from RON.

use crate::error::LightingError;
use crate::render_lane::{clamp_light_scale, Downsampling, SsaoSettings};
use anyhow::Context;
use penumbra_core::renderer::{LightBlendStyle, MAX_BLEND_STYLES};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Renderer-wide lighting settings.
///
/// Missing fields take their defaults, so a file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Resolution of the blend-style buffers relative to the camera.
    pub light_render_texture_scale: f32,
    /// Shadow slots available to one light batch.
    pub max_shadow_texture_count: usize,
    /// At most four blend styles.
    pub blend_styles: Vec<LightBlendStyle>,
    /// Resolution of the camera-sorting-layer capture.
    pub camera_sorting_layer_downsampling: Downsampling,
    /// Ambient occlusion.
    pub ssao: SsaoSettings,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            light_render_texture_scale: 0.5,
            max_shadow_texture_count: 4,
            blend_styles: LightBlendStyle::defaults(),
            camera_sorting_layer_downsampling: Downsampling::default(),
            ssao: SsaoSettings::default(),
        }
    }
}

impl LightingConfig {
    /// Parses a configuration. Does not validate.
    pub fn from_ron_str(source: &str) -> Result<Self, ron::error::SpannedError> {
        ron::de::from_str(source)
    }

    /// Serializes the configuration as pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        let pretty_config = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, pretty_config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lighting config {}", path.display()))?;
        let mut config = Self::from_ron_str(&source)
            .with_context(|| format!("Failed to parse lighting config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid lighting config {}", path.display()))?;
        Ok(config)
    }

    /// Clamps out-of-range values, warning for each, and rejects a shadow
    /// pool that cannot hold one shadow. A non-finite light scale is reset
    /// to the default.
    pub fn validate(&mut self) -> Result<(), LightingError> {
        if self.max_shadow_texture_count < 1 {
            log::error!("max shadow texture count cannot be less than 1");
            return Err(LightingError::InvalidShadowPoolSize(
                self.max_shadow_texture_count,
            ));
        }

        if !self.light_render_texture_scale.is_finite() {
            let fallback = Self::default().light_render_texture_scale;
            log::warn!(
                "Light render texture scale {} is not finite, using {fallback}",
                self.light_render_texture_scale
            );
            self.light_render_texture_scale = fallback;
        }

        let clamped = clamp_light_scale(self.light_render_texture_scale);
        if clamped != self.light_render_texture_scale {
            log::warn!(
                "Light render texture scale {} clamped to {clamped}",
                self.light_render_texture_scale
            );
            self.light_render_texture_scale = clamped;
        }

        if self.blend_styles.len() > MAX_BLEND_STYLES {
            log::warn!(
                "{} blend styles configured, only the first {MAX_BLEND_STYLES} are used",
                self.blend_styles.len()
            );
            self.blend_styles.truncate(MAX_BLEND_STYLES);
        }
        Ok(())
    }
}
