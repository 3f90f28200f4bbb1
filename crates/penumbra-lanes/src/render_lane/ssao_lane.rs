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

//! Screen-space ambient occlusion: estimate, separable blur, composite.

use super::render_targets::{RenderTargetAllocator, TargetKind};
use crate::error::LightingError;
use penumbra_core::math::{Mat4, Vec3, Vec4};
use penumbra_core::renderer::{
    Attachment, CameraData, CommandEncoder, EyeMatrices, FramePass, GpuCommand, LoadAction,
    MaterialId, PropertyName, RenderError, RenderTargetBinding, RenderTargetId, RendererInfo,
    StoreAction, TextureRef,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stereo rendering draws at most two eyes per pass.
pub const MAX_EYES: usize = 2;

/// Label of the pass's profiling scope.
pub const SSAO_SAMPLE_NAME: &str = "SSAO";

/// Property and keyword names used by the pass.
#[allow(missing_docs)]
pub mod names {
    pub const SSAO_PARAMS: &str = "_SSAOParams";
    pub const PROJECTION_PARAMS2: &str = "_ProjectionParams2";
    pub const CAMERA_VIEW_PROJECTIONS: &str = "_CameraViewProjections";
    pub const CAMERA_VIEW_TOP_LEFT_CORNER: &str = "_CameraViewTopLeftCorner";
    pub const CAMERA_VIEW_X_EXTENT: &str = "_CameraViewXExtent";
    pub const CAMERA_VIEW_Y_EXTENT: &str = "_CameraViewYExtent";
    pub const CAMERA_VIEW_Z_EXTENT: &str = "_CameraViewZExtent";
    pub const BASE_MAP: &str = "_BaseMap";
    pub const SOURCE_SIZE: &str = "_SourceSize";
    pub const OCCLUSION_TEXTURE: &str = "_ScreenSpaceOcclusionTexture";
    pub const AMBIENT_OCCLUSION_PARAM: &str = "_AmbientOcclusionParam";

    pub const ORTHOGRAPHIC: &str = "_ORTHOGRAPHIC";
    pub const RECONSTRUCT_NORMAL_LOW: &str = "_RECONSTRUCT_NORMAL_LOW";
    pub const RECONSTRUCT_NORMAL_MEDIUM: &str = "_RECONSTRUCT_NORMAL_MEDIUM";
    pub const RECONSTRUCT_NORMAL_HIGH: &str = "_RECONSTRUCT_NORMAL_HIGH";
    pub const SOURCE_DEPTH: &str = "_SOURCE_DEPTH";
    pub const SOURCE_DEPTH_NORMALS: &str = "_SOURCE_DEPTH_NORMALS";
    pub const SCREEN_SPACE_OCCLUSION: &str = "_SCREEN_SPACE_OCCLUSION";
}

/// Shader pass indices of the SSAO material.
pub mod passes {
    /// Occlusion estimate.
    pub const AO: u32 = 0;
    /// Horizontal blur.
    pub const BLUR_HORIZONTAL: u32 = 1;
    /// Vertical blur.
    pub const BLUR_VERTICAL: u32 = 2;
    /// Final blur.
    pub const BLUR_FINAL: u32 = 3;
    /// Composite onto the camera colour.
    pub const AFTER_OPAQUE: u32 = 4;
}

/// Where depth (and normals) are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DepthSource {
    /// Depth only; normals are reconstructed.
    Depth = 0,
    /// Depth and the prepass normal buffer.
    #[default]
    DepthNormals = 1,
}

impl TryFrom<u32> for DepthSource {
    type Error = RenderError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DepthSource::Depth),
            1 => Ok(DepthSource::DepthNormals),
            other => Err(RenderError::InvalidArgument {
                name: "depth_source",
                reason: format!("{other} is not a depth source"),
            }),
        }
    }
}

/// Tap count used when reconstructing normals from depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NormalQuality {
    /// One tap.
    Low,
    /// Three taps.
    #[default]
    Medium,
    /// Five taps.
    High,
}

impl NormalQuality {
    fn keyword(self) -> PropertyName {
        match self {
            NormalQuality::Low => names::RECONSTRUCT_NORMAL_LOW,
            NormalQuality::Medium => names::RECONSTRUCT_NORMAL_MEDIUM,
            NormalQuality::High => names::RECONSTRUCT_NORMAL_HIGH,
        }
    }
}

/// User-facing SSAO parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsaoSettings {
    /// Estimate occlusion at half resolution.
    pub downsample: bool,
    /// Composite right after opaques instead of feeding the lighting.
    pub after_opaque: bool,
    /// Requested depth source. Deferred renderers always use depth-normals.
    pub source: DepthSource,
    /// Normal reconstruction quality for the depth-only source.
    pub normal_samples: NormalQuality,
    /// Occlusion strength.
    pub intensity: f32,
    /// How much occlusion also darkens direct lighting.
    pub direct_lighting_strength: f32,
    /// Sampling radius in world units.
    pub radius: f32,
    /// Samples per pixel.
    pub sample_count: i32,
}

impl Default for SsaoSettings {
    fn default() -> Self {
        Self {
            downsample: false,
            after_opaque: false,
            source: DepthSource::DepthNormals,
            normal_samples: NormalQuality::Medium,
            intensity: 3.0,
            direct_lighting_strength: 0.25,
            radius: 0.035,
            sample_count: 6,
        }
    }
}

impl SsaoSettings {
    /// `1` at full resolution, `2` when downsampled.
    pub fn downsample_divider(&self) -> u32 {
        if self.downsample {
            2
        } else {
            1
        }
    }

    /// Sets the depth source from its serialized integer form.
    pub fn set_source_index(&mut self, raw: u32) -> Result<(), LightingError> {
        self.source = DepthSource::try_from(raw)?;
        Ok(())
    }
}

/// When the pass runs in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsaoPassEvent {
    /// After the opaque geometry; composites onto the camera colour.
    AfterOpaque,
    /// After the G-buffer; the result is sampled by lighting.
    AfterGbuffer,
}

/// The input the frame graph must provide before the pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsaoPassInput {
    /// Camera depth.
    Depth,
    /// Camera depth and normals.
    Normal,
}

/// The view-ray reconstruction data of one eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeReconstruction {
    /// `projection * view`.
    pub view_projection: Mat4,
    /// Near-plane top-left corner in translation-free view space.
    pub top_left: Vec4,
    /// Top-left to top-right.
    pub x_extent: Vec4,
    /// Top-left to bottom-left.
    pub y_extent: Vec4,
    /// Far-plane centre.
    pub z_extent: Vec4,
}

impl EyeReconstruction {
    /// Computes the corners of `eye`. `None` when the translation-free
    /// view-projection cannot be inverted.
    pub fn from_eye(eye: &EyeMatrices) -> Option<Self> {
        let view_projection = eye.projection * eye.view;
        let inverse = (eye.projection * eye.view.with_translation_stripped()).inverse()?;

        let top_left = inverse.transform_point(Vec3::new(-1.0, 1.0, -1.0));
        let top_right = inverse.transform_point(Vec3::new(1.0, 1.0, -1.0));
        let bottom_left = inverse.transform_point(Vec3::new(-1.0, -1.0, -1.0));
        let far_centre = inverse.transform_point(Vec3::new(0.0, 0.0, 1.0));

        Some(Self {
            view_projection,
            top_left: top_left.extend(0.0),
            x_extent: (top_right - top_left).extend(0.0),
            y_extent: (bottom_left - top_left).extend(0.0),
            z_extent: far_centre.extend(0.0),
        })
    }
}

/// The SSAO frame pass.
#[derive(Debug)]
pub struct SsaoPass {
    material: Option<MaterialId>,
    settings: SsaoSettings,
    renderer: RendererInfo,
    event: SsaoPassEvent,
    input: SsaoPassInput,
    keywords: BTreeMap<PropertyName, bool>,
    allocator: RenderTargetAllocator,
}

impl SsaoPass {
    /// Creates the pass around the SSAO material, if it was loaded.
    pub fn new(material: Option<MaterialId>) -> Self {
        Self {
            material,
            settings: SsaoSettings::default(),
            renderer: RendererInfo::default(),
            event: SsaoPassEvent::AfterGbuffer,
            input: SsaoPassInput::Normal,
            keywords: BTreeMap::new(),
            allocator: RenderTargetAllocator::default(),
        }
    }

    /// The SSAO material handle.
    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }

    /// The settings from the last [`setup`](Self::setup).
    pub fn settings(&self) -> &SsaoSettings {
        &self.settings
    }

    /// When the pass is scheduled.
    pub fn event(&self) -> SsaoPassEvent {
        self.event
    }

    /// What the pass reads.
    pub fn input(&self) -> SsaoPassInput {
        self.input
    }

    /// The source actually used: deferred renderers always have normals.
    pub fn effective_source(&self) -> DepthSource {
        if self.renderer.is_deferred() {
            DepthSource::DepthNormals
        } else {
            self.settings.source
        }
    }

    /// Material keyword state after the last setup.
    pub fn keywords(&self) -> &BTreeMap<PropertyName, bool> {
        &self.keywords
    }

    /// The state of one material keyword, if the pass sets it.
    pub fn keyword(&self, keyword: &str) -> Option<bool> {
        self.keywords.get(keyword).copied()
    }

    /// Configures the pass for a renderer. Returns `true` if it should be
    /// scheduled.
    pub fn setup(&mut self, settings: SsaoSettings, renderer: RendererInfo) -> bool {
        self.settings = settings;
        self.renderer = renderer;
        self.event = if settings.after_opaque {
            SsaoPassEvent::AfterOpaque
        } else {
            SsaoPassEvent::AfterGbuffer
        };

        let source = self.effective_source();
        self.input = match source {
            DepthSource::Depth => SsaoPassInput::Depth,
            DepthSource::DepthNormals => SsaoPassInput::Normal,
        };

        self.keywords.clear();
        if source == DepthSource::Depth {
            for quality in [NormalQuality::Low, NormalQuality::Medium, NormalQuality::High] {
                self.keywords
                    .insert(quality.keyword(), quality == settings.normal_samples);
            }
        }
        self.keywords
            .insert(names::SOURCE_DEPTH, source == DepthSource::Depth);
        self.keywords
            .insert(names::SOURCE_DEPTH_NORMALS, source == DepthSource::DepthNormals);

        self.material.is_some()
            && settings.intensity > 0.0
            && settings.radius > 0.0
            && settings.sample_count > 0
    }

    /// Destroys the SSAO material.
    pub fn dispose(&mut self, encoder: &mut dyn CommandEncoder) {
        if let Some(material) = self.material.take() {
            encoder.record(GpuCommand::DestroyMaterial { material });
        }
    }

    fn require_material(&self) -> Result<MaterialId, LightingError> {
        self.material.ok_or(LightingError::MissingMaterial("SSAO"))
    }

    fn occlusion_target(&self, index: u8) -> Option<RenderTargetId> {
        self.allocator.get(TargetKind::SsaoOcclusion(index))
    }

    fn render(
        encoder: &mut dyn CommandEncoder,
        material: MaterialId,
        target: RenderTargetId,
        pass: u32,
    ) {
        encoder.set_render_target(RenderTargetBinding::color(Attachment::new(
            target,
            LoadAction::DontCare,
            StoreAction::Store,
        )));
        encoder.record(GpuCommand::DrawFullscreen { material, pass });
    }

    fn render_and_set_base_map(
        encoder: &mut dyn CommandEncoder,
        material: MaterialId,
        base_map: RenderTargetId,
        target: RenderTargetId,
        pass: u32,
    ) {
        encoder.set_global_texture(names::BASE_MAP, TextureRef::Target(base_map));
        Self::render(encoder, material, target, pass);
    }
}

impl FramePass for SsaoPass {
    fn name(&self) -> &'static str {
        SSAO_SAMPLE_NAME
    }

    fn on_camera_setup(&mut self, encoder: &mut dyn CommandEncoder, camera: &CameraData) {
        let material = match self.require_material() {
            Ok(material) => material,
            Err(err) => {
                log::error!("SSAO setup skipped: {err}");
                return;
            }
        };
        let settings = self.settings;
        let divider = settings.downsample_divider();

        encoder.record(GpuCommand::SetMaterialVector {
            material,
            name: names::SSAO_PARAMS,
            value: Vec4::new(
                settings.intensity,
                settings.radius,
                1.0 / divider as f32,
                settings.sample_count as f32,
            ),
        });

        let mut view_projections = [Mat4::IDENTITY; MAX_EYES];
        let mut top_left = [Vec4::ZERO; MAX_EYES];
        let mut x_extent = [Vec4::ZERO; MAX_EYES];
        let mut y_extent = [Vec4::ZERO; MAX_EYES];
        let mut z_extent = [Vec4::ZERO; MAX_EYES];
        for (i, eye) in camera.eyes.iter().take(MAX_EYES).enumerate() {
            match EyeReconstruction::from_eye(eye) {
                Some(r) => {
                    view_projections[i] = r.view_projection;
                    top_left[i] = r.top_left;
                    x_extent[i] = r.x_extent;
                    y_extent[i] = r.y_extent;
                    z_extent[i] = r.z_extent;
                }
                None => log::warn!("SSAO eye {i} has a singular view-projection"),
            }
        }

        encoder.record(GpuCommand::SetMaterialVector {
            material,
            name: names::PROJECTION_PARAMS2,
            value: Vec4::new(1.0 / camera.near_clip, 0.0, 0.0, 0.0),
        });
        encoder.record(GpuCommand::SetMaterialMatrixArray {
            material,
            name: names::CAMERA_VIEW_PROJECTIONS,
            values: view_projections.to_vec(),
        });
        for (name, values) in [
            (names::CAMERA_VIEW_TOP_LEFT_CORNER, top_left),
            (names::CAMERA_VIEW_X_EXTENT, x_extent),
            (names::CAMERA_VIEW_Y_EXTENT, y_extent),
            (names::CAMERA_VIEW_Z_EXTENT, z_extent),
        ] {
            encoder.record(GpuCommand::SetMaterialVectorArray {
                material,
                name,
                values: values.to_vec(),
            });
        }

        self.keywords.insert(names::ORTHOGRAPHIC, camera.orthographic);
        for (&keyword, &enabled) in &self.keywords {
            encoder.record(GpuCommand::SetMaterialKeyword {
                material,
                keyword,
                enabled,
            });
        }

        let downsampled = 1.0 / divider as f32;
        self.allocator.acquire(
            encoder,
            TargetKind::SsaoOcclusion(1),
            &camera.target,
            downsampled,
        );
        self.allocator
            .acquire(encoder, TargetKind::SsaoOcclusion(2), &camera.target, 1.0);
        self.allocator
            .acquire(encoder, TargetKind::SsaoOcclusion(3), &camera.target, 1.0);
    }

    fn execute(&mut self, encoder: &mut dyn CommandEncoder, camera: &CameraData) {
        let material = match self.require_material() {
            Ok(material) => material,
            Err(err) => {
                log::error!("SSAO execute skipped: {err}");
                return;
            }
        };
        let (Some(tex1), Some(tex2), Some(tex3)) = (
            self.occlusion_target(1),
            self.occlusion_target(2),
            self.occlusion_target(3),
        ) else {
            log::error!("SSAO execute skipped: occlusion targets were not allocated");
            return;
        };

        encoder.begin_sample(SSAO_SAMPLE_NAME);
        if !self.settings.after_opaque {
            encoder.set_global_keyword(names::SCREEN_SPACE_OCCLUSION, true);
        }

        if let Some(full) = self
            .allocator
            .bound_descriptor(TargetKind::SsaoOcclusion(2))
        {
            let (w, h) = (full.width as f32, full.height as f32);
            encoder.set_global_vector(names::SOURCE_SIZE, Vec4::new(w, h, 1.0 / w, 1.0 / h));
        }

        Self::render(encoder, material, tex1, passes::AO);
        Self::render_and_set_base_map(encoder, material, tex1, tex2, passes::BLUR_HORIZONTAL);
        Self::render_and_set_base_map(encoder, material, tex2, tex3, passes::BLUR_VERTICAL);
        Self::render_and_set_base_map(encoder, material, tex3, tex2, passes::BLUR_FINAL);

        encoder.set_global_texture(names::OCCLUSION_TEXTURE, TextureRef::Target(tex2));
        encoder.set_global_vector(
            names::AMBIENT_OCCLUSION_PARAM,
            Vec4::new(0.0, 0.0, 0.0, self.settings.direct_lighting_strength),
        );

        if self.settings.after_opaque {
            encoder.set_render_target(RenderTargetBinding::color(Attachment::new(
                camera.color_target,
                LoadAction::Load,
                StoreAction::Store,
            )));
            encoder.record(GpuCommand::DrawFullscreen {
                material,
                pass: passes::AFTER_OPAQUE,
            });
        }
        encoder.end_sample(SSAO_SAMPLE_NAME);
    }

    fn on_camera_cleanup(&mut self, encoder: &mut dyn CommandEncoder) {
        if !self.settings.after_opaque {
            encoder.set_global_keyword(names::SCREEN_SPACE_OCCLUSION, false);
        }
        for index in 1..=3 {
            self.allocator
                .release(encoder, TargetKind::SsaoOcclusion(index));
        }
    }
}
