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

//! Batching properties: bounded slots, ordered cover, one slot per caster.

mod common;

use common::{all_shaders, lookups, max_live_targets, shadow_caster, MockScene};
use penumbra_core::renderer::{
    CameraTargetDescriptor, CommandStream, GpuCommand, Light2D, LightKind, RenderTargetId,
    TextureFormat,
};
use penumbra_lanes::{
    plan_batches, BatchPhase, LightBatchScheduler, LightFrame, LightingError,
    MaterialVariantCache, RenderTargetAllocator,
};
use proptest::prelude::*;

fn light_strategy() -> impl Strategy<Value = Light2D> {
    (any::<bool>(), 0.0f32..1.0, 0usize..2, any::<bool>()).prop_map(
        |(shadows, intensity, blend_style_index, global)| {
            let mut light = if shadows {
                shadow_caster(intensity)
            } else {
                Light2D::default()
            };
            light.blend_style_index = blend_style_index;
            if global {
                light.kind = LightKind::Global;
            }
            light
        },
    )
}

fn record_light_set(
    scene: &MockScene,
    pool: usize,
    blend_style: usize,
) -> (Result<penumbra_lanes::BatchStats, LightingError>, CommandStream) {
    let mut stream = CommandStream::new();
    let mut allocator = RenderTargetAllocator::default();
    let camera = CameraTargetDescriptor::new(256, 128, TextureFormat::Rgba8Unorm);
    let materials = MaterialVariantCache::new(all_shaders());
    let lookups = lookups();
    let mut scheduler = LightBatchScheduler::new(pool);
    let mut frame = LightFrame {
        encoder: &mut stream,
        allocator: &mut allocator,
        camera: &camera,
        shadow_scale: 0.5,
        lights: &scene.lights,
        meshes: scene,
        shadow_casters: scene,
        materials: &materials,
        lookups: &lookups,
    };
    let result = scheduler.render_light_set(&mut frame, blend_style, 0, RenderTargetId(1));
    (result, stream)
}

proptest! {
    #[test]
    fn batches_cover_the_list_in_order(
        lights in prop::collection::vec(light_strategy(), 0..64),
        pool in 1usize..6,
    ) {
        let batches = plan_batches(&lights, pool, Light2D::casts_shadows).unwrap();
        let mut next = 0;
        for batch in &batches {
            prop_assert_eq!(batch.lights.start, next);
            prop_assert!(batch.lights.end > batch.lights.start);
            prop_assert!(batch.shadow_casters.len() <= pool);
            prop_assert!(batch.shadow_casters.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(batch.shadow_casters.iter().all(|i| batch.lights.contains(i)));
            next = batch.lights.end;
        }
        prop_assert_eq!(next, lights.len());

        let casters: Vec<usize> = batches.iter().flat_map(|b| b.shadow_casters.clone()).collect();
        let expected: Vec<usize> = (0..lights.len()).filter(|&i| lights[i].casts_shadows()).collect();
        prop_assert_eq!(casters, expected);
    }

    #[test]
    fn recorded_slots_never_exceed_the_pool(
        lights in prop::collection::vec(light_strategy(), 0..48),
        pool in 1usize..5,
    ) {
        let casters = lights.iter().filter(|l| l.casts_shadows()).count();
        let scene = MockScene::new(lights);
        let (result, stream) = record_light_set(&scene, pool, 0);
        let stats = result.unwrap();

        prop_assert!(stats.max_concurrent_slots <= pool);
        prop_assert_eq!(stats.slots_acquired, casters);
        prop_assert_eq!(stats.slots_released, casters);
        prop_assert!(max_live_targets(stream.commands()) <= pool);

        let prerenders = stream
            .iter()
            .filter(|c| matches!(c, GpuCommand::DrawShadowCasters { .. }))
            .count();
        prop_assert_eq!(prerenders, casters);
    }
}

#[test]
fn draws_keep_light_order() {
    let mut lights = Vec::new();
    for i in 0..9 {
        let mut light = if i % 3 == 0 {
            shadow_caster(0.7)
        } else {
            Light2D::default()
        };
        light.intensity = i as f32 + 1.0;
        lights.push(light);
    }
    let scene = MockScene::new(lights);
    let (result, stream) = record_light_set(&scene, 2, 0);
    assert_eq!(result.expect("valid pool").draws, 9);

    let meshes: Vec<usize> = stream
        .iter()
        .filter_map(|c| match c {
            GpuCommand::DrawMesh { mesh, .. } => Some(mesh.0 - 1000),
            _ => None,
        })
        .collect();
    assert_eq!(meshes, (0..9).collect::<Vec<_>>());
}

#[test]
fn shadowed_draw_samples_its_own_slot() {
    // The second caster is on another blend style: the third light must still
    // read the slot assigned to it, not the next one in draw order.
    let mut other_style = shadow_caster(0.5);
    other_style.blend_style_index = 1;
    let scene = MockScene::new(vec![shadow_caster(0.5), other_style, shadow_caster(0.25)]);
    let (result, stream) = record_light_set(&scene, 4, 0);
    assert_eq!(result.expect("valid pool").draws, 2);

    let shadow_targets: Vec<RenderTargetId> = stream
        .iter()
        .filter_map(|c| match c {
            GpuCommand::DrawShadowCasters { target, .. } => Some(*target),
            _ => None,
        })
        .collect();
    assert_eq!(shadow_targets.len(), 3);

    let sampled: Vec<RenderTargetId> = stream
        .iter()
        .filter_map(|c| match c {
            GpuCommand::SetGlobalTexture {
                name: "_ShadowTex",
                texture: penumbra_core::renderer::TextureRef::Target(id),
            } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(sampled, vec![shadow_targets[0], shadow_targets[2]]);
}

#[test]
fn missing_mesh_skips_only_that_light() {
    let mut scene = MockScene::new(vec![Light2D::default(); 3]);
    scene.meshless.insert(1);
    let (result, stream) = record_light_set(&scene, 1, 0);
    assert_eq!(result.expect("valid pool").draws, 2);
    assert_eq!(
        stream
            .iter()
            .filter(|c| matches!(c, GpuCommand::SetGlobalColor { .. }))
            .count(),
        2,
        "a skipped light records no uniforms"
    );
}

#[test]
fn scheduler_finishes_in_done_phase() {
    let scene = MockScene::new(vec![shadow_caster(1.0); 5]);
    let mut stream = CommandStream::new();
    let mut allocator = RenderTargetAllocator::default();
    let camera = CameraTargetDescriptor::new(64, 64, TextureFormat::Rgba8Unorm);
    let materials = MaterialVariantCache::new(all_shaders());
    let lookups = lookups();
    let mut scheduler = LightBatchScheduler::new(2);
    assert_eq!(scheduler.phase(), BatchPhase::Idle);

    let mut frame = LightFrame {
        encoder: &mut stream,
        allocator: &mut allocator,
        camera: &camera,
        shadow_scale: 1.0,
        lights: &scene.lights,
        meshes: &scene,
        shadow_casters: &scene,
        materials: &materials,
        lookups: &lookups,
    };
    let stats = scheduler
        .render_light_set(&mut frame, 0, 0, RenderTargetId(1))
        .expect("valid pool");
    assert_eq!(stats.batches, 3);
    assert_eq!(scheduler.phase(), BatchPhase::Done);
    assert_eq!(max_live_targets(stream.commands()), 2);
}
