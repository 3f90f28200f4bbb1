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

//! A shadow pool of zero aborts with one logged error and no commands.
//!
//! Lives in its own test binary because it installs a global logger.

mod common;

use common::{all_shaders, lookups, shadow_caster, MockScene};
use log::{Level, LevelFilter, Log, Metadata, Record};
use penumbra_core::renderer::{
    CameraTargetDescriptor, CommandStream, Light2D, RenderTargetId, TextureFormat,
};
use penumbra_lanes::{
    plan_batches, LightBatchScheduler, LightFrame, LightingError, MaterialVariantCache,
    RenderTargetAllocator,
};
use std::sync::atomic::{AtomicUsize, Ordering};

struct ErrorCounter {
    errors: AtomicUsize,
}

impl Log for ErrorCounter {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if record.level() == Level::Error {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn flush(&self) {}
}

static LOGGER: ErrorCounter = ErrorCounter {
    errors: AtomicUsize::new(0),
};

fn errors_during<F: FnOnce()>(f: F) -> usize {
    let before = LOGGER.errors.load(Ordering::SeqCst);
    f();
    LOGGER.errors.load(Ordering::SeqCst) - before
}

fn record_with_empty_pool(lights: Vec<Light2D>) -> (Result<(), LightingError>, usize) {
    let scene = MockScene::new(lights);
    let mut stream = CommandStream::new();
    let mut allocator = RenderTargetAllocator::default();
    let camera = CameraTargetDescriptor::new(32, 32, TextureFormat::Rgba8Unorm);
    let materials = MaterialVariantCache::new(all_shaders());
    let lookups = lookups();
    let mut scheduler = LightBatchScheduler::new(0);
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
    let result = scheduler
        .render_light_set(&mut frame, 0, 0, RenderTargetId(1))
        .map(|_| ());
    (result, stream.len())
}

// Everything runs in one test so no other test thread logs concurrently.
#[test]
fn empty_pool_logs_once_and_records_nothing() {
    log::set_logger(&LOGGER).expect("no logger installed yet");
    log::set_max_level(LevelFilter::Trace);

    for count in [0usize, 1, 10_000] {
        let lights = (0..count)
            .map(|i| {
                if i % 2 == 0 {
                    shadow_caster(0.5)
                } else {
                    Light2D::default()
                }
            })
            .collect();

        let mut outcome = None;
        let errors = errors_during(|| outcome = Some(record_with_empty_pool(lights)));
        let (result, recorded) = outcome.expect("closure ran");

        assert_eq!(errors, 1, "{count} lights");
        assert_eq!(recorded, 0, "{count} lights");
        assert!(matches!(result, Err(LightingError::InvalidShadowPoolSize(0))));
    }

    let errors = errors_during(|| {
        let planned = plan_batches(&[], 0, Light2D::casts_shadows);
        assert!(planned.is_err());
    });
    assert_eq!(errors, 1);
}
