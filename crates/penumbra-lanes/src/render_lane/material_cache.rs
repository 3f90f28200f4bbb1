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

//! A process-wide cache of light material variants keyed by feature bits.

use ahash::AHashMap;
use penumbra_core::renderer::{
    BlendMode, CommandEncoder, GpuCommand, Light2D, LightMaterial, LightMaterialKey, LightShaders,
    MaterialId, ShaderId,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Shader keywords a light material variant may enable.
pub mod keywords {
    /// The light is a sprite light.
    pub const SPRITE_LIGHT: &str = "SPRITE_LIGHT";
    /// The point light samples a cookie.
    pub const USE_POINT_LIGHT_COOKIES: &str = "USE_POINT_LIGHT_COOKIES";
    /// Fast normal-map approximation.
    pub const LIGHT_QUALITY_FAST: &str = "LIGHT_QUALITY_FAST";
    /// Normal mapping at any quality.
    pub const USE_NORMAL_MAP: &str = "USE_NORMAL_MAP";
    /// One/One blending.
    pub const USE_ADDITIVE_BLENDING: &str = "USE_ADDITIVE_BLENDING";
}

/// Maps packed [`LightMaterialKey`]s to immutable, shared variants.
///
/// The cache owns the shader families its variants are built from, so every
/// lane sharing it draws with the same shaders.
///
/// Lookups take the read lock. A miss takes the write lock and checks again
/// before building, so concurrent first resolves of one key produce a
/// single variant.
#[derive(Debug)]
pub struct MaterialVariantCache {
    shaders: LightShaders,
    variants: RwLock<AHashMap<u32, Arc<LightMaterial>>>,
    next_id: AtomicUsize,
}

impl MaterialVariantCache {
    /// Creates an empty cache building variants from `shaders`.
    pub fn new(shaders: LightShaders) -> Self {
        Self {
            shaders,
            variants: RwLock::new(AHashMap::new()),
            next_id: AtomicUsize::new(1),
        }
    }

    /// The shader families variants are built from.
    pub fn shaders(&self) -> &LightShaders {
        &self.shaders
    }

    /// Returns the variant for `light` in the regular or volumetric pass.
    ///
    /// `None` when the shader family the key needs was never loaded.
    pub fn resolve(&self, light: &Light2D, is_volume: bool) -> Option<Arc<LightMaterial>> {
        self.resolve_key(LightMaterialKey::for_light(light, is_volume))
    }

    /// Returns the variant for an explicit key.
    pub fn resolve_key(&self, key: LightMaterialKey) -> Option<Arc<LightMaterial>> {
        let bits = key.pack();
        {
            let variants = self.variants.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(material) = variants.get(&bits) {
                return Some(Arc::clone(material));
            }
        }

        let shader = self.shaders.family_for(&key)?;
        let mut variants = self.variants.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(material) = variants.get(&bits) {
            return Some(Arc::clone(material));
        }

        let material = Arc::new(self.build_variant(key, shader));
        log::debug!(
            "Created light material {:?} for key {:#09b}",
            material.id,
            bits
        );
        variants.insert(bits, Arc::clone(&material));
        Some(material)
    }

    fn build_variant(&self, key: LightMaterialKey, shader: ShaderId) -> LightMaterial {
        let mut enabled = Vec::new();
        let blend = if key.volume {
            None
        } else if key.additive {
            enabled.push(keywords::USE_ADDITIVE_BLENDING);
            Some(BlendMode::ADDITIVE)
        } else {
            Some(BlendMode::ALPHA_BLEND)
        };

        if key.sprite {
            enabled.push(keywords::SPRITE_LIGHT);
        }
        if key.point_cookie {
            enabled.push(keywords::USE_POINT_LIGHT_COOKIES);
        }
        if key.point_fast_quality {
            enabled.push(keywords::LIGHT_QUALITY_FAST);
        }
        if key.normal_map {
            enabled.push(keywords::USE_NORMAL_MAP);
        }

        LightMaterial {
            id: MaterialId(self.next_id.fetch_add(1, Ordering::Relaxed)),
            key,
            shader,
            blend,
            keywords: enabled,
        }
    }

    /// Looks a variant up by its handle, for the device consumer.
    pub fn get(&self, id: MaterialId) -> Option<Arc<LightMaterial>> {
        let variants = self.variants.read().unwrap_or_else(PoisonError::into_inner);
        variants.values().find(|m| m.id == id).cloned()
    }

    /// Number of cached variants.
    pub fn len(&self) -> usize {
        self.variants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records `DestroyMaterial` for every variant, ordered by key, and
    /// empties the cache. Returns the number destroyed.
    pub fn destroy_all(&self, encoder: &mut dyn CommandEncoder) -> usize {
        let mut variants = self.variants.write().unwrap_or_else(PoisonError::into_inner);
        let mut drained: Vec<_> = variants.drain().collect();
        drained.sort_unstable_by_key(|(bits, _)| *bits);
        for (_, material) in &drained {
            encoder.record(GpuCommand::DestroyMaterial {
                material: material.id,
            });
        }
        drained.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use penumbra_core::renderer::{
        CommandStream, LightKind, NormalMapQuality, OverlapOperation, PointLightGeometry, TextureId,
    };

    fn shaders() -> LightShaders {
        LightShaders {
            point: Some(ShaderId(1)),
            shape: Some(ShaderId(2)),
            point_volume: Some(ShaderId(3)),
            shape_volume: Some(ShaderId(4)),
        }
    }

    #[test]
    fn test_same_key_same_instance() {
        let cache = MaterialVariantCache::new(shaders());
        let a = Light2D::default();
        let b = Light2D {
            intensity: 7.0,
            ..Default::default()
        };
        let ma = cache.resolve(&a, false).expect("shape family");
        let mb = cache.resolve(&b, false).expect("shape family");
        assert!(Arc::ptr_eq(&ma, &mb));
        assert_eq!(cache.len(), 1);

        let volume = cache.resolve(&a, true).expect("volume family");
        assert!(!Arc::ptr_eq(&ma, &volume));
        assert_ne!(ma.id, volume.id);
    }

    #[test]
    fn test_blend_and_keywords() {
        let cache = MaterialVariantCache::new(shaders());
        let additive = Light2D {
            overlap: OverlapOperation::Additive,
            kind: LightKind::Sprite,
            ..Default::default()
        };
        let m = cache.resolve(&additive, false).expect("shape family");
        assert_eq!(m.blend, Some(BlendMode::ADDITIVE));
        assert!(m.has_keyword(keywords::USE_ADDITIVE_BLENDING));
        assert!(m.has_keyword(keywords::SPRITE_LIGHT));
        assert_eq!(m.shader, ShaderId(2));

        let v = cache.resolve(&additive, true).expect("volume family");
        assert_eq!(v.blend, None);
        assert!(!v.has_keyword(keywords::USE_ADDITIVE_BLENDING));

        let point = Light2D {
            cookie: Some(TextureId(3)),
            normal_map_quality: NormalMapQuality::Fast,
            ..Light2D::point(PointLightGeometry::default())
        };
        let p = cache.resolve(&point, false).expect("point family");
        assert_eq!(p.blend, Some(BlendMode::ALPHA_BLEND));
        assert_eq!(p.shader, ShaderId(1));
        for keyword in [
            keywords::USE_POINT_LIGHT_COOKIES,
            keywords::LIGHT_QUALITY_FAST,
            keywords::USE_NORMAL_MAP,
        ] {
            assert!(p.has_keyword(keyword), "{keyword}");
        }
    }

    #[test]
    fn test_missing_family_yields_none() {
        let cache = MaterialVariantCache::new(LightShaders {
            point: Some(ShaderId(1)),
            ..Default::default()
        });
        assert!(cache.resolve(&Light2D::default(), false).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_and_destroy_all() {
        let cache = MaterialVariantCache::new(shaders());
        let m = cache.resolve(&Light2D::default(), false).expect("shape family");
        cache.resolve(&Light2D::default(), true);
        assert_eq!(cache.get(m.id).map(|g| g.id), Some(m.id));

        let mut stream = CommandStream::new();
        assert_eq!(cache.destroy_all(&mut stream), 2);
        assert_eq!(stream.len(), 2);
        assert!(cache.is_empty());
        assert!(cache.get(m.id).is_none());
    }

    #[test]
    fn test_variants_use_the_cache_shader_set() {
        let first = MaterialVariantCache::new(shaders());
        let second = MaterialVariantCache::new(LightShaders {
            shape: Some(ShaderId(9)),
            ..shaders()
        });
        let a = first.resolve(&Light2D::default(), false).expect("shape family");
        let b = second.resolve(&Light2D::default(), false).expect("shape family");
        assert_eq!(a.shader, ShaderId(2));
        assert_eq!(b.shader, ShaderId(9));
        assert_eq!(second.shaders().shape, Some(ShaderId(9)));
    }
}
