//! One-entry cache for the default branding package.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::metrics::ContentMetrics;
use crate::render::Branding;

struct CachedBranding {
    /// `None` records that no default package exists
    value: Option<Branding>,
    loaded_at: Instant,
}

/// Caches the default branding lookup for a fixed TTL.
///
/// Branding writes must call [`BrandingCache::invalidate`]. Loaders take a
/// [`BrandingCache::generation`] before reading the store and hand it back
/// to [`BrandingCache::put`], which drops values loaded before the last
/// invalidation.
pub struct BrandingCache {
    ttl: Duration,
    slot: RwLock<Option<CachedBranding>>,
    generation: AtomicU64,
}

impl BrandingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Current invalidation generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Cached value, or `None` on a miss or after expiry.
    pub fn get(&self) -> Option<Option<Branding>> {
        self.get_at(Instant::now())
    }

    fn get_at(&self, now: Instant) -> Option<Option<Branding>> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        let hit = slot
            .as_ref()
            .filter(|cached| now.duration_since(cached.loaded_at) < self.ttl)
            .map(|cached| cached.value.clone());

        match hit {
            Some(_) => ContentMetrics::record_branding_cache_hit(),
            None => ContentMetrics::record_branding_cache_miss(),
        }
        hit
    }

    /// Store a value loaded at `generation`. Returns `false` and keeps the
    /// slot empty when an invalidation happened since.
    pub fn put(&self, value: Option<Branding>, generation: u64) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        if self.generation.load(Ordering::Acquire) != generation {
            tracing::debug!("Discarding default branding loaded before an invalidation");
            return false;
        }
        *slot = Some(CachedBranding {
            value,
            loaded_at: Instant::now(),
        });
        true
    }

    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        self.generation.fetch_add(1, Ordering::AcqRel);
        if slot.take().is_some() {
            tracing::debug!("Default branding cache invalidated");
        }
    }
}
