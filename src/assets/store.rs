use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use image::RgbImage;
use lru::LruCache;

use crate::{assets::decode::load_base_image, foundation::error::PinmarkResult};

/// Resolves a base-image path into decoded pixels.
///
/// The annotation pipeline only talks to this trait, so callers decide whether decoded images
/// are kept around between invocations.
pub trait ImageSource: Send + Sync {
    /// Load (or fetch) the decoded RGB raster for `path`.
    fn load(&self, path: &Path) -> PinmarkResult<Arc<RgbImage>>;
}

/// Decode from disk on every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct UncachedSource;

impl ImageSource for UncachedSource {
    fn load(&self, path: &Path) -> PinmarkResult<Arc<RgbImage>> {
        Ok(Arc::new(load_base_image(path)?))
    }
}

/// Read-through cache of decoded base images, bounded by decoded byte size.
///
/// Least recently used entries are evicted once the resident size exceeds the budget. An image
/// larger than the whole budget is returned but never stored; a budget of `0` disables storage.
pub struct ImageCache {
    budget_bytes: usize,
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    entries: LruCache<PathBuf, Arc<RgbImage>>,
    resident_bytes: usize,
    decodes: u64,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ImageCache")
            .field("budget_bytes", &self.budget_bytes)
            .field("entries", &inner.entries.len())
            .field("resident_bytes", &inner.resident_bytes)
            .finish()
    }
}

impl ImageCache {
    /// Create an empty cache holding at most `budget_bytes` of decoded pixels.
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            budget_bytes,
            inner: Mutex::new(CacheInner {
                entries: LruCache::unbounded(),
                resident_bytes: 0,
                decodes: 0,
            }),
        }
    }

    /// Configured byte budget.
    pub fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }

    /// Number of resident images.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Return `true` when nothing is resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decoded bytes currently resident.
    pub fn resident_bytes(&self) -> usize {
        self.lock().resident_bytes
    }

    /// Total number of images this cache has decoded from disk.
    pub fn decode_count(&self) -> u64 {
        self.lock().decodes
    }

    /// Return `true` when `path` is resident.
    pub fn contains(&self, path: &Path) -> bool {
        self.lock().entries.contains(&cache_key(path))
    }

    /// Drop every resident image.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.resident_bytes = 0;
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageSource for ImageCache {
    fn load(&self, path: &Path) -> PinmarkResult<Arc<RgbImage>> {
        let key = cache_key(path);
        if let Some(img) = self.lock().entries.get(&key) {
            tracing::debug!(path = %key.display(), "base image cache hit");
            return Ok(Arc::clone(img));
        }

        // Decode without holding the lock; a concurrent miss on the same key decodes twice and
        // the later insert wins.
        let img = Arc::new(load_base_image(path)?);
        let size = img.as_raw().len();

        let mut inner = self.lock();
        inner.decodes += 1;
        if size == 0 || size > self.budget_bytes {
            tracing::debug!(
                path = %key.display(),
                size,
                budget = self.budget_bytes,
                "base image not cached"
            );
            return Ok(img);
        }

        if let Some(old) = inner.entries.put(key, Arc::clone(&img)) {
            inner.resident_bytes -= old.as_raw().len();
        }
        inner.resident_bytes += size;

        while inner.resident_bytes > self.budget_bytes {
            let Some((evicted, old)) = inner.entries.pop_lru() else {
                break;
            };
            inner.resident_bytes -= old.as_raw().len();
            tracing::debug!(path = %evicted.display(), "evicted base image");
        }

        Ok(img)
    }
}

fn cache_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
