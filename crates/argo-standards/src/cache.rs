//! Process-wide specification cache.
//!
//! Entries are keyed by `directory;type;version;pure` and built at most once
//! per key. Concurrent requests for the same key wait for the first build;
//! different keys build independently. A failed build is not cached.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use argo_model::FileType;
use tracing::debug;

use crate::error::Result;
use crate::registry::{LoadedSpec, StandardsRegistry};

type Slot = Arc<Mutex<Option<Arc<LoadedSpec>>>>;

#[derive(Debug, Default)]
pub struct SpecCache {
    entries: Mutex<HashMap<String, Slot>>,
}

static GLOBAL_CACHE: OnceLock<SpecCache> = OnceLock::new();

impl SpecCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared process-wide cache.
    pub fn global() -> &'static SpecCache {
        GLOBAL_CACHE.get_or_init(SpecCache::new)
    }

    pub fn key(spec_dir: &Path, file_type: FileType, version: &str) -> String {
        format!(
            "{};{};{};pure",
            spec_dir.display(),
            file_type.spec_type(),
            version.trim()
        )
    }

    pub fn get_or_load(
        &self,
        registry: &StandardsRegistry,
        file_type: FileType,
        version: &str,
    ) -> Result<Arc<LoadedSpec>> {
        let key = Self::key(registry.spec_dir(), file_type, version);
        let slot = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(entries.entry(key.clone()).or_default())
        };

        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(loaded) = guard.as_ref() {
            debug!(key = key.as_str(), "specification cache hit");
            return Ok(Arc::clone(loaded));
        }

        let loaded = Arc::new(registry.load_spec(file_type, version)?);
        debug!(key = key.as_str(), "specification cached");
        *guard = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Number of built entries.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .values()
            .filter(|slot| {
                slot.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
