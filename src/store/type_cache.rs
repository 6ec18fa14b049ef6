//! Shared cache of parsed types

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::core::Type;
use crate::Result;

/// Thread-safe cache of parsed type signatures
///
/// Entries are keyed by the raw signature and by its canonical form, so
/// `uint` and `uint256` share one parsed tree. Cached types keep their
/// memoized head sizes, which makes repeated encode/decode calls cheap.
#[derive(Debug, Default)]
pub struct TypeCache {
    entries: RwLock<HashMap<String, Arc<Type>>>,
}

impl TypeCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached type, parsing and inserting it on a miss
    pub fn get_or_parse(&self, signature: &str) -> Result<Arc<Type>> {
        let key = signature.trim();
        if let Some(ty) = self.read().get(key) {
            return Ok(Arc::clone(ty));
        }

        let parsed = Type::parse(key)?;
        let canonical = parsed.format(true);

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let ty = Arc::clone(
            entries
                .entry(canonical.clone())
                .or_insert_with(|| Arc::new(parsed)),
        );
        if key != canonical {
            entries.insert(key.to_string(), Arc::clone(&ty));
        }
        debug!(signature = key, canonical = %canonical, "cached type");
        Ok(ty)
    }

    /// Number of cached keys
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<Type>>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
