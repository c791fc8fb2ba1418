//! Process-wide table of named filter types.
//!
//! Types are registered once at startup and read by every session. Entries
//! are immutable function + defaults pairs, so sessions share them freely.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use super::{FilterConfig, FilterContext, FilterFn};
use crate::surface::Surface;

struct FilterType {
    process: FilterFn,
    defaults: FilterConfig,
}

fn registry() -> &'static RwLock<HashMap<String, FilterType>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, FilterType>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register a filter type under `name`. A later registration of the same name
/// replaces the earlier one.
pub fn register_filter<F>(name: &str, process: F, defaults: FilterConfig)
where
    F: Fn(&mut Surface, &FilterContext<'_>) + Send + Sync + 'static,
{
    let mut table = registry().write().unwrap_or_else(PoisonError::into_inner);
    let replaced = table
        .insert(
            name.to_string(),
            FilterType {
                process: Arc::new(process),
                defaults,
            },
        )
        .is_some();
    tracing::debug!(filter = name, replaced, "filter type registered");
}

pub fn is_registered(name: &str) -> bool {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(name)
}

/// Process function and a copy of the defaults for `name`.
pub(crate) fn lookup(name: &str) -> Option<(FilterFn, FilterConfig)> {
    let table = registry().read().unwrap_or_else(PoisonError::into_inner);
    table
        .get(name)
        .map(|ty| (Arc::clone(&ty.process), ty.defaults.clone()))
}
