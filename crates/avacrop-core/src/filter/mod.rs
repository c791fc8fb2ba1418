//! Post-processing filters applied after each render.
//!
//! ## Pipeline
//!
//! A [`FilterPipeline`] is an ordered list of uniquely named passes. Each pass
//! receives the surface right after the image draw (or after the previous
//! pass) and edits its pixels in place. Insertion order is application order.
//!
//! ## Filter Types
//!
//! A pass is either a custom function supplied at add time, or a named type
//! looked up in the process-wide [`registry`]. Registered types carry default
//! configuration; add-time overrides are merged over the defaults.

pub mod builtin;
pub mod registry;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::surface::Surface;
use crate::transform::TransformState;

pub use builtin::register_builtin_filters;
pub use registry::{is_registered, register_filter};

/// Filter configuration: string keys to arbitrary JSON values.
pub type FilterConfig = serde_json::Map<String, Value>;

/// A filter pass. Shared so the registry and every session can hold it.
pub type FilterFn = Arc<dyn Fn(&mut Surface, &FilterContext<'_>) + Send + Sync>;

/// What a pass sees besides the surface.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    pub name: &'a str,
    pub config: &'a FilterConfig,
    pub transform: TransformState,
    /// Source image `(width, height)` in pixels.
    pub image_size: (u32, u32),
}

impl FilterContext<'_> {
    /// Numeric config value, or `default` when missing or not a number.
    pub fn number(&self, key: &str, default: f64) -> f64 {
        self.config
            .get(key)
            .and_then(Value::as_f64)
            .unwrap_or(default)
    }

    /// Boolean config value, or `default` when missing or not a bool.
    pub fn flag(&self, key: &str, default: bool) -> bool {
        self.config
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }
}

/// How to build a filter entry in [`FilterPipeline::add`].
#[derive(Clone)]
pub enum FilterSource {
    /// A pass supplied directly, with its own starting config.
    Custom {
        process: FilterFn,
        config: FilterConfig,
    },
    /// A type from the registry, with overrides merged over its defaults.
    Registered { overrides: FilterConfig },
}

impl FilterSource {
    pub fn custom<F>(process: F) -> Self
    where
        F: Fn(&mut Surface, &FilterContext<'_>) + Send + Sync + 'static,
    {
        FilterSource::Custom {
            process: Arc::new(process),
            config: FilterConfig::new(),
        }
    }

    pub fn registered() -> Self {
        FilterSource::Registered {
            overrides: FilterConfig::new(),
        }
    }

    /// Replace the config (custom) or the overrides (registered).
    pub fn with_config(mut self, new_config: FilterConfig) -> Self {
        match &mut self {
            FilterSource::Custom { config, .. } => *config = new_config,
            FilterSource::Registered { overrides } => *overrides = new_config,
        }
        self
    }
}

impl fmt::Debug for FilterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSource::Custom { config, .. } => {
                f.debug_struct("Custom").field("config", config).finish()
            }
            FilterSource::Registered { overrides } => f
                .debug_struct("Registered")
                .field("overrides", overrides)
                .finish(),
        }
    }
}

/// A named pass in a pipeline.
#[derive(Clone)]
pub struct FilterEntry {
    name: String,
    process: FilterFn,
    config: FilterConfig,
}

impl FilterEntry {
    pub fn new(name: impl Into<String>, process: FilterFn, config: FilterConfig) -> Self {
        Self {
            name: name.into(),
            process,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Merge keys into the config; keys not in `partial` are kept.
    pub fn merge_config(&mut self, partial: FilterConfig) {
        for (key, value) in partial {
            self.config.insert(key, value);
        }
    }

    pub fn apply(&self, surface: &mut Surface, transform: TransformState, image_size: (u32, u32)) {
        let ctx = FilterContext {
            name: &self.name,
            config: &self.config,
            transform,
            image_size,
        };
        (self.process)(surface, &ctx);
    }
}

impl fmt::Debug for FilterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEntry")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Ordered, uniquely named filter passes.
#[derive(Debug, Clone, Default)]
pub struct FilterPipeline {
    entries: Vec<FilterEntry>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pass. Returns `false` without changes when the name is taken
    /// or a registered type is requested that does not exist.
    pub fn add(&mut self, name: &str, source: FilterSource) -> bool {
        if self.has(name) {
            tracing::debug!(filter = name, "filter already present, ignoring add");
            return false;
        }

        let entry = match source {
            FilterSource::Custom { process, config } => FilterEntry::new(name, process, config),
            FilterSource::Registered { overrides } => {
                let Some((process, defaults)) = registry::lookup(name) else {
                    tracing::debug!(filter = name, "filter type not registered, ignoring add");
                    return false;
                };
                let mut entry = FilterEntry::new(name, process, defaults);
                entry.merge_config(overrides);
                entry
            }
        };

        tracing::debug!(filter = name, "filter added");
        self.entries.push(entry);
        true
    }

    /// Remove a pass by name. Returns whether one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.entries.iter().position(|e| e.name == name) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn remove_all(&mut self) {
        self.entries.clear();
    }

    /// Merge `partial` into the named pass's config. Returns whether it exists.
    pub fn update(&mut self, name: &str, partial: FilterConfig) -> bool {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.merge_config(partial);
                true
            }
            None => false,
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&FilterEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every pass in insertion order.
    pub fn apply_all(
        &self,
        surface: &mut Surface,
        transform: TransformState,
        image_size: (u32, u32),
    ) {
        for entry in &self.entries {
            entry.apply(surface, transform, image_size);
        }
    }
}
