//! Load-once cache cell.

use crate::error::Result;

/// Value materialized on first access and kept for the owner's lifetime.
///
/// A failed load leaves the cell empty, so the next access retries.
#[derive(Clone, Debug)]
pub struct Lazy<T> {
    cached: Option<T>,
}

impl<T> Default for Lazy<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Lazy<T> {
    /// Unloaded cell.
    pub fn empty() -> Self {
        Self { cached: None }
    }

    /// Cell that is already loaded.
    pub fn loaded(value: T) -> Self {
        Self {
            cached: Some(value),
        }
    }

    /// Whether the value has been materialized.
    pub fn is_loaded(&self) -> bool {
        self.cached.is_some()
    }

    /// Cached value, if loaded.
    pub fn get(&self) -> Option<&T> {
        self.cached.as_ref()
    }

    /// Cached value, loading it with `load` on first access.
    pub fn get_or_load<F>(&mut self, load: F) -> Result<&T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(value) = self.cached.take() {
            return Ok(self.cached.insert(value));
        }
        let value = load()?;
        Ok(self.cached.insert(value))
    }
}
