//! Shared state for views and component models.

use std::{
    ops::{Deref, DerefMut},
    sync::{Arc, PoisonError, RwLock},
};

/// A "shared" value.
///
/// Equivalent to `Arc<RwLock<T>>`. Clones point at the same value, which is
/// how in-memory views hand their state to tests and to the components that
/// update them.
#[derive(Default)]
pub struct Shared<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Shared").field(self.get().deref()).finish()
    }
}

impl<T: 'static> From<T> for Shared<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> Shared<T> {
    /// Create a new shared `T`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Get a reference to the inner `T`.
    pub fn get(&self) -> impl Deref<Target = T> + '_ {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a mutable reference to the inner `T`.
    pub fn get_mut(&self) -> impl DerefMut<Target = T> + '_ {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the inner `T`.
    ///
    /// Returns the previous value.
    pub fn set(&self, value: T) -> T {
        let mut guard = self.get_mut();
        std::mem::replace(guard.deref_mut(), value)
    }

    /// Take the inner `T`, leaving the default in its place.
    pub fn take(&self) -> T
    where
        T: Default,
    {
        self.set(T::default())
    }
}

impl<T: Clone> Shared<T> {
    /// Clone out the inner `T`.
    pub fn cloned(&self) -> T {
        self.get().clone()
    }
}
