//! Managed object handles
//!
//! Objects are shared through reference-counted handles. Identity is the
//! allocation address, never structural content.

use std::sync::Arc;

/// Handle to a managed heap object
///
/// Cloning the handle shares the object; equality is reference identity.
pub struct GcRef<T>(Arc<T>);

impl<T> GcRef<T> {
    /// Allocate a new managed object
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Raw address of the managed object
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        Arc::as_ptr(&self.0)
    }

    /// Reference identity
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl<T> Clone for GcRef<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> std::ops::Deref for GcRef<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> PartialEq for GcRef<T> {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl<T> Eq for GcRef<T> {}

impl<T> std::hash::Hash for GcRef<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_ptr().hash(state);
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for GcRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_not_structure() {
        let a = GcRef::new(42);
        let b = GcRef::new(42);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(*a, *b);
    }
}
