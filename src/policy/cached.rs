// ABOUTME: Read-through memo in front of an allow-list store for hot inspection paths.
// ABOUTME: Each memo map is cleared when it fills up or when invalidate() is called.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::store::AllowlistStore;
use super::types::MethodDescriptor;

/// Default number of memoized answers per map.
pub const DEFAULT_MEMO_CAPACITY: usize = 4096;

/// Memoizes class and method lookups of an inner store.
///
/// Callers that edit the underlying allow-list must call [`invalidate`](Self::invalidate).
pub struct CachedAllowlist<S> {
    inner: S,
    capacity: usize,
    classes: RwLock<HashMap<String, bool>>,
    methods: RwLock<HashMap<(String, String), Vec<MethodDescriptor>>>,
}

impl<S: AllowlistStore> CachedAllowlist<S> {
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, DEFAULT_MEMO_CAPACITY)
    }

    /// A memo holding at most `capacity` answers per map. Zero disables memoization.
    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        Self {
            inner,
            capacity,
            classes: RwLock::new(HashMap::new()),
            methods: RwLock::new(HashMap::new()),
        }
    }

    /// Drop every memoized answer.
    pub fn invalidate(&self) {
        self.classes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.methods
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: AllowlistStore> AllowlistStore for CachedAllowlist<S> {
    fn is_class_allowed(&self, type_name: &str) -> bool {
        if let Some(&hit) = self
            .classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name)
        {
            return hit;
        }
        let allowed = self.inner.is_class_allowed(type_name);
        let mut classes = self.classes.write().unwrap_or_else(PoisonError::into_inner);
        if make_room(&mut classes, self.capacity) {
            classes.insert(type_name.to_string(), allowed);
        }
        allowed
    }

    fn allowed_methods(&self, type_name: &str, method_name: &str) -> Vec<MethodDescriptor> {
        let key = (type_name.to_string(), method_name.to_string());
        if let Some(hit) = self
            .methods
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return hit.clone();
        }
        let descriptors = self.inner.allowed_methods(type_name, method_name);
        let mut methods = self.methods.write().unwrap_or_else(PoisonError::into_inner);
        if make_room(&mut methods, self.capacity) {
            methods.insert(key, descriptors.clone());
        }
        descriptors
    }
}

/// Clear a full memo map. Returns whether an entry may be inserted.
fn make_room<K, V>(map: &mut HashMap<K, V>, capacity: usize) -> bool {
    if capacity == 0 {
        return false;
    }
    if map.len() >= capacity {
        map.clear();
    }
    true
}
