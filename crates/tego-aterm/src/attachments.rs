//! Typed metadata attached to terms

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
struct Entry {
    key: TypeId,
    name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

/// An immutable set of attachments, at most one per type
///
/// Setting or removing an attachment returns a new set; the original is
/// unchanged. Cloning is cheap: the entries are shared until modified.
#[derive(Clone, Default)]
pub struct Attachments {
    entries: Arc<Vec<Entry>>,
}

impl Attachments {
    /// The empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attachments
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no attachments
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The attachment of type `T`, if any
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        let key = TypeId::of::<T>();
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .and_then(|entry| entry.value.downcast_ref::<T>())
    }

    /// Whether an attachment of type `T` is present
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.get::<T>().is_some()
    }

    /// A copy with `value` as the attachment of type `T`, replacing any previous one
    pub fn with<T: Any + Send + Sync>(&self, value: T) -> Self {
        let key = TypeId::of::<T>();
        let mut entries = Arc::clone(&self.entries);
        let list = Arc::make_mut(&mut entries);
        let entry = Entry {
            key,
            name: type_name::<T>(),
            value: Arc::new(value),
        };
        match list.iter_mut().find(|e| e.key == key) {
            Some(existing) => *existing = entry,
            None => list.push(entry),
        }
        Self { entries }
    }

    /// A copy without the attachment of type `T`
    pub fn without<T: Any + Send + Sync>(&self) -> Self {
        let key = TypeId::of::<T>();
        if !self.entries.iter().any(|e| e.key == key) {
            return self.clone();
        }
        let entries = self
            .entries
            .iter()
            .filter(|e| e.key != key)
            .cloned()
            .collect();
        Self {
            entries: Arc::new(entries),
        }
    }
}

impl fmt::Debug for Attachments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.entries.iter().map(|e| e.name))
            .finish()
    }
}
