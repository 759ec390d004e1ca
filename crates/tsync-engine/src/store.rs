//! Persistence interface for mappings and last-used selections
//!
//! Storage is best-effort: implementations log and swallow their own
//! failures, so nothing here returns a `Result`. A failed save simply means the
//! mapping is guessed again next time.

use std::collections::HashMap;
use std::sync::Mutex;
use tsync_common::types::{Destination, Selection};

use crate::mapping::FieldMapping;

/// Which remembered choice a selection refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionKind {
    Site,
    List,
}

impl SelectionKind {
    /// Storage key of the remembered selection
    pub fn storage_key(self) -> &'static str {
        match self {
            SelectionKind::Site => "lastSelectedSite",
            SelectionKind::List => "lastSelectedList",
        }
    }
}

/// Key-value persistence for mappings and selections
pub trait MappingStore: Send + Sync {
    /// Saved mapping for `destination`, if any
    fn load(&self, destination: &Destination) -> Option<FieldMapping>;

    fn save(&self, destination: &Destination, mapping: &FieldMapping);

    fn delete(&self, destination: &Destination);

    fn load_last_selection(&self, kind: SelectionKind) -> Option<Selection>;

    fn save_last_selection(&self, kind: SelectionKind, selection: &Selection);

    /// Remove the remembered selection of `kind`
    fn forget_last_selection(&self, kind: SelectionKind);

    /// Remove every saved mapping and selection
    fn clear_all(&self);
}

#[derive(Debug, Default)]
struct MemoryState {
    mappings: HashMap<String, FieldMapping>,
    selections: HashMap<SelectionKind, Selection>,
}

/// Process-local store, mainly for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryMappingStore {
    state: Mutex<MemoryState>,
}

impl MemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saved mappings
    pub fn mapping_count(&self) -> usize {
        self.state.lock().map(|s| s.mappings.len()).unwrap_or(0)
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MemoryState) -> R) -> Option<R> {
        match self.state.lock() {
            Ok(mut state) => Some(f(&mut state)),
            Err(_) => {
                tracing::warn!("Mapping store lock poisoned; ignoring operation");
                None
            },
        }
    }
}

impl MappingStore for MemoryMappingStore {
    fn load(&self, destination: &Destination) -> Option<FieldMapping> {
        self.with_state(|s| s.mappings.get(&destination.mapping_key()).cloned())
            .flatten()
    }

    fn save(&self, destination: &Destination, mapping: &FieldMapping) {
        self.with_state(|s| s.mappings.insert(destination.mapping_key(), mapping.clone()));
    }

    fn delete(&self, destination: &Destination) {
        self.with_state(|s| s.mappings.remove(&destination.mapping_key()));
    }

    fn load_last_selection(&self, kind: SelectionKind) -> Option<Selection> {
        self.with_state(|s| s.selections.get(&kind).cloned()).flatten()
    }

    fn save_last_selection(&self, kind: SelectionKind, selection: &Selection) {
        self.with_state(|s| s.selections.insert(kind, selection.clone()));
    }

    fn forget_last_selection(&self, kind: SelectionKind) {
        self.with_state(|s| s.selections.remove(&kind));
    }

    fn clear_all(&self) {
        self.with_state(|s| {
            s.mappings.clear();
            s.selections.clear();
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tsync_common::types::FieldKey;

    #[test]
    fn test_mappings_are_scoped_by_destination() {
        let store = MemoryMappingStore::new();
        let a = Destination::new("site", "list-a");
        let b = Destination::new("site", "list-b");
        let mapping = FieldMapping::new().with_entry(FieldKey::Subject, Some("Title"));

        store.save(&a, &mapping);

        assert_eq!(store.load(&a), Some(mapping));
        assert_eq!(store.load(&b), None);

        store.delete(&a);
        assert_eq!(store.load(&a), None);
    }

    #[test]
    fn test_selections_and_clear_all() {
        let store = MemoryMappingStore::new();
        let site = Selection::new("site-1", "Helpdesk");
        store.save_last_selection(SelectionKind::Site, &site);
        store.save_last_selection(SelectionKind::List, &Selection::new("list-1", "Tickets"));
        store.save(&Destination::new("site-1", "list-1"), &FieldMapping::new());

        assert_eq!(store.load_last_selection(SelectionKind::Site), Some(site));
        store.forget_last_selection(SelectionKind::List);
        assert_eq!(store.load_last_selection(SelectionKind::List), None);

        store.clear_all();
        assert_eq!(store.load_last_selection(SelectionKind::Site), None);
        assert_eq!(store.mapping_count(), 0);
    }

    #[test]
    fn test_selection_storage_keys() {
        assert_eq!(SelectionKind::Site.storage_key(), "lastSelectedSite");
        assert_eq!(SelectionKind::List.storage_key(), "lastSelectedList");
    }
}
