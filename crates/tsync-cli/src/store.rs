//! File-backed mapping store
//!
//! All state lives in one JSON document, `state.json`, in the state
//! directory:
//!
//! ```json
//! {
//!   "mappings": { "fieldMapping_<site>_<list>": { "subject": "Title" } },
//!   "lastSelectedSite": { "id": "...", "name": "..." },
//!   "lastSelectedList": { "id": "...", "name": "..." }
//! }
//! ```
//!
//! Entries that cannot be parsed are skipped with a warning. A file that is
//! not a JSON object at all is moved to `state.json.bak` before the next write
//! replaces it; a file that cannot be read is never overwritten.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};
use tsync_common::types::{Destination, Selection};
use tsync_engine::mapping::FieldMapping;
use tsync_engine::store::{MappingStore, SelectionKind};

/// File name of the state document
pub const STATE_FILE: &str = "state.json";

/// Extension given to an unparseable state file when it is moved aside
pub const BACKUP_EXTENSION: &str = "json.bak";

#[derive(Debug, Default, Serialize)]
struct StateDocument {
    mappings: BTreeMap<String, FieldMapping>,

    #[serde(rename = "lastSelectedSite", skip_serializing_if = "Option::is_none")]
    last_selected_site: Option<Selection>,

    #[serde(rename = "lastSelectedList", skip_serializing_if = "Option::is_none")]
    last_selected_list: Option<Selection>,
}

impl StateDocument {
    fn selection(&mut self, kind: SelectionKind) -> &mut Option<Selection> {
        match kind {
            SelectionKind::Site => &mut self.last_selected_site,
            SelectionKind::List => &mut self.last_selected_list,
        }
    }

    /// Document from a parsed root object, keeping every entry that parses
    fn from_json(mut root: Map<String, Value>) -> Self {
        let mut document = Self::default();

        match root.remove("mappings") {
            Some(Value::Object(mappings)) => {
                for (key, value) in mappings {
                    match serde_json::from_value::<FieldMapping>(value) {
                        Ok(mapping) => {
                            document.mappings.insert(key, mapping);
                        },
                        Err(e) => warn!(key = %key, error = %e, "Skipping unreadable mapping entry"),
                    }
                }
            },
            Some(Value::Null) | None => {},
            Some(other) => warn!(value = %other, "Ignoring malformed mappings section"),
        }

        for kind in [SelectionKind::Site, SelectionKind::List] {
            let Some(value) = root.remove(kind.storage_key()) else {
                continue;
            };
            match serde_json::from_value::<Option<Selection>>(value) {
                Ok(selection) => *document.selection(kind) = selection,
                Err(e) => warn!(key = kind.storage_key(), error = %e, "Skipping unreadable selection"),
            }
        }

        document
    }
}

/// State file as found on disk
enum StoredState {
    Loaded(StateDocument),
    /// Present but not a JSON object
    Corrupt,
    /// Present but could not be read
    Unreadable,
}

/// [`MappingStore`] over `state.json`
#[derive(Debug)]
pub struct FileMappingStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within the process
    lock: Mutex<()>,
}

impl FileMappingStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(STATE_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unparseable state file is moved before being replaced
    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension(BACKUP_EXTENSION)
    }

    fn read(&self) -> StoredState {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return StoredState::Loaded(StateDocument::default())
            },
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read state file");
                return StoredState::Unreadable;
            },
        };

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(root)) => StoredState::Loaded(StateDocument::from_json(root)),
            Ok(_) => {
                warn!(path = %self.path.display(), "State file is not a JSON object; ignoring it");
                StoredState::Corrupt
            },
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "State file is not valid JSON; ignoring it");
                StoredState::Corrupt
            },
        }
    }

    /// Current document, empty when the file is missing or unusable
    fn document(&self) -> StateDocument {
        match self.read() {
            StoredState::Loaded(document) => document,
            StoredState::Corrupt | StoredState::Unreadable => StateDocument::default(),
        }
    }

    fn write(&self, document: &StateDocument) {
        if let Err(e) = self.try_write(document) {
            warn!(path = %self.path.display(), error = %e, "Failed to write state file");
        }
    }

    fn try_write(&self, document: &StateDocument) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)
    }

    fn update(&self, f: impl FnOnce(&mut StateDocument)) {
        let _guard = match self.lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut document = match self.read() {
            StoredState::Loaded(document) => document,
            StoredState::Corrupt => {
                let backup = self.backup_path();
                if let Err(e) = std::fs::rename(&self.path, &backup) {
                    warn!(path = %self.path.display(), error = %e, "Could not move unparseable state file aside; change not saved");
                    return;
                }
                warn!(backup = %backup.display(), "Moved unparseable state file aside");
                StateDocument::default()
            },
            StoredState::Unreadable => {
                warn!(path = %self.path.display(), "State file is unreadable; change not saved");
                return;
            },
        };

        f(&mut document);
        self.write(&document);
    }
}

impl MappingStore for FileMappingStore {
    fn load(&self, destination: &Destination) -> Option<FieldMapping> {
        self.document().mappings.remove(&destination.mapping_key())
    }

    fn save(&self, destination: &Destination, mapping: &FieldMapping) {
        debug!(destination = %destination, fields = mapping.len(), "Saving mapping");
        self.update(|doc| {
            doc.mappings.insert(destination.mapping_key(), mapping.clone());
        });
    }

    fn delete(&self, destination: &Destination) {
        self.update(|doc| {
            doc.mappings.remove(&destination.mapping_key());
        });
    }

    fn load_last_selection(&self, kind: SelectionKind) -> Option<Selection> {
        self.document().selection(kind).take()
    }

    fn save_last_selection(&self, kind: SelectionKind, selection: &Selection) {
        debug!(key = kind.storage_key(), id = %selection.id, "Saving selection");
        self.update(|doc| *doc.selection(kind) = Some(selection.clone()));
    }

    fn forget_last_selection(&self, kind: SelectionKind) {
        self.update(|doc| *doc.selection(kind) = None);
    }

    fn clear_all(&self) {
        self.update(|doc| *doc = StateDocument::default());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tsync_common::types::FieldKey;

    fn store() -> (TempDir, FileMappingStore) {
        let dir = TempDir::new().unwrap();
        let store = FileMappingStore::new(dir.path().join("nested"));
        (dir, store)
    }

    #[test]
    fn test_round_trip_through_file() {
        let (_dir, store) = store();
        let destination = Destination::new("site-1", "list-1");
        let mapping = FieldMapping::new().with_entry(FieldKey::Subject, Some("Title"));

        store.save(&destination, &mapping);
        store.save_last_selection(SelectionKind::Site, &Selection::new("site-1", "Helpdesk"));

        let reopened = FileMappingStore::new(store.path().parent().unwrap());
        assert_eq!(reopened.load(&destination), Some(mapping));
        assert_eq!(
            reopened.load_last_selection(SelectionKind::Site),
            Some(Selection::new("site-1", "Helpdesk"))
        );
        assert_eq!(reopened.load_last_selection(SelectionKind::List), None);
    }

    #[test]
    fn test_document_layout() {
        let (_dir, store) = store();
        store.save(
            &Destination::new("s", "l"),
            &FieldMapping::new().with_entry(FieldKey::User, Some("Requester")),
        );
        store.save_last_selection(SelectionKind::List, &Selection::new("l", "Tickets"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(json["mappings"]["fieldMapping_s_l"]["user"], "Requester");
        assert_eq!(json["lastSelectedList"]["name"], "Tickets");
        assert!(json.get("lastSelectedSite").is_none());
    }

    #[test]
    fn test_bad_entries_do_not_hide_or_erase_the_rest() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(
            store.path(),
            serde_json::json!({
                "mappings": {
                    "fieldMapping_s_a": { "subject": "Title", "user": "Requester" },
                    "fieldMapping_s_b": { "subject": null, "route": "Route" },
                    "fieldMapping_s_x": ["not", "a", "mapping"]
                },
                "lastSelectedSite": { "id": "s", "name": "Site" },
                "lastSelectedList": { "id": "a", "name": "Tickets" }
            })
            .to_string(),
        )
        .unwrap();

        let a = Destination::new("s", "a");
        assert_eq!(store.load(&a).unwrap().get(FieldKey::User), Some("Requester"));

        let b = store.load(&Destination::new("s", "b")).unwrap();
        assert!(!b.is_mapped(FieldKey::Subject));
        assert_eq!(b.get(FieldKey::Route), Some("Route"));

        store.save(
            &Destination::new("s", "c"),
            &FieldMapping::new().with_entry(FieldKey::Subject, Some("X")),
        );

        assert!(store.load(&a).is_some());
        assert!(store.load(&Destination::new("s", "c")).is_some());
        assert_eq!(
            store.load_last_selection(SelectionKind::Site),
            Some(Selection::new("s", "Site"))
        );
        assert_eq!(
            store.load_last_selection(SelectionKind::List),
            Some(Selection::new("a", "Tickets"))
        );
    }

    #[test]
    fn test_unparseable_file_is_moved_aside_before_write() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.load(&Destination::new("s", "l")), None);
        assert_eq!(store.load_last_selection(SelectionKind::Site), None);

        store.save_last_selection(SelectionKind::Site, &Selection::new("s", "Site"));

        assert_eq!(
            std::fs::read_to_string(store.backup_path()).unwrap(),
            "{ not json"
        );
        assert!(store.load_last_selection(SelectionKind::Site).is_some());
    }

    #[test]
    fn test_delete_and_clear_all() {
        let (_dir, store) = store();
        let a = Destination::new("s", "a");
        let b = Destination::new("s", "b");
        store.save(&a, &FieldMapping::new());
        store.save(&b, &FieldMapping::new());
        store.save_last_selection(SelectionKind::Site, &Selection::new("s", "Site"));

        store.delete(&a);
        assert_eq!(store.load(&a), None);
        assert!(store.load(&b).is_some());

        store.clear_all();
        assert_eq!(store.load(&b), None);
        assert_eq!(store.load_last_selection(SelectionKind::Site), None);
    }
}
