//! Field → column mapping
//!
//! A [`FieldMapping`] says which list column receives each logical field. It
//! is partial: unmapped fields are simply absent. Mappings are scoped to a
//! [`Destination`] and persisted through a [`MappingStore`]; nothing in this
//! module saves implicitly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};
use tsync_common::types::{Destination, DestinationColumn, FieldKey};

use crate::fields::LogicalField;
use crate::store::MappingStore;

/// Internal name of the list column that is never offered for mapping
pub const CONTENT_TYPE_COLUMN: &str = "ContentType";

/// Mapping from logical field to column internal name
///
/// Serialized as a plain JSON object keyed by field key. Unknown keys and
/// empty or null values are dropped when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Option<String>>", into = "BTreeMap<String, String>")]
pub struct FieldMapping {
    entries: BTreeMap<FieldKey, String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column mapped to `key`, if any
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    pub fn is_mapped(&self, key: FieldKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in field key order
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        self.entries.iter().map(|(key, column)| (*key, column.as_str()))
    }

    /// Copy of this mapping with `key` set to `column`, or cleared when the
    /// column is absent or blank
    #[must_use]
    pub fn with_entry(&self, key: FieldKey, column: Option<&str>) -> Self {
        let mut next = self.clone();
        match column.map(str::trim).filter(|c| !c.is_empty()) {
            Some(column) => {
                next.entries.insert(key, column.to_string());
            },
            None => {
                next.entries.remove(&key);
            },
        }
        next
    }

    /// Copy of this mapping without entries naming columns absent from
    /// `columns`, along with the keys that were dropped
    #[must_use]
    pub fn retain_present(&self, columns: &[DestinationColumn]) -> (Self, Vec<FieldKey>) {
        let mut kept = BTreeMap::new();
        let mut dropped = Vec::new();

        for (key, column) in &self.entries {
            if columns.iter().any(|c| &c.name == column) {
                kept.insert(*key, column.clone());
            } else {
                dropped.push(*key);
            }
        }

        (Self { entries: kept }, dropped)
    }
}

impl From<BTreeMap<String, Option<String>>> for FieldMapping {
    fn from(raw: BTreeMap<String, Option<String>>) -> Self {
        let mut entries = BTreeMap::new();

        for (key, value) in raw {
            let Some(column) = value.as_deref().map(str::trim).filter(|c| !c.is_empty()) else {
                continue;
            };
            match key.parse::<FieldKey>() {
                Ok(key) => {
                    entries.insert(key, column.to_string());
                },
                Err(_) => debug!(key = %key, "Ignoring unknown mapping entry"),
            }
        }

        Self { entries }
    }
}

impl From<FieldMapping> for BTreeMap<String, String> {
    fn from(mapping: FieldMapping) -> Self {
        mapping
            .entries
            .into_iter()
            .map(|(key, column)| (key.as_str().to_string(), column))
            .collect()
    }
}

impl FromIterator<(FieldKey, String)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (FieldKey, String)>>(iter: I) -> Self {
        let mut mapping = FieldMapping::new();
        for (key, column) in iter {
            mapping = mapping.with_entry(key, Some(&column));
        }
        mapping
    }
}

/// True iff every required field has an entry
pub fn validate(mapping: &FieldMapping, fields: &[LogicalField]) -> bool {
    fields
        .iter()
        .filter(|f| f.required)
        .all(|f| mapping.is_mapped(f.key))
}

/// Required fields without an entry, in catalog order
pub fn missing_required(mapping: &FieldMapping, fields: &[LogicalField]) -> Vec<FieldKey> {
    fields
        .iter()
        .filter(|f| f.required && !mapping.is_mapped(f.key))
        .map(|f| f.key)
        .collect()
}

/// Best-guess mapping by name
///
/// For each field, the first column whose internal name equals the field key
/// (ignoring case) wins; failing that, the first whose display name does.
/// Columns are considered in the order given, so the result is reproducible
/// for the same column list.
pub fn auto_resolve(columns: &[DestinationColumn], fields: &[LogicalField]) -> FieldMapping {
    let mut mapping = FieldMapping::new();

    for field in fields {
        let key = field.key.as_str();

        let by_name = columns.iter().find(|c| c.name.eq_ignore_ascii_case(key));
        let matched = by_name.or_else(|| {
            columns.iter().find(|c| {
                c.display_name
                    .as_deref()
                    .is_some_and(|display| display.eq_ignore_ascii_case(key))
            })
        });

        if let Some(column) = matched {
            mapping.entries.insert(field.key, column.name.clone());
        }
    }

    mapping
}

/// New mapping with one entry set, or cleared when `column` is absent or blank
pub fn apply_edit(mapping: &FieldMapping, key: FieldKey, column: Option<&str>) -> FieldMapping {
    mapping.with_entry(key, column)
}

/// Whether a column may be offered as a mapping target
pub fn is_selectable(column: &DestinationColumn) -> bool {
    !column.hidden && !column.read_only && column.name != CONTENT_TYPE_COLUMN
}

/// Columns that may be offered as mapping targets, in their original order
pub fn selectable_columns(columns: &[DestinationColumn]) -> Vec<DestinationColumn> {
    columns.iter().filter(|c| is_selectable(c)).cloned().collect()
}

/// Where a resolved mapping came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingOrigin {
    /// Loaded from the store
    Saved,
    /// Guessed from column names; not yet saved
    AutoResolved,
}

/// Active mapping for a destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMapping {
    pub mapping: FieldMapping,
    pub origin: MappingOrigin,
    /// Saved entries dropped because their column no longer exists
    pub pruned: Vec<FieldKey>,
}

/// Loads, guesses and saves mappings for destinations
pub struct MappingResolver<'a, S: MappingStore + ?Sized> {
    store: &'a S,
    fields: &'a [LogicalField],
}

impl<'a, S: MappingStore + ?Sized> MappingResolver<'a, S> {
    pub fn new(store: &'a S, fields: &'a [LogicalField]) -> Self {
        Self { store, fields }
    }

    /// Active mapping for `destination` given its current `columns`
    ///
    /// A saved mapping always wins over a guess, even when it is incomplete.
    pub fn resolve(&self, destination: &Destination, columns: &[DestinationColumn]) -> ResolvedMapping {
        if let Some(saved) = self.store.load(destination) {
            let (mapping, pruned) = saved.retain_present(columns);
            if !pruned.is_empty() {
                info!(
                    destination = %destination,
                    pruned = ?pruned,
                    "Dropped mapping entries for columns that no longer exist"
                );
            }
            return ResolvedMapping {
                mapping,
                origin: MappingOrigin::Saved,
                pruned,
            };
        }

        let mapping = auto_resolve(&selectable_columns(columns), self.fields);
        debug!(
            destination = %destination,
            mapped = mapping.len(),
            "No saved mapping; using auto-resolved mapping"
        );

        ResolvedMapping {
            mapping,
            origin: MappingOrigin::AutoResolved,
            pruned: Vec::new(),
        }
    }

    pub fn is_valid(&self, mapping: &FieldMapping) -> bool {
        validate(mapping, self.fields)
    }

    pub fn missing_required(&self, mapping: &FieldMapping) -> Vec<FieldKey> {
        missing_required(mapping, self.fields)
    }

    /// Persist `mapping` for `destination`
    pub fn save(&self, destination: &Destination, mapping: &FieldMapping) {
        self.store.save(destination, mapping);
    }

    /// Forget the saved mapping so the next resolve guesses again
    pub fn forget(&self, destination: &Destination) {
        self.store.delete(destination);
    }
}
