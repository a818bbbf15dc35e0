//! Record Snapshot Store
//!
//! Holds the live in-memory record next to the last value known to match
//! the remote store. Saves diff against the snapshot instead of trusting
//! an ad-hoc boolean, so an edit that is reverted before the autosave
//! fires evaluates as "unchanged" and never reaches the network.

use chrono::{DateTime, Utc};

use listing_core::db::PropertyRow;
use listing_core::{Property, PropertyField};

pub struct SnapshotStore {
    current: Property,
    snapshot: Property,
    last_saved: Option<String>,
}

impl SnapshotStore {
    /// Seed both views from a freshly fetched (or freshly created) record
    pub fn new(property: Property) -> Self {
        Self {
            snapshot: property.clone(),
            current: property,
            last_saved: None,
        }
    }

    /// Live in-memory value
    pub fn current(&self) -> &Property {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut Property {
        &mut self.current
    }

    /// Structural inequality between current and snapshot
    ///
    /// Whole-record when `scope` is `None`.
    pub fn is_changed(&self, scope: Option<PropertyField>) -> bool {
        match scope {
            Some(field) => field.differs(&self.current, &self.snapshot),
            None => PropertyField::ALL
                .iter()
                .any(|f| f.differs(&self.current, &self.snapshot)),
        }
    }

    /// Replace the snapshot with the row returned by the remote store
    ///
    /// The store's own return value is used (not the locally-sent one) so
    /// server-side defaulting is reflected, and its `updated_at` becomes
    /// "last saved" rather than the local wall clock.
    pub fn commit(&mut self, row: &PropertyRow) {
        self.snapshot = row.to_property();
        self.last_saved = Some(row.updated_at.clone());
    }

    /// Server-assigned timestamp of the last confirmed write
    pub fn last_saved(&self) -> Option<&str> {
        self.last_saved.as_deref()
    }

    /// Last-saved timestamp as a parsed instant, when well-formed
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_core::model::Feature;

    fn store() -> SnapshotStore {
        SnapshotStore::new(Property {
            id: "p1".to_string(),
            title: "Old Title".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn fresh_store_is_unchanged() {
        let s = store();
        assert!(!s.is_changed(None));
        assert!(!s.is_changed(Some(PropertyField::Title)));
        assert!(s.last_saved().is_none());
    }

    #[test]
    fn edit_then_revert_is_unchanged() {
        let mut s = store();
        s.current_mut().title = "New Title".to_string();
        assert!(s.is_changed(Some(PropertyField::Title)));
        assert!(s.is_changed(None));

        s.current_mut().title = "Old Title".to_string();
        assert!(!s.is_changed(None));
    }

    #[test]
    fn scoped_diff_ignores_other_fields() {
        let mut s = store();
        s.current_mut().features.push(Feature::new("Pool"));
        assert!(!s.is_changed(Some(PropertyField::Title)));
        assert!(s.is_changed(Some(PropertyField::Features)));
    }

    #[test]
    fn commit_takes_server_value_and_timestamp() {
        let mut s = store();
        s.current_mut().title = "New Title".to_string();

        let row = PropertyRow {
            id: "p1".to_string(),
            title: "New Title".to_string(),
            updated_at: "2026-08-24T10:00:00.000Z".to_string(),
            ..Default::default()
        };
        s.commit(&row);

        assert!(!s.is_changed(Some(PropertyField::Title)));
        assert_eq!(s.last_saved(), Some("2026-08-24T10:00:00.000Z"));
        assert!(s.last_saved_at().is_some());
    }
}
