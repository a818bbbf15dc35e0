//! Differential Autosave Scheduler
//!
//! Serializes changed fields back into the store encoding and issues the
//! minimal update. An empty record id is the "new, unpersisted record"
//! state and saves are a quiet no-op, not an error. Values structurally
//! equal to the snapshot are skipped entirely (write-avoidance). On
//! failure the dirty ledger is left untouched so the next user-initiated
//! save retries the same diff; there is no background retry.

use std::sync::Arc;

use tracing::{debug, info};

use listing_core::model::ColumnValue;
use listing_core::{PropertyField, Result};

use crate::store::RecordStore;

use super::dirty::DirtyLedger;
use super::snapshot::SnapshotStore;

pub struct AutosaveScheduler {
    records: Arc<dyn RecordStore>,
}

impl AutosaveScheduler {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    /// Save a single field if it differs from the snapshot
    ///
    /// Returns `Ok(false)` for an unpersisted record, `Ok(true)` after a
    /// confirmed write or a write-avoidance skip. Remote failures
    /// propagate with the ledger untouched.
    pub async fn save_field(
        &self,
        snap: &mut SnapshotStore,
        ledger: &mut DirtyLedger,
        field: PropertyField,
    ) -> Result<bool> {
        self.save_fields(snap, ledger, &[field]).await
    }

    /// Save the whole record, or a subset of its fields
    ///
    /// Only fields that structurally differ from the snapshot are encoded
    /// and sent; a field-restricted save never overwrites columns outside
    /// the subset.
    pub async fn save_record(
        &self,
        snap: &mut SnapshotStore,
        ledger: &mut DirtyLedger,
        fields: Option<&[PropertyField]>,
    ) -> Result<bool> {
        match fields {
            Some(subset) => self.save_fields(snap, ledger, subset).await,
            None => self.save_fields(snap, ledger, &PropertyField::ALL).await,
        }
    }

    async fn save_fields(
        &self,
        snap: &mut SnapshotStore,
        ledger: &mut DirtyLedger,
        candidates: &[PropertyField],
    ) -> Result<bool> {
        let property_id = snap.current().id.clone();
        if property_id.is_empty() {
            debug!("Save skipped: record has not been persisted yet");
            return Ok(false);
        }

        let mut patch: Vec<(PropertyField, ColumnValue)> = Vec::new();
        for field in candidates {
            if snap.is_changed(Some(*field)) {
                patch.push((*field, field.encode(snap.current())?));
            }
        }

        if patch.is_empty() {
            // Persisted state already matches; nothing is unsaved.
            for field in candidates {
                ledger.clear(Some(*field));
            }
            debug!(property_id = %property_id, "Save skipped: no fields differ from snapshot");
            return Ok(true);
        }

        let saved: Vec<PropertyField> = patch.iter().map(|(f, _)| *f).collect();
        let row = self.records.update(&property_id, &patch).await?;
        snap.commit(&row);
        // Clearing keys off the post-commit diff, not the patch: a candidate
        // edited back to its persisted value carries no unsaved change even
        // though it was never sent.
        for field in candidates {
            if !snap.is_changed(Some(*field)) {
                ledger.clear(Some(*field));
            }
        }

        info!(
            property_id = %property_id,
            fields = ?saved.iter().map(|f| f.column()).collect::<Vec<_>>(),
            last_saved = %row.updated_at,
            "Autosave committed"
        );
        Ok(true)
    }
}
