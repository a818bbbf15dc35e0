//! Dirty-State Ledger
//!
//! Explicit per-scope "pending changes" markers, set synchronously by
//! every field-change handler so navigation guards and unsaved-changes
//! indicators are accurate before any autosave fires. Cleared only by the
//! scheduler after a confirmed write (or a write-avoidance skip, which
//! means the persisted value already matches).

use std::collections::HashSet;

use listing_core::PropertyField;

#[derive(Debug, Default)]
pub struct DirtyLedger {
    scopes: HashSet<PropertyField>,
}

impl DirtyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, field: PropertyField) {
        self.scopes.insert(field);
    }

    /// Clear one scope, or everything when `scope` is `None`
    pub fn clear(&mut self, scope: Option<PropertyField>) {
        match scope {
            Some(field) => {
                self.scopes.remove(&field);
            }
            None => self.scopes.clear(),
        }
    }

    /// Whole-record dirtiness when `scope` is `None`
    pub fn is_dirty(&self, scope: Option<PropertyField>) -> bool {
        match scope {
            Some(field) => self.scopes.contains(&field),
            None => !self.scopes.is_empty(),
        }
    }

    /// Currently dirty scopes, in stable field order
    pub fn dirty_scopes(&self) -> Vec<PropertyField> {
        PropertyField::ALL
            .iter()
            .copied()
            .filter(|f| self.scopes.contains(f))
            .collect()
    }
}
