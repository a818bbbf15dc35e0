//! The record synchronization engine
//!
//! - [`snapshot`]: live record + last-persisted snapshot with field diffing
//! - [`dirty`]: per-scope unsaved-changes ledger
//! - [`autosave`]: differential field-level saves with write-avoidance
//! - [`assets`]: dual-store consistency for uploaded images and floorplans

pub mod assets;
pub mod autosave;
pub mod dirty;
pub mod snapshot;

pub use assets::AssetManager;
pub use autosave::AutosaveScheduler;
pub use dirty::DirtyLedger;
pub use snapshot::SnapshotStore;
