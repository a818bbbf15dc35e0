//! Canonical in-memory model for a listing record
//!
//! All entities are owned by a single [`Property`] record; none has an
//! independent lifecycle outside its parent. Entities are created locally
//! with a fresh UUID before any persistence occurs, updated in place keyed
//! by id, and destroyed by filtering them out of their parent collection.

mod entities;
mod field;
mod property;

pub use entities::{Area, Feature, Floorplan, Image, NearbyCity, NearbyPlace, TechnicalItem};
pub use field::{ColumnValue, PropertyField};
pub use property::Property;
