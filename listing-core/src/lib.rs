//! # Listing Core Library
//!
//! Shared code for the listing editor backend:
//! - Canonical entity model (Property and its child collections)
//! - Canonical Normalizer for heterogeneously-shaped persisted data
//! - Per-field metadata (column names, store encodings, structural diff)
//! - Database row models and schema initialization

pub mod db;
pub mod error;
pub mod model;
pub mod normalize;

pub use error::{Error, Result};
pub use model::{Property, PropertyField};
