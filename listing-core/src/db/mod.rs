//! Database row models and schema initialization

#[cfg(feature = "sqlx")]
pub mod init;
pub mod models;

#[cfg(feature = "sqlx")]
pub use init::{create_schema, init_database};
pub use models::{AssetKind, AssetRow, PropertyRow};
