//! HTTP API handlers for listing-sync

pub mod health;
pub mod records;

pub use health::health_routes;
pub use records::{
    create_property, delete_property, navigate, open_property, property_status, remove_asset,
    save_field, save_property, upload_asset,
};
