//! Database models
//!
//! `PropertyRow` is the store encoding of a listing: scalar columns plus
//! JSON-encoded text for every collection column. Decoding back to the
//! canonical [`Property`] runs through the Canonical Normalizer, so rows
//! written by older versions of the editor (bare URL strings, camelCase
//! keys, malformed text) still load.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Property, PropertyField};
use crate::normalize;

/// One row of the properties table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub address: String,
    pub price: Option<f64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub features: Option<String>,
    pub areas: Option<String>,
    pub floorplans: Option<String>,
    pub technical_items: Option<String>,
    pub nearby_places: Option<String>,
    pub nearby_cities: Option<String>,
    pub images: Option<String>,
    pub featured_image: Option<String>,
    pub featured_images: Option<String>,
    pub grid_images: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PropertyRow {
    /// Decode the row into the canonical in-memory record
    pub fn to_property(&self) -> Property {
        Property {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            address: self.address.clone(),
            price: self.price,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            features: normalize::normalize_features(&column_value(&self.features)),
            areas: normalize::normalize_areas(&column_value(&self.areas)),
            floorplans: normalize::normalize_floorplans(&column_value(&self.floorplans)),
            technical_items: normalize::normalize_technical_items(&column_value(
                &self.technical_items,
            )),
            nearby_places: normalize::normalize_nearby_places(&column_value(&self.nearby_places)),
            nearby_cities: normalize::normalize_nearby_cities(&column_value(&self.nearby_cities)),
            images: normalize::normalize_images(&column_value(&self.images)),
            featured_image: self.featured_image.clone().filter(|s| !s.is_empty()),
            featured_images: normalize::normalize_url_list(&column_value(&self.featured_images)),
            grid_images: normalize::normalize_url_list(&column_value(&self.grid_images)),
        }
    }
}

fn column_value(column: &Option<String>) -> Value {
    match column {
        Some(text) => Value::String(text.clone()),
        None => Value::Null,
    }
}

/// Discriminator of the side asset table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Floorplan,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Floorplan => "floorplan",
        }
    }

    pub fn from_str(kind: &str) -> Option<AssetKind> {
        match kind {
            "image" => Some(AssetKind::Image),
            "floorplan" => Some(AssetKind::Floorplan),
            _ => None,
        }
    }

    /// The inline collection column this kind denormalizes into
    pub fn inline_field(&self) -> PropertyField {
        match self {
            AssetKind::Image => PropertyField::Images,
            AssetKind::Floorplan => PropertyField::Floorplans,
        }
    }
}

/// One row of the side asset table, keyed by `(property_id, kind)`
///
/// The side table is the durable source of truth for uploaded assets; the
/// inline collection columns are a denormalized cache of it. `file_path`
/// keeps the blob key so back-filled inline entries stay removable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRow {
    pub id: String,
    pub property_id: String,
    pub url: String,
    pub file_path: Option<String>,
    pub kind: AssetKind,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_decodes_legacy_columns() {
        let row = PropertyRow {
            id: "p1".to_string(),
            title: "Villa".to_string(),
            features: Some(r#"[{"id":"f1","description":"Pool"}]"#.to_string()),
            images: Some(r#"["https://cdn/a.jpg"]"#.to_string()),
            areas: Some("garbage".to_string()),
            featured_image: Some(String::new()),
            ..Default::default()
        };

        let property = row.to_property();
        assert_eq!(property.features.len(), 1);
        assert_eq!(property.images.len(), 1);
        assert_eq!(property.images[0].url, "https://cdn/a.jpg");
        assert!(property.areas.is_empty());
        assert!(property.featured_image.is_none());
    }

    #[test]
    fn asset_kind_round_trip() {
        assert_eq!(AssetKind::from_str("image"), Some(AssetKind::Image));
        assert_eq!(AssetKind::from_str("floorplan"), Some(AssetKind::Floorplan));
        assert_eq!(AssetKind::from_str("video"), None);
        assert_eq!(AssetKind::Image.as_str(), "image");
    }
}
