//! Per-field metadata for the Property record
//!
//! Single source of truth for each saveable field: its column name, whether
//! it is a JSON-encoded collection column, its store encoding, structural
//! diff, and how an incoming JSON value is applied to the in-memory record.

use serde_json::{json, Value};

use crate::error::Result;
use crate::model::entities::Area;
use crate::model::property::Property;
use crate::normalize;

/// A value ready to be bound into a column of the properties table
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Null,
}

/// One saveable scope of the Property record
///
/// Field-level saves and dirty tracking are keyed by this enum; the save
/// path only ever touches the columns named here, which keeps dynamic
/// UPDATE statements injection-safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyField {
    Title,
    Description,
    Address,
    Price,
    Bedrooms,
    Bathrooms,
    Features,
    Areas,
    Floorplans,
    TechnicalItems,
    NearbyPlaces,
    NearbyCities,
    Images,
    FeaturedImage,
    FeaturedImages,
    GridImages,
}

impl PropertyField {
    /// Every saveable field, in column order
    pub const ALL: [PropertyField; 16] = [
        PropertyField::Title,
        PropertyField::Description,
        PropertyField::Address,
        PropertyField::Price,
        PropertyField::Bedrooms,
        PropertyField::Bathrooms,
        PropertyField::Features,
        PropertyField::Areas,
        PropertyField::Floorplans,
        PropertyField::TechnicalItems,
        PropertyField::NearbyPlaces,
        PropertyField::NearbyCities,
        PropertyField::Images,
        PropertyField::FeaturedImage,
        PropertyField::FeaturedImages,
        PropertyField::GridImages,
    ];

    /// Column name in the properties table
    pub fn column(&self) -> &'static str {
        match self {
            PropertyField::Title => "title",
            PropertyField::Description => "description",
            PropertyField::Address => "address",
            PropertyField::Price => "price",
            PropertyField::Bedrooms => "bedrooms",
            PropertyField::Bathrooms => "bathrooms",
            PropertyField::Features => "features",
            PropertyField::Areas => "areas",
            PropertyField::Floorplans => "floorplans",
            PropertyField::TechnicalItems => "technical_items",
            PropertyField::NearbyPlaces => "nearby_places",
            PropertyField::NearbyCities => "nearby_cities",
            PropertyField::Images => "images",
            PropertyField::FeaturedImage => "featured_image",
            PropertyField::FeaturedImages => "featured_images",
            PropertyField::GridImages => "grid_images",
        }
    }

    /// Resolve a field from its column name
    pub fn from_name(name: &str) -> Option<PropertyField> {
        PropertyField::ALL.iter().copied().find(|f| f.column() == name)
    }

    /// True for JSON-encoded collection columns
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            PropertyField::Features
                | PropertyField::Areas
                | PropertyField::Floorplans
                | PropertyField::TechnicalItems
                | PropertyField::NearbyPlaces
                | PropertyField::NearbyCities
                | PropertyField::Images
                | PropertyField::FeaturedImages
                | PropertyField::GridImages
        )
    }

    /// Encode the field's current value into its store representation
    ///
    /// Collection fields become JSON-encoded text; scalars pass through.
    /// The nested mapping is fixed per field: Area images serialize as
    /// minimal `{id, url}` records, gallery images and floorplans keep
    /// their `file_path` so uploaded blobs stay linked.
    pub fn encode(&self, property: &Property) -> Result<ColumnValue> {
        let value = match self {
            PropertyField::Title => ColumnValue::Text(property.title.clone()),
            PropertyField::Description => ColumnValue::Text(property.description.clone()),
            PropertyField::Address => ColumnValue::Text(property.address.clone()),
            PropertyField::Price => match property.price {
                Some(p) => ColumnValue::Real(p),
                None => ColumnValue::Null,
            },
            PropertyField::Bedrooms => match property.bedrooms {
                Some(n) => ColumnValue::Integer(n),
                None => ColumnValue::Null,
            },
            PropertyField::Bathrooms => match property.bathrooms {
                Some(n) => ColumnValue::Integer(n),
                None => ColumnValue::Null,
            },
            PropertyField::Features => ColumnValue::Text(serde_json::to_string(&property.features)?),
            PropertyField::Areas => {
                let encoded: Vec<Value> = property.areas.iter().map(area_store_value).collect();
                ColumnValue::Text(serde_json::to_string(&encoded)?)
            }
            PropertyField::Floorplans => {
                ColumnValue::Text(serde_json::to_string(&property.floorplans)?)
            }
            PropertyField::TechnicalItems => {
                ColumnValue::Text(serde_json::to_string(&property.technical_items)?)
            }
            PropertyField::NearbyPlaces => {
                ColumnValue::Text(serde_json::to_string(&property.nearby_places)?)
            }
            PropertyField::NearbyCities => {
                ColumnValue::Text(serde_json::to_string(&property.nearby_cities)?)
            }
            PropertyField::Images => ColumnValue::Text(serde_json::to_string(&property.images)?),
            PropertyField::FeaturedImage => match &property.featured_image {
                Some(url) => ColumnValue::Text(url.clone()),
                None => ColumnValue::Null,
            },
            PropertyField::FeaturedImages => {
                ColumnValue::Text(serde_json::to_string(&property.featured_images)?)
            }
            PropertyField::GridImages => {
                ColumnValue::Text(serde_json::to_string(&property.grid_images)?)
            }
        };
        Ok(value)
    }

    /// Structural inequality between two records, restricted to this field
    ///
    /// Areas compare through their store encoding: the areas column drops
    /// area-image blob paths, so a snapshot re-read from the store must
    /// still count as equal to the record it was saved from.
    pub fn differs(&self, a: &Property, b: &Property) -> bool {
        match self {
            PropertyField::Title => a.title != b.title,
            PropertyField::Description => a.description != b.description,
            PropertyField::Address => a.address != b.address,
            PropertyField::Price => a.price != b.price,
            PropertyField::Bedrooms => a.bedrooms != b.bedrooms,
            PropertyField::Bathrooms => a.bathrooms != b.bathrooms,
            PropertyField::Features => a.features != b.features,
            PropertyField::Areas => {
                let a: Vec<Value> = a.areas.iter().map(area_store_value).collect();
                let b: Vec<Value> = b.areas.iter().map(area_store_value).collect();
                a != b
            }
            PropertyField::Floorplans => a.floorplans != b.floorplans,
            PropertyField::TechnicalItems => a.technical_items != b.technical_items,
            PropertyField::NearbyPlaces => a.nearby_places != b.nearby_places,
            PropertyField::NearbyCities => a.nearby_cities != b.nearby_cities,
            PropertyField::Images => a.images != b.images,
            PropertyField::FeaturedImage => a.featured_image != b.featured_image,
            PropertyField::FeaturedImages => a.featured_images != b.featured_images,
            PropertyField::GridImages => a.grid_images != b.grid_images,
        }
    }

    /// Apply an incoming JSON value to the in-memory record
    ///
    /// Collection values run through the Canonical Normalizer so callers
    /// may hand over any supported legacy shape; scalars are coerced with
    /// defaults rather than rejected.
    pub fn apply(&self, property: &mut Property, value: &Value) {
        match self {
            PropertyField::Title => property.title = string_of(value),
            PropertyField::Description => property.description = string_of(value),
            PropertyField::Address => property.address = string_of(value),
            PropertyField::Price => property.price = value.as_f64(),
            PropertyField::Bedrooms => property.bedrooms = value.as_i64(),
            PropertyField::Bathrooms => property.bathrooms = value.as_i64(),
            PropertyField::Features => property.features = normalize::normalize_features(value),
            PropertyField::Areas => property.areas = normalize::normalize_areas(value),
            PropertyField::Floorplans => {
                property.floorplans = normalize::normalize_floorplans(value)
            }
            PropertyField::TechnicalItems => {
                property.technical_items = normalize::normalize_technical_items(value)
            }
            PropertyField::NearbyPlaces => {
                property.nearby_places = normalize::normalize_nearby_places(value)
            }
            PropertyField::NearbyCities => {
                property.nearby_cities = normalize::normalize_nearby_cities(value)
            }
            PropertyField::Images => property.images = normalize::normalize_images(value),
            PropertyField::FeaturedImage => {
                property.featured_image = value.as_str().map(str::to_string)
            }
            PropertyField::FeaturedImages => {
                property.featured_images = normalize::normalize_url_list(value)
            }
            PropertyField::GridImages => property.grid_images = normalize::normalize_url_list(value),
        }
    }
}

fn string_of(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}

/// Store encoding of one Area; its images flatten to minimal `{id, url}`
/// records because the areas column does not carry blob paths.
fn area_store_value(area: &Area) -> Value {
    json!({
        "id": area.id,
        "title": area.title,
        "name": area.name,
        "description": area.description,
        "size": area.size,
        "columns": area.columns,
        "image_ids": area.image_ids,
        "images": area
            .images
            .iter()
            .map(|i| json!({ "id": i.id, "url": i.url }))
            .collect::<Vec<_>>(),
    })
}
