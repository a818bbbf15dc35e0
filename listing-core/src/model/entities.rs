//! Child entities of a Property record

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single feature line ("Pool", "Garage", ...)
///
/// Order is significant for display, not for identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub description: String,
}

impl Feature {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
        }
    }
}

/// An uploaded or externally-sourced image
///
/// `file_path` is the backing blob-storage key. It is present only for
/// engine-uploaded images and absent for externally-sourced URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl Image {
    pub fn new(url: impl Into<String>, file_path: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.into(),
            file_path,
        }
    }
}

/// A room/area section with its own image pool
///
/// `image_ids` selects entries from the Area's own `images`, which are a
/// distinct pool from the Property's main gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub title: String,
    pub name: String,
    pub description: String,
    pub size: String,
    pub columns: i64,
    pub image_ids: Vec<String>,
    pub images: Vec<Image>,
}

impl Area {
    pub const DEFAULT_COLUMNS: i64 = 2;
}

impl Default for Area {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: String::new(),
            name: String::new(),
            description: String::new(),
            size: String::new(),
            columns: Self::DEFAULT_COLUMNS,
            image_ids: Vec::new(),
            images: Vec::new(),
        }
    }
}

/// A floorplan document, optionally referenced by technical items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floorplan {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub columns: i64,
}

impl Floorplan {
    pub const DEFAULT_COLUMNS: i64 = 1;

    pub fn new(url: impl Into<String>, file_path: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.into(),
            file_path,
            columns: Self::DEFAULT_COLUMNS,
        }
    }
}

/// A technical detail row ("Living area", "120 m²"), optionally linked to
/// a floorplan. Removing a floorplan must null out `floorplan_id` in every
/// item that held it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalItem {
    pub id: String,
    pub title: String,
    pub value: String,
    #[serde(default)]
    pub floorplan_id: Option<String>,
}

impl TechnicalItem {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            value: value.into(),
            floorplan_id: None,
        }
    }
}

/// A nearby point of interest fetched from the places lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyPlace {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub place_type: String,
    pub vicinity: String,
    #[serde(default)]
    pub rating: Option<f64>,
    pub distance: String,
    #[serde(default)]
    pub visible_in_webview: bool,
}

/// A nearby city with travel distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyCity {
    pub id: String,
    pub name: String,
    pub distance: String,
    #[serde(default)]
    pub visible_in_webview: bool,
}
