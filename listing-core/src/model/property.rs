//! The Property record: one listing and all of its child collections

use serde::{Deserialize, Serialize};

use super::entities::{Area, Feature, Floorplan, Image, NearbyCity, NearbyPlace, TechnicalItem};

/// A single listing record
///
/// `id` is stable once assigned and empty before the first persist; the
/// save path treats an empty id as the "new, unpersisted record" state and
/// refuses remote writes for it.
///
/// Invariant: `featured_image`, if set, equals the URL of some entry in
/// `images`; removing an image also removes it from `featured_image`,
/// `featured_images` and `grid_images`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub description: String,
    pub address: String,
    pub price: Option<f64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub features: Vec<Feature>,
    pub areas: Vec<Area>,
    pub floorplans: Vec<Floorplan>,
    pub technical_items: Vec<TechnicalItem>,
    pub nearby_places: Vec<NearbyPlace>,
    pub nearby_cities: Vec<NearbyCity>,
    pub images: Vec<Image>,
    pub featured_image: Option<String>,
    pub featured_images: Vec<String>,
    pub grid_images: Vec<String>,
}

impl Property {
    /// True once the record has been persisted at least once
    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }

    /// Look up a gallery image by id
    pub fn image(&self, image_id: &str) -> Option<&Image> {
        self.images.iter().find(|i| i.id == image_id)
    }

    /// Look up a floorplan by id
    pub fn floorplan(&self, floorplan_id: &str) -> Option<&Floorplan> {
        self.floorplans.iter().find(|f| f.id == floorplan_id)
    }

    /// Look up an area by id
    pub fn area(&self, area_id: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == area_id)
    }

    pub fn area_mut(&mut self, area_id: &str) -> Option<&mut Area> {
        self.areas.iter_mut().find(|a| a.id == area_id)
    }
}
