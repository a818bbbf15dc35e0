//! Editor session: the UI-facing facade of the synchronization engine
//!
//! Owns the snapshot store, dirty ledger, wizard, autosave scheduler and
//! asset manager for one open record. Collection entities are created
//! locally with fresh ids before any persistence, updated in place keyed
//! by id, and removed by filtering; a record that is edited and reverted,
//! or an entity created and deleted before the first save, produces zero
//! remote calls.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use listing_core::db::AssetKind;
use listing_core::model::{
    Area, Feature, Floorplan, Image, NearbyCity, NearbyPlace, TechnicalItem,
};
use listing_core::{Error, Property, PropertyField, Result};

use crate::blob::BlobStorage;
use crate::store::{AssetTable, RecordStore};
use crate::sync::{AssetManager, AutosaveScheduler, DirtyLedger, SnapshotStore};
use crate::wizard::{step_fields, StepWizard, STEP_COUNT};

pub struct EditorSession {
    snap: SnapshotStore,
    ledger: DirtyLedger,
    wizard: StepWizard,
    scheduler: AutosaveScheduler,
    assets: AssetManager,
    records: Arc<dyn RecordStore>,
    saving: bool,
}

impl EditorSession {
    /// Open an existing record: fetch, normalize, reconcile, snapshot
    pub async fn open(
        records: Arc<dyn RecordStore>,
        table: Arc<dyn AssetTable>,
        blobs: Arc<dyn BlobStorage>,
        property_id: &str,
        seed_step: usize,
    ) -> Result<EditorSession> {
        let row = records
            .select(property_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("property {property_id}")))?;

        let mut property = row.to_property();
        let assets = AssetManager::new(table, blobs);
        assets.reconcile(&mut property).await?;

        let mut snap = SnapshotStore::new(property);
        snap.commit(&row);

        Ok(EditorSession {
            snap,
            ledger: DirtyLedger::new(),
            wizard: StepWizard::new(STEP_COUNT, seed_step),
            scheduler: AutosaveScheduler::new(records.clone()),
            assets,
            records,
            saving: false,
        })
    }

    /// Start a brand-new record: exists only in memory until `persist`
    pub fn new_unsaved(
        records: Arc<dyn RecordStore>,
        table: Arc<dyn AssetTable>,
        blobs: Arc<dyn BlobStorage>,
    ) -> EditorSession {
        EditorSession {
            snap: SnapshotStore::new(Property::default()),
            ledger: DirtyLedger::new(),
            wizard: StepWizard::new(STEP_COUNT, 0),
            scheduler: AutosaveScheduler::new(records.clone()),
            assets: AssetManager::new(table, blobs),
            records,
            saving: false,
        }
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    pub fn current(&self) -> &Property {
        self.snap.current()
    }

    pub fn is_dirty(&self, scope: Option<PropertyField>) -> bool {
        self.ledger.is_dirty(scope)
    }

    pub fn last_saved(&self) -> Option<&str> {
        self.snap.last_saved()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn step(&self) -> usize {
        self.wizard.step()
    }

    // ------------------------------------------------------------------
    // Scalar field handlers
    // ------------------------------------------------------------------

    pub fn set_title(&mut self, title: &str) {
        self.snap.current_mut().title = title.to_string();
        self.ledger.mark(PropertyField::Title);
    }

    pub fn set_description(&mut self, description: &str) {
        self.snap.current_mut().description = description.to_string();
        self.ledger.mark(PropertyField::Description);
    }

    pub fn set_address(&mut self, address: &str) {
        self.snap.current_mut().address = address.to_string();
        self.ledger.mark(PropertyField::Address);
    }

    pub fn set_price(&mut self, price: Option<f64>) {
        self.snap.current_mut().price = price;
        self.ledger.mark(PropertyField::Price);
    }

    pub fn set_bedrooms(&mut self, bedrooms: Option<i64>) {
        self.snap.current_mut().bedrooms = bedrooms;
        self.ledger.mark(PropertyField::Bedrooms);
    }

    pub fn set_bathrooms(&mut self, bathrooms: Option<i64>) {
        self.snap.current_mut().bathrooms = bathrooms;
        self.ledger.mark(PropertyField::Bathrooms);
    }

    /// Apply an incoming JSON value to any field (the generic UI handler)
    pub fn apply_field(&mut self, field: PropertyField, value: &Value) {
        field.apply(self.snap.current_mut(), value);
        self.ledger.mark(field);
    }

    // ------------------------------------------------------------------
    // Features
    // ------------------------------------------------------------------

    pub fn add_feature(&mut self, description: &str) -> Feature {
        let feature = Feature::new(description);
        self.snap.current_mut().features.push(feature.clone());
        self.ledger.mark(PropertyField::Features);
        feature
    }

    pub fn update_feature(&mut self, feature_id: &str, description: &str) -> Result<()> {
        let features = &mut self.snap.current_mut().features;
        let feature = features
            .iter_mut()
            .find(|f| f.id == feature_id)
            .ok_or_else(|| Error::NotFound(format!("feature {feature_id}")))?;
        feature.description = description.to_string();
        self.ledger.mark(PropertyField::Features);
        Ok(())
    }

    pub fn remove_feature(&mut self, feature_id: &str) {
        self.snap.current_mut().features.retain(|f| f.id != feature_id);
        self.ledger.mark(PropertyField::Features);
    }

    // ------------------------------------------------------------------
    // Areas
    // ------------------------------------------------------------------

    pub fn add_area(&mut self) -> Area {
        let area = Area::default();
        self.snap.current_mut().areas.push(area.clone());
        self.ledger.mark(PropertyField::Areas);
        area
    }

    /// Replace an area wholesale, keyed by its id
    pub fn update_area(&mut self, area: Area) -> Result<()> {
        let slot = self
            .snap
            .current_mut()
            .area_mut(&area.id)
            .ok_or_else(|| Error::NotFound(format!("area {}", area.id)))?;
        *slot = area;
        self.ledger.mark(PropertyField::Areas);
        Ok(())
    }

    /// Remove an area and best-effort clean up its uploaded image blobs
    pub async fn remove_area(&mut self, area_id: &str) -> Result<()> {
        let image_ids: Vec<String> = match self.snap.current().area(area_id) {
            Some(area) => area.images.iter().map(|i| i.id.clone()).collect(),
            None => return Ok(()),
        };
        for image_id in image_ids {
            self.assets
                .remove_area_image(&mut self.snap, &mut self.ledger, area_id, &image_id)
                .await?;
        }
        self.snap.current_mut().areas.retain(|a| a.id != area_id);
        self.ledger.mark(PropertyField::Areas);
        Ok(())
    }

    pub async fn upload_area_image(
        &mut self,
        area_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Image> {
        self.assets
            .upload_area_image(&mut self.snap, &mut self.ledger, area_id, file_name, bytes)
            .await
    }

    pub async fn remove_area_image(&mut self, area_id: &str, image_id: &str) -> Result<()> {
        self.assets
            .remove_area_image(&mut self.snap, &mut self.ledger, area_id, image_id)
            .await
    }

    /// Select which of the area's own images are displayed
    pub fn set_area_image_selection(&mut self, area_id: &str, image_ids: Vec<String>) -> Result<()> {
        let area = self
            .snap
            .current_mut()
            .area_mut(area_id)
            .ok_or_else(|| Error::NotFound(format!("area {area_id}")))?;
        let known: Vec<String> = area.images.iter().map(|i| i.id.clone()).collect();
        area.image_ids = image_ids
            .into_iter()
            .filter(|id| known.contains(id))
            .collect();
        self.ledger.mark(PropertyField::Areas);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Gallery and featured/grid membership
    // ------------------------------------------------------------------

    pub async fn upload_image(&mut self, file_name: &str, bytes: &[u8]) -> Result<Image> {
        self.assets
            .upload_image(&mut self.snap, &mut self.ledger, file_name, bytes)
            .await
    }

    pub async fn remove_image(&mut self, image_id: &str) -> Result<()> {
        self.assets
            .remove(&mut self.snap, &mut self.ledger, AssetKind::Image, image_id)
            .await
    }

    /// Set the featured image; the URL must belong to the gallery
    pub fn set_featured_image(&mut self, url: Option<&str>) -> Result<()> {
        if let Some(url) = url {
            self.require_gallery_url(url)?;
        }
        self.snap.current_mut().featured_image = url.map(str::to_string);
        self.ledger.mark(PropertyField::FeaturedImage);
        Ok(())
    }

    pub fn toggle_featured(&mut self, url: &str) -> Result<()> {
        self.require_gallery_url(url)?;
        let list = &mut self.snap.current_mut().featured_images;
        if list.iter().any(|u| u == url) {
            list.retain(|u| u != url);
        } else {
            list.push(url.to_string());
        }
        self.ledger.mark(PropertyField::FeaturedImages);
        Ok(())
    }

    pub fn toggle_grid(&mut self, url: &str) -> Result<()> {
        self.require_gallery_url(url)?;
        let list = &mut self.snap.current_mut().grid_images;
        if list.iter().any(|u| u == url) {
            list.retain(|u| u != url);
        } else {
            list.push(url.to_string());
        }
        self.ledger.mark(PropertyField::GridImages);
        Ok(())
    }

    fn require_gallery_url(&self, url: &str) -> Result<()> {
        if self.snap.current().images.iter().any(|i| i.url == url) {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!("{url} is not in the gallery")))
        }
    }

    // ------------------------------------------------------------------
    // Floorplans and technical items
    // ------------------------------------------------------------------

    pub async fn upload_floorplan(&mut self, file_name: &str, bytes: &[u8]) -> Result<Floorplan> {
        self.assets
            .upload_floorplan(&mut self.snap, &mut self.ledger, file_name, bytes)
            .await
    }

    pub async fn remove_floorplan(&mut self, floorplan_id: &str) -> Result<()> {
        self.assets
            .remove(
                &mut self.snap,
                &mut self.ledger,
                AssetKind::Floorplan,
                floorplan_id,
            )
            .await
    }

    pub fn set_floorplan_columns(&mut self, floorplan_id: &str, columns: i64) -> Result<()> {
        let plans = &mut self.snap.current_mut().floorplans;
        let plan = plans
            .iter_mut()
            .find(|f| f.id == floorplan_id)
            .ok_or_else(|| Error::NotFound(format!("floorplan {floorplan_id}")))?;
        plan.columns = columns.max(1);
        self.ledger.mark(PropertyField::Floorplans);
        Ok(())
    }

    pub fn add_technical_item(&mut self, title: &str, value: &str) -> TechnicalItem {
        let item = TechnicalItem::new(title, value);
        self.snap.current_mut().technical_items.push(item.clone());
        self.ledger.mark(PropertyField::TechnicalItems);
        item
    }

    pub fn update_technical_item(&mut self, item: TechnicalItem) -> Result<()> {
        let items = &mut self.snap.current_mut().technical_items;
        let slot = items
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or_else(|| Error::NotFound(format!("technical item {}", item.id)))?;
        *slot = item;
        self.ledger.mark(PropertyField::TechnicalItems);
        Ok(())
    }

    pub fn remove_technical_item(&mut self, item_id: &str) {
        self.snap
            .current_mut()
            .technical_items
            .retain(|i| i.id != item_id);
        self.ledger.mark(PropertyField::TechnicalItems);
    }

    /// Link a technical item to a floorplan; the floorplan must exist
    pub fn set_technical_floorplan(
        &mut self,
        item_id: &str,
        floorplan_id: Option<&str>,
    ) -> Result<()> {
        if let Some(id) = floorplan_id {
            if self.snap.current().floorplan(id).is_none() {
                return Err(Error::NotFound(format!("floorplan {id}")));
            }
        }
        let items = &mut self.snap.current_mut().technical_items;
        let item = items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| Error::NotFound(format!("technical item {item_id}")))?;
        item.floorplan_id = floorplan_id.map(str::to_string);
        self.ledger.mark(PropertyField::TechnicalItems);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Nearby places and cities
    // ------------------------------------------------------------------

    /// Replace nearby places (the result of a fresh lookup)
    pub fn set_nearby_places(&mut self, places: Vec<NearbyPlace>) {
        self.snap.current_mut().nearby_places = places;
        self.ledger.mark(PropertyField::NearbyPlaces);
    }

    pub fn toggle_place_visibility(&mut self, place_id: &str) -> Result<()> {
        let places = &mut self.snap.current_mut().nearby_places;
        let place = places
            .iter_mut()
            .find(|p| p.id == place_id)
            .ok_or_else(|| Error::NotFound(format!("nearby place {place_id}")))?;
        place.visible_in_webview = !place.visible_in_webview;
        self.ledger.mark(PropertyField::NearbyPlaces);
        Ok(())
    }

    pub fn set_nearby_cities(&mut self, cities: Vec<NearbyCity>) {
        self.snap.current_mut().nearby_cities = cities;
        self.ledger.mark(PropertyField::NearbyCities);
    }

    pub fn toggle_city_visibility(&mut self, city_id: &str) -> Result<()> {
        let cities = &mut self.snap.current_mut().nearby_cities;
        let city = cities
            .iter_mut()
            .find(|c| c.id == city_id)
            .ok_or_else(|| Error::NotFound(format!("nearby city {city_id}")))?;
        city.visible_in_webview = !city.visible_in_webview;
        self.ledger.mark(PropertyField::NearbyCities);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Saving and navigation
    // ------------------------------------------------------------------

    /// First persist for a new record, or a whole-record save otherwise
    pub async fn persist(&mut self) -> Result<bool> {
        if self.snap.current().is_persisted() {
            return self.save().await;
        }

        self.saving = true;
        let result = async {
            self.snap.current_mut().id = Uuid::new_v4().to_string();
            let row = self.records.insert(self.snap.current()).await?;
            self.snap.commit(&row);
            self.ledger.clear(None);
            info!(property_id = %row.id, "Property persisted");
            Ok(true)
        }
        .await;
        self.saving = false;

        if result.is_err() {
            // The insert never happened; the record stays unpersisted.
            self.snap.current_mut().id = String::new();
        }
        result
    }

    /// Save every field that differs from the snapshot
    pub async fn save(&mut self) -> Result<bool> {
        self.saving = true;
        let result = self
            .scheduler
            .save_record(&mut self.snap, &mut self.ledger, None)
            .await;
        self.saving = false;
        result
    }

    /// Save a single field if it differs from the snapshot
    pub async fn save_field(&mut self, field: PropertyField) -> Result<bool> {
        self.saving = true;
        let result = self
            .scheduler
            .save_field(&mut self.snap, &mut self.ledger, field)
            .await;
        self.saving = false;
        result
    }

    /// Advance to the next step, saving the current step's fields first
    pub async fn handle_next(&mut self) -> Result<usize> {
        self.save_before_navigation().await?;
        Ok(self.wizard.next())
    }

    pub async fn handle_previous(&mut self) -> Result<usize> {
        self.save_before_navigation().await?;
        Ok(self.wizard.previous())
    }

    pub async fn handle_step_click(&mut self, step: usize) -> Result<usize> {
        self.save_before_navigation().await?;
        Ok(self.wizard.go_to(step))
    }

    /// Gate navigation on save completion: a failed save keeps the editor
    /// on the current step with its ledger intact.
    async fn save_before_navigation(&mut self) -> Result<()> {
        if !self.ledger.is_dirty(None) {
            return Ok(());
        }
        let fields = step_fields(self.wizard.step());
        self.saving = true;
        let result = self
            .scheduler
            .save_record(&mut self.snap, &mut self.ledger, Some(fields))
            .await;
        self.saving = false;
        result.map(|_| ())
    }

    /// Delete the record together with its asset rows and blobs
    pub async fn delete(self) -> Result<()> {
        let property_id = self.snap.current().id.clone();
        if property_id.is_empty() {
            return Ok(());
        }
        self.assets.purge_property(&property_id).await?;
        self.records.delete(&property_id).await?;
        info!(property_id = %property_id, "Property deleted");
        Ok(())
    }
}
