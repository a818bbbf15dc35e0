//! Dual-Store Asset Consistency Manager
//!
//! Every uploaded gallery image and floorplan lives in two places: the
//! record's inline JSON column and one row in the side asset table. The
//! side table is the durable source of truth; the inline column is a
//! denormalized cache of it that can legitimately be empty and is
//! back-filled on fetch.
//!
//! Upload order is blob → side-table row → inline append; a side-table
//! failure after a successful blob write leaves the blob behind (logged,
//! accepted leak). Removal deletes remotely best-effort and always purges
//! every in-memory reference in a single update, so the UI never shows a
//! half-removed asset.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use listing_core::db::{AssetKind, AssetRow};
use listing_core::model::{Floorplan, Image};
use listing_core::{Error, Property, PropertyField, Result};

use crate::blob::{asset_path, BlobStorage};
use crate::store::AssetTable;

use super::dirty::DirtyLedger;
use super::snapshot::SnapshotStore;

pub struct AssetManager {
    table: Arc<dyn AssetTable>,
    blobs: Arc<dyn BlobStorage>,
}

impl AssetManager {
    pub fn new(table: Arc<dyn AssetTable>, blobs: Arc<dyn BlobStorage>) -> Self {
        Self { table, blobs }
    }

    /// Upload a gallery image: blob, side-table row, inline append
    pub async fn upload_image(
        &self,
        snap: &mut SnapshotStore,
        ledger: &mut DirtyLedger,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Image> {
        let row = self
            .upload_asset(snap.current(), AssetKind::Image, file_name, bytes)
            .await?;

        let image = Image {
            id: row.id.clone(),
            url: row.url.clone(),
            file_path: row.file_path.clone(),
        };
        snap.current_mut().images.push(image.clone());
        ledger.mark(PropertyField::Images);
        Ok(image)
    }

    /// Upload a floorplan: blob, side-table row, inline append
    pub async fn upload_floorplan(
        &self,
        snap: &mut SnapshotStore,
        ledger: &mut DirtyLedger,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Floorplan> {
        let row = self
            .upload_asset(snap.current(), AssetKind::Floorplan, file_name, bytes)
            .await?;

        let floorplan = Floorplan {
            id: row.id.clone(),
            url: row.url.clone(),
            file_path: row.file_path.clone(),
            columns: Floorplan::DEFAULT_COLUMNS,
        };
        snap.current_mut().floorplans.push(floorplan.clone());
        ledger.mark(PropertyField::Floorplans);
        Ok(floorplan)
    }

    async fn upload_asset(
        &self,
        property: &Property,
        kind: AssetKind,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<AssetRow> {
        if !property.is_persisted() {
            return Err(Error::InvalidInput(
                "record must be saved before uploading assets".to_string(),
            ));
        }

        let path = asset_path(&property.id, kind, file_name);
        let stored_path = self.blobs.upload(&path, bytes).await?;
        let url = self.blobs.public_url(&stored_path);

        let row = AssetRow {
            id: Uuid::new_v4().to_string(),
            property_id: property.id.clone(),
            url,
            file_path: Some(stored_path.clone()),
            kind,
            created_at: String::new(),
        };

        match self.table.insert(&row).await {
            Ok(stored) => {
                info!(
                    property_id = %property.id,
                    kind = kind.as_str(),
                    path = %stored_path,
                    "Asset uploaded"
                );
                Ok(stored)
            }
            Err(e) => {
                // The blob is already written; it stays behind as an
                // accepted leak rather than risking a dangling reference.
                warn!(
                    property_id = %property.id,
                    path = %stored_path,
                    error = %e,
                    "Asset row insert failed after blob write; blob left behind"
                );
                Err(e)
            }
        }
    }

    /// Remove an asset and purge every reference to it
    ///
    /// Side-table and blob deletes are best-effort: failures are logged
    /// and the in-memory purge proceeds regardless, favoring a consistent
    /// visible state over a perfectly consistent remote state.
    pub async fn remove(
        &self,
        snap: &mut SnapshotStore,
        ledger: &mut DirtyLedger,
        kind: AssetKind,
        asset_id: &str,
    ) -> Result<()> {
        let (url, file_path) = match kind {
            AssetKind::Image => match snap.current().image(asset_id) {
                Some(image) => (image.url.clone(), image.file_path.clone()),
                None => {
                    warn!(asset_id = %asset_id, "Remove skipped: image not in record");
                    return Ok(());
                }
            },
            AssetKind::Floorplan => match snap.current().floorplan(asset_id) {
                Some(plan) => (plan.url.clone(), plan.file_path.clone()),
                None => {
                    warn!(asset_id = %asset_id, "Remove skipped: floorplan not in record");
                    return Ok(());
                }
            },
        };

        if let Err(e) = self.table.delete(asset_id).await {
            warn!(asset_id = %asset_id, error = %e, "Asset row delete failed; continuing");
        }
        if let Some(path) = file_path {
            if let Err(e) = self.blobs.remove(&[path.clone()]).await {
                warn!(path = %path, error = %e, "Blob delete failed; continuing");
            }
        }

        purge_references(snap, ledger, kind, asset_id, &url);
        info!(asset_id = %asset_id, kind = kind.as_str(), "Asset removed");
        Ok(())
    }

    /// Back-fill empty inline collections from the side table
    ///
    /// Runs on fetch, before the snapshot is taken: when the record has an
    /// id but an inline collection is empty, the side table is
    /// authoritative and repopulates the inline view.
    pub async fn reconcile(&self, property: &mut Property) -> Result<()> {
        if !property.is_persisted() {
            return Ok(());
        }

        if property.images.is_empty() {
            let rows = self.table.list(&property.id, AssetKind::Image).await?;
            if !rows.is_empty() {
                info!(
                    property_id = %property.id,
                    count = rows.len(),
                    "Back-filled gallery from asset table"
                );
                property.images = rows
                    .into_iter()
                    .map(|r| Image {
                        id: r.id,
                        url: r.url,
                        file_path: r.file_path,
                    })
                    .collect();
            }
        }

        if property.floorplans.is_empty() {
            let rows = self.table.list(&property.id, AssetKind::Floorplan).await?;
            if !rows.is_empty() {
                info!(
                    property_id = %property.id,
                    count = rows.len(),
                    "Back-filled floorplans from asset table"
                );
                property.floorplans = rows
                    .into_iter()
                    .map(|r| Floorplan {
                        id: r.id,
                        url: r.url,
                        file_path: r.file_path,
                        columns: Floorplan::DEFAULT_COLUMNS,
                    })
                    .collect();
            }
        }

        Ok(())
    }

    /// Upload an image into an Area's own pool
    ///
    /// Area images are embedded in the areas column (their inline store is
    /// the column itself) and have blobs but no side-table rows.
    pub async fn upload_area_image(
        &self,
        snap: &mut SnapshotStore,
        ledger: &mut DirtyLedger,
        area_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Image> {
        let property_id = snap.current().id.clone();
        if property_id.is_empty() {
            return Err(Error::InvalidInput(
                "record must be saved before uploading assets".to_string(),
            ));
        }
        if snap.current().area(area_id).is_none() {
            return Err(Error::NotFound(format!("area {area_id}")));
        }

        let name = asset_path(&property_id, AssetKind::Image, file_name);
        let path = format!("{property_id}/areas/{area_id}/{}", last_segment(&name));
        let stored_path = self.blobs.upload(&path, bytes).await?;
        let url = self.blobs.public_url(&stored_path);

        let image = Image::new(url, Some(stored_path));
        let area = snap
            .current_mut()
            .area_mut(area_id)
            .ok_or_else(|| Error::NotFound(format!("area {area_id}")))?;
        area.images.push(image.clone());
        ledger.mark(PropertyField::Areas);
        Ok(image)
    }

    /// Remove an image from an Area's pool, including its selection entry
    pub async fn remove_area_image(
        &self,
        snap: &mut SnapshotStore,
        ledger: &mut DirtyLedger,
        area_id: &str,
        image_id: &str,
    ) -> Result<()> {
        let file_path = snap
            .current()
            .area(area_id)
            .and_then(|a| a.images.iter().find(|i| i.id == image_id))
            .and_then(|i| i.file_path.clone());

        if let Some(path) = file_path {
            if let Err(e) = self.blobs.remove(&[path.clone()]).await {
                warn!(path = %path, error = %e, "Blob delete failed; continuing");
            }
        }

        if let Some(area) = snap.current_mut().area_mut(area_id) {
            let before = area.images.len();
            area.images.retain(|i| i.id != image_id);
            area.image_ids.retain(|id| id != image_id);
            if area.images.len() != before {
                ledger.mark(PropertyField::Areas);
            }
        }
        Ok(())
    }

    /// Remove every remote trace of a property's assets (record deletion)
    pub async fn purge_property(&self, property_id: &str) -> Result<()> {
        let rows = self.table.delete_for_property(property_id).await?;
        let paths: Vec<String> = rows.into_iter().filter_map(|r| r.file_path).collect();
        if !paths.is_empty() {
            if let Err(e) = self.blobs.remove(&paths).await {
                warn!(property_id = %property_id, error = %e, "Blob cleanup failed during purge");
            }
        }
        Ok(())
    }
}

/// Purge every in-memory reference to an asset in one update: the inline
/// collection, `featured_image`, featured/grid membership, and any
/// technical item pointing at a removed floorplan.
fn purge_references(
    snap: &mut SnapshotStore,
    ledger: &mut DirtyLedger,
    kind: AssetKind,
    asset_id: &str,
    url: &str,
) {
    let property = snap.current_mut();
    ledger.mark(kind.inline_field());
    match kind {
        AssetKind::Image => {
            property.images.retain(|i| i.id != asset_id);

            if property.featured_image.as_deref() == Some(url) {
                property.featured_image = None;
                ledger.mark(PropertyField::FeaturedImage);
            }
            if property.featured_images.iter().any(|u| u == url) {
                property.featured_images.retain(|u| u != url);
                ledger.mark(PropertyField::FeaturedImages);
            }
            if property.grid_images.iter().any(|u| u == url) {
                property.grid_images.retain(|u| u != url);
                ledger.mark(PropertyField::GridImages);
            }
        }
        AssetKind::Floorplan => {
            property.floorplans.retain(|f| f.id != asset_id);

            let mut any_cleared = false;
            for item in &mut property.technical_items {
                if item.floorplan_id.as_deref() == Some(asset_id) {
                    item.floorplan_id = None;
                    any_cleared = true;
                }
            }
            if any_cleared {
                ledger.mark(PropertyField::TechnicalItems);
            }
        }
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
