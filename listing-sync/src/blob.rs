//! Blob storage boundary
//!
//! Uploaded bytes live outside the relational store. Paths are namespaced
//! by parent id and asset kind with a collision-resistant UUID file name,
//! so concurrent uploads never clobber each other.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use listing_core::db::AssetKind;
use listing_core::{Error, Result};

/// Blob store consumed by the asset manager
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store bytes under the given path; returns the stored path
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<String>;

    /// Public URL the UI can render for a stored path
    fn public_url(&self, path: &str) -> String;

    /// Best-effort removal of stored paths
    async fn remove(&self, paths: &[String]) -> Result<()>;
}

/// Build the storage path for a new upload, preserving the original file
/// extension when one is present.
pub fn asset_path(property_id: &str, kind: AssetKind, file_name: &str) -> String {
    let name = match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    };
    format!("{}/{}/{}", property_id, kind.as_str(), name)
}

/// Filesystem-backed blob storage rooted under the configured asset folder
pub struct FsBlobStorage {
    root: PathBuf,
    public_base: String,
}

impl FsBlobStorage {
    pub fn new(root: PathBuf, public_base: impl Into<String>) -> Self {
        Self {
            root,
            public_base: public_base.into(),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        // Stored paths are generated by asset_path(); reject anything that
        // would escape the root.
        if path.split('/').any(|part| part == "..") || path.starts_with('/') {
            return Err(Error::InvalidInput(format!("invalid blob path: {path}")));
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl BlobStorage for FsBlobStorage {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        debug!(path = %path, size = bytes.len(), "Stored blob");
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base.trim_end_matches('/'), path)
    }

    async fn remove(&self, paths: &[String]) -> Result<()> {
        // Best-effort: one missing or undeletable file must not strand the
        // rest of the batch.
        for path in paths {
            let target = match self.resolve(path) {
                Ok(target) => target,
                Err(e) => {
                    warn!(path = %path, error = %e, "Blob delete skipped: invalid path");
                    continue;
                }
            };
            match tokio::fs::remove_file(&target).await {
                Ok(()) => debug!(path = %path, "Removed blob"),
                Err(e) => warn!(path = %path, error = %e, "Blob delete failed; continuing"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_paths_are_namespaced_and_unique() {
        let a = asset_path("p1", AssetKind::Image, "photo.jpg");
        let b = asset_path("p1", AssetKind::Image, "photo.jpg");
        assert!(a.starts_with("p1/image/"));
        assert!(a.ends_with(".jpg"));
        assert_ne!(a, b);

        let plain = asset_path("p1", AssetKind::Floorplan, "plan");
        assert!(plain.starts_with("p1/floorplan/"));
    }

    #[tokio::test]
    async fn remove_continues_past_missing_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FsBlobStorage::new(dir.path().to_path_buf(), "/assets");
        store.upload("p1/image/a.jpg", b"a").await.unwrap();
        store.upload("p1/image/b.jpg", b"b").await.unwrap();

        store
            .remove(&[
                "p1/image/a.jpg".to_string(),
                "p1/image/missing.jpg".to_string(),
                "p1/image/b.jpg".to_string(),
            ])
            .await
            .unwrap();

        // Both real files are gone despite the missing one in the middle
        assert!(!dir.path().join("p1/image/a.jpg").exists());
        assert!(!dir.path().join("p1/image/b.jpg").exists());
    }

    #[test]
    fn traversal_paths_are_rejected() {
        let store = FsBlobStorage::new(PathBuf::from("/tmp/assets"), "/assets");
        assert!(store.resolve("p1/image/../../etc/passwd").is_err());
        assert!(store.resolve("/etc/passwd").is_err());
        assert!(store.resolve("p1/image/a.jpg").is_ok());
    }
}
