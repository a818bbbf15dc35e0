//! Configuration loading and root folder resolution
//!
//! Priority order for every setting: command-line argument, environment
//! variable, TOML config file, compiled default.

use std::path::PathBuf;

use serde::Deserialize;

use listing_core::{Error, Result};

pub const ROOT_ENV_VAR: &str = "LISTING_SYNC_ROOT";
pub const PORT_ENV_VAR: &str = "LISTING_SYNC_PORT";
const DEFAULT_PORT: u16 = 5760;

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Folder holding the database and uploaded assets
    pub root_folder: PathBuf,
    pub port: u16,
    /// Base URL prefix under which stored blobs are publicly served
    pub public_asset_base: String,
}

/// Optional keys of the TOML config file
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    root_folder: Option<String>,
    port: Option<u16>,
    public_asset_base: Option<String>,
}

impl Config {
    pub fn resolve(cli_root: Option<&str>, cli_port: Option<u16>) -> Result<Config> {
        let file = load_config_file().unwrap_or_default();

        let root_folder = cli_root
            .map(PathBuf::from)
            .or_else(|| std::env::var(ROOT_ENV_VAR).ok().map(PathBuf::from))
            .or_else(|| file.root_folder.as_deref().map(PathBuf::from))
            .unwrap_or_else(default_root_folder);

        let port = cli_port
            .or_else(|| {
                std::env::var(PORT_ENV_VAR)
                    .ok()
                    .and_then(|p| p.parse().ok())
            })
            .or(file.port)
            .unwrap_or(DEFAULT_PORT);

        let public_asset_base = file
            .public_asset_base
            .unwrap_or_else(|| "/assets".to_string());

        Ok(Config {
            root_folder,
            port,
            public_asset_base,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("listings.db")
    }

    pub fn blob_root(&self) -> PathBuf {
        self.root_folder.join("assets")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(self.blob_root())?;
        Ok(())
    }
}

fn load_config_file() -> Result<ConfigFile> {
    let path = dirs::config_dir()
        .map(|d| d.join("listing-sync").join("config.toml"))
        .ok_or_else(|| Error::Config("could not determine config directory".to_string()))?;

    if !path.exists() {
        return Err(Error::Config(format!("config file not found: {}", path.display())));
    }

    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}

fn default_root_folder() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("listing-sync"))
        .unwrap_or_else(|| PathBuf::from("./listing-sync-data"))
}
