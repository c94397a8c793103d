use std::fs;
use std::path::Path;

use ezcon_core::DefaultsCatalog;
use ezcon_logging::{ezcon_info, ezcon_warn};

pub const DEFAULTS_FILE_NAME: &str = "ezDefaults.txt";

/// Reads the defaults catalog; a missing file yields an empty catalog.
pub fn load_defaults_catalog(path: &Path) -> DefaultsCatalog {
    match fs::read_to_string(path) {
        Ok(text) => {
            let catalog = DefaultsCatalog::parse(&text);
            ezcon_info!("{} defaults read from {}", catalog.len(), path.display());
            catalog
        }
        Err(err) => {
            ezcon_warn!("Error loading defaults from {}: {err}", path.display());
            DefaultsCatalog::default()
        }
    }
}
