use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::io::store::{CONFIG_FILE, StoreError};
use crate::model::config::MapConfig;

/// Read `config.toml` from the store directory. A missing file yields the
/// default config; a malformed one is an error.
pub fn read_config(store_dir: &Path) -> Result<MapConfig, StoreError> {
    let config_path = store_dir.join(CONFIG_FILE);
    let config_text = match fs::read_to_string(&config_path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(MapConfig::default());
        }
        Err(e) => {
            return Err(StoreError::ReadError {
                path: config_path,
                source: e,
            });
        }
    };
    Ok(toml::from_str(&config_text)?)
}
