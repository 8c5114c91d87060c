pub mod import;
pub mod init;
pub mod play;
pub mod prune;
pub mod validate;

use std::path::Path;

use anyhow::Result;
use glosor_store::{load_config_from, GlosorConfig};

/// Load the config file and apply the global `--database` override.
pub fn load_config(config: Option<&Path>, database: Option<&Path>) -> Result<GlosorConfig> {
    let mut loaded = load_config_from(config)?;
    if let Some(path) = database {
        loaded.database = path.to_string_lossy().into_owned();
    }
    Ok(loaded)
}
