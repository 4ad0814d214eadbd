use std::error::Error;

use csv_to_xml::storage::{StorageConfig, StorageConfigBuilder, fs::FsBlobStore};
use tempfile::TempDir;

#[allow(dead_code)]
mod mocks;

#[allow(unused_imports)]
pub use mocks::*;

#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A filesystem store in a fresh temporary directory, with its configuration.
#[allow(dead_code)]
pub fn fs_store() -> Result<(TempDir, StorageConfig, FsBlobStore), Box<dyn Error>> {
    let dir = TempDir::new()?;
    let config = StorageConfigBuilder::new()
        .connection(dir.path().to_string_lossy())
        .build()?;
    let store = FsBlobStore::from_config(&config)?;
    Ok((dir, config, store))
}
