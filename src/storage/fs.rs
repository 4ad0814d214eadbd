//! A [`BlobStore`] backed by a local directory.

use std::{
    fs,
    io::{self, Write},
    path::{Component, Path, PathBuf},
};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::{
    error::ConversionError,
    storage::{BlobStore, OverwritePolicy, StorageConfig},
};

/// Blob store keeping each blob as a file below a container directory.
///
/// Blob names are relative paths using `/` as separator; absolute names and
/// names with `..` components are refused. Writes go to a temporary file in
/// the target directory that is then renamed over the target, so a reader
/// never sees a half-written blob.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Opens the container directory `root`, creating it if needed.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, ConversionError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            ConversionError::Storage(format!(
                "Cannot create container directory {}: {}",
                root.display(),
                e
            ))
        })?;
        debug!("Container connected to {}", root.display());
        Ok(Self { root })
    }

    /// Opens `<connection>/<container>`.
    pub fn from_config(config: &StorageConfig) -> Result<Self, ConversionError> {
        Self::new(Path::new(config.connection()).join(config.container()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> Result<PathBuf, ConversionError> {
        let relative = Path::new(name);
        let is_plain = !name.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_plain {
            return Err(ConversionError::Storage(format!(
                "Invalid blob name: {:?}",
                name
            )));
        }

        Ok(self.root.join(relative))
    }
}

impl BlobStore for FsBlobStore {
    fn get(&self, name: &str) -> Result<Vec<u8>, ConversionError> {
        let path = self.path_of(name)?;
        debug!("Loading blob {} from {}", name, path.display());
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConversionError::BlobNotFound(name.to_string()),
            _ => ConversionError::Storage(format!("Cannot read blob {}: {}", name, e)),
        })
    }

    fn exists(&self, name: &str) -> Result<bool, ConversionError> {
        let path = self.path_of(name)?;
        path.try_exists()
            .map(|exists| exists && path.is_file())
            .map_err(|e| ConversionError::Storage(format!("Cannot check blob {}: {}", name, e)))
    }

    fn put(&self, name: &str, content: &[u8], policy: OverwritePolicy) -> Result<(), ConversionError> {
        let path = self.path_of(name)?;
        let parent = path.parent().unwrap_or(&self.root);

        fs::create_dir_all(parent).map_err(|e| {
            ConversionError::Storage(format!(
                "Cannot create directory {}: {}",
                parent.display(),
                e
            ))
        })?;

        let mut file = NamedTempFile::new_in(parent)
            .map_err(|e| ConversionError::Storage(format!("Cannot stage blob {}: {}", name, e)))?;
        file.write_all(content)
            .and_then(|()| file.as_file().sync_all())
            .map_err(|e| ConversionError::Storage(format!("Cannot write blob {}: {}", name, e)))?;

        match policy {
            OverwritePolicy::Overwrite => {
                if path.exists() {
                    info!("Replacing existing blob {}", name);
                }
                file.persist(&path).map_err(|e| {
                    ConversionError::Storage(format!("Cannot commit blob {}: {}", name, e.error))
                })?;
            }
            OverwritePolicy::SkipIfExists => {
                file.persist_noclobber(&path).map_err(|e| match e.error.kind() {
                    io::ErrorKind::AlreadyExists => ConversionError::SinkConflict(format!(
                        "Blob {} already exists and overwriting is disabled",
                        name
                    )),
                    _ => ConversionError::Storage(format!("Cannot commit blob {}: {}", name, e.error)),
                })?;
            }
        }

        debug!("Blob {} stored ({} bytes)", name, content.len());
        Ok(())
    }
}
