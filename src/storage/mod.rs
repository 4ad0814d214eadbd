//! # Storage
//!
//! Source and sink collaborators of a conversion. A [`BlobStore`] is a flat
//! namespace of named blobs (an object storage container, a local directory);
//! input CSV files live under the configured input prefix and converted XML
//! documents are written under the output prefix.
//!
//! ## Examples
//!
//! ```rust
//! use csv_to_xml::storage::{BlobStore, OverwritePolicy, StorageConfigBuilder, fs::FsBlobStore};
//!
//! # fn example() -> Result<(), csv_to_xml::ConversionError> {
//! let root = tempfile::tempdir().unwrap();
//! let config = StorageConfigBuilder::new()
//!     .connection(root.path().to_string_lossy())
//!     .container("conversions")
//!     .build()?;
//!
//! let store = FsBlobStore::from_config(&config)?;
//! store.put("csv/cars.csv", b"make,model\nPorsche,356\n", OverwritePolicy::Overwrite)?;
//!
//! assert!(store.exists("csv/cars.csv")?);
//! assert_eq!(config.output_key("cars.csv"), "xml/cars.xml");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::{fmt, path::Path, str::FromStr};

use crate::error::ConversionError;

pub mod fs;

#[cfg(feature = "s3")]
#[cfg_attr(docsrs, doc(cfg(feature = "s3")))]
pub mod s3;

/// What to do when the output blob already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Replace the existing blob.
    #[default]
    Overwrite,
    /// Leave the existing blob alone and fail with
    /// [`ConversionError::SinkConflict`].
    SkipIfExists,
}

impl FromStr for OverwritePolicy {
    type Err = ConversionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(OverwritePolicy::Overwrite),
            "skip-if-exists" | "skip_if_exists" | "skip" => Ok(OverwritePolicy::SkipIfExists),
            other => Err(ConversionError::Configuration(format!(
                "Unknown overwrite policy: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverwritePolicy::Overwrite => write!(f, "overwrite"),
            OverwritePolicy::SkipIfExists => write!(f, "skip-if-exists"),
        }
    }
}

/// A store of named blobs.
///
/// Implementations must be safe to share between workers converting
/// different files concurrently.
pub trait BlobStore: Send + Sync {
    /// Returns the full content of blob `name`, or
    /// [`ConversionError::BlobNotFound`].
    fn get(&self, name: &str) -> Result<Vec<u8>, ConversionError>;

    fn exists(&self, name: &str) -> Result<bool, ConversionError>;

    /// Stores `content` as blob `name`.
    ///
    /// The write is all-or-nothing: readers see either the previous blob or
    /// the complete new one. With [`OverwritePolicy::SkipIfExists`] an existing
    /// blob makes the call fail with [`ConversionError::SinkConflict`].
    fn put(&self, name: &str, content: &[u8], policy: OverwritePolicy) -> Result<(), ConversionError>;
}

/// Replaces the extension of `name` with `xml`, keeping its directories.
///
/// ```
/// use csv_to_xml::storage::xml_name;
///
/// assert_eq!(xml_name("sales.csv"), "sales.xml");
/// assert_eq!(xml_name("2024/q1.sales.CSV"), "2024/q1.sales.xml");
/// assert_eq!(xml_name("README"), "README.xml");
/// ```
pub fn xml_name(name: &str) -> String {
    Path::new(name)
        .with_extension("xml")
        .to_string_lossy()
        .into_owned()
}

pub const DEFAULT_CONTAINER: &str = "csv-to-xml";
pub const DEFAULT_INPUT_PREFIX: &str = "csv/";
pub const DEFAULT_OUTPUT_PREFIX: &str = "xml/";

pub const CONNECTION_VAR: &str = "CSV2XML_STORAGE_CONNECTION";
pub const CONTAINER_VAR: &str = "CSV2XML_CONTAINER";
pub const OVERWRITE_VAR: &str = "CSV2XML_OVERWRITE";

/// Where converted files come from and go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    connection: String,
    container: String,
    input_prefix: String,
    output_prefix: String,
    overwrite: OverwritePolicy,
}

impl StorageConfig {
    /// Reads the configuration from the process environment.
    ///
    /// - `CSV2XML_STORAGE_CONNECTION` (required): store specific connection
    ///   string, a root directory for [`fs::FsBlobStore`]
    /// - `CSV2XML_CONTAINER`: container name, defaults to `csv-to-xml`
    /// - `CSV2XML_OVERWRITE`: `overwrite` (default) or `skip-if-exists`
    pub fn from_env() -> Result<Self, ConversionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`StorageConfig::from_env`] with a custom variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConversionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let connection = lookup(CONNECTION_VAR).ok_or_else(|| {
            ConversionError::Configuration(format!("{} is not set", CONNECTION_VAR))
        })?;

        let mut builder = StorageConfigBuilder::new().connection(connection);

        if let Some(container) = lookup(CONTAINER_VAR) {
            builder = builder.container(container);
        }

        if let Some(policy) = lookup(OVERWRITE_VAR) {
            builder = builder.overwrite(policy.parse()?);
        }

        builder.build()
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn overwrite(&self) -> OverwritePolicy {
        self.overwrite
    }

    /// Blob name of input file `file_name`.
    pub fn input_key(&self, file_name: &str) -> String {
        format!("{}{}", self.input_prefix, file_name)
    }

    /// Blob name of the XML document converted from input file `file_name`.
    pub fn output_key(&self, file_name: &str) -> String {
        format!("{}{}", self.output_prefix, xml_name(file_name))
    }
}

/// Builder for [`StorageConfig`].
#[derive(Debug, Clone)]
pub struct StorageConfigBuilder {
    connection: Option<String>,
    container: String,
    input_prefix: String,
    output_prefix: String,
    overwrite: OverwritePolicy,
}

impl Default for StorageConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageConfigBuilder {
    pub fn new() -> Self {
        Self {
            connection: None,
            container: DEFAULT_CONTAINER.to_string(),
            input_prefix: DEFAULT_INPUT_PREFIX.to_string(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            overwrite: OverwritePolicy::default(),
        }
    }

    pub fn connection<S: Into<String>>(mut self, connection: S) -> Self {
        self.connection = Some(connection.into());
        self
    }

    pub fn container<S: Into<String>>(mut self, container: S) -> Self {
        self.container = container.into();
        self
    }

    pub fn input_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.input_prefix = prefix.into();
        self
    }

    pub fn output_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.output_prefix = prefix.into();
        self
    }

    pub fn overwrite(mut self, policy: OverwritePolicy) -> Self {
        self.overwrite = policy;
        self
    }

    pub fn build(self) -> Result<StorageConfig, ConversionError> {
        let connection = self
            .connection
            .ok_or_else(|| ConversionError::Configuration("Connection is required".to_string()))?;

        if self.container.trim().is_empty() {
            return Err(ConversionError::Configuration(
                "Container name must not be empty".to_string(),
            ));
        }

        if self.input_prefix == self.output_prefix {
            return Err(ConversionError::Configuration(format!(
                "Input and output prefixes must differ, both are {:?}",
                self.input_prefix
            )));
        }

        Ok(StorageConfig {
            connection,
            container: self.container,
            input_prefix: self.input_prefix,
            output_prefix: self.output_prefix,
            overwrite: self.overwrite,
        })
    }
}
