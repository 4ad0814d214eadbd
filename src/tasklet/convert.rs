//! # Conversion Tasklet
//!
//! Converts one CSV file into an XML document and stores the document in a
//! [`BlobStore`], as a single batch step.
//!
//! ## Examples
//!
//! ```rust
//! use csv_to_xml::core::converter::ConverterBuilder;
//! use csv_to_xml::core::step::{StepBuilder, StepExecution};
//! use csv_to_xml::storage::{BlobStore, StorageConfigBuilder, fs::FsBlobStore};
//! use csv_to_xml::tasklet::convert::ConvertTaskletBuilder;
//!
//! # fn example() -> Result<(), csv_to_xml::ConversionError> {
//! let root = tempfile::tempdir().unwrap();
//! let config = StorageConfigBuilder::new()
//!     .connection(root.path().to_string_lossy())
//!     .build()?;
//! let store = FsBlobStore::from_config(&config)?;
//! let converter = ConverterBuilder::new().build();
//!
//! let tasklet = ConvertTaskletBuilder::new()
//!     .store(&store)
//!     .config(&config)
//!     .converter(&converter)
//!     .file_name("cars.csv")
//!     .content(b"make,model\nPorsche,356\nMazda,CX-30\n".to_vec())
//!     .build()?;
//!
//! let step = StepBuilder::new("convert-cars").tasklet(&tasklet).build()?;
//! let mut step_execution = StepExecution::new("convert-cars");
//! step.execute(&mut step_execution)?;
//!
//! assert_eq!(step_execution.write_count, 2);
//! assert_eq!(step_execution.output.as_deref(), Some("xml/cars.xml"));
//! assert!(store.exists("xml/cars.xml")?);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use log::{debug, info};

use crate::{
    core::{
        converter::Converter,
        step::{RepeatStatus, StepExecution, Tasklet},
    },
    error::ConversionError,
    storage::{BlobStore, OverwritePolicy, StorageConfig},
};

/// A tasklet converting one CSV file and saving the resulting XML document.
///
/// The document is stored under the configured output prefix, named after the
/// input file with its extension replaced by `.xml`. Nothing is stored when
/// the conversion fails.
pub struct ConvertTasklet<'a> {
    store: &'a dyn BlobStore,
    config: &'a StorageConfig,
    converter: &'a Converter<'a>,
    /// Input file name, relative to the input prefix
    file_name: String,
    content: Vec<u8>,
    overwrite: OverwritePolicy,
}

impl ConvertTasklet<'_> {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Tasklet for ConvertTasklet<'_> {
    fn execute(&self, step_execution: &mut StepExecution) -> Result<RepeatStatus, ConversionError> {
        info!(
            "Converting {} ({} bytes)",
            self.file_name,
            self.content.len()
        );

        let result = self.converter.convert_bytes(&self.content)?;
        debug!("Data converted to XML");

        step_execution.read_count = result.read_count();
        step_execution.write_count = result.write_count();
        step_execution.skip_count = result.skipped();

        let output = self.config.output_key(&self.file_name);
        info!("Saving XML to {}", output);
        self.store
            .put(&output, result.document(), self.overwrite)?;

        step_execution.output = Some(output);
        Ok(RepeatStatus::Finished)
    }
}

/// Builder for [`ConvertTasklet`].
///
/// The overwrite policy defaults to the one of the storage configuration.
#[derive(Default)]
pub struct ConvertTaskletBuilder<'a> {
    store: Option<&'a dyn BlobStore>,
    config: Option<&'a StorageConfig>,
    converter: Option<&'a Converter<'a>>,
    file_name: Option<String>,
    content: Option<Vec<u8>>,
    overwrite: Option<OverwritePolicy>,
}

impl<'a> ConvertTaskletBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: &'a dyn BlobStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(mut self, config: &'a StorageConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn converter(mut self, converter: &'a Converter<'a>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn file_name<S: Into<String>>(mut self, file_name: S) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn content(mut self, content: Vec<u8>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn overwrite(mut self, policy: OverwritePolicy) -> Self {
        self.overwrite = Some(policy);
        self
    }

    pub fn build(self) -> Result<ConvertTasklet<'a>, ConversionError> {
        let store = self
            .store
            .ok_or_else(|| ConversionError::Configuration("Blob store is required".to_string()))?;

        let config = self
            .config
            .ok_or_else(|| ConversionError::Configuration("Storage config is required".to_string()))?;

        let converter = self
            .converter
            .ok_or_else(|| ConversionError::Configuration("Converter is required".to_string()))?;

        let file_name = self
            .file_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ConversionError::Configuration("File name is required".to_string()))?;

        let content = self
            .content
            .ok_or_else(|| ConversionError::Configuration("Content is required".to_string()))?;

        Ok(ConvertTasklet {
            store,
            config,
            converter,
            file_name,
            content,
            overwrite: self.overwrite.unwrap_or(config.overwrite()),
        })
    }
}
