//! Conversion of CSV files as soon as they land in the input prefix.

use log::info;

use crate::{
    core::{converter::Converter, step::StepExecution},
    error::ConversionError,
    storage::{BlobStore, StorageConfig},
};

/// What a blob trigger did with a new blob.
#[derive(Debug)]
pub enum TriggerOutcome {
    /// The blob was converted; holds the step execution.
    Converted(StepExecution),
    /// The blob is not a CSV file and was left alone.
    Ignored,
}

/// Converts every new `.csv` blob of the input prefix.
///
/// # Examples
///
/// ```rust
/// use csv_to_xml::core::converter::ConverterBuilder;
/// use csv_to_xml::storage::{BlobStore, StorageConfigBuilder, fs::FsBlobStore};
/// use csv_to_xml::trigger::blob::{BlobTrigger, TriggerOutcome};
///
/// # fn example() -> Result<(), csv_to_xml::ConversionError> {
/// let root = tempfile::tempdir().unwrap();
/// let config = StorageConfigBuilder::new()
///     .connection(root.path().to_string_lossy())
///     .build()?;
/// let store = FsBlobStore::from_config(&config)?;
/// let converter = ConverterBuilder::new().build();
/// let trigger = BlobTrigger::new(&store, &config, &converter);
///
/// let outcome = trigger.on_blob_created("cars.csv", b"make\nPorsche\n")?;
/// assert!(matches!(outcome, TriggerOutcome::Converted(_)));
/// assert!(store.exists("xml/cars.xml")?);
///
/// let outcome = trigger.on_blob_created("notes.txt", b"hello")?;
/// assert!(matches!(outcome, TriggerOutcome::Ignored));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct BlobTrigger<'a> {
    store: &'a dyn BlobStore,
    config: &'a StorageConfig,
    converter: &'a Converter<'a>,
}

impl<'a> BlobTrigger<'a> {
    pub fn new(
        store: &'a dyn BlobStore,
        config: &'a StorageConfig,
        converter: &'a Converter<'a>,
    ) -> Self {
        Self {
            store,
            config,
            converter,
        }
    }

    /// Handles the arrival of blob `name` (relative to the input prefix).
    pub fn on_blob_created(
        &self,
        name: &str,
        content: &[u8],
    ) -> Result<TriggerOutcome, ConversionError> {
        if !is_csv(name) {
            info!("Ignoring blob {}, not a CSV file", name);
            return Ok(TriggerOutcome::Ignored);
        }

        info!("Blob trigger processed blob {} ({} bytes)", name, content.len());

        super::run_conversion(
            self.store,
            self.config,
            self.converter,
            name,
            content.to_vec(),
        )
        .map(TriggerOutcome::Converted)
    }
}

fn is_csv(name: &str) -> bool {
    name.len() > 4
        && name
            .get(name.len() - 4..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".csv"))
}

#[cfg(test)]
mod tests {
    use super::is_csv;

    #[test]
    fn csv_extension_is_case_insensitive() {
        assert!(is_csv("data.csv"));
        assert!(is_csv("DATA.CSV"));
        assert!(is_csv("nested/data.Csv"));
    }

    #[test]
    fn other_names_are_not_csv() {
        assert!(!is_csv(".csv"));
        assert!(!is_csv("data.csv.bak"));
        assert!(!is_csv("data.xml"));
        assert!(!is_csv("csv"));
        assert!(!is_csv("données"));
    }
}
