//! # Triggers
//!
//! Entry points starting a conversion: [`blob::BlobTrigger`] reacts to a new
//! CSV blob, [`http::HttpTrigger`] converts a stored file named in a request.
//! Both run one [`ConvertTasklet`] as a step and return its [`StepExecution`].

use log::debug;

use crate::{
    core::{
        converter::Converter,
        step::{StepBuilder, StepExecution},
    },
    error::ConversionError,
    storage::{BlobStore, StorageConfig},
    tasklet::convert::ConvertTaskletBuilder,
};

pub mod blob;
pub mod http;

/// Converts `content` of input file `file_name` and saves the document.
fn run_conversion(
    store: &dyn BlobStore,
    config: &StorageConfig,
    converter: &Converter,
    file_name: &str,
    content: Vec<u8>,
) -> Result<StepExecution, ConversionError> {
    let tasklet = ConvertTaskletBuilder::new()
        .store(store)
        .config(config)
        .converter(converter)
        .file_name(file_name)
        .content(content)
        .build()?;

    let name = format!("convert-{}", file_name);
    let step = StepBuilder::new(&name).tasklet(&tasklet).build()?;
    let mut step_execution = StepExecution::new(&name);

    step.execute(&mut step_execution)?;
    debug!(
        "Step {} took {:?}",
        step_execution.name, step_execution.duration
    );

    Ok(step_execution)
}
