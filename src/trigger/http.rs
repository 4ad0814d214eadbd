//! Conversion of a stored CSV file on request.
//!
//! [`HttpTrigger::handle`] takes the raw body of a request such as
//!
//! ```json
//! { "FileName": "sales.csv" }
//! ```
//!
//! converts `<input prefix>sales.csv` and answers with a status code and a
//! JSON body. It does not depend on any HTTP server: whatever serves the
//! endpoint passes the body in and writes the [`HttpResponse`] out.

use std::path::{Component, Path};

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::{
    core::{converter::Converter, step::StepExecution},
    error::ConversionError,
    storage::{BlobStore, StorageConfig},
};

pub const COMPLETED_MESSAGE: &str = "Conversion Completed";
pub const FAILED_MESSAGE: &str = "Conversion Failed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    #[serde(rename = "FileName")]
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConversionResponse {
    pub message: String,
    pub output: String,
    pub records_emitted: usize,
    pub records_skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    pub message: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// JSON document
    pub body: String,
}

/// Status code answered for a failed conversion.
pub fn status_of(error: &ConversionError) -> u16 {
    match error {
        ConversionError::Request(_) => 400,
        ConversionError::BlobNotFound(_) => 404,
        ConversionError::SinkConflict(_) => 409,
        ConversionError::EmptyInput
        | ConversionError::InvalidElementName { .. }
        | ConversionError::Encoding(_)
        | ConversionError::Parse { .. }
        | ConversionError::SkipLimitExceeded(_) => 422,
        _ => 500,
    }
}

/// Converts the CSV files named in requests.
pub struct HttpTrigger<'a> {
    store: &'a dyn BlobStore,
    config: &'a StorageConfig,
    converter: &'a Converter<'a>,
}

impl<'a> HttpTrigger<'a> {
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

    /// Handles a request body and builds the response.
    pub fn handle(&self, body: &[u8]) -> HttpResponse {
        info!("HTTP trigger processed a request");

        let outcome = serde_json::from_slice::<ConversionRequest>(body)
            .map_err(|e| ConversionError::Request(e.to_string()))
            .and_then(|request| self.convert(&request));

        match outcome {
            Ok(step_execution) => {
                let response = ConversionResponse {
                    message: COMPLETED_MESSAGE.to_string(),
                    output: step_execution.output.unwrap_or_default(),
                    records_emitted: step_execution.write_count,
                    records_skipped: step_execution.skip_count,
                };
                json_response(200, &response)
            }
            Err(err) => {
                error!("Conversion request failed: {}", err);
                let response = ErrorResponse {
                    message: FAILED_MESSAGE.to_string(),
                    error: err.to_string(),
                };
                json_response(status_of(&err), &response)
            }
        }
    }

    /// Loads the requested file from the input prefix, converts it and saves
    /// the document under the output prefix.
    pub fn convert(&self, request: &ConversionRequest) -> Result<StepExecution, ConversionError> {
        let file_name = request.file_name.trim();
        if file_name.is_empty() {
            return Err(ConversionError::Request("FileName must not be empty".to_string()));
        }
        if !is_relative_name(file_name) {
            return Err(ConversionError::Request(format!(
                "FileName must be a relative name without '..': {:?}",
                file_name
            )));
        }

        let content = self.store.get(&self.config.input_key(file_name))?;

        super::run_conversion(self.store, self.config, self.converter, file_name, content)
    }
}

/// `true` when every component of `name` is a plain file or directory name.
fn is_relative_name(name: &str) -> bool {
    Path::new(name)
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
}

fn json_response<T: Serialize>(status: u16, payload: &T) -> HttpResponse {
    match serde_json::to_string(payload) {
        Ok(body) => HttpResponse { status, body },
        Err(e) => {
            error!("Cannot serialize response: {}", e);
            HttpResponse {
                status: 500,
                body: r#"{"Message":"Conversion Failed","Error":"Cannot serialize response"}"#
                    .to_string(),
            }
        }
    }
}
