//! A [`BlobStore`] backed by an S3 bucket.
//!
//! The store owns a current-thread `tokio` runtime and blocks on every SDK
//! call, so it must not be used from inside another `tokio` runtime.

use std::fmt::Display;

use aws_config::BehaviorVersion;
use aws_sdk_s3::{Client, error::ProvideErrorMetadata, primitives::ByteStream};
use log::{debug, info};
use tokio::runtime::{Builder, Runtime};

use crate::{
    error::ConversionError,
    storage::{BlobStore, OverwritePolicy, StorageConfig},
};

/// Blob store mapping the container to a bucket and blob names to object keys.
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    runtime: Runtime,
}

impl S3BlobStore {
    /// Connects to the bucket named by the configured container.
    ///
    /// Credentials and region come from the usual AWS environment. A non-empty
    /// connection string is used as endpoint URL (path-style addressing), which
    /// is what S3-compatible servers expect.
    pub fn from_config(config: &StorageConfig) -> Result<Self, ConversionError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ConversionError::Storage(format!("Cannot start S3 runtime: {}", e)))?;

        let shared = runtime.block_on(aws_config::load_defaults(BehaviorVersion::latest()));
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if !config.connection().is_empty() {
            builder = builder
                .endpoint_url(config.connection())
                .force_path_style(true);
        }

        debug!("Container connected to s3://{}", config.container());

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.container().to_string(),
            runtime,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl BlobStore for S3BlobStore {
    fn get(&self, name: &str) -> Result<Vec<u8>, ConversionError> {
        debug!("Loading s3://{}/{}", self.bucket, name);
        self.runtime.block_on(async {
            let output = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(name)
                .send()
                .await
                .map_err(|e| {
                    if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                        ConversionError::BlobNotFound(name.to_string())
                    } else {
                        ConversionError::Storage(format!("Cannot read blob {}: {}", name, e))
                    }
                })?;

            let data = output.body.collect().await.map_err(|e| {
                ConversionError::Storage(format!("Cannot read blob {}: {}", name, e))
            })?;

            Ok(data.into_bytes().to_vec())
        })
    }

    fn exists(&self, name: &str) -> Result<bool, ConversionError> {
        self.runtime.block_on(async {
            match self
                .client
                .head_object()
                .bucket(&self.bucket)
                .key(name)
                .send()
                .await
            {
                Ok(_) => Ok(true),
                Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
                Err(e) => Err(ConversionError::Storage(format!(
                    "Cannot check blob {}: {}",
                    name, e
                ))),
            }
        })
    }

    fn put(&self, name: &str, content: &[u8], policy: OverwritePolicy) -> Result<(), ConversionError> {
        if self.exists(name)? {
            match policy {
                OverwritePolicy::Overwrite => info!("Replacing existing blob {}", name),
                OverwritePolicy::SkipIfExists => return Err(conflict(name)),
            }
        }

        // A single PUT replaces the object whole. Under SkipIfExists the PUT is
        // conditional, so a blob created since the check above is kept.
        self.runtime.block_on(async {
            let mut request = self
                .client
                .put_object()
                .bucket(&self.bucket)
                .key(name)
                .body(ByteStream::from(content.to_vec()));

            if policy == OverwritePolicy::SkipIfExists {
                request = request.if_none_match("*");
            }

            request.send().await.map_err(|e| {
                let status = e.raw_response().map(|response| response.status().as_u16());
                let code = e.as_service_error().and_then(|se| se.code());
                put_failure(name, status, code, &e)
            })
        })?;

        debug!("Blob s3://{}/{} stored ({} bytes)", self.bucket, name, content.len());
        Ok(())
    }
}

fn conflict(name: &str) -> ConversionError {
    ConversionError::SinkConflict(format!(
        "Blob {} already exists and overwriting is disabled",
        name
    ))
}

/// Maps a failed PUT. A failed `If-None-Match` precondition (412) or a
/// concurrent conditional write (409) means the blob appeared meanwhile.
fn put_failure(
    name: &str,
    status: Option<u16>,
    code: Option<&str>,
    error: &dyn Display,
) -> ConversionError {
    let lost_race = matches!(status, Some(409 | 412))
        || matches!(code, Some("PreconditionFailed" | "ConditionalRequestConflict"));

    if lost_race {
        conflict(name)
    } else {
        ConversionError::Storage(format!("Cannot write blob {}: {}", name, error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_precondition_is_a_sink_conflict() {
        let by_status = put_failure("xml/a.xml", Some(412), None, &"precondition failed");
        let by_code = put_failure("xml/a.xml", None, Some("PreconditionFailed"), &"precondition failed");
        let concurrent = put_failure("xml/a.xml", Some(409), Some("ConditionalRequestConflict"), &"conflict");

        for error in [by_status, by_code, concurrent] {
            assert!(
                matches!(&error, ConversionError::SinkConflict(message) if message.contains("xml/a.xml")),
                "{:?} should be a sink conflict",
                error
            );
        }
    }

    #[test]
    fn other_put_failures_are_storage_errors() {
        let denied = put_failure("xml/a.xml", Some(403), Some("AccessDenied"), &"access denied");
        let offline = put_failure("xml/a.xml", None, None, &"dispatch failure");

        assert!(matches!(denied, ConversionError::Storage(message) if message.contains("access denied")));
        assert!(matches!(offline, ConversionError::Storage(_)));
    }
}
