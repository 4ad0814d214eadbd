//! # Tasklet Module
//!
//! Tasklets are single-task operations run by a [`crate::core::step::TaskletStep`].
//! The [`convert::ConvertTasklet`] turns one CSV file into an XML document and
//! hands it to a [`crate::storage::BlobStore`].

pub mod convert;
