//! Object-storage abstraction for the image derivative pipeline.
//!
//! The `ObjectStorage` trait covers the two operations the pipeline needs
//! (download the source object with its user metadata, upload a derivative
//! with its content type); `S3ObjectStorage` implements it on top of
//! `object_store`. Key derivation for derivatives lives in [`keys`] so the
//! fan-out coordinator and the notifier share one definition.

pub mod keys;
pub mod s3;
pub mod traits;

pub use s3::S3ObjectStorage;
pub use traits::{ObjectStorage, StorageError, StorageResult, StoredObject};
