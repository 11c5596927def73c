//! Hosted backend plumbing for Workdesk.
//!
//! [`BackendClient`] speaks to the auth service, the relational store and the
//! object store. [`ObjectStorage`] is the repository for uploaded files.

pub mod error;
pub mod rest;
pub mod storage;

pub use error::ServiceError;
pub use rest::{error_message, BackendClient};
pub use storage::{
    inline_data_url, validate_image, ObjectStorage, UploadFile, UploadResult, MAX_IMAGE_BYTES,
};

// Re-exported so dependents build requests without naming reqwest directly.
pub use reqwest::Method;
