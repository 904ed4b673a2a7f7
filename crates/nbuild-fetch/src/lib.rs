//! Fetch subsystem for nbuild package builds.
//!
//! Given an ordered list of [`DownloadRequest`]s, produce verified files in a
//! package download directory, reusing what is already there and halting
//! with a [`FetchError`] on the first integrity failure, unsupported scheme
//! or unrecoverable network error.

pub mod config;
pub mod logging;

pub mod cache;
pub mod checksum;
pub mod control;
pub mod error;
pub mod fetch;
pub mod lock;
pub mod manifest;
pub mod request;
pub mod retry;
pub mod storage;
pub mod transport;
pub mod url_model;

pub use checksum::{DigestAlgorithm, ExpectedDigest};
pub use error::{FatalKind, FetchError};
pub use fetch::{FetchOptions, FetchSource, Fetched, Fetcher};
pub use manifest::FetchManifest;
pub use request::DownloadRequest;
