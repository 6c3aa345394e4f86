//! Error types shared by the core controllers and the browser wiring.

use thiserror::Error;

/// Failures surfaced while wiring a page section.
///
/// None of these are fatal: the caller logs them and leaves the affected
/// feature inert.
#[derive(Debug, Error)]
pub enum Error {
    /// A selector or id lookup found nothing.
    #[error("missing element: {selector}")]
    MissingElement { selector: String },

    /// A JavaScript call threw.
    #[error("javascript error: {message}")]
    Js { message: String },

    /// The embedded configuration block could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub fn missing(selector: impl Into<String>) -> Self {
        Error::MissingElement {
            selector: selector.into(),
        }
    }
}

/// Failures of the persisted key-value store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage is unavailable")]
    Unavailable,

    #[error("could not write key {key}: {message}")]
    Write { key: String, message: String },
}

/// Gallery navigation rejected an index.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GalleryError {
    #[error("photo index {index} out of range for {len} photos")]
    OutOfRange { index: usize, len: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
