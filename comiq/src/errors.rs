//! Error-handling for this library.

use std::{path::PathBuf, result};

use thiserror::Error;

/// Our standard result type.
pub type Result<T, E = Error> = result::Result<T, E>;

/// A boxed error from an external collaborator (an OCR engine, the model
/// provider, etc).
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors which can be returned by this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller did not ask for any OCR engines.
    #[error("no OCR engines were requested")]
    NoEnginesRequested,

    /// The caller asked for an OCR engine which has not been registered.
    #[error(
        "unknown OCR engine {name:?} (available engines: {})",
        .available.join(", ")
    )]
    UnknownEngine {
        /// The first engine name which did not match.
        name: String,
        /// All registered engine names.
        available: Vec<String>,
    },

    /// We need a credential which was not provided.
    #[error("no API key found (set {var} in your environment or in .env)")]
    MissingCredential {
        /// The environment variable we looked at.
        var: &'static str,
    },

    /// We could not load a configuration file.
    #[error("could not load configuration from {}", .path.display())]
    Config {
        /// The configuration file.
        path: PathBuf,
        /// The underlying error.
        source: BoxedError,
    },

    /// An OCR engine failed.
    #[error("OCR engine {engine:?} failed")]
    Ocr {
        /// The name under which the engine was registered.
        engine: String,
        /// The underlying error.
        source: BoxedError,
    },

    /// The model's reply could not be interpreted as a list of text groups.
    #[error("could not parse model response as text groups")]
    Validation {
        /// The raw reply, for debugging.
        raw: String,
        /// The error from decoding the standard `{"groups": [...]}` shape.
        source: serde_json::Error,
    },

    /// The request to the model failed.
    #[error("multimodal model request failed")]
    Model {
        /// The underlying error.
        source: BoxedError,
    },

    /// The model replied, but without any content.
    #[error("multimodal model returned an empty response")]
    EmptyResponse,

    /// We could not read an image.
    #[error("could not read image {}", .path.display())]
    ReadImage {
        /// The image we tried to read.
        path: PathBuf,
        /// The underlying error.
        source: image::ImageError,
    },

    /// The image has no pixels, so there is nothing to normalize against.
    #[error("image is empty ({width}x{height})")]
    EmptyImage {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },

    /// A background task doing image or OCR work panicked or was cancelled.
    #[error("background image processing task failed")]
    Background {
        /// The underlying error.
        #[from]
        source: tokio::task::JoinError,
    },

    /// We could not encode an image for the model.
    #[error("could not encode image")]
    EncodeImage {
        /// The underlying error.
        #[from]
        source: image::ImageError,
    },
}

impl Error {
    /// Is this a configuration problem, as opposed to something which went
    /// wrong while processing a particular image?
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::NoEnginesRequested
                | Error::UnknownEngine { .. }
                | Error::MissingCredential { .. }
                | Error::Config { .. }
        )
    }
}
