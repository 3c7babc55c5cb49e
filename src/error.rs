//! Error types for label conversion and delivery.
//!
//! Every stage of the pipeline reports through [`Error`]. All of them are
//! fatal for the label being converted: nothing is sent unless the whole
//! pipeline succeeds.

use thiserror::Error;

/// Main error type for label conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// The rasterizer could not be run or produced output we can't read.
    ///
    /// Covers a missing `pdftoppm` binary, a non-zero exit status, an
    /// unrecognised image header, truncated bitmap data and empty images.
    #[error("Rasterization failed: {0}")]
    Rasterization(String),

    /// Invalid configuration parameter provided.
    ///
    /// Label dimensions and DPI must be positive and finite, and a printer
    /// address must look like `host:port`. Checked before any rasterization.
    #[error("Invalid configuration parameter: {0}")]
    InvalidConfig(String),

    /// The scaled image does not fit the label's pixel box.
    ///
    /// This is an internal invariant violation: the rasterizer overshot more
    /// than the one pixel we compensate for, or centering would place the
    /// bitmap at a negative offset.
    #[error("Scaled image does not fit the label: {0}")]
    FitConsistency(String),

    /// Writing the command script failed.
    #[error(transparent)]
    Transport(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}
