//! Error types for target fishing.

use thiserror::Error;

/// Unified error type for loading inputs, validating settings and screening.
///
/// `InvalidSettings` aborts a run before any work is dispatched.
/// `MalformedModel` only affects the protein it was raised for: the screen records it
/// as a [`crate::ScreeningFailure`] and moves on to the remaining models.
#[derive(Error, Debug)]
pub enum ScreeningError {
    /// Run configuration is unusable (non-positive weights, sigma, thresholds, ...)
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// A pharmacophore model violates the hotspot/cluster invariants
    #[error("Malformed pharmacophore model '{model}': {message}")]
    MalformedModel { model: String, message: String },

    /// A ligand feature graph violates the conformer/feature invariants
    #[error("Malformed ligand '{ligand}': {message}")]
    MalformedLigand { ligand: String, message: String },

    /// Unrecognised feature type tag
    #[error("Unknown feature type '{0}'")]
    UnknownFeatureType(String),

    /// Unsupported table file extension
    #[error("Unsupported table format for '{0}'")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Table error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

impl ScreeningError {
    /// Creates a settings error.
    pub fn settings(message: impl Into<String>) -> Self {
        ScreeningError::InvalidSettings(message.into())
    }

    /// Creates a malformed model error.
    pub fn model(model: impl Into<String>, message: impl Into<String>) -> Self {
        ScreeningError::MalformedModel {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Creates a malformed ligand error.
    pub fn ligand(ligand: impl Into<String>, message: impl Into<String>) -> Self {
        ScreeningError::MalformedLigand {
            ligand: ligand.into(),
            message: message.into(),
        }
    }
}
