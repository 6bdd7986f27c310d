//! Screening settings.

use crate::errors::ScreeningError;
use crate::features::FeatureWeights;
use std::time::Duration;

/// Pairs farther apart than this (Å) contribute nothing
pub const DISTANCE_THRESHOLD: f64 = 2.0;
/// Width of the Gaussian distance decay (Å)
pub const SIGMA: f64 = 1.0;
/// Coarse filter used while branching, several Å beyond [`DISTANCE_THRESHOLD`]
pub const GEOMETRIC_CUTOFF: f64 = 6.0;
/// Number of ligand features kept for the assignment search
pub const MAX_SELECTED_FEATURES: usize = 20;
/// Upper bound on selected features; the search recurses once per feature
pub const MAX_SEARCH_DEPTH: usize = 256;
/// Search nodes expanded per protein before giving up on exhaustiveness
pub const NODE_EXPANSION_CAP: usize = 100_000;

/// How per-conformer scores of one assignment are reduced to a single value.
///
/// `Max` counts a molecule as a binder if any one conformer fits;
/// `Mean` averages the per-conformer scores over all N conformers, giving
/// smaller absolute values for flexible molecules.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConformerReduction {
    /// Best single conformer
    #[default]
    Max,
    /// Average over all conformers
    Mean,
}

impl std::fmt::Display for ConformerReduction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ConformerReduction::Max => write!(f, "max"),
            ConformerReduction::Mean => write!(f, "mean"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    /// Importance multiplier per feature type
    pub weights: FeatureWeights,
    /// Exclusive scoring distance cutoff in Å
    pub distance_threshold: f64,
    /// Gaussian decay width in Å
    pub sigma: f64,
    /// Feature-to-cluster distance above which a branch is not explored
    pub geometric_cutoff: f64,
    /// Ligand features kept after priority sorting
    pub max_selected_features: usize,
    /// Scores below this are dropped from rankings
    pub min_score: f64,
    /// Keep only the best N proteins per query
    pub top_n: Option<usize>,
    /// Search nodes expanded per protein
    pub node_expansion_cap: usize,
    /// Optional wall-clock budget per protein
    pub time_limit: Option<Duration>,
    /// Conformer reduction rule
    pub reduction: ConformerReduction,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weights: FeatureWeights::default(),
            distance_threshold: DISTANCE_THRESHOLD,
            sigma: SIGMA,
            geometric_cutoff: GEOMETRIC_CUTOFF,
            max_selected_features: MAX_SELECTED_FEATURES,
            min_score: 0.0,
            top_n: None,
            node_expansion_cap: NODE_EXPANSION_CAP,
            time_limit: None,
            reduction: ConformerReduction::Max,
        }
    }
}

impl Settings {
    /// Check every option before any protein is scored.
    pub fn validate(&self) -> Result<(), ScreeningError> {
        self.weights.validate()?;
        positive("distance_threshold", self.distance_threshold)?;
        positive("sigma", self.sigma)?;
        positive("geometric_cutoff", self.geometric_cutoff)?;
        if !(1..=MAX_SEARCH_DEPTH).contains(&self.max_selected_features) {
            return Err(ScreeningError::settings(format!(
                "max_selected_features must be between 1 and {MAX_SEARCH_DEPTH}, got {}",
                self.max_selected_features
            )));
        }
        if self.node_expansion_cap == 0 {
            return Err(ScreeningError::settings(
                "node_expansion_cap must be at least 1",
            ));
        }
        if self.min_score.is_nan() {
            return Err(ScreeningError::settings("min_score must not be NaN"));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<(), ScreeningError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ScreeningError::settings(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}
