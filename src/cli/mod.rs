pub(crate) mod analyze;
pub(crate) mod score;
pub(crate) mod screen;

use std::path::Path;
use std::time::Duration;
use targetfish::{
    load_ligands, ConformerReduction, FeatureType, FeatureWeights, LigandGraph, ScreeningError,
    Settings, DISTANCE_THRESHOLD, GEOMETRIC_CUTOFF, HYDROPHOBIC_WEIGHT, IONIC_WEIGHT,
    MAX_SELECTED_FEATURES, NODE_EXPANSION_CAP, POLAR_WEIGHT, SIGMA,
};
use tracing::{debug, error};

/// Scoring options shared by the `screen` and `score` subcommands.
#[derive(clap::Args, Debug, Clone)]
pub(crate) struct ScoringArgs {
    /// Weight of cation features
    #[arg(long, default_value_t = IONIC_WEIGHT)]
    cation: f64,

    /// Weight of anion features
    #[arg(long, default_value_t = IONIC_WEIGHT)]
    anion: f64,

    /// Weight of aromatic features
    #[arg(long, default_value_t = POLAR_WEIGHT)]
    aromatic: f64,

    /// Weight of hydrogen bond donor features
    #[arg(long, default_value_t = POLAR_WEIGHT)]
    hbd: f64,

    /// Weight of hydrogen bond acceptor features
    #[arg(long, default_value_t = POLAR_WEIGHT)]
    hba: f64,

    /// Weight of halogen features
    #[arg(long, default_value_t = POLAR_WEIGHT)]
    halogen: f64,

    /// Weight of hydrophobic features
    #[arg(long, default_value_t = HYDROPHOBIC_WEIGHT)]
    hydrophobic: f64,

    /// Feature-to-cluster distance (Å) at or beyond which a pair scores nothing
    #[arg(long, default_value_t = DISTANCE_THRESHOLD)]
    distance_threshold: f64,

    /// Width (Å) of the Gaussian distance decay
    #[arg(long, default_value_t = SIGMA)]
    sigma: f64,

    /// Clusters farther than this (Å) from a feature's centroid are not tried
    #[arg(long, default_value_t = GEOMETRIC_CUTOFF)]
    geometric_cutoff: f64,

    /// Highest-weighted ligand features kept for matching (at most 256)
    #[arg(long = "max-features", default_value_t = MAX_SELECTED_FEATURES)]
    max_features: usize,

    /// Search nodes expanded per protein before returning the best-known score
    #[arg(long = "node-cap", default_value_t = NODE_EXPANSION_CAP)]
    node_cap: usize,

    /// Optional wall-clock budget per protein in milliseconds
    #[arg(long = "time-limit-ms")]
    time_limit_ms: Option<u64>,

    /// How per-conformer scores are combined
    #[arg(long, value_enum, default_value_t = ConformerReduction::Max)]
    reduction: ConformerReduction,
}

impl ScoringArgs {
    pub(crate) fn settings(&self) -> Settings {
        let weights = FeatureWeights::default()
            .with(FeatureType::Cation, self.cation)
            .with(FeatureType::Anion, self.anion)
            .with(FeatureType::Aromatic, self.aromatic)
            .with(FeatureType::HBondDonor, self.hbd)
            .with(FeatureType::HBondAcceptor, self.hba)
            .with(FeatureType::Halogen, self.halogen)
            .with(FeatureType::Hydrophobic, self.hydrophobic);
        Settings {
            weights,
            distance_threshold: self.distance_threshold,
            sigma: self.sigma,
            geometric_cutoff: self.geometric_cutoff,
            max_selected_features: self.max_features,
            node_expansion_cap: self.node_cap,
            time_limit: self.time_limit_ms.map(Duration::from_millis),
            reduction: self.reduction,
            ..Default::default()
        }
    }
}

/// Load the queries of a ligand table, logging and skipping malformed ones.
/// Fails if no query is usable.
pub(crate) fn load_queries(path: &Path) -> Result<Vec<LigandGraph>, ScreeningError> {
    let mut queries = Vec::new();
    for (name, graph) in load_ligands(path)? {
        match graph {
            Ok(graph) => {
                let types = FeatureType::ALL
                    .iter()
                    .zip(graph.type_counts())
                    .filter(|(_, n)| *n > 0)
                    .map(|(t, n)| format!("{n} {t}"))
                    .collect::<Vec<_>>();
                debug!(
                    "Query {name}: {} features ({}) over {} conformer(s)",
                    graph.len(),
                    types.join(", "),
                    graph.n_conformers()
                );
                queries.push(graph);
            }
            Err(e) => error!("Skipping query {name}: {e}"),
        }
    }
    if queries.is_empty() {
        return Err(ScreeningError::ligand(
            path.to_string_lossy(),
            "no usable query in ligand table",
        ));
    }
    Ok(queries)
}
