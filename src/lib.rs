#![doc = include_str!("../README.md")]

//! # Targetfish Library
//!
//! Pharmacophore-based target fishing: a query ligand, described as typed
//! pharmacophoric features over one or more conformers, is scored against every
//! protein pharmacophore model of a database and the proteins are ranked by how
//! well their interaction hotspot clusters can host the ligand's features.
//!
//! Scoring a protein means finding the injective, type-preserving assignment of
//! ligand features to hotspot clusters that maximizes a Gaussian distance score,
//! reduced across conformers. The search is an exact branch-and-bound bounded by
//! a node budget; results are returned as plain structs or Polars DataFrames.

pub mod analysis;
mod errors;
mod features;
pub mod io;
mod ligand;
pub mod matching;
pub mod pharmacophore;
mod ranking;
mod screening;
mod settings;
mod utils;

// Re-export key public types
pub use errors::ScreeningError;
pub use features::{
    FeatureType, FeatureWeights, HYDROPHOBIC_WEIGHT, IONIC_WEIGHT, POLAR_WEIGHT,
};
pub use io::{load_ligands, load_model_database, load_pharmacophore_model};
pub use ligand::{LigandFeatureNode, LigandGraph};
pub use matching::{score_model, Assignment, SearchOutcome};
pub use pharmacophore::{Cluster, Hotspot, PharmacophoreModel};
pub use ranking::{rank, Rankings, ScoreResult};
pub use screening::{
    rankings, screen, screen_query, ModelDatabase, ModelEntry, QueryReport, ScreeningFailure,
};
pub use settings::{
    ConformerReduction, Settings, DISTANCE_THRESHOLD, GEOMETRIC_CUTOFF, MAX_SEARCH_DEPTH,
    MAX_SELECTED_FEATURES, NODE_EXPANSION_CAP, SIGMA,
};
pub use utils::{read_df_from_file, run_with_threads, write_df_to_file, DataFrameFileType};

use polars::prelude::DataFrame;

/// Screen every query against `db` and flatten the rankings into one table.
///
/// # Returns
///
/// A Polars DataFrame with columns `query_name`, `protein_identifier` and `score`,
/// grouped by query name and ordered by descending score within each query.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use targetfish::{get_target_scores, load_ligands, load_model_database, Settings};
///
/// let db = load_model_database(Path::new("path/to/models")).unwrap();
/// let queries: Vec<_> = load_ligands(Path::new("path/to/ligands.csv"))
///     .unwrap()
///     .into_iter()
///     .filter_map(|(_, graph)| graph.ok())
///     .collect();
/// let scores = get_target_scores(&queries, &db, &Settings::default()).unwrap();
/// println!("Scored {} query-target pairs", scores.height());
/// ```
pub fn get_target_scores(
    queries: &[LigandGraph],
    db: &ModelDatabase,
    settings: &Settings,
) -> Result<DataFrame, ScreeningError> {
    let reports = screen(queries, db, settings)?;
    Ok(rankings(&reports).to_df()?)
}
