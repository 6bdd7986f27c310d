//! Matching engine: ligand features against one protein pharmacophore model.
pub mod assignment;
pub mod scoring;
pub mod search;
pub mod selector;

// Re-exports
pub use assignment::{Assignment, ClusterUsage};
pub use scoring::{pair_contribution, ConformerScorer};
pub use search::{AssignmentSearch, SearchOutcome};
pub use selector::select_features;

use crate::ligand::LigandGraph;
use crate::pharmacophore::PharmacophoreModel;
use crate::settings::Settings;
use tracing::{debug, trace};

/// Score one ligand against one protein model.
///
/// Empty models and ligands without features score 0 without searching.
/// Settings are assumed to be validated by the caller.
pub fn score_model(
    graph: &LigandGraph,
    model: &PharmacophoreModel,
    settings: &Settings,
) -> SearchOutcome {
    if graph.is_empty() || model.is_empty() {
        trace!(
            "Skipping search for {} vs {}: nothing to match",
            graph.name(),
            model.identifier()
        );
        return SearchOutcome::empty();
    }

    let search = AssignmentSearch::new(graph, model, settings);
    let outcome = search.run();
    debug!(
        "{query} vs {protein}: score {score:.4} from {pairs} pairs over {depth} features ({expansions} expansions{truncated})",
        query = graph.name(),
        protein = model.identifier(),
        score = outcome.score,
        pairs = outcome.assignment.len(),
        depth = search.depth(),
        expansions = outcome.expansions,
        truncated = if outcome.truncated { ", truncated" } else { "" },
    );
    outcome
}
