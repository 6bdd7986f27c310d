use crate::features::FeatureWeights;
use crate::ligand::LigandGraph;

/// Pick the ligand features used for the assignment search.
///
/// Features are ordered by descending weight, keeping the original feature order
/// among equal weights, and the first `max_features` are returned as indices into
/// [`LigandGraph::features`].
pub fn select_features(
    graph: &LigandGraph,
    weights: &FeatureWeights,
    max_features: usize,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..graph.len()).collect();
    // Stable sort keeps ties in input order
    order.sort_by(|&a, &b| {
        let wa = weights.get(graph.feature(a).feature_type);
        let wb = weights.get(graph.feature(b).feature_type);
        wb.total_cmp(&wa)
    });
    order.truncate(max_features);
    order
}
