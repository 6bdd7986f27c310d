//! Conformer-aware scoring of feature-to-cluster assignments.
//!
//! A mapped pair contributes `w · exp(-d² / 2σ²)` when the feature sits closer
//! than the distance threshold to the cluster center in a given conformer, and
//! nothing otherwise. Per-conformer scores are the sums over pairs; the final
//! assignment score reduces them across conformers with [`ConformerReduction`].

use super::assignment::Assignment;
use crate::features::FeatureType;
use crate::ligand::LigandGraph;
use crate::pharmacophore::PharmacophoreModel;
use crate::settings::{ConformerReduction, Settings};

/// Gaussian contribution of one pair at distance `d`. The threshold is exclusive.
pub fn pair_contribution(weight: f64, d: f64, distance_threshold: f64, sigma: f64) -> f64 {
    if d < distance_threshold {
        weight * (-(d * d) / (2.0 * sigma * sigma)).exp()
    } else {
        0.0
    }
}

pub struct ConformerScorer<'a> {
    settings: &'a Settings,
}

impl<'a> ConformerScorer<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Contribution of a feature of `feature_type` at distance `d` from its cluster.
    pub fn contribution(&self, feature_type: FeatureType, d: f64) -> f64 {
        pair_contribution(
            self.settings.weights.get(feature_type),
            d,
            self.settings.distance_threshold,
            self.settings.sigma,
        )
    }

    /// Contribution of mapping `feature` to `cluster`, for every conformer.
    pub fn pair_row(
        &self,
        graph: &LigandGraph,
        model: &PharmacophoreModel,
        feature: usize,
        cluster: usize,
    ) -> Vec<f64> {
        let node = graph.feature(feature);
        let center = model.cluster(cluster).center();
        node.positions
            .iter()
            .map(|p| self.contribution(node.feature_type, nalgebra::distance(p, center)))
            .collect()
    }

    /// Sum of pair contributions for each conformer.
    pub fn per_conformer_scores(
        &self,
        assignment: &Assignment,
        graph: &LigandGraph,
        model: &PharmacophoreModel,
    ) -> Vec<f64> {
        let mut totals = vec![0.0; graph.n_conformers()];
        for &(feature, cluster) in assignment.pairs() {
            let row = self.pair_row(graph, model, feature, cluster);
            totals.iter_mut().zip(row).for_each(|(t, v)| *t += v);
        }
        totals
    }

    /// Collapse per-conformer values with the configured reduction. Empty input scores 0.
    pub fn reduce(&self, per_conformer: &[f64]) -> f64 {
        if per_conformer.is_empty() {
            return 0.0;
        }
        match self.settings.reduction {
            ConformerReduction::Max => per_conformer.iter().copied().fold(0.0, f64::max),
            ConformerReduction::Mean => {
                per_conformer.iter().sum::<f64>() / per_conformer.len() as f64
            }
        }
    }

    /// Score of one assignment. An assignment without pairs scores 0.
    pub fn score(
        &self,
        assignment: &Assignment,
        graph: &LigandGraph,
        model: &PharmacophoreModel,
    ) -> f64 {
        if assignment.is_empty() {
            return 0.0;
        }
        self.reduce(&self.per_conformer_scores(assignment, graph, model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureWeights;
    use crate::ligand::LigandFeatureNode;
    use crate::pharmacophore::Hotspot;
    use nalgebra::Point3;

    fn aromatic_pair(positions: Vec<Point3<f64>>) -> (LigandGraph, PharmacophoreModel) {
        let model = PharmacophoreModel::from_hotspots(
            "p1",
            vec![Hotspot::new(FeatureType::Aromatic, Point3::origin(), 1.0, 0)],
        )
        .unwrap();
        let n = positions.len();
        let graph = LigandGraph::new(
            "q",
            n,
            vec![LigandFeatureNode::new(FeatureType::Aromatic, positions)],
        )
        .unwrap();
        (graph, model)
    }

    fn single_pair() -> Assignment {
        let mut a = Assignment::new();
        a.push(0, 0);
        a
    }

    #[test]
    fn contribution_decreases_with_distance() {
        let mut last = f64::INFINITY;
        for i in 0..20 {
            let d = i as f64 * 0.1;
            let v = pair_contribution(4.0, d, 2.0, 1.0);
            assert!(v < last, "contribution at {d} should be below {last}");
            assert!(v > 0.0);
            last = v;
        }
        assert_eq!(pair_contribution(4.0, 0.0, 2.0, 1.0), 4.0);
    }

    #[test]
    fn threshold_is_exclusive() {
        assert_eq!(pair_contribution(4.0, 2.0, 2.0, 1.0), 0.0);
        assert_eq!(pair_contribution(4.0, 2.5, 2.0, 1.0), 0.0);
        assert!(pair_contribution(4.0, 1.999, 2.0, 1.0) > 0.0);
    }

    #[test]
    fn max_over_conformers() {
        let (graph, model) =
            aromatic_pair(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 5.0, 5.0)]);
        let settings = Settings::default();
        let scorer = ConformerScorer::new(&settings);
        let assignment = single_pair();

        let per_conf = scorer.per_conformer_scores(&assignment, &graph, &model);
        assert_eq!(per_conf, vec![4.0, 0.0]);
        assert_eq!(scorer.score(&assignment, &graph, &model), 4.0);
    }

    #[test]
    fn mean_over_conformers() {
        let (graph, model) =
            aromatic_pair(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 5.0, 5.0)]);
        let settings = Settings {
            reduction: ConformerReduction::Mean,
            ..Default::default()
        };
        let scorer = ConformerScorer::new(&settings);
        assert_eq!(scorer.score(&single_pair(), &graph, &model), 2.0);
    }

    #[test]
    fn pair_at_threshold_scores_zero() {
        let (graph, model) = aromatic_pair(vec![Point3::new(2.0, 0.0, 0.0)]);
        let settings = Settings::default();
        let scorer = ConformerScorer::new(&settings);
        assert_eq!(scorer.score(&single_pair(), &graph, &model), 0.0);
    }

    #[test]
    fn empty_assignment_scores_zero() {
        let (graph, model) = aromatic_pair(vec![Point3::origin()]);
        let settings = Settings::default();
        let scorer = ConformerScorer::new(&settings);
        assert_eq!(scorer.score(&Assignment::new(), &graph, &model), 0.0);
    }

    #[test]
    fn doubling_weights_doubles_score() {
        let (graph, model) = aromatic_pair(vec![Point3::new(0.7, 0.3, 0.0)]);
        let settings = Settings::default();
        let doubled = Settings {
            weights: FeatureWeights::default().scaled(2.0),
            ..Default::default()
        };
        let base = ConformerScorer::new(&settings).score(&single_pair(), &graph, &model);
        let twice = ConformerScorer::new(&doubled).score(&single_pair(), &graph, &model);
        assert!(base > 0.0);
        assert!((twice - 2.0 * base).abs() < 1e-12);
    }
}
