//! Query-side pharmacophore: ligand features realised over several conformers.

use crate::errors::ScreeningError;
use crate::features::FeatureType;
use crate::pharmacophore::centroid;
use nalgebra::Point3;

/// One pharmacophore feature of the query molecule.
///
/// `positions[c]` is where the feature sits in conformer `c`.
#[derive(Clone, Debug, PartialEq)]
pub struct LigandFeatureNode {
    pub feature_type: FeatureType,
    pub positions: Vec<Point3<f64>>,
}

impl LigandFeatureNode {
    pub fn new(feature_type: FeatureType, positions: Vec<Point3<f64>>) -> Self {
        Self {
            feature_type,
            positions,
        }
    }

    /// Mean position over all conformers, used for the coarse geometric filter.
    pub fn centroid(&self) -> Point3<f64> {
        centroid(&self.positions)
    }
}

/// All features of one query molecule plus its conformer count.
#[derive(Clone, Debug)]
pub struct LigandGraph {
    name: String,
    n_conformers: usize,
    features: Vec<LigandFeatureNode>,
}

impl LigandGraph {
    /// Build a ligand graph, checking that every feature has exactly `n_conformers`
    /// finite positions and that `n_conformers` is at least one.
    pub fn new(
        name: impl Into<String>,
        n_conformers: usize,
        features: Vec<LigandFeatureNode>,
    ) -> Result<Self, ScreeningError> {
        let name = name.into();
        if n_conformers == 0 {
            return Err(ScreeningError::ligand(&name, "conformer count must be at least 1"));
        }
        for (i, feature) in features.iter().enumerate() {
            if feature.positions.len() != n_conformers {
                return Err(ScreeningError::ligand(
                    &name,
                    format!(
                        "feature {i} has {} positions, expected {n_conformers}",
                        feature.positions.len()
                    ),
                ));
            }
            if !feature
                .positions
                .iter()
                .all(|p| p.coords.iter().all(|v| v.is_finite()))
            {
                return Err(ScreeningError::ligand(
                    &name,
                    format!("feature {i} has a non-finite position"),
                ));
            }
        }
        Ok(Self {
            name,
            n_conformers,
            features,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_conformers(&self) -> usize {
        self.n_conformers
    }

    pub fn features(&self) -> &[LigandFeatureNode] {
        &self.features
    }

    pub fn feature(&self, index: usize) -> &LigandFeatureNode {
        &self.features[index]
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of features per type, in [`FeatureType::ALL`] order.
    pub fn type_counts(&self) -> [usize; FeatureType::COUNT] {
        let mut counts = [0; FeatureType::COUNT];
        for f in &self.features {
            counts[f.feature_type.index()] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_centroid() {
        let node = LigandFeatureNode::new(
            FeatureType::Aromatic,
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, -2.0)],
        );
        assert_eq!(node.centroid(), Point3::new(1.0, 2.0, -1.0));
    }

    #[test]
    fn build_graph() {
        let graph = LigandGraph::new(
            "CBN",
            2,
            vec![
                LigandFeatureNode::new(
                    FeatureType::Aromatic,
                    vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
                ),
                LigandFeatureNode::new(
                    FeatureType::HBondDonor,
                    vec![Point3::origin(), Point3::new(0.0, 1.0, 0.0)],
                ),
            ],
        )
        .unwrap();
        assert_eq!(graph.name(), "CBN");
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.n_conformers(), 2);
        assert_eq!(graph.type_counts()[FeatureType::HBondDonor.index()], 1);
    }

    #[test]
    fn empty_graph_is_valid() {
        let graph = LigandGraph::new("empty", 1, vec![]).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn reject_ragged_conformers() {
        let err = LigandGraph::new(
            "ragged",
            2,
            vec![
                LigandFeatureNode::new(
                    FeatureType::Aromatic,
                    vec![Point3::origin(), Point3::origin()],
                ),
                LigandFeatureNode::new(FeatureType::Cation, vec![Point3::origin()]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ScreeningError::MalformedLigand { .. }));
    }

    #[test]
    fn reject_zero_conformers() {
        assert!(LigandGraph::new("none", 0, vec![]).is_err());
    }

    #[test]
    fn reject_non_finite_positions() {
        let node = LigandFeatureNode::new(
            FeatureType::Anion,
            vec![Point3::new(f64::NAN, 0.0, 0.0)],
        );
        assert!(LigandGraph::new("nan", 1, vec![node]).is_err());
    }
}
