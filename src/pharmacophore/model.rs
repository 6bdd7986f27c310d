use super::hotspot::{Cluster, Hotspot};
use super::index::ClusterIndex;
use crate::errors::ScreeningError;
use crate::features::FeatureType;
use nalgebra::Point3;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// All hotspot clusters predicted for one protein binding site.
///
/// Clusters are stored in ascending identifier order, so a cluster's position in
/// [`PharmacophoreModel::clusters`] orders the same way as its identifier.
/// The model is read-only once built and can be shared between screening threads.
#[derive(Debug)]
pub struct PharmacophoreModel {
    identifier: String,
    source: Option<PathBuf>,
    clusters: Vec<Cluster>,
    index: ClusterIndex,
}

impl PharmacophoreModel {
    /// Build a model from loose hotspots, grouping them by their cluster identifier.
    ///
    /// Fails if a cluster mixes feature types, a confidence lies outside [0, 1],
    /// or a coordinate is not finite.
    pub fn from_hotspots(
        identifier: impl Into<String>,
        hotspots: Vec<Hotspot>,
    ) -> Result<Self, ScreeningError> {
        let identifier = identifier.into();

        let mut grouped: BTreeMap<usize, Vec<Hotspot>> = BTreeMap::new();
        for hotspot in hotspots {
            if !hotspot.position.coords.iter().all(|v| v.is_finite()) {
                return Err(ScreeningError::model(
                    &identifier,
                    format!("non-finite hotspot position in cluster {}", hotspot.cluster),
                ));
            }
            if !(0.0..=1.0).contains(&hotspot.confidence) {
                return Err(ScreeningError::model(
                    &identifier,
                    format!(
                        "hotspot confidence {} outside [0, 1] in cluster {}",
                        hotspot.confidence, hotspot.cluster
                    ),
                ));
            }
            grouped.entry(hotspot.cluster).or_default().push(hotspot);
        }

        let clusters = grouped
            .into_iter()
            .map(|(id, members)| {
                let feature_type = members[0].feature_type;
                if let Some(other) = members.iter().find(|h| h.feature_type != feature_type) {
                    return Err(ScreeningError::model(
                        &identifier,
                        format!(
                            "cluster {id} mixes {feature_type} and {} hotspots",
                            other.feature_type
                        ),
                    ));
                }
                Ok(Cluster::new(id, feature_type, members))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let index = ClusterIndex::new(&clusters);
        Ok(Self {
            identifier,
            source: None,
            clusters,
            index,
        })
    }

    /// Record the file the model was read from.
    pub fn with_source(mut self, source: impl AsRef<Path>) -> Self {
        self.source = Some(source.as_ref().to_path_buf());
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn cluster(&self, index: usize) -> &Cluster {
        &self.clusters[index]
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn hotspot_count(&self) -> usize {
        self.clusters.iter().map(|c| c.hotspots().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Clusters whose type matches `feature_type`. Empty when the model has none.
    pub fn compatible_clusters(
        &self,
        feature_type: FeatureType,
    ) -> impl Iterator<Item = &Cluster> + '_ {
        self.index
            .compatible(feature_type)
            .iter()
            .map(|&idx| &self.clusters[idx])
    }

    /// Cluster indices of `feature_type` within `cutoff` Å of `point`,
    /// with their distances, nearest first and ties broken by cluster identifier.
    pub fn clusters_within(
        &self,
        feature_type: FeatureType,
        point: &Point3<f64>,
        cutoff: f64,
    ) -> Vec<(usize, f64)> {
        self.index.within(feature_type, point, cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotspot(t: FeatureType, x: f64, y: f64, z: f64, cluster: usize) -> Hotspot {
        Hotspot::new(t, Point3::new(x, y, z), 0.9, cluster)
    }

    fn sample_model() -> PharmacophoreModel {
        PharmacophoreModel::from_hotspots(
            "1abc",
            vec![
                hotspot(FeatureType::Aromatic, 0.0, 0.0, 0.0, 3),
                hotspot(FeatureType::Aromatic, 2.0, 0.0, 0.0, 3),
                hotspot(FeatureType::Cation, 5.0, 5.0, 5.0, 1),
                hotspot(FeatureType::Aromatic, 4.0, 0.0, 0.0, 7),
                hotspot(FeatureType::HBondDonor, -3.0, 0.0, 0.0, 2),
            ],
        )
        .unwrap()
    }

    #[test]
    fn clusters_grouped_and_sorted() {
        let model = sample_model();
        assert_eq!(model.identifier(), "1abc");
        assert_eq!(model.cluster_count(), 4);
        assert_eq!(model.hotspot_count(), 5);
        let ids: Vec<usize> = model.clusters().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 7]);

        // Representative position is the hotspot centroid
        let aromatic = model.cluster(2);
        assert_eq!(aromatic.id(), 3);
        assert_eq!(*aromatic.center(), Point3::new(1.0, 0.0, 0.0));
        assert!((aromatic.confidence() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn compatible_clusters_by_type() {
        let model = sample_model();
        let aromatic: Vec<usize> = model
            .compatible_clusters(FeatureType::Aromatic)
            .map(|c| c.id())
            .collect();
        assert_eq!(aromatic, vec![3, 7]);
        assert!(model
            .compatible_clusters(FeatureType::Aromatic)
            .all(|c| c.feature_type() == FeatureType::Aromatic));
        assert_eq!(model.compatible_clusters(FeatureType::Halogen).count(), 0);
    }

    #[test]
    fn clusters_within_sorted_by_distance() {
        let model = sample_model();
        let hits = model.clusters_within(FeatureType::Aromatic, &Point3::new(3.0, 0.0, 0.0), 2.5);
        let idx: Vec<usize> = hits.iter().map(|h| h.0).collect();
        // Cluster 7 (d = 1.0) comes before cluster 3 (d = 2.0)
        assert_eq!(idx, vec![3, 2]);
        assert!((hits[0].1 - 1.0).abs() < 1e-12);
        assert!((hits[1].1 - 2.0).abs() < 1e-12);

        // Equal distances fall back to cluster order
        let tied = model.clusters_within(FeatureType::Aromatic, &Point3::new(2.5, 0.0, 0.0), 2.0);
        assert_eq!(tied.iter().map(|h| h.0).collect::<Vec<_>>(), vec![2, 3]);

        let none = model.clusters_within(FeatureType::Aromatic, &Point3::new(50.0, 0.0, 0.0), 6.0);
        assert!(none.is_empty());
    }

    #[test]
    fn reject_mixed_cluster() {
        let err = PharmacophoreModel::from_hotspots(
            "bad",
            vec![
                hotspot(FeatureType::Anion, 0.0, 0.0, 0.0, 0),
                hotspot(FeatureType::Cation, 1.0, 0.0, 0.0, 0),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ScreeningError::MalformedModel { .. }));
    }

    #[test]
    fn reject_bad_confidence() {
        let mut h = hotspot(FeatureType::Anion, 0.0, 0.0, 0.0, 0);
        h.confidence = 1.5;
        assert!(PharmacophoreModel::from_hotspots("bad", vec![h]).is_err());
    }

    #[test]
    fn empty_model() {
        let model = PharmacophoreModel::from_hotspots("empty", vec![]).unwrap();
        assert!(model.is_empty());
        assert_eq!(model.compatible_clusters(FeatureType::Cation).count(), 0);
    }
}
