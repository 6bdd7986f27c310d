//! Type-keyed lookup of clusters, built once per model.

use super::hotspot::Cluster;
use crate::features::FeatureType;
use nalgebra::Point3;
use rstar::primitives::GeomWithData;
use rstar::RTree;

type ClusterPoint = GeomWithData<[f64; 3], usize>;

/// Groups cluster indices by feature type and keeps one R-tree of cluster centers per type.
pub struct ClusterIndex {
    by_type: [Vec<usize>; FeatureType::COUNT],
    trees: [RTree<ClusterPoint>; FeatureType::COUNT],
}

impl ClusterIndex {
    pub fn new(clusters: &[Cluster]) -> Self {
        let by_type: [Vec<usize>; FeatureType::COUNT] = std::array::from_fn(|i| {
            clusters
                .iter()
                .enumerate()
                .filter(|(_, c)| c.feature_type().index() == i)
                .map(|(idx, _)| idx)
                .collect()
        });
        let trees = std::array::from_fn(|i| {
            let points = by_type[i]
                .iter()
                .map(|&idx| {
                    let c = clusters[idx].center();
                    GeomWithData::new([c.x, c.y, c.z], idx)
                })
                .collect();
            RTree::bulk_load(points)
        });
        Self { by_type, trees }
    }

    /// Indices of all clusters of `feature_type`, in model order.
    pub fn compatible(&self, feature_type: FeatureType) -> &[usize] {
        &self.by_type[feature_type.index()]
    }

    /// Indices and distances of clusters of `feature_type` whose center lies within
    /// `cutoff` of `point`, ordered by distance then by index.
    pub fn within(
        &self,
        feature_type: FeatureType,
        point: &Point3<f64>,
        cutoff: f64,
    ) -> Vec<(usize, f64)> {
        let query = [point.x, point.y, point.z];
        let mut hits: Vec<(usize, f64)> = self.trees[feature_type.index()]
            .locate_within_distance(query, cutoff * cutoff)
            .map(|p| {
                let [x, y, z] = *p.geom();
                (p.data, nalgebra::distance(point, &Point3::new(x, y, z)))
            })
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits
    }
}

impl std::fmt::Debug for ClusterIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for t in FeatureType::ALL {
            map.entry(&t, &self.by_type[t.index()].len());
        }
        map.finish()
    }
}
