use crate::features::FeatureType;
use core::fmt;
use nalgebra::{Point3, Vector3};

/// A predicted point-like chemical feature on the binding surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Hotspot {
    pub feature_type: FeatureType,
    pub position: Point3<f64>,
    /// Prediction confidence in [0, 1]
    pub confidence: f64,
    /// Identifier of the cluster this hotspot belongs to
    pub cluster: usize,
}

impl Hotspot {
    pub fn new(
        feature_type: FeatureType,
        position: Point3<f64>,
        confidence: f64,
        cluster: usize,
    ) -> Self {
        Self {
            feature_type,
            position,
            confidence,
            cluster,
        }
    }
}

/// Spatially adjacent hotspots of one type, matched as a single unit.
#[derive(Clone, Debug)]
pub struct Cluster {
    id: usize,
    feature_type: FeatureType,
    hotspots: Vec<Hotspot>,
    center: Point3<f64>,
}

impl Cluster {
    /// Group hotspots into a cluster. Callers guarantee a non-empty, single-type set.
    pub(crate) fn new(id: usize, feature_type: FeatureType, hotspots: Vec<Hotspot>) -> Self {
        let center = centroid(hotspots.iter().map(|h| &h.position));
        Self {
            id,
            feature_type,
            hotspots,
            center,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn feature_type(&self) -> FeatureType {
        self.feature_type
    }

    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    /// Representative position used for distance scoring (hotspot centroid).
    pub fn center(&self) -> &Point3<f64> {
        &self.center
    }

    /// Mean confidence of the member hotspots.
    pub fn confidence(&self) -> f64 {
        self.hotspots.iter().map(|h| h.confidence).sum::<f64>() / self.hotspots.len() as f64
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cluster {id} ({ftype}, {n} hotspots) at ({x:.3}, {y:.3}, {z:.3})",
            id = self.id,
            ftype = self.feature_type,
            n = self.hotspots.len(),
            x = self.center.x,
            y = self.center.y,
            z = self.center.z,
        )
    }
}

/// Arithmetic mean of a set of points. The origin for an empty set.
pub fn centroid<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Point3<f64> {
    let (sum, n) = points
        .into_iter()
        .fold((Vector3::zeros(), 0usize), |(acc, n), p| (acc + p.coords, n + 1));
    if n == 0 {
        Point3::origin()
    } else {
        Point3::from(sum / n as f64)
    }
}
