use crate::ligand::LigandGraph;
use crate::pharmacophore::PharmacophoreModel;

/// A mapping from ligand features to distinct clusters of one model.
///
/// Pairs are `(feature index, cluster index)` in the order they were decided.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    pairs: Vec<(usize, usize)>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, feature: usize, cluster: usize) {
        self.pairs.push((feature, cluster));
    }

    pub fn pop(&mut self) -> Option<(usize, usize)> {
        self.pairs.pop()
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Every pair is type-compatible and no cluster or feature is used twice.
    pub fn is_consistent(&self, graph: &LigandGraph, model: &PharmacophoreModel) -> bool {
        let mut clusters = ClusterUsage::new(model.cluster_count());
        let mut features = ClusterUsage::new(graph.len());
        for &(f, c) in &self.pairs {
            if f >= graph.len() || c >= model.cluster_count() {
                return false;
            }
            if graph.feature(f).feature_type != model.cluster(c).feature_type() {
                return false;
            }
            if clusters.contains(c) || features.contains(f) {
                return false;
            }
            clusters.insert(c);
            features.insert(f);
        }
        true
    }
}

/// Fixed-size bitset over cluster indices.
#[derive(Clone, Debug)]
pub struct ClusterUsage {
    words: Vec<u64>,
}

impl ClusterUsage {
    pub fn new(n: usize) -> Self {
        Self {
            words: vec![0; n.div_ceil(64)],
        }
    }

    pub fn contains(&self, i: usize) -> bool {
        self.words[i / 64] & (1u64 << (i % 64)) != 0
    }

    pub fn insert(&mut self, i: usize) {
        self.words[i / 64] |= 1u64 << (i % 64);
    }

    pub fn remove(&mut self, i: usize) {
        self.words[i / 64] &= !(1u64 << (i % 64));
    }
}
