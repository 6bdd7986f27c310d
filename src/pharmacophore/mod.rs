//! Protein-side pharmacophore models.
//!
//! A model is a set of hotspot clusters predicted for one binding site.
//! Clusters are grouped by feature type at construction time so that the
//! matching engine can look up type-compatible candidates without scanning.
pub mod hotspot;
pub mod index;
pub mod model;

pub use hotspot::{centroid, Cluster, Hotspot};
pub use index::ClusterIndex;
pub use model::PharmacophoreModel;
