//! Pharmacophore feature types and their interaction weights.

use crate::errors::ScreeningError;
use core::fmt;
use std::str::FromStr;

/// Chemical feature category shared by protein hotspots, clusters and ligand features.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureType {
    Hydrophobic,
    Aromatic,
    HBondDonor,
    HBondAcceptor,
    Cation,
    Anion,
    Halogen,
}

impl FeatureType {
    /// Number of feature categories.
    pub const COUNT: usize = 7;

    /// All feature categories in declaration order.
    pub const ALL: [FeatureType; FeatureType::COUNT] = [
        FeatureType::Hydrophobic,
        FeatureType::Aromatic,
        FeatureType::HBondDonor,
        FeatureType::HBondAcceptor,
        FeatureType::Cation,
        FeatureType::Anion,
        FeatureType::Halogen,
    ];

    /// Dense index used for per-type lookup tables.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for FeatureType {
    type Err = ScreeningError;

    /// Parse a feature tag.
    ///
    /// Accepts the variant names as well as the `HBond_donor`/`HBond_acceptor`
    /// spellings and the short `HBD`/`HBA` forms, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase().replace(['_', '-', ' '], "");
        match tag.as_str() {
            "hydrophobic" => Ok(FeatureType::Hydrophobic),
            "aromatic" => Ok(FeatureType::Aromatic),
            "hbonddonor" | "hbd" | "donor" => Ok(FeatureType::HBondDonor),
            "hbondacceptor" | "hba" | "acceptor" => Ok(FeatureType::HBondAcceptor),
            "cation" => Ok(FeatureType::Cation),
            "anion" => Ok(FeatureType::Anion),
            "halogen" => Ok(FeatureType::Halogen),
            _ => Err(ScreeningError::UnknownFeatureType(s.to_string())),
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureType::Hydrophobic => write!(f, "Hydrophobic"),
            FeatureType::Aromatic => write!(f, "Aromatic"),
            FeatureType::HBondDonor => write!(f, "HBondDonor"),
            FeatureType::HBondAcceptor => write!(f, "HBondAcceptor"),
            FeatureType::Cation => write!(f, "Cation"),
            FeatureType::Anion => write!(f, "Anion"),
            FeatureType::Halogen => write!(f, "Halogen"),
        }
    }
}

/// Default weight for charged features.
pub const IONIC_WEIGHT: f64 = 8.0;
/// Default weight for aromatic, hydrogen bonding and halogen features.
pub const POLAR_WEIGHT: f64 = 4.0;
/// Default weight for hydrophobic features.
pub const HYDROPHOBIC_WEIGHT: f64 = 1.0;

/// Importance multiplier per feature type.
///
/// Electrostatic features dominate, hydrophobic contacts are numerous and weakly
/// discriminating. Every weight must be strictly positive, see [`FeatureWeights::validate`].
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureWeights {
    weights: [f64; FeatureType::COUNT],
}

impl Default for FeatureWeights {
    fn default() -> Self {
        let mut weights = [POLAR_WEIGHT; FeatureType::COUNT];
        weights[FeatureType::Hydrophobic.index()] = HYDROPHOBIC_WEIGHT;
        weights[FeatureType::Cation.index()] = IONIC_WEIGHT;
        weights[FeatureType::Anion.index()] = IONIC_WEIGHT;
        Self { weights }
    }
}

impl FeatureWeights {
    /// Weight of a feature type.
    pub fn get(&self, feature_type: FeatureType) -> f64 {
        self.weights[feature_type.index()]
    }

    /// Override the weight of one feature type.
    pub fn set(&mut self, feature_type: FeatureType, weight: f64) {
        self.weights[feature_type.index()] = weight;
    }

    /// Builder-style variant of [`FeatureWeights::set`].
    pub fn with(mut self, feature_type: FeatureType, weight: f64) -> Self {
        self.set(feature_type, weight);
        self
    }

    /// Multiply every weight by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            weights: self.weights.map(|w| w * factor),
        }
    }

    /// Reject zero, negative and non-finite weights.
    pub fn validate(&self) -> Result<(), ScreeningError> {
        for feature_type in FeatureType::ALL {
            let w = self.get(feature_type);
            if !w.is_finite() || w <= 0.0 {
                return Err(ScreeningError::settings(format!(
                    "weight for {feature_type} must be positive and finite, got {w}"
                )));
            }
        }
        Ok(())
    }

    /// Iterate over `(type, weight)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureType, f64)> + '_ {
        FeatureType::ALL.iter().map(|&t| (t, self.get(t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_table_covers_every_type() {
        let weights = FeatureWeights::default().with(FeatureType::Halogen, 2.5);
        let table: Vec<(FeatureType, f64)> = weights.iter().collect();
        assert_eq!(table.len(), FeatureType::COUNT);
        assert_eq!(table[0], (FeatureType::Hydrophobic, HYDROPHOBIC_WEIGHT));
        assert_eq!(table[4], (FeatureType::Cation, IONIC_WEIGHT));
        assert_eq!(table[6], (FeatureType::Halogen, 2.5));
    }

    #[test]
    fn parse_feature_tags() {
        assert_eq!(
            "Aromatic".parse::<FeatureType>().unwrap(),
            FeatureType::Aromatic
        );
        assert_eq!(
            "HBond_donor".parse::<FeatureType>().unwrap(),
            FeatureType::HBondDonor
        );
        assert_eq!(
            "hbond_acceptor".parse::<FeatureType>().unwrap(),
            FeatureType::HBondAcceptor
        );
        assert_eq!(" CATION ".parse::<FeatureType>().unwrap(), FeatureType::Cation);
        for t in FeatureType::ALL {
            assert_eq!(t.to_string().parse::<FeatureType>().unwrap(), t);
        }
    }

    #[test]
    fn unknown_feature_tag() {
        let err = "PiStacking".parse::<FeatureType>().unwrap_err();
        assert!(matches!(err, ScreeningError::UnknownFeatureType(tag) if tag == "PiStacking"));
    }

    #[test]
    fn default_weights() {
        let weights = FeatureWeights::default();
        assert_eq!(weights.get(FeatureType::Cation), 8.0);
        assert_eq!(weights.get(FeatureType::Anion), 8.0);
        assert_eq!(weights.get(FeatureType::Aromatic), 4.0);
        assert_eq!(weights.get(FeatureType::HBondDonor), 4.0);
        assert_eq!(weights.get(FeatureType::HBondAcceptor), 4.0);
        assert_eq!(weights.get(FeatureType::Halogen), 4.0);
        assert_eq!(weights.get(FeatureType::Hydrophobic), 1.0);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn reject_non_positive_weights() {
        let zero = FeatureWeights::default().with(FeatureType::Halogen, 0.0);
        assert!(matches!(
            zero.validate(),
            Err(ScreeningError::InvalidSettings(_))
        ));

        let negative = FeatureWeights::default().with(FeatureType::Hydrophobic, -1.0);
        assert!(negative.validate().is_err());

        let nan = FeatureWeights::default().with(FeatureType::Anion, f64::NAN);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn scaled_weights() {
        let doubled = FeatureWeights::default().scaled(2.0);
        assert_eq!(doubled.get(FeatureType::Cation), 16.0);
        assert_eq!(doubled.get(FeatureType::Hydrophobic), 2.0);
    }
}
