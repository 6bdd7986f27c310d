//! Screening of query ligands against a whole pharmacophore model database.
//!
//! Proteins are scored in parallel on the current rayon pool. Each protein is
//! evaluated independently against read-only inputs and rankings are only built
//! once every score of a query has been collected, so the output does not
//! depend on the number of threads or their scheduling.

use crate::errors::ScreeningError;
use crate::ligand::LigandGraph;
use crate::matching::score_model;
use crate::pharmacophore::PharmacophoreModel;
use crate::ranking::{rank, Rankings, ScoreResult};
use crate::settings::Settings;
use rayon::prelude::*;
use tracing::{debug, warn};

/// One database slot: a loaded model, or the reason it could not be loaded.
#[derive(Debug)]
pub struct ModelEntry {
    pub identifier: String,
    pub model: Result<PharmacophoreModel, ScreeningError>,
}

/// In-memory collection of protein pharmacophore models.
#[derive(Debug, Default)]
pub struct ModelDatabase {
    entries: Vec<ModelEntry>,
}

impl ModelDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, model: PharmacophoreModel) {
        self.entries.push(ModelEntry {
            identifier: model.identifier().to_string(),
            model: Ok(model),
        });
    }

    /// Keep a slot for a model that failed to load so the screen can report it.
    pub fn push_failed(&mut self, identifier: impl Into<String>, error: ScreeningError) {
        self.entries.push(ModelEntry {
            identifier: identifier.into(),
            model: Err(error),
        });
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of usable models.
    pub fn loaded(&self) -> usize {
        self.entries.iter().filter(|e| e.model.is_ok()).count()
    }
}

impl FromIterator<PharmacophoreModel> for ModelDatabase {
    fn from_iter<I: IntoIterator<Item = PharmacophoreModel>>(iter: I) -> Self {
        let mut db = ModelDatabase::new();
        iter.into_iter().for_each(|m| db.push(m));
        db
    }
}

/// A protein that could not be scored for a query.
#[derive(Clone, Debug, PartialEq)]
pub struct ScreeningFailure {
    pub protein: String,
    pub message: String,
}

/// Outcome of screening one query against the database.
#[derive(Clone, Debug)]
pub struct QueryReport {
    pub query: String,
    /// Filtered, sorted and truncated scores
    pub ranking: Vec<ScoreResult>,
    pub failures: Vec<ScreeningFailure>,
    /// Proteins that were scored, before filtering
    pub screened: usize,
    /// Proteins whose search hit the node cap or deadline
    pub truncated: usize,
}

/// Screen one query against every model in `db`.
///
/// Settings are validated before any protein is scored. Models that failed to load
/// are reported in [`QueryReport::failures`] and left out of the ranking.
pub fn screen_query(
    graph: &LigandGraph,
    db: &ModelDatabase,
    settings: &Settings,
) -> Result<QueryReport, ScreeningError> {
    settings.validate()?;
    Ok(screen_validated(graph, db, settings))
}

/// Screen several queries, each ranked independently.
pub fn screen(
    queries: &[LigandGraph],
    db: &ModelDatabase,
    settings: &Settings,
) -> Result<Vec<QueryReport>, ScreeningError> {
    settings.validate()?;
    Ok(queries
        .iter()
        .map(|graph| screen_validated(graph, db, settings))
        .collect())
}

/// Collect the rankings of several reports, keyed by query name.
pub fn rankings(reports: &[QueryReport]) -> Rankings {
    let mut rankings = Rankings::new();
    for r in reports {
        // Already filtered, the bounds below keep every entry
        rankings.insert(r.query.clone(), r.ranking.clone(), f64::NEG_INFINITY, None);
    }
    rankings
}

fn screen_validated(graph: &LigandGraph, db: &ModelDatabase, settings: &Settings) -> QueryReport {
    debug!(
        "Screening {} ({} features, {} conformers) against {} models",
        graph.name(),
        graph.len(),
        graph.n_conformers(),
        db.len()
    );

    let evaluated: Vec<Result<(ScoreResult, bool), ScreeningFailure>> = db
        .entries()
        .par_iter()
        .map(|entry| match &entry.model {
            Ok(model) => {
                let outcome = score_model(graph, model, settings);
                Ok((
                    ScoreResult::new(entry.identifier.clone(), outcome.score),
                    outcome.truncated,
                ))
            }
            Err(e) => Err(ScreeningFailure {
                protein: entry.identifier.clone(),
                message: e.to_string(),
            }),
        })
        .collect();

    let mut scores = Vec::with_capacity(evaluated.len());
    let mut failures = Vec::new();
    let mut truncated = 0;
    for item in evaluated {
        match item {
            Ok((score, was_truncated)) => {
                if was_truncated {
                    truncated += 1;
                }
                scores.push(score);
            }
            Err(failure) => {
                warn!(
                    "Skipping {} for query {}: {}",
                    failure.protein,
                    graph.name(),
                    failure.message
                );
                failures.push(failure);
            }
        }
    }
    if truncated > 0 {
        warn!(
            "Search budget exhausted for {truncated} of {} proteins screened with {}; \
             their scores are best-known rather than exhaustive",
            scores.len(),
            graph.name()
        );
    }

    let screened = scores.len();
    QueryReport {
        query: graph.name().to_string(),
        ranking: rank(scores, settings.min_score, settings.top_n),
        failures,
        screened,
        truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureType, FeatureWeights};
    use crate::ligand::LigandFeatureNode;
    use crate::pharmacophore::Hotspot;
    use crate::utils::run_with_threads;
    use nalgebra::Point3;

    fn protein(id: &str, clusters: &[(FeatureType, [f64; 3])]) -> PharmacophoreModel {
        let hotspots = clusters
            .iter()
            .enumerate()
            .map(|(i, (t, [x, y, z]))| Hotspot::new(*t, Point3::new(*x, *y, *z), 0.8, i))
            .collect();
        PharmacophoreModel::from_hotspots(id, hotspots).unwrap()
    }

    fn query() -> LigandGraph {
        LigandGraph::new(
            "query",
            2,
            vec![
                LigandFeatureNode::new(
                    FeatureType::Aromatic,
                    vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.5, 0.0, 0.0)],
                ),
                LigandFeatureNode::new(
                    FeatureType::Cation,
                    vec![Point3::new(3.0, 0.0, 0.0), Point3::new(3.5, 0.2, 0.0)],
                ),
                LigandFeatureNode::new(
                    FeatureType::Hydrophobic,
                    vec![Point3::new(0.0, 3.0, 0.0), Point3::new(0.0, 3.0, 1.0)],
                ),
            ],
        )
        .unwrap()
    }

    fn database() -> ModelDatabase {
        let mut db: ModelDatabase = vec![
            protein(
                "P_full",
                &[
                    (FeatureType::Aromatic, [0.1, 0.0, 0.0]),
                    (FeatureType::Cation, [3.2, 0.0, 0.0]),
                    (FeatureType::Hydrophobic, [0.0, 3.2, 0.5]),
                ],
            ),
            protein("P_aromatic", &[(FeatureType::Aromatic, [0.3, 0.3, 0.0])]),
            protein("P_empty", &[]),
            protein(
                "P_wrong_types",
                &[
                    (FeatureType::Anion, [3.0, 0.0, 0.0]),
                    (FeatureType::Halogen, [0.0, 0.0, 0.0]),
                ],
            ),
            protein("P_cation", &[(FeatureType::Cation, [3.0, 0.0, 0.0])]),
        ]
        .into_iter()
        .collect();
        db.push_failed(
            "P_broken",
            ScreeningError::model("P_broken", "cluster 0 mixes Anion and Cation hotspots"),
        );
        db
    }

    #[test]
    fn screen_ranks_and_isolates_failures() {
        let report = screen_query(&query(), &database(), &Settings::default()).unwrap();
        assert_eq!(report.query, "query");
        assert_eq!(report.screened, 5);
        assert_eq!(report.truncated, 0);
        assert_eq!(
            report.failures,
            vec![ScreeningFailure {
                protein: "P_broken".to_string(),
                message: "Malformed pharmacophore model 'P_broken': cluster 0 mixes Anion and Cation hotspots"
                    .to_string(),
            }]
        );

        let order: Vec<&str> = report.ranking.iter().map(|r| r.protein.as_str()).collect();
        assert_eq!(order[0], "P_full");
        // Proteins without matches still score 0 and pass the default min_score
        assert_eq!(order.len(), 5);
        assert_eq!(&order[3..], &["P_empty", "P_wrong_types"]);
        assert!(report.ranking.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(!order.contains(&"P_broken"));
    }

    #[test]
    fn min_score_and_top_n() {
        let settings = Settings {
            min_score: 1e-6,
            top_n: Some(2),
            ..Default::default()
        };
        let report = screen_query(&query(), &database(), &settings).unwrap();
        assert_eq!(report.ranking.len(), 2);
        assert_eq!(report.ranking[0].protein, "P_full");
    }

    #[test]
    fn invalid_settings_abort_before_screening() {
        let settings = Settings {
            sigma: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            screen(&[query()], &database(), &settings),
            Err(ScreeningError::InvalidSettings(_))
        ));
    }

    #[test]
    fn empty_database_gives_empty_ranking() {
        let report = screen_query(&query(), &ModelDatabase::new(), &Settings::default()).unwrap();
        assert!(report.ranking.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn zero_feature_ligand_scores_zero() {
        let empty = LigandGraph::new("empty", 3, vec![]).unwrap();
        let report = screen_query(&empty, &database(), &Settings::default()).unwrap();
        assert_eq!(report.ranking.len(), 5);
        assert!(report.ranking.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn identical_output_across_thread_counts() {
        let db = database();
        let graph = query();
        let settings = Settings::default();
        let single = run_with_threads(1, || screen_query(&graph, &db, &settings).unwrap());
        let many = run_with_threads(4, || screen_query(&graph, &db, &settings).unwrap());
        assert_eq!(single.ranking.len(), many.ranking.len());
        for (a, b) in single.ranking.iter().zip(&many.ranking) {
            assert_eq!(a.protein, b.protein);
            assert_eq!(a.score.to_bits(), b.score.to_bits());
        }
    }

    #[test]
    fn doubled_weights_keep_ranking_order() {
        let db = database();
        let graph = query();
        let base = screen_query(&graph, &db, &Settings::default()).unwrap();
        let doubled = Settings {
            weights: FeatureWeights::default().scaled(2.0),
            ..Default::default()
        };
        let scaled = screen_query(&graph, &db, &doubled).unwrap();
        for (a, b) in base.ranking.iter().zip(&scaled.ranking) {
            assert_eq!(a.protein, b.protein);
            assert_eq!(b.score, 2.0 * a.score);
        }
    }

    #[test]
    fn multiple_queries_ranked_independently() {
        let other = LigandGraph::new(
            "cation_only",
            1,
            vec![LigandFeatureNode::new(
                FeatureType::Cation,
                vec![Point3::new(3.0, 0.0, 0.0)],
            )],
        )
        .unwrap();
        let reports = screen(&[query(), other], &database(), &Settings::default()).unwrap();
        let all = rankings(&reports);
        assert_eq!(all.len(), 2);
        let top = &all.get("cation_only").unwrap()[0];
        // P_cation sits exactly on the feature, P_full 0.2 Å away
        assert_eq!(top.protein, "P_cation");
        assert_eq!(top.score, 8.0);
    }
}
