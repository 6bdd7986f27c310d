//! Ranking of per-protein scores for each query.

use core::fmt;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Best assignment score of one protein for one query.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreResult {
    pub protein: String,
    pub score: f64,
}

impl ScoreResult {
    pub fn new(protein: impl Into<String>, score: f64) -> Self {
        Self {
            protein: protein.into(),
            score,
        }
    }
}

impl fmt::Display for ScoreResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<50} Score: {:8.4}", self.protein, self.score)
    }
}

/// Drop scores below `min_score`, order by descending score then protein identifier,
/// and keep at most `top_n` entries.
pub fn rank(
    results: impl IntoIterator<Item = ScoreResult>,
    min_score: f64,
    top_n: Option<usize>,
) -> Vec<ScoreResult> {
    let mut ranked: Vec<ScoreResult> = results
        .into_iter()
        .filter(|r| r.score >= min_score)
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.protein.cmp(&b.protein))
    });
    if let Some(n) = top_n {
        ranked.truncate(n);
    }
    ranked
}

/// Ranked results of several queries, keyed and ordered by query name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rankings {
    by_query: BTreeMap<String, Vec<ScoreResult>>,
}

impl Rankings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rank `results` and store them under `query`, replacing an earlier ranking.
    pub fn insert(
        &mut self,
        query: impl Into<String>,
        results: impl IntoIterator<Item = ScoreResult>,
        min_score: f64,
        top_n: Option<usize>,
    ) {
        self.by_query
            .insert(query.into(), rank(results, min_score, top_n));
    }

    pub fn get(&self, query: &str) -> Option<&[ScoreResult]> {
        self.by_query.get(query).map(|v| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ScoreResult])> + '_ {
        self.by_query
            .iter()
            .map(|(q, r)| (q.as_str(), r.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.by_query.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_query.is_empty()
    }

    /// Total number of ranked entries across all queries.
    pub fn total_hits(&self) -> usize {
        self.by_query.values().map(|v| v.len()).sum()
    }

    /// Flatten to a table with columns `query_name`, `protein_identifier`, `score`.
    pub fn to_df(&self) -> PolarsResult<DataFrame> {
        let rows: Vec<(&str, &ScoreResult)> = self
            .by_query
            .iter()
            .flat_map(|(q, r)| r.iter().map(move |x| (q.as_str(), x)))
            .collect();
        df!(
            "query_name" => rows.iter().map(|x| x.0.to_owned()).collect::<Vec<String>>(),
            "protein_identifier" => rows.iter().map(|x| x.1.protein.to_owned()).collect::<Vec<String>>(),
            "score" => rows.iter().map(|x| x.1.score).collect::<Vec<f64>>(),
        )
    }
}
