//! Statistics over screening result tables
//! (`query_name`, `protein_identifier`, `score`).

use crate::errors::ScreeningError;
use crate::ranking::{rank, ScoreResult};
use crate::utils::{f64_column, i64_column, str_column};
use core::fmt;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Number of best targets per query considered when looking for promiscuous targets.
pub const PROMISCUITY_TOP_N: usize = 10;

/// Distribution of the scores in a result table.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation, undefined for a single score
    pub std: Option<f64>,
}

/// Whole-table overview.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultSummary {
    pub total: usize,
    pub unique_queries: usize,
    pub unique_targets: usize,
    /// `None` for an empty table
    pub scores: Option<ScoreStats>,
}

impl fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total query-target pairs: {}", self.total)?;
        writeln!(f, "Unique queries: {}", self.unique_queries)?;
        write!(f, "Unique targets: {}", self.unique_targets)?;
        if let Some(s) = &self.scores {
            write!(
                f,
                "\nScores: min {:.4}, max {:.4}, mean {:.4}, median {:.4}",
                s.min, s.max, s.mean, s.median
            )?;
            if let Some(std) = s.std {
                write!(f, ", std {std:.4}")?;
            }
        }
        Ok(())
    }
}

/// Count rows, distinct queries and targets, and describe the score distribution.
pub fn summarize(df: &DataFrame) -> Result<ResultSummary, ScreeningError> {
    let stats = df
        .clone()
        .lazy()
        .select([
            col("query_name").n_unique().alias("unique_queries"),
            col("protein_identifier").n_unique().alias("unique_targets"),
            col("score").min().alias("min"),
            col("score").max().alias("max"),
            col("score").mean().alias("mean"),
            col("score").median().alias("median"),
            col("score").std(1).alias("std"),
        ])
        .collect()?;

    let count = |name: &str| -> Result<usize, ScreeningError> {
        let n = i64_column(&stats, name)?.first().copied().flatten();
        Ok(n.and_then(|n| usize::try_from(n).ok()).unwrap_or(0))
    };
    let value = |name: &str| -> Result<Option<f64>, ScreeningError> {
        Ok(f64_column(&stats, name)?.first().copied().flatten())
    };

    let scores = match (value("min")?, value("max")?, value("mean")?, value("median")?) {
        (Some(min), Some(max), Some(mean), Some(median)) => Some(ScoreStats {
            min,
            max,
            mean,
            median,
            // Null or NaN for a single score
            std: value("std")?.filter(|s| s.is_finite()),
        }),
        _ => None,
    };

    Ok(ResultSummary {
        total: df.height(),
        unique_queries: count("unique_queries")?,
        unique_targets: count("unique_targets")?,
        scores,
    })
}

/// Per-query hit count, mean and max score, ordered by query name.
pub fn per_query_stats(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .group_by([col("query_name")])
        .agg([
            col("score").count().alias("total_hits"),
            col("score").mean().alias("mean_score"),
            col("score").max().alias("max_score"),
        ])
        .sort(["query_name"], SortMultipleOptions::default())
        .collect()
}

/// Rows scoring at least `threshold`, best first.
pub fn strong_hits(df: &DataFrame, threshold: f64) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .filter(col("score").gt_eq(lit(threshold)))
        .sort(
            ["score"],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .collect()
}

/// Targets that appear among the `top_n` best hits of more than one query,
/// with the number of queries, most frequent first.
pub fn promiscuous_targets(
    df: &DataFrame,
    top_n: usize,
) -> Result<Vec<(String, usize)>, ScreeningError> {
    let queries = str_column(df, "query_name")?;
    let targets = str_column(df, "protein_identifier")?;
    let scores = f64_column(df, "score")?;

    let mut by_query: BTreeMap<String, Vec<ScoreResult>> = BTreeMap::new();
    for ((query, target), score) in queries.into_iter().zip(targets).zip(scores) {
        if let (Some(query), Some(target), Some(score)) = (query, target, score) {
            by_query
                .entry(query)
                .or_default()
                .push(ScoreResult::new(target, score));
        }
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for results in by_query.into_values() {
        for hit in rank(results, f64::NEG_INFINITY, Some(top_n)) {
            *counts.entry(hit.protein).or_default() += 1;
        }
    }

    let mut promiscuous: Vec<(String, usize)> =
        counts.into_iter().filter(|(_, c)| *c > 1).collect();
    // Stable sort keeps identifier order among equal counts
    promiscuous.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(promiscuous)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> DataFrame {
        df!(
            "query_name" => ["THC", "THC", "THC", "CBN", "CBN", "CBD"],
            "protein_identifier" => ["1abc", "2xyz", "3def", "2xyz", "1abc", "2xyz"],
            "score" => [30.0, 12.0, 4.0, 40.0, 2.0, 6.0],
        )
        .unwrap()
    }

    #[test]
    fn summary() {
        let summary = summarize(&results()).unwrap();
        assert_eq!(summary.total, 6);
        assert_eq!(summary.unique_queries, 3);
        assert_eq!(summary.unique_targets, 3);
        let scores = summary.scores.unwrap();
        assert_eq!(scores.min, 2.0);
        assert_eq!(scores.max, 40.0);
        assert_eq!(scores.mean, 94.0 / 6.0);
        assert_eq!(scores.median, 9.0);
        let values: [f64; 6] = [30.0, 12.0, 4.0, 40.0, 2.0, 6.0];
        let ss: f64 = values.iter().map(|v| (v - 94.0 / 6.0).powi(2)).sum();
        assert!((scores.std.unwrap() - (ss / 5.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn summary_of_single_and_empty_tables() {
        let one = df!(
            "query_name" => ["q"],
            "protein_identifier" => ["p"],
            "score" => [3.5],
        )
        .unwrap();
        let scores = summarize(&one).unwrap().scores.unwrap();
        assert_eq!(scores.median, 3.5);
        assert_eq!(scores.std, None);

        let empty = one.head(Some(0));
        let summary = summarize(&empty).unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.scores, None);
    }

    #[test]
    fn per_query_table() {
        let stats = per_query_stats(&results()).unwrap();
        assert_eq!(stats.height(), 3);
        assert_eq!(
            str_column(&stats, "query_name").unwrap(),
            vec![
                Some("CBD".to_string()),
                Some("CBN".to_string()),
                Some("THC".to_string())
            ]
        );
        assert_eq!(
            f64_column(&stats, "total_hits").unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0)]
        );
        assert_eq!(
            f64_column(&stats, "max_score").unwrap(),
            vec![Some(6.0), Some(40.0), Some(30.0)]
        );
        assert_eq!(
            f64_column(&stats, "mean_score").unwrap(),
            vec![Some(6.0), Some(21.0), Some(46.0 / 3.0)]
        );
    }

    #[test]
    fn strong_hits_inclusive_threshold() {
        let hits = strong_hits(&results(), 30.0).unwrap();
        assert_eq!(
            f64_column(&hits, "score").unwrap(),
            vec![Some(40.0), Some(30.0)]
        );
    }

    #[test]
    fn promiscuity() {
        let all = promiscuous_targets(&results(), PROMISCUITY_TOP_N).unwrap();
        assert_eq!(
            all,
            vec![("2xyz".to_string(), 3), ("1abc".to_string(), 2)]
        );
        // Only the single best hit of each query
        let top1 = promiscuous_targets(&results(), 1).unwrap();
        assert_eq!(top1, vec![("2xyz".to_string(), 2)]);
    }
}
