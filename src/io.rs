//! Loaders for hotspot and ligand feature tables.
//!
//! Hotspot tables hold one protein each, with columns
//! `cluster`, `type`, `x`, `y`, `z` and an optional `score` (confidence).
//! Ligand tables hold one row per feature and conformer, with columns
//! `feature`, `type`, `conformer`, `x`, `y`, `z` and an optional `query`
//! naming the molecule when several are stored together.
//! CSV, Parquet, JSON and NDJSON files are accepted.

use crate::errors::ScreeningError;
use crate::features::FeatureType;
use crate::ligand::{LigandFeatureNode, LigandGraph};
use crate::pharmacophore::{Hotspot, PharmacophoreModel};
use crate::screening::ModelDatabase;
use crate::utils::{f64_column, i64_column, read_df_from_file, str_column, DataFrameFileType};
use nalgebra::Point3;
use polars::prelude::*;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Build a protein model from a hotspot table.
pub fn pharmacophore_from_df(
    identifier: &str,
    df: &DataFrame,
) -> Result<PharmacophoreModel, ScreeningError> {
    let clusters = i64_column(df, "cluster")?;
    let types = str_column(df, "type")?;
    let xs = f64_column(df, "x")?;
    let ys = f64_column(df, "y")?;
    let zs = f64_column(df, "z")?;
    let scores = match df.column("score") {
        Ok(_) => f64_column(df, "score")?,
        Err(_) => vec![Some(1.0); df.height()],
    };

    let malformed = |row: usize, what: &str| {
        ScreeningError::model(identifier, format!("row {row}: missing or invalid {what}"))
    };

    let hotspots = (0..df.height())
        .map(|row| {
            let cluster = clusters[row]
                .and_then(|c| usize::try_from(c).ok())
                .ok_or_else(|| malformed(row, "cluster"))?;
            let feature_type = types[row]
                .as_deref()
                .ok_or_else(|| malformed(row, "type"))?
                .parse::<FeatureType>()
                .map_err(|e| ScreeningError::model(identifier, format!("row {row}: {e}")))?;
            let position = match (xs[row], ys[row], zs[row]) {
                (Some(x), Some(y), Some(z)) => Point3::new(x, y, z),
                _ => return Err(malformed(row, "coordinates")),
            };
            let confidence = scores[row].ok_or_else(|| malformed(row, "score"))?;
            Ok(Hotspot::new(feature_type, position, confidence, cluster))
        })
        .collect::<Result<Vec<_>, ScreeningError>>()?;

    PharmacophoreModel::from_hotspots(identifier, hotspots)
}

/// Load one protein model; its identifier is the file stem.
pub fn load_pharmacophore_model(path: &Path) -> Result<PharmacophoreModel, ScreeningError> {
    let identifier = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    load_with_identifier(path, &identifier)
}

fn load_with_identifier(
    path: &Path,
    identifier: &str,
) -> Result<PharmacophoreModel, ScreeningError> {
    let df = read_df_from_file(path)?;
    Ok(pharmacophore_from_df(identifier, &df)?.with_source(path))
}

/// Load every hotspot table below `dir`.
///
/// Files are visited in path order and identified by their path relative to `dir`
/// without extension. A file that fails to load keeps its slot in the database
/// as a failure; only an unreadable directory is an error.
pub fn load_model_database(dir: &Path) -> Result<ModelDatabase, ScreeningError> {
    let mut files = Vec::new();
    collect_tables(dir, &mut files)?;
    files.sort();
    debug!("Found {} table(s) under {}", files.len(), dir.display());

    let loaded: Vec<(String, Result<PharmacophoreModel, ScreeningError>)> = files
        .par_iter()
        .map(|path| {
            let identifier = model_identifier(dir, path);
            let model = load_with_identifier(path, &identifier);
            (identifier, model)
        })
        .collect();

    let mut db = ModelDatabase::new();
    for (identifier, model) in loaded {
        match model {
            Ok(model) => {
                debug!(
                    "Loaded {identifier}: {} clusters from {} hotspots",
                    model.cluster_count(),
                    model.hotspot_count()
                );
                db.push(model);
            }
            Err(e) => {
                warn!("Failed to load {identifier}: {e}");
                db.push_failed(identifier, e);
            }
        }
    }
    info!(
        "Loaded {} of {} pharmacophore models from {}",
        db.loaded(),
        db.len(),
        dir.display()
    );
    Ok(db)
}

fn collect_tables(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_tables(&path, files)?;
        } else if DataFrameFileType::from_path(&path).is_some() {
            files.push(path);
        }
    }
    Ok(())
}

fn model_identifier(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Default)]
struct FeatureRows {
    feature_type: Option<FeatureType>,
    positions: BTreeMap<usize, Point3<f64>>,
}

/// Columns of a ligand feature table.
struct LigandColumns {
    features: Vec<Option<i64>>,
    conformers: Vec<Option<i64>>,
    types: Vec<Option<String>>,
    xs: Vec<Option<f64>>,
    ys: Vec<Option<f64>>,
    zs: Vec<Option<f64>>,
}

impl LigandColumns {
    fn from_df(df: &DataFrame) -> PolarsResult<Self> {
        Ok(Self {
            features: i64_column(df, "feature")?,
            conformers: i64_column(df, "conformer")?,
            types: str_column(df, "type")?,
            xs: f64_column(df, "x")?,
            ys: f64_column(df, "y")?,
            zs: f64_column(df, "z")?,
        })
    }

    /// Build the graph of one query from its rows.
    fn graph(&self, name: &str, rows: &[usize]) -> Result<LigandGraph, ScreeningError> {
        let mut nodes: BTreeMap<usize, FeatureRows> = BTreeMap::new();
        for &row in rows {
            let malformed = |what: &str| {
                ScreeningError::ligand(name, format!("row {row}: missing or invalid {what}"))
            };
            let feature = self.features[row]
                .and_then(|v| usize::try_from(v).ok())
                .ok_or_else(|| malformed("feature"))?;
            let conformer = self.conformers[row]
                .and_then(|v| usize::try_from(v).ok())
                .ok_or_else(|| malformed("conformer"))?;
            let feature_type = self.types[row]
                .as_deref()
                .ok_or_else(|| malformed("type"))?
                .parse::<FeatureType>()
                .map_err(|e| ScreeningError::ligand(name, format!("row {row}: {e}")))?;
            let position = match (self.xs[row], self.ys[row], self.zs[row]) {
                (Some(x), Some(y), Some(z)) => Point3::new(x, y, z),
                _ => return Err(malformed("coordinates")),
            };

            let node = nodes.entry(feature).or_default();
            match node.feature_type {
                Some(t) if t != feature_type => {
                    return Err(ScreeningError::ligand(
                        name,
                        format!("feature {feature} is both {t} and {feature_type}"),
                    ))
                }
                _ => node.feature_type = Some(feature_type),
            }
            if node.positions.insert(conformer, position).is_some() {
                return Err(ScreeningError::ligand(
                    name,
                    format!("feature {feature} lists conformer {conformer} twice"),
                ));
            }
        }
        assemble_graph(name, nodes)
    }
}

/// Build ligand graphs from a feature table, one per distinct `query` value
/// in order of first appearance.
///
/// Table-level problems (missing columns) fail the whole call; problems inside
/// one query only fail that query's entry.
pub fn ligands_from_df(
    df: &DataFrame,
    default_name: &str,
) -> Result<Vec<(String, Result<LigandGraph, ScreeningError>)>, ScreeningError> {
    let queries = match df.column("query") {
        Ok(_) => str_column(df, "query")?,
        Err(_) => vec![Some(default_name.to_string()); df.height()],
    };
    let columns = LigandColumns::from_df(df)?;

    let mut order: Vec<String> = Vec::new();
    let mut rows_by_query: HashMap<String, Vec<usize>> = HashMap::new();
    for (row, query) in queries.into_iter().enumerate() {
        let query = query.unwrap_or_else(|| default_name.to_string());
        rows_by_query
            .entry(query.clone())
            .or_insert_with(|| {
                order.push(query);
                Vec::new()
            })
            .push(row);
    }

    Ok(order
        .into_iter()
        .map(|name| {
            let graph = columns.graph(&name, &rows_by_query[&name]);
            (name, graph)
        })
        .collect())
}

fn assemble_graph(
    name: &str,
    nodes: BTreeMap<usize, FeatureRows>,
) -> Result<LigandGraph, ScreeningError> {
    if let Some(missing) = nodes.keys().enumerate().find_map(|(i, &f)| (i != f).then_some(i)) {
        return Err(ScreeningError::ligand(
            name,
            format!("feature indices skip {missing}"),
        ));
    }

    let n_conformers = nodes
        .values()
        .filter_map(|n| n.positions.keys().next_back())
        .max()
        .map_or(1, |&c| c + 1);

    let features = nodes
        .into_iter()
        .map(|(feature, rows)| {
            if rows.positions.len() != n_conformers {
                let missing = (0..n_conformers)
                    .find(|c| !rows.positions.contains_key(c))
                    .unwrap_or(0);
                return Err(ScreeningError::ligand(
                    name,
                    format!("feature {feature} has no position for conformer {missing}"),
                ));
            }
            // Every feature is created by a typed row
            let feature_type = rows
                .feature_type
                .ok_or_else(|| ScreeningError::ligand(name, format!("feature {feature} has no type")))?;
            Ok(LigandFeatureNode::new(
                feature_type,
                rows.positions.into_values().collect(),
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;

    LigandGraph::new(name, n_conformers, features)
}

/// Load all query ligands from a feature table. Without a `query` column the
/// whole file is one ligand named after the file stem.
pub fn load_ligands(
    path: &Path,
) -> Result<Vec<(String, Result<LigandGraph, ScreeningError>)>, ScreeningError> {
    let default_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Query".to_string());
    let df = read_df_from_file(path)?;
    ligands_from_df(&df, &default_name)
}
