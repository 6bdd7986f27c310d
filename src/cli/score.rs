use super::{load_queries, ScoringArgs};
use clap::Parser;
use std::path::PathBuf;
use targetfish::matching::ConformerScorer;
use targetfish::{
    load_pharmacophore_model, score_model, LigandGraph, PharmacophoreModel, ScreeningError,
    SearchOutcome, Settings,
};
use tracing::{info, trace, warn};

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    /// Ligand feature table
    #[arg(short, long)]
    ligands: PathBuf,

    /// Hotspot table of the protein
    #[arg(short, long)]
    model: PathBuf,

    /// Only score the query with this name
    #[arg(short, long)]
    query: Option<String>,

    #[command(flatten)]
    scoring: ScoringArgs,
}

pub(crate) fn run(args: &Args) -> Result<(), ScreeningError> {
    trace!("{args:?}");

    let settings = args.scoring.settings();
    settings.validate()?;

    let model = load_pharmacophore_model(&args.model)?;
    info!(
        "Loaded {}: {} clusters from {} hotspots",
        model.identifier(),
        model.cluster_count(),
        model.hotspot_count()
    );

    let queries: Vec<LigandGraph> = load_queries(&args.ligands)?
        .into_iter()
        .filter(|q| args.query.as_deref().map_or(true, |name| q.name() == name))
        .collect();
    if queries.is_empty() {
        return Err(ScreeningError::ligand(
            args.query.clone().unwrap_or_default(),
            format!("not found in {}", args.ligands.display()),
        ));
    }

    for graph in &queries {
        let outcome = score_model(graph, &model, &settings);
        if outcome.truncated {
            warn!(
                "Search for {} stopped after {} expansions, the score is the best found",
                graph.name(),
                outcome.expansions
            );
        }
        println!("{}", report(graph, &model, &settings, &outcome));
    }
    Ok(())
}

/// Human-readable account of one search: score, best conformer and every mapped pair.
fn report(
    graph: &LigandGraph,
    model: &PharmacophoreModel,
    settings: &Settings,
    outcome: &SearchOutcome,
) -> String {
    let scorer = ConformerScorer::new(settings);
    let per_conformer = scorer.per_conformer_scores(&outcome.assignment, graph, model);
    let best_conformer = per_conformer
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &s)| match best {
            Some((_, b)) if b >= s => best,
            _ => Some((i, s)),
        });

    let mut lines = vec![format!(
        "{} vs {}: score {:.4} ({} pairs, {} expansions{})",
        graph.name(),
        model.identifier(),
        outcome.score,
        outcome.assignment.len(),
        outcome.expansions,
        if outcome.truncated { ", truncated" } else { "" }
    )];
    if let Some((i, s)) = best_conformer {
        lines.push(format!("  best conformer: {i} ({s:.4})"));
    }
    for &(feature, cluster) in outcome.assignment.pairs() {
        let node = graph.feature(feature);
        let target = model.cluster(cluster);
        let row = scorer.pair_row(graph, model, feature, cluster);
        let closest = node
            .positions
            .iter()
            .map(|p| nalgebra::distance(p, target.center()))
            .fold(f64::INFINITY, f64::min);
        lines.push(format!(
            "  feature {feature:>3} {:<14} -> cluster {:>4} (confidence {:.2})  closest {closest:6.3} Å  contribution {:8.4}",
            node.feature_type.to_string(),
            target.id(),
            target.confidence(),
            scorer.reduce(&row)
        ));
    }
    lines.join("\n")
}
