use super::{load_queries, ScoringArgs};
use clap::Parser;
use std::path::PathBuf;
use targetfish::analysis::summarize;
use targetfish::{
    load_model_database, rankings, run_with_threads, screen, write_df_to_file, DataFrameFileType,
    ScreeningError,
};
use tracing::{debug, info, trace, warn};

/// Number of hits logged per query.
const LOGGED_HITS: usize = 10;

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    /// Ligand feature table with one or more queries
    #[arg(short, long)]
    ligands: PathBuf,

    /// Directory of hotspot tables, searched recursively
    #[arg(short, long)]
    database: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Name of the output file
    #[arg(short = 'f', long = "filename", default_value_t = String::from("screening_results"))]
    filename: String,

    /// Output file type
    #[arg(short = 't', long, default_value_t = DataFrameFileType::Csv)]
    output_format: DataFrameFileType,

    /// Drop proteins scoring below this
    #[arg(long = "min-score", default_value_t = 0.0)]
    min_score: f64,

    /// Keep only the best N proteins per query
    #[arg(long = "top-n")]
    top_n: Option<usize>,

    #[command(flatten)]
    scoring: ScoringArgs,

    /// Number of threads to use for parallel processing (0 for all cores)
    #[arg(short = 'j', long = "num-threads", default_value_t = 0)]
    num_threads: usize,
}

pub(crate) fn run(args: &Args) -> Result<(), ScreeningError> {
    trace!("{args:?}");

    let mut settings = args.scoring.settings();
    settings.min_score = args.min_score;
    settings.top_n = args.top_n;
    settings.validate()?;

    let weights = settings
        .weights
        .iter()
        .map(|(t, w)| format!("{t} {w}"))
        .collect::<Vec<_>>();
    info!("Feature weights: {}", weights.join(", "));

    let output_path = std::path::absolute(&args.output)?;
    let queries = load_queries(&args.ligands)?;
    info!(
        "Loaded {} quer{} from {}",
        queries.len(),
        if queries.len() == 1 { "y" } else { "ies" },
        args.ligands.display()
    );

    let db = load_model_database(&args.database)?;
    if db.loaded() == 0 {
        warn!("No usable pharmacophore model in {}", args.database.display());
    }

    let reports = run_with_threads(args.num_threads, || {
        debug!("Using {} thread(s)", rayon::current_num_threads());
        screen(&queries, &db, &settings)
    })?;

    for report in &reports {
        info!(
            "{}: {} of {} proteins ranked, {} failed",
            report.query,
            report.ranking.len(),
            report.screened,
            report.failures.len()
        );
    }

    let ranked = rankings(&reports);
    for (query, hits) in ranked.iter() {
        let top = hits
            .iter()
            .take(LOGGED_HITS)
            .enumerate()
            .map(|(i, hit)| format!("{:>3}. {hit}", i + 1))
            .collect::<Vec<_>>();
        if !top.is_empty() {
            info!("Top hits for {query}:\n{}", top.join("\n"));
        }
    }

    let mut df_scores = ranked.to_df()?;
    let summary = summarize(&df_scores)?;
    info!("Screening summary\n{summary}");

    std::fs::create_dir_all(&output_path)?;
    let output_file = output_path
        .join(&args.filename)
        .with_extension(args.output_format.to_string());
    write_df_to_file(&mut df_scores, &output_file, args.output_format)?;
    info!("Results saved to {}", output_file.display());
    Ok(())
}
