use clap::Parser;
use std::path::PathBuf;
use targetfish::analysis::{
    per_query_stats, promiscuous_targets, strong_hits, summarize, PROMISCUITY_TOP_N,
};
use targetfish::{read_df_from_file, write_df_to_file, DataFrameFileType, ScreeningError};
use tracing::{info, trace, warn};

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    /// Screening result table
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for the per-query table
    #[arg(short, long)]
    output: PathBuf,

    /// Score at or above which a hit counts as strong
    #[arg(long, default_value_t = 30.0)]
    threshold: f64,

    /// Name of the output file
    #[arg(short = 'f', long = "filename", default_value_t = String::from("per_query_stats"))]
    filename: String,

    /// Output file type
    #[arg(short = 't', long, default_value_t = DataFrameFileType::Csv)]
    output_format: DataFrameFileType,
}

pub(crate) fn run(args: &Args) -> Result<(), ScreeningError> {
    trace!("{args:?}");

    let df = read_df_from_file(&args.input)?;
    if df.height() == 0 {
        warn!("{} holds no results", args.input.display());
    }

    let summary = summarize(&df)?;
    info!("Summary statistics\n{summary}");

    let strong = strong_hits(&df, args.threshold)?;
    info!(
        "Strong hits (score >= {}): {}\n{}",
        args.threshold,
        strong.height(),
        strong
    );

    let mut per_query = per_query_stats(&df)?;
    info!("Per-query statistics\n{per_query}");

    let promiscuous = promiscuous_targets(&df, PROMISCUITY_TOP_N)?;
    if promiscuous.is_empty() {
        info!("No target appears in the top {PROMISCUITY_TOP_N} of more than one query");
    } else {
        let lines = promiscuous
            .iter()
            .map(|(target, n)| format!("{target:<50} in {n} queries"))
            .collect::<Vec<_>>();
        info!(
            "Targets in the top {PROMISCUITY_TOP_N} of several queries:\n{}",
            lines.join("\n")
        );
    }

    let output_path = std::path::absolute(&args.output)?;
    std::fs::create_dir_all(&output_path)?;
    let output_file = output_path
        .join(&args.filename)
        .with_extension(args.output_format.to_string());
    write_df_to_file(&mut per_query, &output_file, args.output_format)?;
    info!("Per-query statistics saved to {}", output_file.display());
    Ok(())
}
