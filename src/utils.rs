use crate::errors::ScreeningError;
use polars::prelude::*;
use std::path::Path;
use tracing::warn;

/// Run `f` inside a rayon pool with `num_threads` workers (0 for all cores).
///
/// Falls back to the global pool if a dedicated one cannot be built.
pub fn run_with_threads<T, F>(num_threads: usize, f: F) -> T
where
    F: FnOnce() -> T + Send,
    T: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
    {
        Ok(pool) => pool.install(f),
        Err(e) => {
            warn!("Failed to build a thread pool with {num_threads} thread(s), using the global pool: {e}");
            f()
        }
    }
}

/// Write a DataFrame to `file_path`, replacing its extension with the format's suffix.
pub fn write_df_to_file(
    df: &mut DataFrame,
    file_path: &Path,
    file_type: DataFrameFileType,
) -> Result<(), ScreeningError> {
    let file_suffix = file_type.to_string();
    let mut file = std::fs::File::create(file_path.with_extension(file_suffix))?;
    match file_type {
        DataFrameFileType::Csv => {
            CsvWriter::new(&mut file).finish(df)?;
        }
        DataFrameFileType::Parquet => {
            ParquetWriter::new(&mut file).finish(df)?;
        }
        DataFrameFileType::Json => {
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::Json)
                .finish(df)?;
        }
        DataFrameFileType::NDJson => {
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::JsonLines)
                .finish(df)?;
        }
    }
    Ok(())
}

/// Read a table, picking the reader from the file extension.
pub fn read_df_from_file(file_path: &Path) -> Result<DataFrame, ScreeningError> {
    let file_type = DataFrameFileType::from_path(file_path).ok_or_else(|| {
        ScreeningError::UnsupportedFormat(file_path.to_string_lossy().to_string())
    })?;
    let df = match file_type {
        DataFrameFileType::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(file_path.to_path_buf()))?
            .finish()?,
        DataFrameFileType::Parquet => {
            ParquetReader::new(std::fs::File::open(file_path)?).finish()?
        }
        DataFrameFileType::Json => JsonReader::new(std::fs::File::open(file_path)?)
            .with_json_format(JsonFormat::Json)
            .finish()?,
        DataFrameFileType::NDJson => JsonReader::new(std::fs::File::open(file_path)?)
            .with_json_format(JsonFormat::JsonLines)
            .finish()?,
    };
    Ok(df)
}

/// File format for reading and writing DataFrames.
#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum DataFrameFileType {
    /// Comma-separated values
    Csv,
    /// Parquet columnar storage
    Parquet,
    /// Standard JSON
    Json,
    /// Newline-delimited JSON
    NDJson,
}

impl DataFrameFileType {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(DataFrameFileType::Csv),
            "parquet" | "pq" => Some(DataFrameFileType::Parquet),
            "json" => Some(DataFrameFileType::Json),
            "ndjson" | "jsonl" => Some(DataFrameFileType::NDJson),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataFrameFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DataFrameFileType::Csv => write!(f, "csv"),
            DataFrameFileType::Parquet => write!(f, "parquet"),
            DataFrameFileType::Json => write!(f, "json"),
            DataFrameFileType::NDJson => write!(f, "ndjson"),
        }
    }
}

/// Values of a numeric column as `f64`, whatever its stored numeric type.
pub(crate) fn f64_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}

/// Values of an integer column as `i64`.
pub(crate) fn i64_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
    let column = df.column(name)?.cast(&DataType::Int64)?;
    Ok(column.i64()?.into_iter().collect())
}

/// Values of a column rendered as strings.
pub(crate) fn str_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}
