use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Decode spreadsheet uploads, profile columns, and plan chart-ready data",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode a file and report its columns and row count
    Inspect(InspectArgs),
    /// Profile columns into semantic types with sample values
    Columns(ColumnsArgs),
    /// Plan a chart specification for selected columns
    Plot(PlotArgs),
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Input file (csv, xls, xlsx, json)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Write a dataset summary JSON to this path
    #[arg(short = 's', long = "summary")]
    pub summary: Option<PathBuf>,
    /// Number of data rows to preview (0 disables the preview)
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// Dataset display name (defaults to the file name)
    #[arg(long)]
    pub name: Option<String>,
    /// Character encoding for csv input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// Input file to decode and profile
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Dataset summary JSON produced by `inspect --summary`
    #[arg(long)]
    pub summary: Option<PathBuf>,
    /// Blob store root directory for summary-driven analysis
    #[arg(long)]
    pub store: Option<PathBuf>,
    /// Profile these column names without any data (name-only fallback)
    #[arg(short = 'C', long = "names", value_delimiter = ',')]
    pub names: Vec<String>,
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
    /// Character encoding for csv input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Input file to decode and chart
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Dataset summary JSON produced by `inspect --summary`
    #[arg(long)]
    pub summary: Option<PathBuf>,
    /// Blob store root directory for summary-driven analysis
    #[arg(long)]
    pub store: Option<PathBuf>,
    /// Columns to chart (between 2 and 4 names)
    #[arg(short = 'C', long = "columns", value_delimiter = ',', required = true)]
    pub columns: Vec<String>,
    /// Dataset display name used in the chart description
    #[arg(long)]
    pub name: Option<String>,
    /// Output JSON file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Character encoding for csv input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}
