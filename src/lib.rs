pub mod analyze;
pub mod cli;
pub mod dataset;
pub mod decode;
pub mod error;
pub mod plan;
pub mod profile;
pub mod render;
pub mod store;

use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use encoding_rs::{Encoding, UTF_8};
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands},
    dataset::DatasetSummary,
    decode::{Cell, FileKind},
    store::DirectoryStore,
};

/// The selection surface allows between 2 and 4 columns; the planner itself
/// only enforces the lower bound.
const MAX_SELECTED_COLUMNS: usize = 4;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("tabchart", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Inspect(args) => handle_inspect(&args),
        Commands::Columns(args) => handle_columns(&args),
        Commands::Plot(args) => handle_plot(&args),
    }
}

fn handle_inspect(args: &cli::InspectArgs) -> Result<()> {
    let file_name = display_file_name(&args.input);
    let kind = FileKind::from_file_name(&file_name)?;
    let encoding = resolve_encoding(args.input_encoding.as_deref())?;
    let bytes = fs::read(&args.input)
        .with_context(|| format!("Reading input file {:?}", args.input))?;
    let table = decode::decode_encoded(&bytes, kind, encoding)?;
    let name = args.name.clone().unwrap_or_else(|| file_name.clone());
    info!(
        "Decoded '{}' ({}): {} column(s), {} row(s)",
        name,
        kind,
        table.columns().len(),
        table.row_count()
    );

    if args.rows > 0 && table.row_count() > 0 {
        let positions = table.column_positions();
        let preview = table
            .rows()
            .iter()
            .take(args.rows)
            .map(|row| {
                positions
                    .iter()
                    .map(|&pos| row.get(pos).map(Cell::render).unwrap_or_default())
                    .collect()
            })
            .collect::<Vec<Vec<String>>>();
        render::print_table(table.columns(), &preview);
    }

    if let Some(path) = &args.summary {
        let summary =
            DatasetSummary::from_table(name, kind, bytes.len() as u64, file_name, &table);
        summary
            .save(path)
            .with_context(|| format!("Writing summary to {path:?}"))?;
        info!("Dataset summary written to {path:?}");
    }
    Ok(())
}

fn handle_columns(args: &cli::ColumnsArgs) -> Result<()> {
    let profiles = if let Some(input) = &args.input {
        let file_name = display_file_name(input);
        let kind = FileKind::from_file_name(&file_name)?;
        let encoding = resolve_encoding(args.input_encoding.as_deref())?;
        let bytes =
            fs::read(input).with_context(|| format!("Reading input file {input:?}"))?;
        let table = decode::decode_encoded(&bytes, kind, encoding)?;
        profile::profile_table(&table)
    } else if let Some(summary_path) = &args.summary {
        let summary = DatasetSummary::load(summary_path)?;
        let store = DirectoryStore::new(store_root(args.store.as_deref(), summary_path));
        analyze::analyze_columns(&summary, &store)
    } else if !args.names.is_empty() {
        profile::fallback_profiles(&args.names)
    } else {
        bail!("Provide --input, --summary, or --names");
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
    } else {
        let headers = ["column", "type", "source", "samples"]
            .map(String::from)
            .to_vec();
        let rows = profiles
            .iter()
            .map(|p| {
                vec![
                    p.name.clone(),
                    p.data_type.as_str().to_string(),
                    p.source.as_str().to_string(),
                    p.sample_values.join(", "),
                ]
            })
            .collect::<Vec<_>>();
        render::print_table(&headers, &rows);
    }
    info!("Profiled {} column(s)", profiles.len());
    Ok(())
}

fn handle_plot(args: &cli::PlotArgs) -> Result<()> {
    let selected = args
        .columns
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    if selected.len() > MAX_SELECTED_COLUMNS {
        bail!(
            "Select between 2 and {} columns, got {}",
            MAX_SELECTED_COLUMNS,
            selected.len()
        );
    }

    let spec = if let Some(input) = &args.input {
        let file_name = display_file_name(input);
        let kind = FileKind::from_file_name(&file_name)?;
        let encoding = resolve_encoding(args.input_encoding.as_deref())?;
        let bytes =
            fs::read(input).with_context(|| format!("Reading input file {input:?}"))?;
        let table = decode::decode_encoded(&bytes, kind, encoding)?;
        let name = args.name.clone().unwrap_or(file_name);
        plan::plan(&table, &selected, &name)?
    } else if let Some(summary_path) = &args.summary {
        let summary = DatasetSummary::load(summary_path)?;
        let store = DirectoryStore::new(store_root(args.store.as_deref(), summary_path));
        analyze::plan_chart(&summary, &store, &selected)?
    } else {
        bail!("Provide --input or --summary");
    };

    info!(
        "Planned {} chart with {} data point(s)",
        spec.chart_type.as_str(),
        spec.data.len()
    );
    let rendered = serde_json::to_string_pretty(&spec)?;
    match &args.output {
        Some(path) => {
            fs::write(path, rendered + "\n")
                .with_context(|| format!("Writing chart spec to {path:?}"))?;
            info!("Chart specification written to {path:?}");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

// Blob keys in a summary are relative to the store root; default to the
// summary's own directory so `inspect --summary` output works in place.
fn store_root(store: Option<&Path>, summary_path: &Path) -> PathBuf {
    match store {
        Some(root) => root.to_path_buf(),
        None => summary_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}
