//! fluent-grid - Entry Point

use clap::Parser;
use fluent_grid::config::{CliOverrides, ResolvedConfig};
use fluent_grid::grid::{
    GapSpec, GridView, HeadlessHost, JustifyMode, ReconciliationController, SortSpec,
};
use fluent_grid::model::AppError;
use fluent_grid::source::{field_text, item_key};
use serde_json::Value;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;
use tracing::info;

/// fluent-grid - animated keyed grid in the terminal
#[derive(Parser, Debug)]
#[command(name = "fluent-grid")]
#[command(version)]
#[command(about = "Lay out a JSON array of items on an animated, keyed grid")]
pub struct Args {
    /// Path to a JSON array of items (reads piped stdin, or a demo dataset, if not provided)
    pub file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Item width in pixels
    #[arg(long)]
    pub item_width: Option<f64>,

    /// Item height in pixels
    #[arg(long)]
    pub item_height: Option<f64>,

    /// Column gap in pixels, or "justify" to stretch gaps across the container
    #[arg(long)]
    pub x_gap: Option<GapSpec>,

    /// Row gap in pixels
    #[arg(long)]
    pub y_gap: Option<f64>,

    /// Free space distribution: none, space-around or space-between
    #[arg(long)]
    pub justify: Option<JustifyMode>,

    /// Initial sort as FIELD:KIND (kind is string, number or date)
    #[arg(long)]
    pub sort: Option<SortSpec>,

    /// Only show items whose FIELD equals VALUE
    #[arg(long)]
    pub filter: Option<FilterArg>,

    /// Print the settled layout to stdout instead of starting the TUI
    #[arg(long)]
    pub print: bool,

    /// Container width in pixels for --print
    #[arg(long, default_value = "800")]
    pub width: f64,
}

/// A `FIELD=VALUE` equality filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArg {
    /// Field to compare.
    pub field: String,
    /// Required value.
    pub value: String,
}

impl FromStr for FilterArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((field, value)) if !field.trim().is_empty() => Ok(Self {
                field: field.trim().to_string(),
                value: value.to_string(),
            }),
            _ => Err(format!("expected FIELD=VALUE, got {s:?}")),
        }
    }
}

impl FilterArg {
    fn matches(&self, item: &Value) -> bool {
        field_text(item, &self.field).as_deref() == Some(self.value.as_str())
    }
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Load configuration with full precedence chain:
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = fluent_grid::config::load_config_with_precedence(args.config.clone())?;
        let merged = fluent_grid::config::merge_config(config_file)?;
        let with_env = fluent_grid::config::apply_env_overrides(merged)?;
        fluent_grid::config::apply_cli_overrides(
            with_env,
            CliOverrides {
                item_width: args.item_width,
                item_height: args.item_height,
                x_gap: args.x_gap,
                y_gap: args.y_gap,
                justify: args.justify,
            },
        )
    };

    fluent_grid::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    let input_source = fluent_grid::source::detect_input_source(args.file.clone());
    let dataset = fluent_grid::source::load_dataset(&input_source)?;

    if args.print {
        let stdout = io::stdout();
        return print_layout(&args, &config, dataset, &mut stdout.lock());
    }

    let mut config = config;
    if let Some(sort) = &args.sort {
        // an explicit --sort takes the first digit key
        config.sort_fields.retain(|spec| spec != sort);
        config.sort_fields.insert(0, sort.clone());
    }
    fluent_grid::view::run_with_dataset(dataset, &config)?;

    Ok(())
}

/// Reconcile `dataset` once on an in-memory host and write the settled layout.
fn print_layout(
    args: &Args,
    config: &ResolvedConfig,
    dataset: Vec<Value>,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let label_field = config.label_field.clone();
    let host = HeadlessHost::with_label(args.width, move |item: &Value| {
        item_key(item, &label_field)
    });
    let key_field = config.key_field.clone();
    let mut grid = ReconciliationController::new(host, config.grid_options(), move |item| {
        item_key(item, &key_field)
    });

    let filter = args.filter.clone().map(|filter| {
        Box::new(move |item: &Value| filter.matches(item)) as Box<dyn Fn(&Value) -> bool>
    });
    let sort = args.sort.as_ref().map(|spec| spec.comparator());
    grid.apply_with(dataset, filter, sort)?;
    grid.settle(Instant::now())?;

    if let Some(geometry) = grid.geometry() {
        writeln!(out, "grid-template-columns: {}", geometry.column_template())?;
        writeln!(out, "column-gap: {}px", geometry.column_gap_px)?;
        writeln!(out, "row-gap: {}px", geometry.row_gap_px)?;
        writeln!(out, "justify-content: {}", geometry.justify.as_css())?;
    }
    for handle in grid.views() {
        let view = handle.view();
        let bbox = view.bounding_box();
        writeln!(
            out,
            "{:>4}  {:<16} {:>6} {:>6}",
            handle.context().rank(),
            view.label,
            bbox.x,
            bbox.y
        )?;
    }
    Ok(())
}
