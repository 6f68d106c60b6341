//! Sightline - deferred list demo entry point

use clap::Parser;
use sightline::config::CliOverrides;
use sightline::model::{AppError, Thresholds};
use std::path::PathBuf;
use tracing::info;

/// Terminal demo of shared visibility tracking and deferred list cells
#[derive(Parser, Debug)]
#[command(name = "sightline")]
#[command(version)]
#[command(about = "Scroll long card columns that render content only near the viewport")]
pub struct Args {
    /// Cards per column
    #[arg(long)]
    pub items: Option<usize>,

    /// Number of side-by-side columns (1-4)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub columns: Option<u8>,

    /// Root margin in CSS shorthand, e.g. "10px" or "0px 0px 200px 0px"
    #[arg(long)]
    pub root_margin: Option<String>,

    /// Comma separated visibility thresholds, e.g. "0,0.5,1"
    #[arg(long, value_parser = parse_thresholds)]
    pub thresholds: Option<::std::vec::Vec<f64>>,

    /// Placeholder height before a card was measured, e.g. "100px" or "10%"
    #[arg(long)]
    pub min_height: Option<String>,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            item_count: self.items,
            columns: self.columns.map(usize::from),
            root_margin: self.root_margin.clone(),
            thresholds: self.thresholds.clone(),
            min_placeholder_height: self.min_height.clone(),
        }
    }
}

fn parse_thresholds(input: &str) -> Result<Vec<f64>, String> {
    Thresholds::parse_list(input)
        .map(|t| t.as_slice().to_vec())
        .map_err(|e| e.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = sightline::config::load_config_with_precedence(args.config.clone())?;
        let merged = sightline::config::merge_config(config_file);
        let with_env = sightline::config::apply_env_overrides(merged).map_err(AppError::from)?;
        sightline::config::apply_cli_overrides(with_env, args.overrides())
    };

    sightline::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let board = sightline::view::BoardConfig::from_resolved(&config)?;
    let styles = sightline::view::BoardStyles::with_color_config(
        sightline::view::ColorConfig::from_env_and_args(args.no_color),
    );

    sightline::view::run(&board, styles)?;

    Ok(())
}
