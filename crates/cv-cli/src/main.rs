//! cvvar CLI

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cv_analysis::{AnalysisConfig, CvvarReader, SrimData, SrimTables};
use cv_root::{Histogram, RootFile};
use serde_json::json;

#[derive(Parser)]
#[command(name = "cvvar")]
#[command(about = "cvvar - TPC neutron analysis file toolkit")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    /// YAML configuration (file, tree, SRIM tables, rendering)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the keys of the top directory
    Keys {
        /// Analysis file. Defaults to the configured one (`cvvar.root`).
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List the branches of the event tree
    Branches {
        /// Analysis file. Defaults to the configured one (`cvvar.root`).
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Tree name. Defaults to the configured one (`cvvar_tree`).
        #[arg(short, long)]
        tree: Option<String>,
    },

    /// Project a branch expression into a histogram
    Hist {
        /// `x` or `y:x`, e.g. `length:ene_l`
        expr: String,

        /// Any prefix of `nx, xlo, xhi, ny, ylo, yhi`; open axes take their range from the data
        #[arg(default_value = "")]
        binning: String,

        /// Selection; its value weights each entry
        #[arg(long, default_value = "")]
        cut: String,

        /// Analysis file. Defaults to the configured one (`cvvar.root`).
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Tree name. Defaults to the configured one (`cvvar_tree`).
        #[arg(short, long)]
        tree: Option<String>,

        /// Save the histogram here (.svg, .png or .pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ROOT draw options (HIST, E, BAR, SCAT, BOX, COL, COLZ)
        #[arg(long, default_value = "")]
        draw: String,

        /// Logarithmic colour axis (2-D); use --draw LOGY for a 1-D log scale
        #[arg(long)]
        log: bool,

        /// Hide the statistics box
        #[arg(long)]
        no_stats: bool,
    },

    /// Load a SRIM energy/range table
    Srim {
        /// Which table to load
        #[arg(value_enum)]
        table: SrimTable,

        /// Table file; only with `file`
        #[arg(long, required_if_eq("table", "file"))]
        path: Option<PathBuf>,

        /// Directory holding the default-named tables
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SrimTable {
    Hydrogen,
    Argon,
    File,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    let mut config =
        AnalysisConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Keys { file } => {
            let path = file.unwrap_or(config.cvvar_path);
            cmd_keys(&path)
        }
        Commands::Branches { file, tree } => {
            override_source(&mut config, file, tree);
            cmd_branches(&config)
        }
        Commands::Hist { expr, binning, cut, file, tree, output, draw, log, no_stats } => {
            override_source(&mut config, file, tree);
            if no_stats {
                config.opt_stat = false;
            }
            cmd_hist(&config, &expr, &binning, &cut, output.as_deref(), &draw, log)
        }
        Commands::Srim { table, path, dir } => {
            if let Some(dir) = dir {
                config.srim.dir = Some(dir);
            }
            cmd_srim(&config, table, path.as_deref())
        }
    }
}

fn override_source(config: &mut AnalysisConfig, file: Option<PathBuf>, tree: Option<String>) {
    if let Some(f) = file {
        config.cvvar_path = f;
    }
    if let Some(t) = tree {
        config.tree_name = t;
    }
}

fn write_json(value: serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn cmd_keys(path: &Path) -> Result<()> {
    let file = RootFile::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let keys: Vec<_> = file
        .list_keys()?
        .into_iter()
        .map(|k| json!({ "name": k.name, "class": k.class_name, "cycle": k.cycle }))
        .collect();
    write_json(json!({ "file": path.display().to_string(), "keys": keys }))
}

fn cmd_branches(config: &AnalysisConfig) -> Result<()> {
    let path = &config.cvvar_path;
    let file = RootFile::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let tree = file.get_tree(&config.tree_name)?;
    let branches: Vec<_> = tree
        .branches
        .iter()
        .map(|b| {
            json!({
                "name": b.name,
                "type": format!("{:?}", b.leaf_type),
                "len": b.leaf_len,
                "baskets": b.n_baskets(),
            })
        })
        .collect();
    write_json(json!({ "tree": tree.name, "entries": tree.entries, "branches": branches }))
}

fn cmd_hist(
    config: &AnalysisConfig,
    expr: &str,
    binning: &str,
    cut: &str,
    output: Option<&Path>,
    draw: &str,
    log: bool,
) -> Result<()> {
    let reader = CvvarReader::from_config(config)
        .with_context(|| format!("failed to open {}", config.cvvar_path.display()))?;
    let hist = reader.hist(expr, binning, cut)?;
    if let Some(out) = output {
        reader
            .save(&hist, draw, out, log)
            .with_context(|| format!("failed to save {}", out.display()))?;
    }
    write_json(hist_summary(&hist, output))
}

fn hist_summary(hist: &Histogram, output: Option<&Path>) -> serde_json::Value {
    let output = output.map(|p| p.display().to_string());
    match hist {
        Histogram::H1(h) => json!({
            "name": h.name,
            "title": h.title,
            "dimension": 1,
            "entries": h.entries,
            "integral": h.integral(),
            "mean": finite(h.mean()),
            "std_dev": finite(h.std_dev()),
            "underflow": h.underflow,
            "overflow": h.overflow,
            "content": h.content,
            "output": output,
        }),
        Histogram::H2(h) => json!({
            "name": h.name,
            "title": h.title,
            "dimension": 2,
            "entries": h.entries,
            "integral": h.integral(),
            "mean": [finite(h.mean_x()), finite(h.mean_y())],
            "std_dev": [finite(h.std_dev_x()), finite(h.std_dev_y())],
            "output": output,
        }),
    }
}

/// JSON has no NaN; empty histograms report `null` moments.
fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

fn cmd_srim(config: &AnalysisConfig, table: SrimTable, path: Option<&Path>) -> Result<()> {
    let tables = SrimTables::from_config(&config.srim);
    let source = match (table, path) {
        (SrimTable::File, Some(p)) => p.to_path_buf(),
        (SrimTable::File, None) => anyhow::bail!("--path is required for `srim file`"),
        (SrimTable::Hydrogen, _) => tables.hydrogen_path().to_path_buf(),
        (SrimTable::Argon, _) => tables.argon_path().to_path_buf(),
    };
    let (energy, length) = SrimData::read(&source)?;
    write_json(json!({
        "path": source.display().to_string(),
        "rows": energy.len(),
        "energy_kev": &*energy,
        "length_cm": &*length,
    }))
}
