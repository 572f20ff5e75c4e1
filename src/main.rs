use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use cell_matcher::data::{loader, rank};
use cell_matcher::{pipeline, report, SortConfig};

#[derive(Parser)]
#[command(name = "cell-matcher")]
#[command(about = "Sort measured battery cells into matched modules")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assign every cell of a batch to a module and write the reports
    Sort(SortArgs),
    /// Show where one cell's resistances rank within the batch
    Rank {
        /// Measurement table (.csv, .json or .parquet)
        input: PathBuf,
        /// Cell number
        id: i64,
    },
}

#[derive(Args)]
struct SortArgs {
    /// Measurement table (.csv, .json or .parquet)
    input: PathBuf,

    /// Directory the reports are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// TOML file with sorting settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cells per module
    #[arg(long)]
    cells_per_module: Option<usize>,

    /// Multiple of the dev_st standard deviation above its mean that marks an outlier
    #[arg(long)]
    outlier_coefficient: Option<f64>,

    /// Bins in the dev_st histogram
    #[arg(long)]
    histogram_bins: Option<usize>,
}

impl SortArgs {
    /// Config file first, then command-line overrides.
    fn config(&self) -> Result<SortConfig> {
        let mut config = match &self.config {
            Some(path) => SortConfig::from_toml_file(path)?,
            None => SortConfig::default(),
        };
        if let Some(n) = self.cells_per_module {
            config.cells_per_module = n;
        }
        if let Some(k) = self.outlier_coefficient {
            config.outlier_coefficient = k;
        }
        if let Some(bins) = self.histogram_bins {
            config.histogram_bins = bins;
        }
        config.validate()?;
        Ok(config)
    }
}

fn sort(args: &SortArgs) -> Result<()> {
    let config = args.config()?;
    let records = loader::load_file(&args.input)?;
    let state = pipeline::run(&records, &config)?;

    report::write_all(&state, &config, &args.out_dir)?;
    info!("done");

    println!(
        "{} cells: {} modules ({} first pass, {} recycled), {} left over",
        state.len(),
        state.module_count(),
        state.first_pass_modules,
        state.recycled_modules,
        state.leftover_ids().len()
    );
    Ok(())
}

fn show_rank(input: &Path, id: i64) -> Result<()> {
    let records = loader::load_file(input)?;
    let Some(ranking) = rank::rank_cell(&records, id) else {
        bail!("cell {id} is not in {}", input.display());
    };
    print!("{}", ranking.render());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Sort(args) => sort(args),
        Command::Rank { input, id } => show_rank(input, *id),
    }
}
