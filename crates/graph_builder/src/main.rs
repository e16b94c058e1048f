//! Graph Builder CLI
//!
//! Tracking frames (CSV/JSON) → per-frame court graphs or possession (JSON)

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use cg_core::{BatchConfig, CourtConfig, FailurePolicy};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use graph_builder::RunSummary;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "graph_builder")]
#[command(about = "Build court graphs and possession from tracking frames", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct RunArgs {
    /// Input frames (.csv with a header row, or .json array of objects)
    #[arg(long)]
    input: PathBuf,

    /// Output JSON file path
    #[arg(long)]
    out: PathBuf,

    /// Court configuration (.yaml/.yml/.json); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip malformed frames and list them in the output instead of aborting
    #[arg(long, default_value = "false")]
    skip_malformed: bool,

    /// Build frames on all cores
    #[arg(long, default_value = "false")]
    parallel: bool,
}

#[cfg(feature = "cli")]
impl RunArgs {
    fn court(&self) -> Result<CourtConfig> {
        match &self.config {
            Some(path) => graph_builder::load_court_config(path),
            None => Ok(CourtConfig::default()),
        }
    }

    fn batch(&self) -> BatchConfig {
        BatchConfig {
            policy: if self.skip_malformed {
                FailurePolicy::SkipAndRecord
            } else {
                FailurePolicy::Abort
            },
            parallel: self.parallel,
        }
    }

    fn announce(&self, what: &str) {
        println!("🔨 Building {what}...");
        println!("   Input:  {}", self.input.display());
        println!("   Output: {}", self.out.display());
        if let Some(config) = &self.config {
            println!("   Config: {}", config.display());
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Build one graph per frame
    Graphs(RunArgs),

    /// Resolve the team in possession for every frame
    Possession(RunArgs),
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let summary = match cli.command {
        Commands::Graphs(args) => {
            args.announce("frame graphs");
            graph_builder::build_graph_file(&args.input, &args.out, args.court()?, args.batch())?
        }
        Commands::Possession(args) => {
            args.announce("possession");
            graph_builder::build_possession_file(
                &args.input,
                &args.out,
                args.court()?,
                args.batch(),
            )?
        }
    };

    print_summary(&summary);
    Ok(())
}

#[cfg(feature = "cli")]
fn print_summary(summary: &RunSummary) {
    println!("\n✅ Done");
    println!("   Frames:  {}", summary.total_frames);
    println!("   Written: {}", summary.written);
    if !summary.failed_frames.is_empty() {
        println!(
            "   Skipped: {} (frames {:?})",
            summary.failed_frames.len(),
            summary.failed_frames
        );
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    std::process::exit(1);
}
