use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Chartseed - chart coverage boxes and supervised tile seeding
#[derive(Parser, Debug)]
#[command(name = "chartseed")]
#[command(about = "Chart coverage boxes and supervised tile seeding", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Configuration overrides shared by all commands
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration file (defaults to .chartseed/config.toml)
    #[arg(long = "config", global = true, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Directory for seed config, progress and log files
    #[arg(long, global = true, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Reference box database
    #[arg(long, global = true, value_name = "FILE")]
    pub box_database: Option<PathBuf>,

    /// Tile cache configuration passed to the seed command
    #[arg(long, global = true, value_name = "FILE")]
    pub tile_config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge the box database with a selection
    Merge(MergeArgs),

    /// Estimate the number of tiles for a selection
    Count(CountArgs),

    /// Compute boxes that close zoom pyramid gaps
    Missing(MissingArgs),

    /// Combine adjacent boxes of a box file
    Coalesce(CoalesceArgs),

    /// Show configuration values and their sources
    Config,

    /// Run and control seed jobs
    Seed(SeedArgs),

    /// Run the seed command under a parent watchdog
    #[command(hide = true)]
    Worker(WorkerCliArgs),
}

/// Zoom window overrides
#[derive(Args, Debug, Clone, Default)]
pub struct ZoomArgs {
    /// Lowest zoom level to include
    #[arg(long)]
    pub min_zoom: Option<i32>,

    /// Highest zoom level to include
    #[arg(long)]
    pub max_zoom: Option<i32>,
}

#[derive(Parser, Debug)]
pub struct MergeArgs {
    /// Selection file (JSON list of boxes)
    pub selection: PathBuf,

    #[command(flatten)]
    pub zoom: ZoomArgs,

    /// Add boxes closing zoom pyramid gaps
    #[arg(long)]
    pub fill_gaps: bool,

    /// Allowed number of empty zoom levels when filling gaps
    #[arg(long)]
    pub max_empty: Option<u32>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: MergeFormat,

    /// Write the result to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Seed name prefix (seed format)
    #[arg(long, default_value = "seed")]
    pub name: String,

    /// Caches to seed, comma separated (seed format)
    #[arg(long, value_delimiter = ',', default_value = "osm")]
    pub caches: Vec<String>,
}

/// Output format of the merge command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MergeFormat {
    /// Table of boxes
    Table,
    /// Box database lines
    Lines,
    /// GeoJSON feature collection
    Geojson,
    /// Seed configuration document
    Seed,
}

#[derive(Parser, Debug)]
pub struct CountArgs {
    /// Selection file (JSON list of boxes)
    pub selection: PathBuf,

    #[command(flatten)]
    pub zoom: ZoomArgs,

    /// Tile budget to check against
    #[arg(long)]
    pub max_tiles: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct MissingArgs {
    /// Box file to complete
    pub input: PathBuf,

    /// File receiving the synthesized boxes
    pub output: PathBuf,

    /// Allowed number of empty zoom levels
    #[arg(long)]
    pub max_empty: Option<u32>,
}

#[derive(Parser, Debug)]
pub struct CoalesceArgs {
    /// Box file to coalesce
    pub input: PathBuf,

    /// Write the coalesced boxes to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Corner distance in degrees below which edges count as shared
    #[arg(long, default_value_t = 0.01)]
    pub tolerance: f64,
}

#[derive(Parser, Debug)]
pub struct SeedArgs {
    #[command(subcommand)]
    pub command: SeedCommands,
}

#[derive(Subcommand, Debug)]
pub enum SeedCommands {
    /// Start a seed for a selection and watch it
    Run(SeedRunArgs),

    /// Resume an interrupted or paused seed
    Resume,

    /// Show the state of the work directory
    Status,

    /// Discard a paused seed
    Stop,

    /// Print a seed log
    Log(SeedLogArgs),
}

#[derive(Parser, Debug)]
pub struct SeedRunArgs {
    /// Selection file (JSON list of boxes)
    pub selection: PathBuf,

    /// Caches to seed, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub caches: Vec<String>,

    /// Name of the selection, used as seed name prefix
    #[arg(long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub zoom: ZoomArgs,

    /// Tile budget; larger seeds are refused
    #[arg(long)]
    pub max_tiles: Option<u64>,

    /// Add boxes closing zoom pyramid gaps
    #[arg(long)]
    pub fill_gaps: bool,

    /// Allowed number of empty zoom levels when filling gaps
    #[arg(long)]
    pub max_empty: Option<u32>,
}

#[derive(Parser, Debug)]
pub struct SeedLogArgs {
    /// Log file name (defaults to the newest log)
    pub name: Option<String>,

    /// Only print the last N bytes
    #[arg(long, value_name = "BYTES")]
    pub tail: Option<u64>,
}

/// Arguments of the hidden worker entry point
#[derive(Parser, Debug)]
pub struct WorkerCliArgs {
    /// Seed configuration
    #[arg(short = 's')]
    pub seed: PathBuf,

    /// Tile cache configuration
    #[arg(short = 'f')]
    pub tile_file: PathBuf,

    /// Concurrency of the seed command
    #[arg(short = 'c', default_value_t = 1)]
    pub concurrency: u32,

    /// Progress file of the seed command
    #[arg(long)]
    pub progress_file: PathBuf,

    /// Continue from the progress file
    #[arg(long = "continue")]
    pub continue_seed: bool,

    /// Seed command to run
    #[arg(long)]
    pub command: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_worker_args_parse() {
        let cli = Cli::parse_from([
            "chartseed",
            "worker",
            "-s",
            "/work/seed.json",
            "-f",
            "mapproxy.yaml",
            "-c",
            "1",
            "--progress-file",
            "/work/progress",
            "--continue",
            "--command",
            "mapproxy-seed",
        ]);

        match cli.command {
            Commands::Worker(args) => {
                assert_eq!(args.seed, PathBuf::from("/work/seed.json"));
                assert_eq!(args.concurrency, 1);
                assert!(args.continue_seed);
                assert_eq!(args.command, "mapproxy-seed");
            }
            other => panic!("Expected worker command, got {:?}", other),
        }
    }

    #[test]
    fn test_caches_are_comma_separated() {
        let cli = Cli::parse_from(["chartseed", "seed", "run", "sel.json", "--caches", "osm,sea"]);

        match cli.command {
            Commands::Seed(SeedArgs { command: SeedCommands::Run(args) }) => {
                assert_eq!(args.caches, vec!["osm".to_string(), "sea".to_string()]);
            }
            other => panic!("Expected seed run, got {:?}", other),
        }
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::parse_from(["chartseed", "seed", "status", "--work-dir", "/tmp/w", "--json"]);
        assert!(cli.json);
        assert_eq!(cli.config.work_dir, Some(PathBuf::from("/tmp/w")));
    }
}
