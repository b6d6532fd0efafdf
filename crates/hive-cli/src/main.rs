use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hive_core::constants::DEFAULT_BEST_FILE;
use hive_core::{SimConfig, World};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser)]
#[command(name = "hive")]
#[command(about = "Headless hex-grid colony evolution runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and report a summary
    Run {
        /// Path to config file (JSON); defaults are used when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the config seed
        #[arg(long)]
        seed: Option<u64>,

        /// Number of ticks to run
        #[arg(long, default_value_t = 1000)]
        steps: usize,

        /// Record metrics every N ticks
        #[arg(long, default_value_t = 100)]
        sample_every: usize,

        /// Output directory for summary.json (optional)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Champion file to load before and save after the run
        #[arg(long, default_value = DEFAULT_BEST_FILE)]
        best: PathBuf,

        /// Print an ASCII map of the final world
        #[arg(long)]
        map: bool,
    },
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let file = File::open(path).with_context(|| format!("failed to open config {path:?}"))?;
    serde_json::from_reader(BufReader::new(file)).context("failed to parse config")
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&SimConfig::default())?);
        }
        Commands::Run {
            config,
            seed,
            steps,
            sample_every,
            out,
            best,
            map,
        } => {
            let mut sim_config = load_config(config.as_ref())?;
            if let Some(seed) = seed {
                sim_config.seed = seed;
            }
            sim_config.validate().context("config validation error")?;

            let mut world = World::new(sim_config).context("failed to initialize world")?;
            if best.exists() {
                world.load_best(&best);
            }
            info!(steps, sample_every, "simulating");

            let summary = world
                .run_experiment(steps, sample_every)
                .context("experiment failed")?;

            if let Some(out_dir) = out {
                std::fs::create_dir_all(&out_dir).context("failed to create output directory")?;
                let file = File::create(out_dir.join("summary.json"))
                    .context("failed to create summary file")?;
                serde_json::to_writer_pretty(file, &summary).context("failed to write summary")?;
                println!("Results saved to {out_dir:?}");
            }
            println!(
                "Run complete. Alive: {}, mothers: {}, births: {}, elite spawns: {}",
                summary.final_alive,
                summary.final_mothers,
                summary.total_births,
                summary.elite_spawns
            );

            match world.champion() {
                Some(champion) => {
                    world.save_best(&best).context("failed to save champion")?;
                    println!("Champion: {} points -> {best:?}", champion.points);
                }
                None => println!("No champion recorded"),
            }
            if map {
                print!("{}", render::ascii_map(&world));
            }
        }
    }
    Ok(())
}
