//! digmap: build a map from a JSON configuration and dump it
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); the map goes to stdout.

mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use dm_core::{GenRng, MapBuilder, MapConfig};

/// Build a zoned cave map and print it
#[derive(Parser, Debug)]
#[command(name = "digmap")]
#[command(author, version, about = "Generate zoned cave maps", long_about = None)]
struct Args {
    /// JSON map configuration; the built-in four-zone level when omitted
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Master seed (overrides the configuration)
    #[arg(short = 's', long = "seed", conflicts_with = "random_seed")]
    seed: Option<u64>,

    /// Pick a fresh master seed
    #[arg(short = 'r', long = "random-seed")]
    random_seed: bool,

    /// Grid width (overrides the configuration)
    #[arg(short = 'W', long = "width")]
    width: Option<i32>,

    /// Grid height (overrides the configuration)
    #[arg(short = 'H', long = "height")]
    height: Option<i32>,

    /// Print a JSON summary
    #[arg(long = "json")]
    json: bool,

    /// Do not print the ASCII map
    #[arg(long = "no-ascii")]
    no_ascii: bool,
}

impl Args {
    fn map_config(&self) -> Result<MapConfig> {
        let mut config = match &self.config {
            Some(path) => MapConfig::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => MapConfig::default(),
        };
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        } else if self.random_seed {
            config.seed = GenRng::from_entropy().seed();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.map_config()?;
    let seed = config.seed;
    info!(seed, "digmap starting");

    let built = MapBuilder::new(config)
        .with_listener(|ready| info!(width = ready.width, height = ready.height, "map ready"))
        .build();

    if !args.no_ascii {
        print!("{}", render::ascii(&built));
    }
    if args.json {
        let summary = render::Summary::new(&built, seed);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
