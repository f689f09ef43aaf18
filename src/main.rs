use clap::{Parser, ValueEnum};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use netwalk::config::WalkConfig;
use netwalk::config_loader::{self, CliOverrides};
use netwalk::sampler::Order;
use netwalk::walk::run_walk;

/// How the networks are combined into one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Interleave {
    /// Each network in turn
    Natural,
    /// Fair random interleaving across networks
    Random,
}

impl From<Interleave> for Order {
    fn from(interleave: Interleave) -> Self {
        match interleave {
            Interleave::Natural => Order::Natural,
            Interleave::Random => Order::Random,
        }
    }
}

/// Enumerate the addresses of IPv4/IPv6 networks in order or in random order
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Networks to enumerate (e.g. 10.0.0.0/24, 2001:db8::/120)
    networks: Vec<String>,

    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Visit each network's addresses in random order
    #[arg(short, long)]
    random: bool,

    /// How addresses from different networks are combined
    #[arg(short, long, value_enum)]
    interleave: Option<Interleave>,

    /// Visit the networks in shuffled order
    #[arg(long)]
    shuffle_networks: bool,

    /// Skip the routing and broadcast address of each network
    #[arg(short, long)]
    exclusive: bool,

    /// Seed for reproducible random orderings
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop after this many lines
    #[arg(short = 'n', long)]
    limit: Option<u64>,

    /// Print the networks instead of their addresses
    #[arg(long)]
    list_networks: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            networks: self.networks.clone(),
            random: self.random,
            interleave: self.interleave.map(Order::from),
            shuffle_networks: self.shuffle_networks,
            exclusive: self.exclusive,
            seed: self.seed,
            limit: self.limit,
            list_networks: self.list_networks,
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Logs go to stderr so they never mix with the enumeration on stdout
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut config = match &args.config {
        Some(path) => config_loader::load_config(path)?,
        None => WalkConfig::default(),
    };
    config_loader::apply_overrides(&mut config, &args.overrides())?;

    info!("Enumerating {} networks", config.networks.len());

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    run_walk(&config, &mut out).wrap_err("Enumeration failed")?;

    Ok(())
}
