use crate::config::{NetworkEntry, WalkConfig};
use crate::sampler::Order;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{debug, info, warn};
use std::fs::File;
use std::path::Path;

/// Load and parse configuration from a YAML file
///
/// Validation is left to [`apply_overrides`], since command-line arguments
/// may still add networks.
pub fn load_config(config_path: &Path) -> Result<WalkConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration file '{}'", config_path.display()))?;

    let config: WalkConfig = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration file '{}'", config_path.display()))?;

    debug!("Configuration lists {} networks", config.networks.len());

    Ok(config)
}

/// CLI arguments that can override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub networks: Vec<String>,
    pub random: bool,
    pub interleave: Option<Order>,
    pub shuffle_networks: bool,
    pub exclusive: bool,
    pub seed: Option<u64>,
    pub limit: Option<u64>,
    pub list_networks: bool,
}

/// Apply CLI overrides to a configuration and validate the result
pub fn apply_overrides(config: &mut WalkConfig, overrides: &CliOverrides) -> Result<()> {
    if !overrides.networks.is_empty() {
        info!("Adding {} networks from the command line", overrides.networks.len());
        config
            .networks
            .extend(overrides.networks.iter().map(|network| NetworkEntry::from(network.as_str())));
    }

    if overrides.random {
        config.network.order = Order::Random;
    }

    if let Some(interleave) = overrides.interleave {
        config.set.interleave = interleave;
    }

    if overrides.shuffle_networks {
        config.set.shuffle_networks = true;
    }

    if overrides.exclusive {
        config.network.inclusive = false;
    }

    if overrides.seed.is_some() {
        config.seed = overrides.seed;
    }

    if overrides.limit.is_some() {
        config.limit = overrides.limit;
    }

    if overrides.list_networks {
        config.list_networks = true;
    }

    // Re-validate after applying overrides
    config.validate()?;

    if config.seed.is_some() && !config.uses_randomness() {
        warn!("A seed is configured but every network is walked in natural order; the seed has no effect");
    }

    Ok(())
}
