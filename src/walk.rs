//! Walk orchestrator.
//!
//! This module drives one enumeration run from a validated configuration:
//! it builds the network set, seeds the generator and streams the resulting
//! networks or addresses to a writer, one per line.

use std::io::Write;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::WalkConfig;

/// Generator for a run: seeded when the configuration fixes a seed.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Write the configured enumeration to `out`, returning the number of lines written.
pub fn run_walk<W: Write>(config: &WalkConfig, out: &mut W) -> Result<u64> {
    let set = config.build_set()?;
    let mut rng = make_rng(config.seed);
    let limit = config
        .limit
        .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

    let mut written = 0u64;

    if config.list_networks {
        info!("Listing {} networks", set.len());
        for network in set.networks_with(&mut rng).into_iter().take(limit) {
            writeln!(out, "{}", network).wrap_err("Failed to write network")?;
            written += 1;
        }
    } else {
        info!(
            "Enumerating up to {} addresses from {} networks ({:?} interleave)",
            set.address_length(),
            set.len(),
            set.config().interleave
        );
        for address in set.addresses_with(rng).take(limit) {
            writeln!(out, "{}", address).wrap_err("Failed to write address")?;
            written += 1;
        }
    }

    out.flush().wrap_err("Failed to flush output")?;
    info!("Wrote {} lines", written);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkEntry;
    use crate::sampler::Order;

    fn config_for(networks: &[&str]) -> WalkConfig {
        WalkConfig {
            networks: networks.iter().map(|network| NetworkEntry::from(*network)).collect(),
            ..WalkConfig::default()
        }
    }

    #[test]
    fn test_sequential_walk() {
        let config = config_for(&["10.0.0.0/31", "10.0.1.0/32"]);
        let mut out = Vec::new();

        assert_eq!(run_walk(&config, &mut out).unwrap(), 3);
        assert_eq!(String::from_utf8(out).unwrap(), "10.0.0.0\n10.0.0.1\n10.0.1.0\n");
    }

    #[test]
    fn test_seeded_walk_is_reproducible() {
        let mut config = config_for(&["10.0.0.0/24", "fd00::/120"]);
        config.network.order = Order::Random;
        config.set.interleave = Order::Random;
        config.seed = Some(1234);

        let mut first = Vec::new();
        let mut second = Vec::new();
        run_walk(&config, &mut first).unwrap();
        run_walk(&config, &mut second).unwrap();

        assert_eq!(first, second);
        assert_eq!(String::from_utf8(first).unwrap().lines().count(), 512);
    }

    #[test]
    fn test_limit() {
        let mut config = config_for(&["10.0.0.0/8"]);
        config.network.order = Order::Random;
        config.limit = Some(5);

        let mut out = Vec::new();
        assert_eq!(run_walk(&config, &mut out).unwrap(), 5);
    }

    #[test]
    fn test_list_networks() {
        let mut config = config_for(&["10.0.1.0/24", "10.0.0.0/24"]);
        config.list_networks = true;

        let mut out = Vec::new();
        run_walk(&config, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "10.0.0.0/24\n10.0.1.0/24\n");
    }

    #[test]
    fn test_invalid_network() {
        let config = config_for(&["10.0.0.0/99"]);
        assert!(run_walk(&config, &mut Vec::new()).is_err());
    }
}
