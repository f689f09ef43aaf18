use serde::{Deserialize, Serialize};

use crate::ip::{Cidr, CidrSet, NetworkConfig, SetConfig};
use crate::sampler::Order;

/// Top-level configuration structure that mirrors the YAML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Networks to enumerate, as `address/prefix` strings or detailed entries
    pub networks: Vec<NetworkEntry>,
    /// Defaults applied to every network
    pub network: NetworkConfig,
    /// How the networks are combined
    pub set: SetConfig,
    /// (Optional) Seed for reproducible random orderings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// (Optional) Stop after this many addresses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// List the networks themselves instead of their addresses
    pub list_networks: bool,
}

/// One network entry, either bare or with per-network overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NetworkEntry {
    Plain(String),
    Detailed {
        cidr: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        inclusive: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        order: Option<Order>,
    },
}

impl NetworkEntry {
    pub fn cidr(&self) -> &str {
        match self {
            NetworkEntry::Plain(cidr) => cidr,
            NetworkEntry::Detailed { cidr, .. } => cidr,
        }
    }

    /// Parse the entry, filling unset fields from `defaults`
    pub fn resolve(&self, defaults: NetworkConfig) -> Result<Cidr, ValidationError> {
        let network: Cidr = self
            .cidr()
            .parse()
            .map_err(|e| ValidationError::InvalidNetwork(format!("{}: {}", self.cidr(), e)))?;

        let config = match self {
            NetworkEntry::Plain(_) => defaults,
            NetworkEntry::Detailed { inclusive, order, .. } => NetworkConfig {
                inclusive: inclusive.unwrap_or(defaults.inclusive),
                order: order.unwrap_or(defaults.order),
            },
        };

        Ok(network.with_config(config))
    }
}

impl From<&str> for NetworkEntry {
    fn from(cidr: &str) -> Self {
        NetworkEntry::Plain(cidr.to_string())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("No networks configured")]
    NoNetworks,
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
}

impl WalkConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.networks.is_empty() {
            return Err(ValidationError::NoNetworks);
        }

        for entry in &self.networks {
            entry.resolve(self.network)?;
        }

        if self.limit == Some(0) {
            return Err(ValidationError::InvalidLimit("limit must be greater than zero".to_string()));
        }

        Ok(())
    }

    /// Whether any part of the walk draws from the random generator
    pub fn uses_randomness(&self) -> bool {
        let per_network_random = self.networks.iter().any(|entry| {
            matches!(entry, NetworkEntry::Detailed { order: Some(Order::Random), .. })
        });

        self.network.order.is_random()
            || per_network_random
            || self.set.interleave.is_random()
            || self.set.shuffle_networks
    }

    /// Build the network set described by this configuration
    pub fn build_set(&self) -> Result<CidrSet, ValidationError> {
        let mut set = CidrSet::new(self.set);
        for entry in &self.networks {
            set.insert(entry.resolve(self.network)?);
        }
        Ok(set)
    }
}
