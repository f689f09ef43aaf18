//! Sets of networks enumerated as one address stream.
//!
//! A [`CidrSet`] holds networks of either family. Its addresses come out of a
//! [`FairMux`] with one source per member network: each member walks its own
//! address space in the order its [`NetworkConfig`](super::NetworkConfig)
//! asks for, and the set's [`SetConfig`] decides how the members are combined.

use std::collections::BTreeSet;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::address::Address;
use super::network::Cidr;
use crate::sampler::{fair_mux, DomainIter, FairMux, Order};

/// How a set combines its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SetConfig {
    /// Member after member, or fair random interleaving.
    pub interleave: Order,
    /// Visit members in shuffled order instead of set order.
    pub shuffle_networks: bool,
}

/// Ordered collection of distinct networks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CidrSet {
    networks: BTreeSet<Cidr>,
    config: SetConfig,
}

impl CidrSet {
    pub fn new(config: SetConfig) -> Self {
        CidrSet { networks: BTreeSet::new(), config }
    }

    pub fn config(&self) -> SetConfig {
        self.config
    }

    pub fn set_config(&mut self, config: SetConfig) {
        self.config = config;
    }

    /// Returns `false` if the network was already present.
    pub fn insert(&mut self, network: Cidr) -> bool {
        self.networks.insert(network)
    }

    /// Returns `false` if the network was not present.
    pub fn remove(&mut self, network: &Cidr) -> bool {
        self.networks.remove(network)
    }

    /// Exact membership of `network`.
    pub fn is_member(&self, network: &Cidr) -> bool {
        self.networks.contains(network)
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Members in set order.
    pub fn iter(&self) -> impl Iterator<Item = &Cidr> + '_ {
        self.networks.iter()
    }

    /// Members of both sets, under this set's configuration.
    pub fn union(&self, other: &CidrSet) -> CidrSet {
        CidrSet {
            networks: self.networks.union(&other.networks).copied().collect(),
            config: self.config,
        }
    }

    /// Total usable addresses across members, saturating at `u128::MAX`.
    pub fn address_length(&self) -> u128 {
        self.networks.iter().fold(0u128, |total, network| total.saturating_add(network.len()))
    }

    /// Whether any member has `address` as a usable address.
    pub fn contains(&self, address: &Address) -> bool {
        self.networks.iter().any(|network| network.contains(address))
    }

    /// Whether any member covers all of `network`.
    pub fn contains_network(&self, network: &Cidr) -> bool {
        self.networks.iter().any(|member| member.contains_network(network))
    }

    /// Member list, shuffled when the configuration asks for it.
    pub fn networks_with<R: Rng>(&self, rng: &mut R) -> Vec<Cidr> {
        let mut networks: Vec<Cidr> = self.networks.iter().copied().collect();
        if self.config.shuffle_networks {
            networks.shuffle(rng);
        }
        networks
    }

    /// Every usable address of every member, using an entropy-seeded generator.
    pub fn addresses(&self) -> FairMux<DomainIter<'_, Cidr, StdRng>, StdRng> {
        self.addresses_with(StdRng::from_entropy())
    }

    /// Every usable address of every member, each exactly once.
    ///
    /// Sequential enumeration drains members in set order, or in a shuffled
    /// order when `shuffle_networks` is set.
    pub fn addresses_with<R: Rng + SeedableRng>(&self, mut rng: R) -> FairMux<DomainIter<'_, Cidr, R>, R> {
        debug!(
            "Enumerating {} addresses across {} networks",
            self.address_length(),
            self.networks.len()
        );

        let mut members: Vec<&Cidr> = self.networks.iter().collect();
        if self.config.shuffle_networks {
            members.shuffle(&mut rng);
        }

        fair_mux(
            members.into_iter().map(|network| (network, network.config().order)),
            self.config.interleave,
            rng,
        )
    }
}

impl FromIterator<Cidr> for CidrSet {
    fn from_iter<T: IntoIterator<Item = Cidr>>(networks: T) -> Self {
        CidrSet { networks: networks.into_iter().collect(), config: SetConfig::default() }
    }
}

impl Extend<Cidr> for CidrSet {
    fn extend<T: IntoIterator<Item = Cidr>>(&mut self, networks: T) {
        self.networks.extend(networks);
    }
}

impl<'a> IntoIterator for &'a CidrSet {
    type Item = &'a Cidr;
    type IntoIter = std::collections::btree_set::Iter<'a, Cidr>;

    fn into_iter(self) -> Self::IntoIter {
        self.networks.iter()
    }
}
