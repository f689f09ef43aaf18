//! CIDR networks as enumerable domains.
//!
//! A [`Cidr`] is a routing address plus a prefix length. Its address space is
//! a [`Domain`]: index `i` maps to the `i`-th usable address, so a network of
//! any size can be walked in order or in random order without listing it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::address::{Address, AddressError, AddressFamily};
use crate::sampler::{Domain, DomainIter, Order};

/// Errors from building or indexing networks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CidrError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("too many prefixes in '{0}'")]
    TooManyPrefixes(String),

    #[error("invalid prefix '{prefix}' in '{cidr}'")]
    InvalidPrefix { cidr: String, prefix: String },

    #[error("{0} spans 2^128 addresses, beyond the indexable range")]
    RangeOverflow(String),

    #[error("index {index} is outside a network of {len} addresses")]
    IndexOutOfRange { index: u128, len: u128 },
}

/// Per-network enumeration settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Whether the routing and broadcast addresses are part of the network.
    pub inclusive: bool,
    /// Order in which the network's own addresses are visited.
    pub order: Order,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig { inclusive: true, order: Order::Natural }
    }
}

/// An IPv4 or IPv6 network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cidr {
    routing: Address,
    prefix: u8,
    config: NetworkConfig,
}

impl Cidr {
    /// Network of `address` with `prefix` bits; host bits of `address` are cleared.
    pub fn new(address: Address, prefix: u8, config: NetworkConfig) -> Result<Self, CidrError> {
        let mask = address.family().mask(prefix)?;

        if address.family() == AddressFamily::V6 && prefix == 0 {
            return Err(CidrError::RangeOverflow(format!("{}/{}", address, prefix)));
        }

        Ok(Cidr { routing: address & mask, prefix, config })
    }

    /// Same network with different enumeration settings.
    pub fn with_config(self, config: NetworkConfig) -> Self {
        Cidr { config, ..self }
    }

    pub fn config(&self) -> NetworkConfig {
        self.config
    }

    pub fn family(&self) -> AddressFamily {
        self.routing.family()
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn netmask(&self) -> Address {
        let family = self.family();
        Address::from_raw(family, family.max_value() ^ (self.network_range() - 1))
    }

    pub fn routing_address(&self) -> Address {
        self.routing
    }

    pub fn broadcast_address(&self) -> Address {
        self.routing | (self.network_range() - 1)
    }

    /// Number of addresses covered, endpoints included: `2^(bits - prefix)`.
    pub fn network_range(&self) -> u128 {
        1u128 << (self.family().bits() - self.prefix)
    }

    /// Number of usable addresses under the configured endpoint policy.
    pub fn len(&self) -> u128 {
        if self.config.inclusive {
            self.network_range()
        } else {
            self.network_range().saturating_sub(2)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn first_offset(&self) -> u128 {
        u128::from(!self.config.inclusive)
    }

    /// The `index`-th usable address.
    pub fn get(&self, index: u128) -> Result<Address, CidrError> {
        let len = self.len();
        if index >= len {
            return Err(CidrError::IndexOutOfRange { index, len });
        }
        Ok(self.at(index))
    }

    /// Whether `address` is one of this network's usable addresses.
    pub fn contains(&self, address: &Address) -> bool {
        if address.family() != self.family() || self.is_empty() {
            return false;
        }

        let first = self.routing.value() + self.first_offset();
        let last = first + (self.len() - 1);
        (first..=last).contains(&address.value())
    }

    /// Whether `other` lies entirely inside this network.
    pub fn contains_network(&self, other: &Cidr) -> bool {
        other.family() == self.family()
            && other.prefix >= self.prefix
            && other.routing & self.netmask().value() == self.routing
    }

    pub fn overlaps(&self, other: &Cidr) -> bool {
        self.contains_network(other) || other.contains_network(self)
    }

    /// Usable addresses in the configured order, using an entropy-seeded generator.
    pub fn addresses(&self) -> DomainIter<'_, Cidr, StdRng> {
        self.addresses_with(StdRng::from_entropy())
    }

    /// Usable addresses in the configured order, drawing randomness from `rng`.
    pub fn addresses_with<R: Rng>(&self, rng: R) -> DomainIter<'_, Cidr, R> {
        DomainIter::new(self, self.config.order, rng)
    }
}

impl Domain for Cidr {
    type Element = Address;

    fn count(&self) -> u128 {
        self.len()
    }

    fn at(&self, index: u128) -> Address {
        self.routing.offset(self.first_offset() + index)
    }
}

impl Ord for Cidr {
    /// Narrower families first, then shorter prefixes, then by address.
    fn cmp(&self, other: &Self) -> Ordering {
        (self.family(), self.prefix, self.routing, self.config).cmp(&(
            other.family(),
            other.prefix,
            other.routing,
            other.config,
        ))
    }
}

impl PartialOrd for Cidr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Cidr {
    type Err = CidrError;

    /// Parses `address[/prefix]`; without a prefix the network is a single host.
    fn from_str(text: &str) -> Result<Self, CidrError> {
        let mut parts = text.split('/');
        let address: Address = parts.next().unwrap_or_default().parse()?;

        let prefix = match parts.next() {
            Some(prefix) => prefix.parse::<u8>().map_err(|_| CidrError::InvalidPrefix {
                cidr: text.to_string(),
                prefix: prefix.to_string(),
            })?,
            None => address.bits(),
        };

        if parts.next().is_some() {
            return Err(CidrError::TooManyPrefixes(text.to_string()));
        }

        Cidr::new(address, prefix, NetworkConfig::default())
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.routing, self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cidr(text: &str) -> Cidr {
        text.parse().unwrap()
    }

    fn exclusive(text: &str) -> Cidr {
        cidr(text).with_config(NetworkConfig { inclusive: false, order: Order::Natural })
    }

    #[test]
    fn test_network_arithmetic() {
        let network = cidr("192.168.1.77/24");
        assert_eq!(network.to_string(), "192.168.1.0/24");
        assert_eq!(network.routing_address().to_string(), "192.168.1.0");
        assert_eq!(network.broadcast_address().to_string(), "192.168.1.255");
        assert_eq!(network.netmask().to_string(), "255.255.255.0");
        assert_eq!(network.network_range(), 256);
        assert_eq!(network.len(), 256);
    }

    #[test]
    fn test_v6_arithmetic() {
        let network = cidr("2001:db8::1234/64");
        assert_eq!(network.to_string(), "2001:db8::/64");
        assert_eq!(network.broadcast_address().to_string(), "2001:db8::ffff:ffff:ffff:ffff");
        assert_eq!(network.netmask().to_string(), "ffff:ffff:ffff:ffff::");
        assert_eq!(network.network_range(), 1 << 64);

        assert_eq!(cidr("::/1").network_range(), 1 << 127);
    }

    #[test]
    fn test_endpoint_exclusion() {
        let network = exclusive("10.0.0.0/24");
        assert_eq!(network.len(), 254);
        assert_eq!(network.get(0).unwrap().to_string(), "10.0.0.1");
        assert_eq!(network.get(253).unwrap().to_string(), "10.0.0.254");
        assert_eq!(
            network.get(254).unwrap_err(),
            CidrError::IndexOutOfRange { index: 254, len: 254 }
        );

        assert!(!network.contains(&"10.0.0.0".parse().unwrap()));
        assert!(!network.contains(&"10.0.0.255".parse().unwrap()));
        assert!(network.contains(&"10.0.0.1".parse().unwrap()));
        assert!(cidr("10.0.0.0/24").contains(&"10.0.0.255".parse().unwrap()));

        assert!(exclusive("10.0.0.0/31").is_empty());
        assert!(exclusive("10.0.0.7/32").is_empty());
    }

    #[test]
    fn test_parse_forms() {
        let host = cidr("10.1.2.3");
        assert_eq!(host.prefix(), 32);
        assert_eq!(host.len(), 1);
        assert_eq!(cidr("::1").prefix(), 128);

        assert!(matches!("1.2.3.4/5/6".parse::<Cidr>(), Err(CidrError::TooManyPrefixes(_))));
        assert!(matches!("1.2.3.4/x".parse::<Cidr>(), Err(CidrError::InvalidPrefix { .. })));
        assert_eq!(
            "10.0.0.0/33".parse::<Cidr>().unwrap_err(),
            CidrError::Address(AddressError::PrefixTooLong { prefix: 33, bits: 32 })
        );
        assert!(matches!("::/0".parse::<Cidr>(), Err(CidrError::RangeOverflow(_))));
        assert_eq!(cidr("0.0.0.0/0").len(), 1 << 32);
    }

    #[test]
    fn test_containment() {
        let wide = cidr("10.0.0.0/8");
        let narrow = cidr("10.20.0.0/16");
        assert!(wide.contains_network(&narrow));
        assert!(!narrow.contains_network(&wide));
        assert!(wide.contains_network(&wide));
        assert!(!wide.contains_network(&cidr("11.0.0.0/16")));
        assert!(!wide.contains_network(&cidr("::/96")));
        assert!(wide.overlaps(&narrow) && narrow.overlaps(&wide));
        assert!(!narrow.overlaps(&cidr("10.21.0.0/16")));

        assert!(wide.contains(&"10.255.255.255".parse().unwrap()));
        assert!(!wide.contains(&"::a00:1".parse().unwrap()));
    }

    #[test]
    fn test_natural_enumeration() {
        let addresses: Vec<String> = exclusive("192.168.0.0/29").addresses().map(|a| a.to_string()).collect();
        assert_eq!(
            addresses,
            vec![
                "192.168.0.1", "192.168.0.2", "192.168.0.3",
                "192.168.0.4", "192.168.0.5", "192.168.0.6",
            ]
        );
    }

    #[test]
    fn test_random_enumeration() {
        let network = cidr("172.16.4.0/22").with_config(NetworkConfig { inclusive: true, order: Order::Random });
        let walked: Vec<Address> = network.addresses_with(StdRng::seed_from_u64(8)).collect();
        assert_eq!(walked.len(), 1024);

        let mut sorted = walked.clone();
        sorted.sort();
        assert_ne!(walked, sorted);
        let natural: Vec<Address> = cidr("172.16.4.0/22").addresses().collect();
        assert_eq!(sorted, natural);
    }

    #[test]
    fn test_huge_network_is_lazy() {
        let network = cidr("2001:db8::/32").with_config(NetworkConfig { inclusive: true, order: Order::Random });
        let sample: Vec<Address> = network.addresses_with(StdRng::seed_from_u64(1)).take(100).collect();
        assert_eq!(sample.len(), 100);
        assert!(sample.iter().all(|address| network.contains(address)));
    }

    #[test]
    fn test_ordering() {
        let mut networks = vec![cidr("::/64"), cidr("10.0.0.0/24"), cidr("10.0.0.0/16"), cidr("9.0.0.0/24")];
        networks.sort();
        let names: Vec<String> = networks.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["10.0.0.0/16", "9.0.0.0/24", "10.0.0.0/24", "::/64"]);
    }
}
