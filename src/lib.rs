//! # Netwalk - Lazy enumeration of IP network address spaces
//!
//! This library walks the addresses of IPv4 and IPv6 networks, either in
//! natural order or in a random order without replacement, without
//! ever materializing the address space.
//!
//! ## Overview
//!
//! Networks routinely hold more than 2^32 (or, for IPv6, up to 2^127)
//! addresses, so no approach here allocates or shuffles an index array.
//! Random order comes from a sampler whose state grows with the number of
//! values drawn, not with the size of the range; several networks are
//! combined by a multiplexer that is fair at every step.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `sampler`: the enumeration engine (range sampler, domains, fair multiplexer)
//! - `ip`: addresses, CIDR networks and network sets
//! - `config`: Type-safe configuration structures and YAML parsing
//! - `config_loader`: Configuration file loading and CLI overrides
//! - `walk`: High-level orchestration of one enumeration run
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use netwalk::ip::{Cidr, CidrSet, NetworkConfig, SetConfig};
//! use netwalk::sampler::Order;
//!
//! let random = NetworkConfig { inclusive: false, order: Order::Random };
//! let mut set = CidrSet::new(SetConfig { interleave: Order::Random, shuffle_networks: false });
//! set.insert("10.0.0.0/8".parse::<Cidr>()?.with_config(random));
//! set.insert("2001:db8::/64".parse::<Cidr>()?.with_config(random));
//!
//! for address in set.addresses().take(10) {
//!     println!("{}", address);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Library types report construction failures through `thiserror` enums
//! (`SampleError`, `AddressError`, `CidrError`, `ValidationError`). Once an
//! iterator exists it cannot fail. Configuration loading and the binary use
//! `color_eyre` for error reporting with context.

pub mod config;
pub mod config_loader;
pub mod ip;
pub mod sampler;
pub mod walk;
