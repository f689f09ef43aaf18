//! IP addresses, networks and network sets.
//!
//! This module supplies the domains that the enumeration engine walks:
//! addresses of either family, CIDR networks exposing their address space as
//! an indexable domain, and sets of networks enumerated as one stream.

pub mod address;
pub mod network;
pub mod set;

// Re-export commonly used types
pub use address::{Address, AddressError, AddressFamily};
pub use network::{Cidr, CidrError, NetworkConfig};
pub use set::{CidrSet, SetConfig};
