//! IP addresses as fixed-width integers.
//!
//! An [`Address`] is a `u128` value tagged with its [`AddressFamily`]. The
//! family carries the bit width and the text codec, so IPv4 and IPv6 share
//! one type and one set of arithmetic.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ops::{BitAnd, BitOr};
use std::str::FromStr;

/// Errors from parsing or building addresses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("'{0}' contains more than 4 octets")]
    TooManyOctets(String),

    #[error("invalid octet '{octet}' in '{address}'")]
    InvalidOctet { address: String, octet: String },

    #[error("invalid IPv6 address '{0}'")]
    InvalidV6(String),

    #[error("could not parse '{0}' as an IPv4 or IPv6 address")]
    Unrecognized(String),

    #[error("prefix /{prefix} exceeds the {bits}-bit address width")]
    PrefixTooLong { prefix: u8, bits: u8 },

    #[error("value {value:#x} does not fit in a {bits}-bit address")]
    ValueOutOfRange { value: u128, bits: u8 },

    #[error("cannot combine an {left} address with an {right} address")]
    FamilyMismatch { left: AddressFamily, right: AddressFamily },
}

/// The supported address families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    pub const fn bits(self) -> u8 {
        match self {
            AddressFamily::V4 => 32,
            AddressFamily::V6 => 128,
        }
    }

    /// Largest value an address of this family can hold.
    pub const fn max_value(self) -> u128 {
        match self {
            AddressFamily::V4 => u32::MAX as u128,
            AddressFamily::V6 => u128::MAX,
        }
    }

    /// Network mask with the top `prefix` bits set.
    pub fn mask(self, prefix: u8) -> Result<u128, AddressError> {
        if prefix > self.bits() {
            return Err(AddressError::PrefixTooLong { prefix, bits: self.bits() });
        }

        let max = self.max_value();
        Ok(max ^ max.checked_shr(u32::from(prefix)).unwrap_or(0))
    }

    /// Parse the text form of an address of this family.
    ///
    /// IPv4 accepts one to four dotted decimal octets; missing trailing
    /// octets are zero, so `"10.1"` is `10.1.0.0`.
    pub fn parse(self, text: &str) -> Result<u128, AddressError> {
        match self {
            AddressFamily::V4 => parse_v4(text),
            AddressFamily::V6 => text
                .parse::<Ipv6Addr>()
                .map(u128::from)
                .map_err(|_| AddressError::InvalidV6(text.to_string())),
        }
    }

    /// Text form of `value`: dotted quad, or compressed IPv6 notation.
    pub fn format(self, value: u128) -> String {
        match self {
            AddressFamily::V4 => Ipv4Addr::from(value as u32).to_string(),
            AddressFamily::V6 => Ipv6Addr::from(value).to_string(),
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::V4 => write!(f, "IPv4"),
            AddressFamily::V6 => write!(f, "IPv6"),
        }
    }
}

fn parse_v4(text: &str) -> Result<u128, AddressError> {
    let octets: Vec<&str> = text.split('.').collect();
    if octets.len() > 4 {
        return Err(AddressError::TooManyOctets(text.to_string()));
    }

    let mut value: u128 = 0;
    for position in 0..4 {
        let octet = match octets.get(position) {
            Some(octet) if !octet.is_empty() && octet.bytes().all(|b| b.is_ascii_digit()) => {
                octet.parse::<u8>().map_err(|_| AddressError::InvalidOctet {
                    address: text.to_string(),
                    octet: octet.to_string(),
                })?
            }
            Some(octet) => {
                return Err(AddressError::InvalidOctet {
                    address: text.to_string(),
                    octet: octet.to_string(),
                })
            }
            None => 0,
        };
        value = (value << 8) | u128::from(octet);
    }

    Ok(value)
}

/// An IPv4 or IPv6 address.
///
/// Ordered by family first (IPv4 before IPv6), then by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    family: AddressFamily,
    value: u128,
}

impl Address {
    pub fn new(family: AddressFamily, value: u128) -> Result<Self, AddressError> {
        if value > family.max_value() {
            return Err(AddressError::ValueOutOfRange { value, bits: family.bits() });
        }
        Ok(Address { family, value })
    }

    /// Value truncated to the family width.
    pub(crate) fn from_raw(family: AddressFamily, value: u128) -> Self {
        Address { family, value: value & family.max_value() }
    }

    /// Parse `text` as an address of `family` only.
    pub fn parse_as(family: AddressFamily, text: &str) -> Result<Self, AddressError> {
        Ok(Address { family, value: family.parse(text)? })
    }

    /// Netmask address for `prefix`.
    pub fn netmask(family: AddressFamily, prefix: u8) -> Result<Self, AddressError> {
        Ok(Address { family, value: family.mask(prefix)? })
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    pub fn value(&self) -> u128 {
        self.value
    }

    pub fn bits(&self) -> u8 {
        self.family.bits()
    }

    /// `None` when the result passes the top of the address space.
    pub fn checked_add(self, offset: u128) -> Option<Self> {
        let value = self.value.checked_add(offset)?;
        (value <= self.family.max_value()).then_some(Address { family: self.family, value })
    }

    /// `None` when the result passes below zero.
    pub fn checked_sub(self, offset: u128) -> Option<Self> {
        let value = self.value.checked_sub(offset)?;
        Some(Address { family: self.family, value })
    }

    /// Address `offset` steps above this one, wrapping at the family width.
    pub(crate) fn offset(self, offset: u128) -> Self {
        Address::from_raw(self.family, self.value.wrapping_add(offset))
    }

    pub fn to_ip_addr(&self) -> IpAddr {
        match self.family {
            AddressFamily::V4 => IpAddr::V4(Ipv4Addr::from(self.value as u32)),
            AddressFamily::V6 => IpAddr::V6(Ipv6Addr::from(self.value)),
        }
    }
}

impl BitAnd<u128> for Address {
    type Output = Address;

    fn bitand(self, mask: u128) -> Address {
        Address { family: self.family, value: self.value & mask }
    }
}

impl BitOr<u128> for Address {
    type Output = Address;

    fn bitor(self, bits: u128) -> Address {
        Address {
            family: self.family,
            value: (self.value | bits) & self.family.max_value(),
        }
    }
}

impl Address {
    fn same_family(self, other: Address) -> Result<AddressFamily, AddressError> {
        if self.family == other.family {
            Ok(self.family)
        } else {
            Err(AddressError::FamilyMismatch { left: self.family, right: other.family })
        }
    }
}

/// Bitwise AND of two addresses; fails when the families differ.
impl BitAnd for Address {
    type Output = Result<Address, AddressError>;

    fn bitand(self, other: Address) -> Self::Output {
        let family = self.same_family(other)?;
        Ok(Address { family, value: self.value & other.value })
    }
}

/// Bitwise OR of two addresses; fails when the families differ.
impl BitOr for Address {
    type Output = Result<Address, AddressError>;

    fn bitor(self, other: Address) -> Self::Output {
        let family = self.same_family(other)?;
        Ok(Address { family, value: self.value | other.value })
    }
}

impl From<Ipv4Addr> for Address {
    fn from(address: Ipv4Addr) -> Self {
        Address { family: AddressFamily::V4, value: u128::from(u32::from(address)) }
    }
}

impl From<Ipv6Addr> for Address {
    fn from(address: Ipv6Addr) -> Self {
        Address { family: AddressFamily::V6, value: u128::from(address) }
    }
}

impl From<IpAddr> for Address {
    fn from(address: IpAddr) -> Self {
        match address {
            IpAddr::V4(v4) => v4.into(),
            IpAddr::V6(v6) => v6.into(),
        }
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Family-blind parse: IPv4 first, then IPv6.
    fn from_str(text: &str) -> Result<Self, AddressError> {
        Address::parse_as(AddressFamily::V4, text)
            .or_else(|_| Address::parse_as(AddressFamily::V6, text))
            .map_err(|_| AddressError::Unrecognized(text.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.family.format(self.value))
    }
}
