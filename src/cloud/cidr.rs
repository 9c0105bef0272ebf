//! IPv4 CIDR blocks

use crate::error::SynthError;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// An IPv4 network in `a.b.c.d/n` form, normalized to its network address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Cidr {
    network: u32,
    prefix: u8,
}

impl Ipv4Cidr {
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, SynthError> {
        if prefix > 32 {
            return Err(SynthError::InvalidCidr(format!("{addr}/{prefix}")));
        }
        Ok(Self {
            network: u32::from(addr) & mask(prefix),
            prefix,
        })
    }

    /// First `count` consecutive blocks of length `prefix` inside this one
    pub fn subdivide(&self, prefix: u8, count: usize) -> Result<Vec<Ipv4Cidr>, SynthError> {
        let exhausted = || SynthError::CidrExhausted {
            cidr: self.to_string(),
            prefix,
            count,
        };

        if prefix < self.prefix || prefix > 32 {
            return Err(exhausted());
        }
        let available = 1u64 << (prefix - self.prefix);
        if count as u64 > available {
            return Err(exhausted());
        }

        let step = 1u64 << (32 - prefix);
        Ok((0..count as u64)
            .map(|i| Ipv4Cidr {
                network: (u64::from(self.network) + i * step) as u32,
                prefix,
            })
            .collect())
    }
}

fn mask(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SynthError::InvalidCidr(s.to_string());
        let (addr, prefix) = s.split_once('/').ok_or_else(invalid)?;
        let addr: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
        Self::new(addr, prefix).map_err(|_| invalid())
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", Ipv4Addr::from(self.network), self.prefix)
    }
}
