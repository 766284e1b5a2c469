// Copyright 2026 Anapaya Systems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! SCION address types

use std::{
    fmt::{self, Debug, Display},
    num::ParseIntError,
    str::FromStr,
};

/// Errors returned when parsing ISD, AS or ISD-AS identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    /// The ISD part is not a valid 16-bit decimal number.
    #[error("invalid ISD {0:?}: {1}")]
    InvalidIsd(String, ParseIntError),
    /// The AS part is malformed.
    #[error("invalid AS number {0:?}")]
    InvalidAsn(String),
    /// The ISD-AS identifier is not of the form `<isd>-<as>`.
    #[error("invalid ISD-AS {0:?}, expected <isd>-<as>")]
    InvalidIsdAsn(String),
}

/// ISD (Isolation Domain) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Isd(pub u16);
impl Isd {
    /// The wildcard ISD.
    pub const WILDCARD: Isd = Isd(0);

    /// Creates a new ISD from the given u16 value.
    pub fn new(value: u16) -> Self {
        Isd(value)
    }

    /// Returns the u16 value of the ISD.
    pub fn value(&self) -> u16 {
        self.0
    }
}
impl Display for Isd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl FromStr for Isd {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u16::from_str(s)
            .map(Isd)
            .map_err(|e| AddressParseError::InvalidIsd(s.to_string(), e))
    }
}

/// ASN (Autonomous System Number) identifier.
/// Maximum size is 48 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Asn(pub u64);
impl Asn {
    /// The wildcard AS number.
    pub const WILDCARD: Asn = Asn(0);
    /// Largest AS number that is formatted in decimal (BGP compatible range).
    const MAX_BGP_ASN: u64 = u32::MAX as u64;
    const BITS: u32 = 48;
    const MASK: u64 = (1 << Self::BITS) - 1;

    /// Creates a new ASN from the given u64 value.
    ///
    /// Will truncate to 48 bits.
    pub fn new(value: u64) -> Self {
        Asn(value & Self::MASK)
    }

    /// Returns the value of the ASN as u64.
    pub fn value(&self) -> u64 {
        self.0
    }
}
impl Display for Asn {
    /// BGP compatible AS numbers are written in decimal, all others as three colon separated
    /// groups of 16-bit hex values, e.g. `ff00:0:110`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 <= Self::MAX_BGP_ASN {
            return write!(f, "{}", self.0);
        }
        write!(
            f,
            "{:x}:{:x}:{:x}",
            (self.0 >> 32) & 0xffff,
            (self.0 >> 16) & 0xffff,
            self.0 & 0xffff
        )
    }
}
impl FromStr for Asn {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AddressParseError::InvalidAsn(s.to_string());

        if !s.contains(':') {
            let value = u64::from_str(s).map_err(|_| invalid())?;
            if value > Self::MAX_BGP_ASN {
                return Err(invalid());
            }
            return Ok(Asn(value));
        }

        let groups: Vec<&str> = s.split(':').collect();
        if groups.len() != 3 {
            return Err(invalid());
        }
        let mut value = 0u64;
        for group in groups {
            if group.is_empty() || group.len() > 4 {
                return Err(invalid());
            }
            let group = u16::from_str_radix(group, 16).map_err(|_| invalid())?;
            value = (value << 16) | u64::from(group);
        }
        Ok(Asn(value))
    }
}

/// ISD-AS identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IsdAsn(pub u64);
impl IsdAsn {
    /// The wildcard ISD-AS, also used as the zero value for unset neighbors.
    pub const WILDCARD: IsdAsn = IsdAsn(0);

    /// Creates a new ISD-AS identifier from the given ISD and ASN.
    pub fn new(isd: Isd, asn: Asn) -> Self {
        IsdAsn(((isd.0 as u64) << 48) | (asn.0 & Asn::MASK))
    }

    /// Creates a new ISD-AS identifier from the given ISD and ASN parts.
    ///
    /// Will truncate ASN to 48 bits.
    pub fn new_from_raw(isd: u16, asn: u64) -> Self {
        IsdAsn::new(Isd::new(isd), Asn::new(asn))
    }

    /// Returns the value of the ISD-AS identifier as u64.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns the ISD part of the ISD-AS identifier.
    pub fn isd(&self) -> Isd {
        Isd((self.0 >> 48) as u16)
    }

    /// Returns the ASN part of the ISD-AS identifier.
    pub fn asn(&self) -> Asn {
        Asn(self.0 & Asn::MASK)
    }

    /// Returns true if this is the zero value.
    pub fn is_wildcard(&self) -> bool {
        self.0 == 0
    }

    /// Returns the big endian wire representation.
    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}
impl Debug for IsdAsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.isd(), self.asn())
    }
}
impl Display for IsdAsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.isd(), self.asn())
    }
}
impl FromStr for IsdAsn {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((isd, asn)) = s.split_once('-') else {
            return Err(AddressParseError::InvalidIsdAsn(s.to_string()));
        };
        Ok(IsdAsn::new(Isd::from_str(isd)?, Asn::from_str(asn)?))
    }
}
impl From<u64> for IsdAsn {
    fn from(value: u64) -> Self {
        IsdAsn(value)
    }
}
