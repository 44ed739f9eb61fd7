// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::fail::Fail;
use ::libc::EINVAL;
use ::std::{
    fmt,
    str::FromStr,
};

//======================================================================================================================
// Constants
//======================================================================================================================

/// Size of a link address in bytes.
pub const MAC_ADDRESS_SIZE: usize = 6;

//======================================================================================================================
// Structures
//======================================================================================================================

/// MAC Address
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct MacAddress(eui48::MacAddress);

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl MacAddress {
    pub const fn new(bytes: [u8; MAC_ADDRESS_SIZE]) -> Self {
        MacAddress(eui48::MacAddress::new(bytes))
    }

    /// Reads a link address from the first six bytes of `bytes`. Returns `None` if the slice is too short.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let octets: [u8; MAC_ADDRESS_SIZE] = bytes.get(..MAC_ADDRESS_SIZE)?.try_into().ok()?;
        Some(Self::new(octets))
    }

    /// Returns the array of bytes composing the target [MacAddress].
    pub fn octets(&self) -> [u8; MAC_ADDRESS_SIZE] {
        self.0.to_array()
    }

    pub fn broadcast() -> MacAddress {
        MacAddress(eui48::MacAddress::broadcast())
    }

    pub fn nil() -> MacAddress {
        MacAddress(eui48::MacAddress::nil())
    }

    pub fn is_nil(self) -> bool {
        self.0.is_nil()
    }

    /// All six octets are 0xff.
    pub fn is_broadcast(self) -> bool {
        self.0.is_broadcast()
    }

    /// The group bit of the first octet is set and this is not the broadcast address.
    pub fn is_multicast(self) -> bool {
        !self.is_broadcast() && self.0.is_multicast()
    }

    pub fn is_unicast(self) -> bool {
        self.0.is_unicast()
    }

    pub fn to_canonical(self) -> String {
        self.0.to_canonical()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn parse_canonical_str(canonical_macaddr_string: &str) -> Result<Self, Fail> {
        match eui48::MacAddress::parse_str(canonical_macaddr_string) {
            Ok(addr) => Ok(Self(addr)),
            Err(_) => Err(Fail::new(EINVAL, "failed to parse MAC Address")),
        }
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_canonical())
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MacAddress({})", &self.to_canonical())
    }
}

impl FromStr for MacAddress {
    type Err = Fail;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MacAddress::parse_canonical_str(s)
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
