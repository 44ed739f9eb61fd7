// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::network::types::MacAddress;
use ::std::net::{
    Ipv4Addr,
    Ipv6Addr,
};

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Maps an IPv6 multicast address to its Ethernet group address (RFC 2464): `33:33` followed by the last four
/// octets of the IPv6 address.
pub fn ipv6_mcast_to_mac_addr(addr: &Ipv6Addr) -> MacAddress {
    let o: [u8; 16] = addr.octets();
    MacAddress::new([0x33, 0x33, o[12], o[13], o[14], o[15]])
}

/// Maps an IPv4 multicast address to its Ethernet group address (RFC 1112 section 6.4): `01:00:5e` followed by the
/// low-order 23 bits of the IPv4 address.
pub fn ipv4_mcast_to_mac_addr(addr: &Ipv4Addr) -> MacAddress {
    let o: [u8; 4] = addr.octets();
    MacAddress::new([0x01, 0x00, 0x5e, o[1] & 0x7f, o[2], o[3]])
}

/// Link address every station on the segment accepts.
pub fn broadcast_addr() -> MacAddress {
    MacAddress::broadcast()
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
