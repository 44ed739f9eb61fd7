// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

// The link layer never interprets network-layer payloads beyond a handful of fields: the declared datagram length
// (to undo Ethernet padding) and the source/destination addresses (to pick link destinations and VLAN tags). These
// are read in place through the views below.

//======================================================================================================================
// Imports
//======================================================================================================================

use ::std::net::{
    Ipv4Addr,
    Ipv6Addr,
};

//======================================================================================================================
// Constants
//======================================================================================================================

/// Minimum size of IPv4 header (in bytes).
pub const IPV4_HEADER_MIN_SIZE: usize = 20;

/// Size of the fixed IPv6 header (in bytes).
pub const IPV6_HEADER_SIZE: usize = 40;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Read-only view of an IPv4 header.
#[derive(Clone, Copy, Debug)]
pub struct Ipv4HeaderView<'a>(&'a [u8]);

/// Read-only view of an IPv6 header.
#[derive(Clone, Copy, Debug)]
pub struct Ipv6HeaderView<'a>(&'a [u8]);

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl<'a> Ipv4HeaderView<'a> {
    /// Overlays a view on `buf`. Returns `None` if `buf` cannot hold a minimal IPv4 header.
    pub fn parse(buf: &'a [u8]) -> Option<Self> {
        if buf.len() < IPV4_HEADER_MIN_SIZE {
            return None;
        }
        Some(Self(&buf[..IPV4_HEADER_MIN_SIZE]))
    }

    /// Total length of the datagram, header included.
    pub fn total_length(&self) -> usize {
        u16::from_be_bytes([self.0[2], self.0[3]]) as usize
    }

    pub fn src_addr(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.0[12], self.0[13], self.0[14], self.0[15])
    }

    pub fn dst_addr(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.0[16], self.0[17], self.0[18], self.0[19])
    }
}

impl<'a> Ipv6HeaderView<'a> {
    /// Overlays a view on `buf`. Returns `None` if `buf` cannot hold an IPv6 header.
    pub fn parse(buf: &'a [u8]) -> Option<Self> {
        if buf.len() < IPV6_HEADER_SIZE {
            return None;
        }
        Some(Self(&buf[..IPV6_HEADER_SIZE]))
    }

    /// Length of the payload following the fixed header.
    pub fn payload_length(&self) -> usize {
        u16::from_be_bytes([self.0[4], self.0[5]]) as usize
    }

    /// Total length of the datagram, fixed header included.
    pub fn total_length(&self) -> usize {
        self.payload_length() + IPV6_HEADER_SIZE
    }

    pub fn src_addr(&self) -> Ipv6Addr {
        Self::read_addr(&self.0[8..24])
    }

    pub fn dst_addr(&self) -> Ipv6Addr {
        Self::read_addr(&self.0[24..40])
    }

    fn read_addr(bytes: &[u8]) -> Ipv6Addr {
        let mut octets: [u8; 16] = [0; 16];
        octets.copy_from_slice(bytes);
        Ipv6Addr::from(octets)
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
