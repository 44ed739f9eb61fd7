// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Exports
//======================================================================================================================

pub mod config;
pub mod consts;
pub mod types;

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    inetstack::protocols::layer3::{
        Ipv4HeaderView,
        Ipv6HeaderView,
    },
    runtime::{
        fail::Fail,
        memory::Packet,
        network::types::MacAddress,
    },
};
use ::std::{
    fmt,
    net::{
        Ipv4Addr,
        Ipv6Addr,
    },
    ops::BitOr,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Index of a network interface in the interface registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IfIndex(pub usize);

/// Link layer driving a network interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum L2Kind {
    Ethernet,
    Dummy,
    Ieee802154,
    Bluetooth,
}

/// Address family of the network-layer payload carried by a packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressFamily {
    Inet,
    Inet6,
}

/// Outcome of processing a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetVerdict {
    /// The packet was consumed (queued for transmission, or taken by a collaborator).
    Ok,
    /// The packet should be passed on to the network layer.
    Continue,
    /// The packet should be released.
    Drop,
}

/// Hardware capabilities advertised by an Ethernet device.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct EthernetHwCaps(u32);

//======================================================================================================================
// Traits
//======================================================================================================================

/// A network interface bound to this layer.
pub trait NetworkInterface: Send + Sync {
    /// Index of this interface in the interface registry.
    fn index(&self) -> IfIndex;

    /// Link address owned by this interface.
    fn link_addr(&self) -> MacAddress;

    /// Link layer that drives this interface.
    fn l2_kind(&self) -> L2Kind;

    /// Hardware capabilities of the underlying device.
    fn hw_capabilities(&self) -> EthernetHwCaps;

    /// Directed broadcast address of the IPv4 subnet configured on this interface, if any.
    fn ipv4_subnet_broadcast(&self) -> Option<Ipv4Addr> {
        None
    }

    /// Driver hook invoked when a VLAN tag is enabled or disabled on this interface. Devices that do not filter
    /// VLANs in hardware keep the default.
    fn vlan_setup(&self, _tag: u16, _enable: bool) -> Result<(), Fail> {
        Ok(())
    }

    /// Hands a fully framed packet to the transmit queue. Does not wait for completion.
    fn queue_tx(&self, pkt: Packet);
}

/// Lookup of interfaces by the network-layer addresses they own.
pub trait InterfaceRegistry: Send + Sync {
    /// Interface that owns `addr`.
    fn ipv4_addr_lookup(&self, addr: &Ipv4Addr) -> Option<IfIndex>;

    /// Interface that owns `addr`.
    fn ipv6_addr_lookup(&self, addr: &Ipv6Addr) -> Option<IfIndex>;

    /// Interface that owns the source address of the network-layer header exposed at the front of `pkt`.
    fn resolve_owning_interface(&self, pkt: &Packet) -> Option<IfIndex> {
        let ip_hdr: &[u8] = pkt.first_frag()?;
        match pkt.family()? {
            AddressFamily::Inet => self.ipv4_addr_lookup(&Ipv4HeaderView::parse(ip_hdr)?.src_addr()),
            AddressFamily::Inet6 => self.ipv6_addr_lookup(&Ipv6HeaderView::parse(ip_hdr)?.src_addr()),
        }
    }
}

/// Address resolution collaborator.
pub trait ArpResolver: Send + Sync {
    /// Resolves the link destination of an outgoing IPv4 packet. On success, returns the packet to send now with
    /// its link header already written; this may be a different packet than `pkt` (e.g. a request released from the
    /// pending queue). Returns `None` if nothing should be sent.
    fn prepare(&self, pkt: Packet) -> Option<Packet>;

    /// Processes an incoming ARP message whose link header has already been stripped.
    fn input(&self, iface: &dyn NetworkInterface, pkt: &mut Packet) -> NetVerdict;

    /// Flushes all cached address resolutions.
    fn clear_cache(&self);
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl EthernetHwCaps {
    pub const TX_CHECKSUM_OFFLOAD: Self = Self(1 << 0);
    pub const RX_CHECKSUM_OFFLOAD: Self = Self(1 << 1);
    pub const VLAN: Self = Self(1 << 2);
    pub const AUTO_NEGOTIATION_SET: Self = Self(1 << 3);
    pub const LINK_10BASE_T: Self = Self(1 << 4);
    pub const LINK_100BASE_T: Self = Self(1 << 5);
    pub const LINK_1000BASE_T: Self = Self(1 << 6);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl BitOr for EthernetHwCaps {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for EthernetHwCaps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EthernetHwCaps({:#x})", self.0)
    }
}

impl fmt::Display for IfIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "iface#{}", self.0)
    }
}
