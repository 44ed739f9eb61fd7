// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![allow(dead_code)]

//==============================================================================
// Imports
//==============================================================================

use ::ethl2::{
    runtime::{
        config::Config,
        logging,
        memory::NetBuf,
    },
    EthernetHwCaps,
    EthernetL2,
    Fail,
    IfIndex,
    InterfaceRegistry,
    L2Kind,
    MacAddress,
    NetworkInterface,
    Packet,
};
use ::std::{
    net::{
        Ipv4Addr,
        Ipv6Addr,
    },
    sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Arc,
        Mutex,
    },
};

//==============================================================================
// Constants
//==============================================================================

pub const ALICE_MAC: MacAddress = MacAddress::new([0x12, 0x23, 0x45, 0x67, 0x89, 0xab]);
pub const ALICE_IPV6: Ipv6Addr = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
pub const BOB_MAC: MacAddress = MacAddress::new([0xaa, 0x89, 0x67, 0x45, 0x23, 0x12]);
pub const BOB_IPV6: Ipv6Addr = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2);

/// Configuration shared by both ends of a link.
pub const CONFIG: &str = "
ethernet:
  local_link_addr: \"12:23:45:67:89:ab\"
  enable_arp: false
  enable_vlan: true
";

//==============================================================================
// Structures
//==============================================================================

/// Network interface that keeps the frames it is asked to transmit.
pub struct Nic {
    index: IfIndex,
    link_addr: MacAddress,
    sent: Mutex<Vec<Packet>>,
    vlan_setups: AtomicUsize,
}

/// Registry that never owns any address.
pub struct EmptyRegistry;

//==============================================================================
// Associated Functions
//==============================================================================

impl Nic {
    pub fn new(index: usize, link_addr: MacAddress) -> Self {
        logging::initialize();
        Self {
            index: IfIndex(index),
            link_addr,
            sent: Mutex::new(Vec::new()),
            vlan_setups: AtomicUsize::new(0),
        }
    }

    /// Removes every frame transmitted so far.
    pub fn take_sent(&self) -> Vec<Packet> {
        match self.sent.lock() {
            Ok(mut sent) => sent.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn vlan_setups(&self) -> usize {
        self.vlan_setups.load(Ordering::Relaxed)
    }
}

//==============================================================================
// Trait Implementations
//==============================================================================

impl NetworkInterface for Nic {
    fn index(&self) -> IfIndex {
        self.index
    }

    fn link_addr(&self) -> MacAddress {
        self.link_addr
    }

    fn l2_kind(&self) -> L2Kind {
        L2Kind::Ethernet
    }

    fn hw_capabilities(&self) -> EthernetHwCaps {
        EthernetHwCaps::VLAN | EthernetHwCaps::RX_CHECKSUM_OFFLOAD
    }

    fn vlan_setup(&self, _tag: u16, _enable: bool) -> Result<(), Fail> {
        self.vlan_setups.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn queue_tx(&self, pkt: Packet) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(pkt);
        }
    }
}

impl InterfaceRegistry for EmptyRegistry {
    fn ipv4_addr_lookup(&self, _addr: &Ipv4Addr) -> Option<IfIndex> {
        None
    }

    fn ipv6_addr_lookup(&self, _addr: &Ipv6Addr) -> Option<IfIndex> {
        None
    }
}

//==============================================================================
// Standalone Functions
//==============================================================================

/// Builds a link layer from the shared configuration file.
pub fn new_link_layer() -> Result<EthernetL2, Fail> {
    let config: Config = Config::from_str_contents(CONFIG)?;
    Ok(EthernetL2::new(config.ethernet_config()?, Arc::new(EmptyRegistry), None))
}

/// Builds an IPv6 datagram carrying `payload`.
pub fn ipv6_datagram(src: Ipv6Addr, dst: Ipv6Addr, payload: &[u8]) -> Vec<u8> {
    let mut buf: Vec<u8> = vec![0; 40];
    buf[0] = 0x60;
    buf[4..6].copy_from_slice(&(payload.len() as u16).to_be_bytes());
    buf[7] = 64;
    buf[8..24].copy_from_slice(&src.octets());
    buf[24..40].copy_from_slice(&dst.octets());
    buf.extend_from_slice(payload);
    buf
}

/// Serializes a framed packet the way it would appear on the wire.
pub fn wire_bytes(pkt: &Packet) -> Vec<u8> {
    let mut bytes: Vec<u8> = Vec::new();
    for frag in pkt.frags() {
        if let Some(hdr) = frag.link_header(pkt.ll_reserve()) {
            if bytes.is_empty() {
                bytes.extend_from_slice(hdr);
            }
        }
        bytes.extend_from_slice(frag);
    }
    bytes
}

/// Wraps bytes taken off the wire in a receive packet.
pub fn from_wire(bytes: &[u8]) -> Packet {
    Packet::from_frag(NetBuf::from_slice(0, bytes))
}
