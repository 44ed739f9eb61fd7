// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    inetstack::protocols::{
        layer2::{
            fill_header,
            EtherType2,
            EthernetL2,
            ETHERNET2_HEADER_SIZE,
        },
        layer3::{
            Ipv4HeaderView,
            IPV4_HEADER_MIN_SIZE,
            IPV6_HEADER_SIZE,
        },
    },
    runtime::{
        fail::Fail,
        logging,
        memory::{
            NetBuf,
            Packet,
        },
        network::{
            config::EthernetConfig,
            consts::ETHERNET_MIN_FRAME_SIZE,
            types::MacAddress,
            AddressFamily,
            ArpResolver,
            EthernetHwCaps,
            IfIndex,
            InterfaceRegistry,
            L2Kind,
            NetVerdict,
            NetworkInterface,
        },
    },
};
use ::std::{
    collections::{
        HashMap,
        VecDeque,
    },
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

//======================================================================================================================
// Constants
//======================================================================================================================

pub const ALICE_MAC: MacAddress = MacAddress::new([0x12, 0x23, 0x45, 0x67, 0x89, 0xab]);
pub const ALICE_IPV4: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);
pub const ALICE_IPV6: Ipv6Addr = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
pub const ALICE_IFACE: IfIndex = IfIndex(1);
pub const BOB_MAC: MacAddress = MacAddress::new([0xab, 0x89, 0x67, 0x45, 0x23, 0x12]);
pub const BOB_IPV4: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 2);
pub const BOB_IPV6: Ipv6Addr = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2);
pub const BOB_IFACE: IfIndex = IfIndex(2);
pub const CARRIE_MAC: MacAddress = MacAddress::new([0x02, 0x11, 0x22, 0x33, 0x44, 0x55]);
pub const CARRIE_IPV4: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 3);

//======================================================================================================================
// Structures
//======================================================================================================================

/// Network interface that records what the link layer does to it.
pub struct TestInterface {
    index: IfIndex,
    link_addr: MacAddress,
    l2_kind: L2Kind,
    hw_caps: EthernetHwCaps,
    subnet_broadcast: Option<Ipv4Addr>,
    vlan_setup_calls: Mutex<Vec<(u16, bool)>>,
    outgoing: Mutex<VecDeque<Packet>>,
}

/// Interface registry backed by address maps.
#[derive(Default)]
pub struct TestRegistry {
    ipv4: HashMap<Ipv4Addr, IfIndex>,
    ipv6: HashMap<Ipv6Addr, IfIndex>,
}

/// Address resolution collaborator with a fixed cache. Unresolved packets are parked and replaced by a broadcast
/// request.
pub struct TestArp {
    local_link_addr: MacAddress,
    cache: Mutex<HashMap<Ipv4Addr, MacAddress>>,
    pending: Mutex<Vec<Packet>>,
    inputs: AtomicUsize,
    clears: AtomicUsize,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl TestInterface {
    /// Creates an Ethernet interface that advertises VLAN support.
    pub fn new(index: IfIndex, link_addr: MacAddress) -> Self {
        logging::initialize();
        Self {
            index,
            link_addr,
            l2_kind: L2Kind::Ethernet,
            hw_caps: EthernetHwCaps::VLAN | EthernetHwCaps::LINK_1000BASE_T,
            subnet_broadcast: None,
            vlan_setup_calls: Mutex::new(Vec::new()),
            outgoing: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_l2_kind(mut self, l2_kind: L2Kind) -> Self {
        self.l2_kind = l2_kind;
        self
    }

    pub fn with_hw_capabilities(mut self, hw_caps: EthernetHwCaps) -> Self {
        self.hw_caps = hw_caps;
        self
    }

    pub fn with_subnet_broadcast(mut self, addr: Ipv4Addr) -> Self {
        self.subnet_broadcast = Some(addr);
        self
    }

    /// Removes the oldest packet from the transmit queue.
    pub fn pop_frame(&self) -> Option<Packet> {
        self.outgoing.lock().ok()?.pop_front()
    }

    pub fn outgoing_len(&self) -> usize {
        self.outgoing.lock().map(|q| q.len()).unwrap_or(0)
    }

    pub fn vlan_setup_calls(&self) -> Vec<(u16, bool)> {
        self.vlan_setup_calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ipv4(mut self, addr: Ipv4Addr, iface: IfIndex) -> Self {
        self.ipv4.insert(addr, iface);
        self
    }

    pub fn with_ipv6(mut self, addr: Ipv6Addr, iface: IfIndex) -> Self {
        self.ipv6.insert(addr, iface);
        self
    }
}

impl TestArp {
    pub fn new(local_link_addr: MacAddress) -> Self {
        Self {
            local_link_addr,
            cache: Mutex::new(HashMap::new()),
            pending: Mutex::new(Vec::new()),
            inputs: AtomicUsize::new(0),
            clears: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, addr: Ipv4Addr, link_addr: MacAddress) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(addr, link_addr);
        }
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().map(|pending| pending.len()).unwrap_or(0)
    }

    pub fn input_count(&self) -> usize {
        self.inputs.load(Ordering::Relaxed)
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::Relaxed)
    }

    fn lookup(&self, addr: &Ipv4Addr) -> Option<MacAddress> {
        self.cache.lock().ok()?.get(addr).copied()
    }

    /// Builds a broadcast request for `target`.
    fn request(&self, target: Ipv4Addr) -> Packet {
        let mut body: [u8; 28] = [0; 28];
        body[24..28].copy_from_slice(&target.octets());
        let mut frag: NetBuf = NetBuf::from_slice(ETHERNET2_HEADER_SIZE, &body);
        fill_header(
            &mut frag,
            ETHERNET2_HEADER_SIZE,
            EtherType2::Arp,
            None,
            Some(self.local_link_addr),
            Some(MacAddress::broadcast()),
        );
        let mut pkt: Packet = Packet::from_frag(frag);
        pkt.set_family(AddressFamily::Inet);
        pkt.set_ll_reserve(ETHERNET2_HEADER_SIZE);
        pkt
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl NetworkInterface for TestInterface {
    fn index(&self) -> IfIndex {
        self.index
    }

    fn link_addr(&self) -> MacAddress {
        self.link_addr
    }

    fn l2_kind(&self) -> L2Kind {
        self.l2_kind
    }

    fn hw_capabilities(&self) -> EthernetHwCaps {
        self.hw_caps
    }

    fn ipv4_subnet_broadcast(&self) -> Option<Ipv4Addr> {
        self.subnet_broadcast
    }

    fn vlan_setup(&self, tag: u16, enable: bool) -> Result<(), Fail> {
        if let Ok(mut calls) = self.vlan_setup_calls.lock() {
            calls.push((tag, enable));
        }
        Ok(())
    }

    fn queue_tx(&self, pkt: Packet) {
        if let Ok(mut outgoing) = self.outgoing.lock() {
            outgoing.push_back(pkt);
        }
    }
}

impl InterfaceRegistry for TestRegistry {
    fn ipv4_addr_lookup(&self, addr: &Ipv4Addr) -> Option<IfIndex> {
        self.ipv4.get(addr).copied()
    }

    fn ipv6_addr_lookup(&self, addr: &Ipv6Addr) -> Option<IfIndex> {
        self.ipv6.get(addr).copied()
    }
}

impl ArpResolver for TestArp {
    fn prepare(&self, mut pkt: Packet) -> Option<Packet> {
        let target: Ipv4Addr = Ipv4HeaderView::parse(pkt.first_frag()?)?.dst_addr();
        match self.lookup(&target) {
            Some(link_addr) => {
                let reserve: usize = pkt.ll_reserve();
                for frag in pkt.frags_mut() {
                    fill_header(
                        frag,
                        reserve,
                        EtherType2::Ipv4,
                        None,
                        Some(self.local_link_addr),
                        Some(link_addr),
                    );
                }
                Some(pkt)
            },
            None => {
                self.pending.lock().ok()?.push(pkt);
                Some(self.request(target))
            },
        }
    }

    fn input(&self, _iface: &dyn NetworkInterface, _pkt: &mut Packet) -> NetVerdict {
        self.inputs.fetch_add(1, Ordering::Relaxed);
        NetVerdict::Ok
    }

    fn clear_cache(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Builds an IPv4 datagram carrying `payload_len` zero bytes.
pub fn ipv4_datagram(src: Ipv4Addr, dst: Ipv4Addr, payload_len: usize) -> Vec<u8> {
    let mut buf: Vec<u8> = vec![0; IPV4_HEADER_MIN_SIZE + payload_len];
    buf[0] = 0x45;
    buf[2..4].copy_from_slice(&((IPV4_HEADER_MIN_SIZE + payload_len) as u16).to_be_bytes());
    buf[8] = 64;
    buf[12..16].copy_from_slice(&src.octets());
    buf[16..20].copy_from_slice(&dst.octets());
    buf
}

/// Builds an IPv6 datagram carrying `payload_len` zero bytes.
pub fn ipv6_datagram(src: Ipv6Addr, dst: Ipv6Addr, payload_len: usize) -> Vec<u8> {
    let mut buf: Vec<u8> = vec![0; IPV6_HEADER_SIZE + payload_len];
    buf[0] = 0x60;
    buf[4..6].copy_from_slice(&(payload_len as u16).to_be_bytes());
    buf[7] = 64;
    buf[8..24].copy_from_slice(&src.octets());
    buf[24..40].copy_from_slice(&dst.octets());
    buf
}

/// Builds an untagged frame.
pub fn frame(dst: MacAddress, src: MacAddress, ether_type: u16, payload: &[u8]) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::with_capacity(ETHERNET2_HEADER_SIZE + payload.len());
    buf.extend_from_slice(&dst.octets());
    buf.extend_from_slice(&src.octets());
    buf.extend_from_slice(&ether_type.to_be_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Builds an 802.1Q tagged frame.
pub fn vlan_frame(dst: MacAddress, src: MacAddress, tci: u16, ether_type: u16, payload: &[u8]) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();
    buf.extend_from_slice(&dst.octets());
    buf.extend_from_slice(&src.octets());
    buf.extend_from_slice(&u16::from(EtherType2::Vlan).to_be_bytes());
    buf.extend_from_slice(&tci.to_be_bytes());
    buf.extend_from_slice(&ether_type.to_be_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Pads `frame` to the Ethernet minimum, the way a sender's hardware would.
pub fn pad(mut frame: Vec<u8>) -> Vec<u8> {
    if frame.len() < ETHERNET_MIN_FRAME_SIZE {
        frame.resize(ETHERNET_MIN_FRAME_SIZE, 0);
    }
    frame
}

/// Wraps a received frame in a single-fragment packet.
pub fn rx_packet(frame: &[u8]) -> Packet {
    Packet::from_frag(NetBuf::from_slice(0, frame))
}

/// Wraps an outgoing datagram in a packet with `headroom` bytes in front of it.
pub fn tx_packet(family: AddressFamily, datagram: &[u8], headroom: usize) -> Packet {
    let mut pkt: Packet = Packet::from_frag(NetBuf::from_slice(headroom, datagram));
    pkt.set_family(family);
    pkt
}

/// Creates a link layer with both address resolution and VLAN support turned on.
pub fn new_ethernet(registry: TestRegistry, arp: Option<Arc<TestArp>>) -> EthernetL2 {
    let arp: Option<Arc<dyn ArpResolver>> = arp.map(|arp| arp as Arc<dyn ArpResolver>);
    EthernetL2::new(EthernetConfig::default(), Arc::new(registry), arp)
}
