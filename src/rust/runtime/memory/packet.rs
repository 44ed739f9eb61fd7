// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    inetstack::protocols::layer2::vlan::{
        vlan_get_pcp,
        vlan_get_vid,
        vlan_set_pcp,
        vlan_set_vid,
    },
    runtime::{
        memory::NetBuf,
        network::{
            consts::VLAN_TAG_UNSPEC,
            types::{
                MacAddress,
                MAC_ADDRESS_SIZE,
            },
            AddressFamily,
        },
    },
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Link technology a link address belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkType {
    Ethernet,
    Dummy,
}

/// Where the bytes of a link address live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkAddrLocation {
    /// Inside the link header of the packet's first fragment, at this offset of the fragment's storage.
    Header { offset: usize },
    /// Outside of the packet.
    Owned(MacAddress),
}

/// Link address recorded in the metadata of a packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkAddr {
    location: LinkAddrLocation,
    link_type: LinkType,
}

/// A packet: a chain of fragments plus the metadata that travels with it through the stack.
#[derive(Clone, Debug)]
pub struct Packet {
    frags: Vec<NetBuf>,
    family: Option<AddressFamily>,
    vlan_tci: u16,
    priority: u8,
    ll_reserve: usize,
    ll_src: Option<LinkAddr>,
    ll_dst: Option<LinkAddr>,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl LinkAddr {
    /// Ethernet address stored in the first fragment's link header at `offset`.
    pub fn in_header(offset: usize) -> Self {
        Self {
            location: LinkAddrLocation::Header { offset },
            link_type: LinkType::Ethernet,
        }
    }

    /// Ethernet address stored outside of the packet.
    pub fn owned(addr: MacAddress) -> Self {
        Self {
            location: LinkAddrLocation::Owned(addr),
            link_type: LinkType::Ethernet,
        }
    }

    pub fn location(&self) -> LinkAddrLocation {
        self.location
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    /// Number of bytes in this link address.
    pub fn addr_len(&self) -> usize {
        MAC_ADDRESS_SIZE
    }

    /// Returns true if this address lives in the first fragment's storage at `offset`.
    pub fn is_at(&self, offset: usize) -> bool {
        self.location == LinkAddrLocation::Header { offset }
    }
}

impl Packet {
    /// Creates a packet out of a chain of fragments.
    pub fn new(frags: Vec<NetBuf>) -> Self {
        Self {
            frags,
            family: None,
            vlan_tci: VLAN_TAG_UNSPEC,
            priority: 0,
            ll_reserve: 0,
            ll_src: None,
            ll_dst: None,
        }
    }

    /// Creates a single-fragment packet.
    pub fn from_frag(frag: NetBuf) -> Self {
        Self::new(vec![frag])
    }

    pub fn frags(&self) -> &[NetBuf] {
        &self.frags
    }

    pub fn frags_mut(&mut self) -> &mut [NetBuf] {
        &mut self.frags
    }

    /// Appends a fragment to the end of the chain.
    pub fn push_frag(&mut self, frag: NetBuf) {
        self.frags.push(frag)
    }

    pub fn first_frag(&self) -> Option<&NetBuf> {
        self.frags.first()
    }

    pub fn first_frag_mut(&mut self) -> Option<&mut NetBuf> {
        self.frags.first_mut()
    }

    /// Returns the number of data bytes across the whole chain.
    pub fn len(&self) -> usize {
        self.frags.iter().map(NetBuf::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shortens the chain to `len` data bytes. Fragments past the cut are released; the first fragment is always
    /// kept.
    pub fn truncate(&mut self, len: usize) {
        let mut remaining: usize = len;
        let mut keep: usize = self.frags.len();
        for (i, frag) in self.frags.iter_mut().enumerate() {
            if frag.len() < remaining {
                remaining -= frag.len();
                continue;
            }
            frag.truncate(remaining);
            keep = i + 1;
            break;
        }
        self.frags.truncate(keep.max(1));
    }

    pub fn family(&self) -> Option<AddressFamily> {
        self.family
    }

    pub fn set_family(&mut self, family: AddressFamily) {
        self.family = Some(family)
    }

    pub fn vlan_tci(&self) -> u16 {
        self.vlan_tci
    }

    pub fn set_vlan_tci(&mut self, tci: u16) {
        self.vlan_tci = tci
    }

    /// Returns the VLAN identifier carried in the tag control information.
    pub fn vlan_tag(&self) -> u16 {
        vlan_get_vid(self.vlan_tci)
    }

    pub fn set_vlan_tag(&mut self, tag: u16) {
        self.vlan_tci = vlan_set_vid(self.vlan_tci, tag)
    }

    /// Returns the VLAN priority carried in the tag control information.
    pub fn vlan_priority(&self) -> u8 {
        vlan_get_pcp(self.vlan_tci)
    }

    pub fn set_vlan_priority(&mut self, priority: u8) {
        self.vlan_tci = vlan_set_pcp(self.vlan_tci, priority)
    }

    /// Returns the stack-internal priority of this packet.
    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: u8) {
        self.priority = priority
    }

    /// Returns the number of headroom bytes reserved for the link header.
    pub fn ll_reserve(&self) -> usize {
        self.ll_reserve
    }

    pub fn set_ll_reserve(&mut self, reserve: usize) {
        self.ll_reserve = reserve
    }

    pub fn ll_src_slot(&self) -> Option<LinkAddr> {
        self.ll_src
    }

    pub fn ll_dst_slot(&self) -> Option<LinkAddr> {
        self.ll_dst
    }

    pub fn set_ll_src(&mut self, addr: Option<LinkAddr>) {
        self.ll_src = addr
    }

    pub fn set_ll_dst(&mut self, addr: Option<LinkAddr>) {
        self.ll_dst = addr
    }

    /// Resolves the link source address.
    pub fn ll_src(&self) -> Option<MacAddress> {
        self.resolve(self.ll_src?)
    }

    /// Resolves the link destination address.
    pub fn ll_dst(&self) -> Option<MacAddress> {
        self.resolve(self.ll_dst?)
    }

    fn resolve(&self, addr: LinkAddr) -> Option<MacAddress> {
        match addr.location {
            LinkAddrLocation::Owned(mac) => Some(mac),
            LinkAddrLocation::Header { offset } => {
                MacAddress::from_bytes(self.frags.first()?.storage().get(offset..)?)
            },
        }
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
