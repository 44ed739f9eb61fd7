// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    inetstack::protocols::layer2::{
        vlan::{
            vlan_get_pcp,
            vlan_get_vid,
        },
        EtherType2,
    },
    runtime::{
        fail::Fail,
        memory::NetBuf,
        network::{
            consts::ETHERNET_MIN_FRAME_SIZE,
            types::{
                MacAddress,
                MAC_ADDRESS_SIZE,
            },
        },
    },
};
use ::libc::EBADMSG;

//======================================================================================================================
// Constants
//======================================================================================================================

pub const ETHERNET2_HEADER_SIZE: usize = 14;
pub const VLAN_HEADER_SIZE: usize = 18;
pub const MIN_PAYLOAD_SIZE: usize = ETHERNET_MIN_FRAME_SIZE - ETHERNET2_HEADER_SIZE;

/// Offset of the destination address within a link header.
pub const DST_ADDR_OFFSET: usize = 0;
/// Offset of the source address within a link header.
pub const SRC_ADDR_OFFSET: usize = MAC_ADDRESS_SIZE;

//======================================================================================================================
// Structures
//======================================================================================================================

/// View of a plain Ethernet header at the front of a buffer.
#[derive(Clone, Copy)]
pub struct Ethernet2Header<'a>(&'a [u8]);

/// View of an 802.1Q tagged Ethernet header at the front of a buffer.
#[derive(Clone, Copy)]
pub struct VlanHeader<'a>(&'a [u8]);

/// Writable view of a plain Ethernet header.
pub struct Ethernet2HeaderMut<'a>(&'a mut [u8]);

/// Writable view of an 802.1Q tagged Ethernet header.
pub struct VlanHeaderMut<'a>(&'a mut [u8]);

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl<'a> Ethernet2Header<'a> {
    /// Overlays a header view on the front of `buf`.
    pub fn parse(buf: &'a [u8]) -> Result<Self, Fail> {
        if buf.len() < ETHERNET2_HEADER_SIZE {
            return Err(Fail::new(EBADMSG, "frame too small"));
        }
        Ok(Self(&buf[..ETHERNET2_HEADER_SIZE]))
    }

    pub fn dst_addr(&self) -> MacAddress {
        read_addr(&self.0[DST_ADDR_OFFSET..])
    }

    pub fn src_addr(&self) -> MacAddress {
        read_addr(&self.0[SRC_ADDR_OFFSET..])
    }

    /// Raw protocol type field, in host byte order.
    pub fn ether_type(&self) -> u16 {
        u16::from_be_bytes([self.0[12], self.0[13]])
    }
}

impl<'a> VlanHeader<'a> {
    /// Overlays a tagged header view on the front of `buf`.
    pub fn parse(buf: &'a [u8]) -> Result<Self, Fail> {
        if buf.len() < VLAN_HEADER_SIZE {
            return Err(Fail::new(EBADMSG, "tagged frame too small"));
        }
        Ok(Self(&buf[..VLAN_HEADER_SIZE]))
    }

    pub fn dst_addr(&self) -> MacAddress {
        read_addr(&self.0[DST_ADDR_OFFSET..])
    }

    pub fn src_addr(&self) -> MacAddress {
        read_addr(&self.0[SRC_ADDR_OFFSET..])
    }

    /// Tag protocol identifier.
    pub fn tpid(&self) -> u16 {
        u16::from_be_bytes([self.0[12], self.0[13]])
    }

    /// Tag control information.
    pub fn tci(&self) -> u16 {
        u16::from_be_bytes([self.0[14], self.0[15]])
    }

    /// Raw protocol type of the payload that follows the tag.
    pub fn ether_type(&self) -> u16 {
        u16::from_be_bytes([self.0[16], self.0[17]])
    }
}

impl<'a> Ethernet2HeaderMut<'a> {
    /// Overlays a writable header view on the front of `buf`. Returns `None` if `buf` is too small.
    pub fn new(buf: &'a mut [u8]) -> Option<Self> {
        Some(Self(buf.get_mut(..ETHERNET2_HEADER_SIZE)?))
    }

    pub fn set_dst_addr(&mut self, addr: MacAddress) {
        self.0[DST_ADDR_OFFSET..DST_ADDR_OFFSET + MAC_ADDRESS_SIZE].copy_from_slice(addr.as_bytes());
    }

    pub fn set_src_addr(&mut self, addr: MacAddress) {
        self.0[SRC_ADDR_OFFSET..SRC_ADDR_OFFSET + MAC_ADDRESS_SIZE].copy_from_slice(addr.as_bytes());
    }

    pub fn set_ether_type(&mut self, ether_type: EtherType2) {
        self.0[12..14].copy_from_slice(&u16::from(ether_type).to_be_bytes());
    }
}

impl<'a> VlanHeaderMut<'a> {
    /// Overlays a writable tagged header view on the front of `buf`. Returns `None` if `buf` is too small.
    pub fn new(buf: &'a mut [u8]) -> Option<Self> {
        Some(Self(buf.get_mut(..VLAN_HEADER_SIZE)?))
    }

    pub fn set_dst_addr(&mut self, addr: MacAddress) {
        self.0[DST_ADDR_OFFSET..DST_ADDR_OFFSET + MAC_ADDRESS_SIZE].copy_from_slice(addr.as_bytes());
    }

    pub fn set_src_addr(&mut self, addr: MacAddress) {
        self.0[SRC_ADDR_OFFSET..SRC_ADDR_OFFSET + MAC_ADDRESS_SIZE].copy_from_slice(addr.as_bytes());
    }

    /// Writes the tag block: the VLAN protocol identifier followed by `tci`.
    pub fn set_tag(&mut self, tci: u16) {
        self.0[12..14].copy_from_slice(&u16::from(EtherType2::Vlan).to_be_bytes());
        self.0[14..16].copy_from_slice(&tci.to_be_bytes());
    }

    pub fn set_ether_type(&mut self, ether_type: EtherType2) {
        self.0[16..18].copy_from_slice(&u16::from(ether_type).to_be_bytes());
    }
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

fn read_addr(bytes: &[u8]) -> MacAddress {
    let mut octets: [u8; MAC_ADDRESS_SIZE] = [0; MAC_ADDRESS_SIZE];
    octets.copy_from_slice(&bytes[..MAC_ADDRESS_SIZE]);
    MacAddress::new(octets)
}

/// Writes a link header into the `reserve` bytes of headroom in front of `frag`'s data. The header is VLAN tagged
/// with `vlan_tci` when one is given. Addresses passed as `None` are left as they are in the buffer.
///
/// # Panics
///
/// Panics if the fragment has less than `reserve` bytes of headroom, or if `reserve` cannot hold the header.
pub fn fill_header(
    frag: &mut NetBuf,
    reserve: usize,
    ether_type: EtherType2,
    vlan_tci: Option<u16>,
    src: Option<MacAddress>,
    dst: Option<MacAddress>,
) {
    let hdr_len: usize = match vlan_tci {
        Some(_) => VLAN_HEADER_SIZE,
        None => ETHERNET2_HEADER_SIZE,
    };
    let headroom: usize = frag.headroom();
    let frag_len: usize = frag.len();
    let hdr_buf: &mut [u8] = match frag.link_header_mut(reserve) {
        Some(hdr_buf) if hdr_buf.len() >= hdr_len => hdr_buf,
        _ => panic!(
            "fill_header(): no room for a {} byte link header (reserve={}, headroom={})",
            hdr_len, reserve, headroom
        ),
    };

    match vlan_tci {
        Some(tci) => {
            if let Some(mut hdr) = VlanHeaderMut::new(hdr_buf) {
                if let Some(dst) = dst {
                    hdr.set_dst_addr(dst);
                }
                if let Some(src) = src {
                    hdr.set_src_addr(src);
                }
                hdr.set_tag(tci);
                hdr.set_ether_type(ether_type);
            }
            trace!(
                "fill_header(): src={:?} dst={:?} type={:?} tag={} pri={} len={}",
                src,
                dst,
                ether_type,
                vlan_get_vid(tci),
                vlan_get_pcp(tci),
                frag_len
            );
        },
        None => {
            if let Some(mut hdr) = Ethernet2HeaderMut::new(hdr_buf) {
                if let Some(dst) = dst {
                    hdr.set_dst_addr(dst);
                }
                if let Some(src) = src {
                    hdr.set_src_addr(src);
                }
                hdr.set_ether_type(ether_type);
            }
            trace!(
                "fill_header(): src={:?} dst={:?} type={:?} len={}",
                src,
                dst,
                ether_type,
                frag_len
            );
        },
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
