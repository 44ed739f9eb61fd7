// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    inetstack::protocols::{
        layer2::{
            broadcast_addr,
            ethernet2::header::{
                DST_ADDR_OFFSET,
                SRC_ADDR_OFFSET,
            },
            fill_header,
            ipv4_mcast_to_mac_addr,
            ipv6_mcast_to_mac_addr,
            EtherType2,
            EthernetL2,
            ETHERNET2_HEADER_SIZE,
            VLAN_HEADER_SIZE,
        },
        layer3::{
            Ipv4HeaderView,
            Ipv6HeaderView,
        },
    },
    runtime::{
        fail::Fail,
        memory::{
            LinkAddr,
            Packet,
        },
        network::{
            consts::VLAN_TAG_UNSPEC,
            types::MacAddress,
            AddressFamily,
            IfIndex,
            NetVerdict,
            NetworkInterface,
        },
    },
};
use ::libc::ENOENT;
use ::std::net::{
    Ipv4Addr,
    Ipv6Addr,
};

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl EthernetL2 {
    /// Frames `pkt` and queues it for transmission on `iface`. The network-layer datagram must already sit at the
    /// front of the first fragment.
    pub fn send(&self, iface: &dyn NetworkInterface, mut pkt: Packet) -> NetVerdict {
        let idx: IfIndex = iface.index();
        let family: AddressFamily = match pkt.family() {
            Some(family) => family,
            None => {
                warn!("send(): packet has no address family (iface={})", idx);
                return NetVerdict::Drop;
            },
        };
        if pkt.first_frag().is_none() {
            warn!("send(): no data (iface={})", idx);
            return NetVerdict::Drop;
        }
        if pkt.ll_reserve() == 0 {
            pkt.set_ll_reserve(self.header_reserve(idx));
        }

        let mut addrs_set: bool = false;
        if family == AddressFamily::Inet {
            if let Some(arp) = &self.arp {
                match ipv4_link_shortcut(iface, &pkt) {
                    Some(dst) => {
                        pkt.set_ll_dst(Some(LinkAddr::owned(dst)));
                        pkt.set_ll_src(Some(LinkAddr::owned(iface.link_addr())));
                        addrs_set = true;
                    },
                    None => {
                        // Address resolution writes the link header itself.
                        let mut pkt: Packet = match arp.prepare(pkt) {
                            Some(pkt) => pkt,
                            None => {
                                debug!("send(): no packet to send after address resolution (iface={})", idx);
                                return NetVerdict::Drop;
                            },
                        };
                        if !point_at_link_header(&mut pkt) {
                            warn!("send(): resolved packet has no link header (iface={})", idx);
                            return NetVerdict::Drop;
                        }
                        debug!("send(): sending resolved packet to {} (dst={:?})", idx, pkt.ll_dst());
                        iface.queue_tx(pkt);
                        return NetVerdict::Ok;
                    },
                }
            }
        }

        if !addrs_set {
            // A receive buffer reused for a reply still carries the group address it was sent to.
            match pkt.ll_src() {
                Some(src) if !src.is_broadcast() && !src.is_multicast() => (),
                _ => pkt.set_ll_src(Some(LinkAddr::owned(iface.link_addr()))),
            }

            if pkt.ll_dst().is_none() {
                let dst: MacAddress = match ipv6_multicast_dst(&pkt) {
                    Some(dst) => dst,
                    None => broadcast_addr(),
                };
                debug!("send(): destination address was not set, using {}", dst);
                pkt.set_ll_dst(Some(LinkAddr::owned(dst)));
            }
        }

        let ether_type: EtherType2 = EtherType2::for_family(family);
        let vlan_tci: Option<u16> = if self.is_vlan_enabled(idx) {
            if let Err(e) = self.set_vlan_tag(idx, &mut pkt) {
                warn!("send(): {:?} (iface={})", e, idx);
                return NetVerdict::Drop;
            }
            // TODO: Map packet priorities onto 802.1p classes instead of copying them.
            let priority: u8 = pkt.priority();
            pkt.set_vlan_priority(priority);
            Some(pkt.vlan_tci())
        } else {
            None
        };

        let hdr_len: usize = match vlan_tci {
            Some(_) => VLAN_HEADER_SIZE,
            None => ETHERNET2_HEADER_SIZE,
        };
        let reserve: usize = pkt.ll_reserve();
        if reserve < hdr_len {
            warn!("send(): link reserve of {} bytes is too small (iface={})", reserve, idx);
            return NetVerdict::Drop;
        }

        let src: Option<MacAddress> = pkt.ll_src();
        let dst: Option<MacAddress> = pkt.ll_dst();
        let src_slot: Option<LinkAddr> = pkt.ll_src_slot();
        let dst_slot: Option<LinkAddr> = pkt.ll_dst_slot();
        for (i, frag) in pkt.frags_mut().iter_mut().enumerate() {
            // Addresses that already sit in this header need no copy.
            let hdr_start: Option<usize> = frag.data_offset().checked_sub(reserve);
            let in_place = |slot: Option<LinkAddr>, offset: usize| -> bool {
                match (i, hdr_start, slot) {
                    (0, Some(start), Some(slot)) => slot.is_at(start + offset),
                    _ => false,
                }
            };
            let src: Option<MacAddress> = if in_place(src_slot, SRC_ADDR_OFFSET) { None } else { src };
            let dst: Option<MacAddress> = if in_place(dst_slot, DST_ADDR_OFFSET) { None } else { dst };
            fill_header(frag, reserve, ether_type, vlan_tci, src, dst);
        }
        point_at_link_header(&mut pkt);

        trace!("send(): queueing {} bytes on {}", pkt.len(), idx);
        iface.queue_tx(pkt);

        NetVerdict::Ok
    }

    /// Tags `pkt` with the VLAN of the interface that owns its source address. Packets that already carry a tag are
    /// left alone.
    fn set_vlan_tag(&self, iface: IfIndex, pkt: &mut Packet) -> Result<(), Fail> {
        if pkt.vlan_tag() != VLAN_TAG_UNSPEC {
            return Ok(());
        }

        let owner: IfIndex = match self.registry.resolve_owning_interface(pkt) {
            Some(target) if target != iface => {
                debug!("set_vlan_tag(): iface {} should be {}", iface, target);
                target
            },
            _ => iface,
        };

        match self.context.find_tag(owner) {
            Some(tag) => {
                pkt.set_vlan_tag(tag);
                Ok(())
            },
            None => Err(Fail::new(ENOENT, "no vlan for interface")),
        }
    }
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Link destination of an IPv4 datagram sent to a broadcast or multicast group. These need no address resolution.
fn ipv4_link_shortcut(iface: &dyn NetworkInterface, pkt: &Packet) -> Option<MacAddress> {
    let dst: Ipv4Addr = Ipv4HeaderView::parse(pkt.first_frag()?)?.dst_addr();
    if dst.is_broadcast() || iface.ipv4_subnet_broadcast() == Some(dst) {
        Some(broadcast_addr())
    } else if dst.is_multicast() {
        Some(ipv4_mcast_to_mac_addr(&dst))
    } else {
        None
    }
}

/// Link destination of an IPv6 datagram sent to a multicast group.
fn ipv6_multicast_dst(pkt: &Packet) -> Option<MacAddress> {
    if pkt.family()? != AddressFamily::Inet6 {
        return None;
    }
    let dst: Ipv6Addr = Ipv6HeaderView::parse(pkt.first_frag()?)?.dst_addr();
    if dst.is_multicast() {
        Some(ipv6_mcast_to_mac_addr(&dst))
    } else {
        None
    }
}

/// Points the link address slots of `pkt` at the header in front of its first fragment. Returns false if the
/// header does not fit in the fragment's headroom.
fn point_at_link_header(pkt: &mut Packet) -> bool {
    let reserve: usize = pkt.ll_reserve();
    let hdr_start: usize = match pkt.first_frag().and_then(|frag| frag.data_offset().checked_sub(reserve)) {
        Some(hdr_start) => hdr_start,
        None => return false,
    };
    pkt.set_ll_src(Some(LinkAddr::in_header(hdr_start + SRC_ADDR_OFFSET)));
    pkt.set_ll_dst(Some(LinkAddr::in_header(hdr_start + DST_ADDR_OFFSET)));
    pkt.ll_src().is_some() && pkt.ll_dst().is_some()
}
