// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    inetstack::protocols::{
        layer2::{
            ethernet2::header::{
                DST_ADDR_OFFSET,
                SRC_ADDR_OFFSET,
            },
            vlan::{
                vlan_get_pcp,
                vlan_get_vid,
            },
            EtherType2,
            Ethernet2Header,
            EthernetL2,
            VlanHeader,
            ETHERNET2_HEADER_SIZE,
            MIN_PAYLOAD_SIZE,
            VLAN_HEADER_SIZE,
        },
        layer3::{
            Ipv4HeaderView,
            Ipv6HeaderView,
        },
    },
    runtime::{
        memory::{
            LinkAddr,
            NetBuf,
            Packet,
        },
        network::{
            types::MacAddress,
            AddressFamily,
            IfIndex,
            NetVerdict,
            NetworkInterface,
        },
    },
};

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl EthernetL2 {
    /// Unframes a packet received on `iface`. On [NetVerdict::Continue] the link header has been stripped and the
    /// packet is ready for the network layer.
    pub fn receive(&self, iface: &dyn NetworkInterface, pkt: &mut Packet) -> NetVerdict {
        let idx: IfIndex = iface.index();
        let vlan_enabled: bool = self.is_vlan_enabled(idx);

        let frag: &NetBuf = match pkt.first_frag() {
            Some(frag) => frag,
            None => {
                debug!("receive(): empty packet (iface={})", idx);
                return NetVerdict::Drop;
            },
        };
        let hdr_start: usize = frag.data_offset();
        let hdr: Ethernet2Header = match Ethernet2Header::parse(frag) {
            Ok(hdr) => hdr,
            Err(e) => {
                debug!("receive(): {:?}", e);
                return NetVerdict::Drop;
            },
        };
        let src: MacAddress = hdr.src_addr();
        let dst: MacAddress = hdr.dst_addr();
        let mut ether_type: u16 = hdr.ether_type();
        let mut hdr_len: usize = ETHERNET2_HEADER_SIZE;
        let mut tci: Option<u16> = None;

        if vlan_enabled && ether_type == u16::from(EtherType2::Vlan) {
            let vlan_hdr: VlanHeader = match VlanHeader::parse(frag) {
                Ok(vlan_hdr) => vlan_hdr,
                Err(e) => {
                    debug!("receive(): {:?}", e);
                    return NetVerdict::Drop;
                },
            };
            tci = Some(vlan_hdr.tci());
            ether_type = vlan_hdr.ether_type();
            hdr_len = VLAN_HEADER_SIZE;
        }

        if let Some(tci) = tci {
            pkt.set_vlan_tci(tci);
        }

        let (ether_type, family): (EtherType2, AddressFamily) =
            match EtherType2::try_from(ether_type).map(|t| (t, t.family())) {
                Ok((t, Some(family))) => (t, family),
                _ => {
                    debug!("receive(): unknown hdr type {:#06x}", ether_type);
                    return NetVerdict::Drop;
                },
            };
        pkt.set_family(family);

        pkt.set_ll_src(Some(LinkAddr::in_header(hdr_start + SRC_ADDR_OFFSET)));
        pkt.set_ll_dst(Some(LinkAddr::in_header(hdr_start + DST_ADDR_OFFSET)));

        match tci {
            Some(tci) => debug!(
                "receive(): iface={} src={} dst={} type={:?} tag={} pri={} len={}",
                idx,
                src,
                dst,
                ether_type,
                vlan_get_vid(tci),
                vlan_get_pcp(tci),
                pkt.len()
            ),
            None => debug!(
                "receive(): iface={} src={} dst={} type={:?} len={}",
                idx,
                src,
                dst,
                ether_type,
                pkt.len()
            ),
        }

        if !dst.is_broadcast() && !dst.is_multicast() && dst != iface.link_addr() {
            debug!("receive(): dropping frame, not for me [{}]", iface.link_addr());
            return NetVerdict::Drop;
        }

        pkt.set_ll_reserve(hdr_len);
        if let Some(frag) = pkt.first_frag_mut() {
            if let Err(e) = frag.adjust(hdr_len) {
                warn!("receive(): cannot strip link header: {:?}", e);
                return NetVerdict::Drop;
            }
        }

        if ether_type == EtherType2::Arp {
            return match &self.arp {
                Some(arp) => {
                    debug!("receive(): ARP packet from {} received", src);
                    arp.input(iface, pkt)
                },
                None => {
                    debug!("receive(): dropping ARP packet, address resolution is disabled");
                    NetVerdict::Drop
                },
            };
        }

        update_length(pkt);

        NetVerdict::Continue
    }
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Removes the padding added to frames shorter than the Ethernet minimum. The declared length of the datagram is
/// read from the network header at the front of the packet.
fn update_length(pkt: &mut Packet) {
    let declared: Option<usize> = pkt.first_frag().and_then(|frag| match pkt.family()? {
        AddressFamily::Inet => Some(Ipv4HeaderView::parse(frag)?.total_length()),
        AddressFamily::Inet6 => Some(Ipv6HeaderView::parse(frag)?.total_length()),
    });

    if let Some(len) = declared {
        if len < MIN_PAYLOAD_SIZE && len < pkt.len() {
            trace!("update_length(): {} -> {}", pkt.len(), len);
            pkt.truncate(len);
        }
    }
}
