// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::runtime::{
    fail::Fail,
    network::AddressFamily,
};
use ::libc::ENOTSUP;

#[repr(u16)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EtherType2 {
    Ipv4 = 0x0800,
    Arp = 0x0806,
    Vlan = 0x8100,
    Ipv6 = 0x86dd,
}

impl EtherType2 {
    /// Address family of the payload. ARP rides in the IPv4 family. A VLAN tag is not a payload and has none.
    pub fn family(self) -> Option<AddressFamily> {
        match self {
            EtherType2::Ipv4 | EtherType2::Arp => Some(AddressFamily::Inet),
            EtherType2::Ipv6 => Some(AddressFamily::Inet6),
            EtherType2::Vlan => None,
        }
    }

    /// Protocol type used to frame a packet of the given family.
    pub fn for_family(family: AddressFamily) -> Self {
        match family {
            AddressFamily::Inet => EtherType2::Ipv4,
            AddressFamily::Inet6 => EtherType2::Ipv6,
        }
    }
}

impl TryFrom<u16> for EtherType2 {
    type Error = Fail;

    fn try_from(n: u16) -> Result<Self, Fail> {
        match n {
            0x0800 => Ok(EtherType2::Ipv4),
            0x0806 => Ok(EtherType2::Arp),
            0x8100 => Ok(EtherType2::Vlan),
            0x86dd => Ok(EtherType2::Ipv6),
            _ => Err(Fail::new(ENOTSUP, "unsupported ETHERTYPE")),
        }
    }
}

impl From<EtherType2> for u16 {
    fn from(ether_type: EtherType2) -> u16 {
        ether_type as u16
    }
}
