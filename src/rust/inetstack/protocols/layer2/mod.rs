// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

pub mod ethernet2;
mod receive;
mod transmit;
pub mod vlan;


//======================================================================================================================
// Exports
//======================================================================================================================

pub use self::{
    ethernet2::{
        header::{
            fill_header,
            Ethernet2Header,
            VlanHeader,
            ETHERNET2_HEADER_SIZE,
            MIN_PAYLOAD_SIZE,
            VLAN_HEADER_SIZE,
        },
        multicast::{
            broadcast_addr,
            ipv4_mcast_to_mac_addr,
            ipv6_mcast_to_mac_addr,
        },
        protocol::EtherType2,
    },
    vlan::{
        EthernetContext,
        VlanEntry,
    },
};

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::{
    fail::Fail,
    network::{
        config::EthernetConfig,
        consts::VLAN_COUNT,
        ArpResolver,
        IfIndex,
        InterfaceRegistry,
        NetworkInterface,
    },
};
use ::arrayvec::ArrayVec;
use ::libc::ENOTSUP;
use ::std::sync::Arc;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Ethernet link layer. Frames packets on their way to the interface and unframes them on their way up.
pub struct EthernetL2 {
    config: EthernetConfig,
    context: Arc<EthernetContext>,
    arp: Option<Arc<dyn ArpResolver>>,
    registry: Arc<dyn InterfaceRegistry>,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl EthernetL2 {
    pub fn new(
        config: EthernetConfig,
        registry: Arc<dyn InterfaceRegistry>,
        arp: Option<Arc<dyn ArpResolver>>,
    ) -> Self {
        Self::with_context(config, Arc::new(EthernetContext::new()), registry, arp)
    }

    /// Creates a link layer that shares `context` with other instances (e.g. the sub-interfaces of one device).
    pub fn with_context(
        config: EthernetConfig,
        context: Arc<EthernetContext>,
        registry: Arc<dyn InterfaceRegistry>,
        arp: Option<Arc<dyn ArpResolver>>,
    ) -> Self {
        let arp: Option<Arc<dyn ArpResolver>> = if config.get_enable_arp() { arp } else { None };
        Self {
            config,
            context,
            arp,
            registry,
        }
    }

    pub fn config(&self) -> &EthernetConfig {
        &self.config
    }

    pub fn context(&self) -> &Arc<EthernetContext> {
        &self.context
    }

    /// Attaches `iface` to this layer and turns on the VLAN tags configured for start up.
    pub fn init(&self, iface: &dyn NetworkInterface) {
        if !self.config.get_enable_vlan() {
            return;
        }

        self.context.init(iface);
        for tag in self.config.get_vlan_tags() {
            // Every tag needs a slot of its own.
            self.context.init(iface);
            if let Err(e) = self.context.enable(iface, *tag) {
                warn!("init(): cannot enable vlan tag {} on {}: {:?}", tag, iface.index(), e);
            }
        }
    }

    /// Number of headroom bytes the link header of a frame sent through `iface` takes.
    pub fn header_reserve(&self, iface: IfIndex) -> usize {
        if self.is_vlan_enabled(iface) {
            VLAN_HEADER_SIZE
        } else {
            ETHERNET2_HEADER_SIZE
        }
    }

    /// Brings the link layer of `iface` up or down. Going down flushes the address resolution cache.
    pub fn enable(&self, iface: &dyn NetworkInterface, state: bool) -> Result<(), Fail> {
        debug!("enable(): iface={} state={}", iface.index(), state);
        if !state {
            if let Some(arp) = &self.arp {
                arp.clear_cache();
            }
        }
        Ok(())
    }

    /// Returns true if frames on `iface` carry VLAN tags.
    pub fn is_vlan_enabled(&self, iface: IfIndex) -> bool {
        self.config.get_enable_vlan() && self.context.is_vlan_enabled(iface)
    }

    pub fn vlan_enable(&self, iface: &dyn NetworkInterface, tag: u16) -> Result<(), Fail> {
        self.check_vlan_support()?;
        self.context.enable(iface, tag)
    }

    pub fn vlan_disable(&self, iface: &dyn NetworkInterface, tag: u16) -> Result<(), Fail> {
        self.check_vlan_support()?;
        self.context.disable(iface, tag)
    }

    /// Interface that receives frames tagged with `tag`.
    pub fn get_vlan_iface(&self, tag: u16) -> Option<IfIndex> {
        self.context.get_vlan_iface(tag)
    }

    pub fn get_vlan_tag(&self, iface: IfIndex) -> u16 {
        self.context.get_vlan_tag(iface)
    }

    pub fn vlan_entries(&self) -> ArrayVec<VlanEntry, VLAN_COUNT> {
        self.context.entries()
    }

    fn check_vlan_support(&self) -> Result<(), Fail> {
        if !self.config.get_enable_vlan() {
            return Err(Fail::new(ENOTSUP, "vlan support is disabled"));
        }
        Ok(())
    }
}
