// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//==============================================================================
// Structures
//==============================================================================

/// Ethernet Configuration Descriptor
#[derive(Clone, Debug)]
pub struct EthernetConfig {
    /// Resolve IPv4 destinations through ARP?
    enable_arp: bool,
    /// Process VLAN tags?
    enable_vlan: bool,
    /// VLAN tags to enable on start up.
    vlan_tags: Vec<u16>,
}

//==============================================================================
// Associate Functions
//==============================================================================

/// Associate Functions for Ethernet Configuration Descriptor
impl EthernetConfig {
    /// Creates an Ethernet Configuration Descriptor.
    pub fn new(enable_arp: Option<bool>, enable_vlan: Option<bool>, vlan_tags: Option<Vec<u16>>) -> Self {
        let mut config: EthernetConfig = Self::default();

        if let Some(enable_arp) = enable_arp {
            config.set_enable_arp(enable_arp);
        }
        if let Some(enable_vlan) = enable_vlan {
            config.set_enable_vlan(enable_vlan);
        }
        if let Some(vlan_tags) = vlan_tags {
            config.set_vlan_tags(vlan_tags);
        }

        config
    }

    /// Gets the ARP option in the target [EthernetConfig].
    pub fn get_enable_arp(&self) -> bool {
        self.enable_arp
    }

    /// Gets the VLAN option in the target [EthernetConfig].
    pub fn get_enable_vlan(&self) -> bool {
        self.enable_vlan
    }

    /// Gets the start up VLAN tags in the target [EthernetConfig].
    pub fn get_vlan_tags(&self) -> &[u16] {
        &self.vlan_tags
    }

    /// Sets the ARP option in the target [EthernetConfig].
    fn set_enable_arp(&mut self, enable_arp: bool) {
        self.enable_arp = enable_arp
    }

    /// Sets the VLAN option in the target [EthernetConfig].
    fn set_enable_vlan(&mut self, enable_vlan: bool) {
        self.enable_vlan = enable_vlan
    }

    /// Sets the start up VLAN tags in the target [EthernetConfig].
    fn set_vlan_tags(&mut self, vlan_tags: Vec<u16>) {
        self.vlan_tags = vlan_tags
    }
}

//==============================================================================
// Trait Implementations
//==============================================================================

/// Default Trait Implementation for Ethernet Configuration Descriptor
impl Default for EthernetConfig {
    /// Creates an Ethernet Configuration Descriptor with the default values.
    fn default() -> Self {
        EthernetConfig {
            enable_arp: true,
            enable_vlan: true,
            vlan_tags: Vec::new(),
        }
    }
}

//==============================================================================
// Unit Tests
//==============================================================================
