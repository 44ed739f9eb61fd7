// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Constants
//======================================================================================================================

/// Number of VLAN slots in an Ethernet context.
pub const VLAN_COUNT: usize = 4;

/// Number of interface indices tracked by the enabled-VLAN bitset of an Ethernet context.
pub const MAX_INTERFACE_COUNT: usize = u64::BITS as usize;

/// Tag value that marks a VLAN slot as unused.
pub const VLAN_TAG_UNSPEC: u16 = 0x0fff;

/// Minimum size of an Ethernet frame, excluding the frame check sequence.
pub const ETHERNET_MIN_FRAME_SIZE: usize = 60;
