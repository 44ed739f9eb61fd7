// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

// Tag control information layout (IEEE 802.1Q):
//
//   15      13  12  11                      0
//  +----------+----+-------------------------+
//  |   PCP    |DEI |          VID            |
//  +----------+----+-------------------------+

//======================================================================================================================
// Constants
//======================================================================================================================

const VID_MASK: u16 = 0x0fff;
const DEI_SHIFT: u16 = 12;
const PCP_SHIFT: u16 = 13;
const PCP_MASK: u16 = 0x7;

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// VLAN identifier.
pub fn vlan_get_vid(tci: u16) -> u16 {
    tci & VID_MASK
}

/// Drop eligible indicator.
pub fn vlan_get_dei(tci: u16) -> bool {
    (tci >> DEI_SHIFT) & 1 == 1
}

/// Priority code point.
pub fn vlan_get_pcp(tci: u16) -> u8 {
    ((tci >> PCP_SHIFT) & PCP_MASK) as u8
}

/// Replaces the VLAN identifier of `tci`. Bits of `vid` above the 12-bit field are ignored.
pub fn vlan_set_vid(tci: u16, vid: u16) -> u16 {
    (tci & !VID_MASK) | (vid & VID_MASK)
}

/// Replaces the priority code point of `tci`. Bits of `pcp` above the 3-bit field are ignored.
pub fn vlan_set_pcp(tci: u16, pcp: u8) -> u16 {
    (tci & !(PCP_MASK << PCP_SHIFT)) | (((pcp as u16) & PCP_MASK) << PCP_SHIFT)
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
