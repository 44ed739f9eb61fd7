// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod context;
mod tci;


//======================================================================================================================
// Exports
//======================================================================================================================

pub use self::{
    context::{
        EthernetContext,
        VlanEntry,
    },
    tci::{
        vlan_get_dei,
        vlan_get_pcp,
        vlan_get_vid,
        vlan_set_pcp,
        vlan_set_vid,
    },
};
