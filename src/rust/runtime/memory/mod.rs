// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod netbuf;
mod packet;

//======================================================================================================================
// Exports
//======================================================================================================================

pub use self::{
    netbuf::NetBuf,
    packet::{
        LinkAddr,
        LinkAddrLocation,
        LinkType,
        Packet,
    },
};
