// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![cfg_attr(feature = "strict", deny(warnings))]
#![deny(clippy::all)]

#[macro_use]
extern crate log;

pub mod inetstack;
pub mod runtime;

pub use self::{
    inetstack::protocols::layer2::{
        EtherType2,
        EthernetContext,
        EthernetL2,
        VlanEntry,
    },
    runtime::{
        fail::Fail,
        memory::{
            NetBuf,
            Packet,
        },
        network::{
            types::MacAddress,
            AddressFamily,
            ArpResolver,
            EthernetHwCaps,
            IfIndex,
            InterfaceRegistry,
            L2Kind,
            NetVerdict,
            NetworkInterface,
        },
    },
};

//======================================================================================================================
// Macros
//======================================================================================================================

/// Ensures that two expressions are equal, bailing out of the enclosing `anyhow::Result` function otherwise.
#[macro_export]
macro_rules! ensure_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    ::anyhow::bail!(
                        "ensure_eq failed at {}:{}: left={:?} right={:?}",
                        file!(),
                        line!(),
                        left_val,
                        right_val
                    );
                }
            },
        }
    };
}

/// Ensures that two expressions are not equal, bailing out of the enclosing `anyhow::Result` function otherwise.
#[macro_export]
macro_rules! ensure_neq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                if *left_val == *right_val {
                    ::anyhow::bail!(
                        "ensure_neq failed at {}:{}: left={:?} right={:?}",
                        file!(),
                        line!(),
                        left_val,
                        right_val
                    );
                }
            },
        }
    };
}
