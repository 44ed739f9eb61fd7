// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod common;

//==============================================================================
// Imports
//==============================================================================

use crate::common::{
    Nic,
    ALICE_MAC,
    BOB_MAC,
};
use ::anyhow::Result;
use ::crossbeam_channel::{
    Receiver,
    Sender,
    TryRecvError,
};
use ::ethl2::{
    runtime::network::consts::{
        VLAN_COUNT,
        VLAN_TAG_UNSPEC,
    },
    EthernetL2,
    Fail,
    IfIndex,
    NetworkInterface,
};
use ::libc::{
    EALREADY,
    EBADF,
    ESRCH,
};
use ::std::{
    sync::Arc,
    thread::{
        self,
        JoinHandle,
    },
};

//==============================================================================
// Constants
//==============================================================================

const NUM_READERS: usize = 4;
const NUM_ROUNDS: u16 = 256;

//==============================================================================
// Tests
//==============================================================================

#[test]
fn vlan_control_reports_status_codes() -> Result<()> {
    let l2: EthernetL2 = common::new_link_layer()?;
    let nic: Nic = Nic::new(1, ALICE_MAC);
    l2.init(&nic);

    ethl2::ensure_eq!(Fail::status_of(&l2.vlan_enable(&nic, 5)), 0);
    ethl2::ensure_eq!(Fail::status_of(&l2.vlan_enable(&nic, 5)), -EALREADY);
    ethl2::ensure_eq!(Fail::status_of(&l2.vlan_enable(&nic, VLAN_TAG_UNSPEC)), -EBADF);
    ethl2::ensure_eq!(Fail::status_of(&l2.vlan_disable(&nic, 6)), -ESRCH);
    ethl2::ensure_eq!(Fail::status_of(&l2.vlan_disable(&nic, 5)), 0);

    // Only the calls that changed the table reached the driver.
    ethl2::ensure_eq!(nic.vlan_setups(), 2);
    Ok(())
}

#[test]
fn vlan_tags_are_per_interface() -> Result<()> {
    let l2: EthernetL2 = common::new_link_layer()?;
    let alice: Nic = Nic::new(1, ALICE_MAC);
    let bob: Nic = Nic::new(2, BOB_MAC);
    l2.init(&alice);
    l2.init(&bob);

    l2.vlan_enable(&alice, 100)?;
    l2.vlan_enable(&bob, 200)?;
    ethl2::ensure_eq!(l2.header_reserve(alice.index()), 18);
    ethl2::ensure_eq!(l2.get_vlan_tag(bob.index()), 200);
    ethl2::ensure_eq!(l2.get_vlan_iface(100), Some(alice.index()));
    ethl2::ensure_eq!(l2.vlan_entries().len(), 2);

    l2.vlan_disable(&alice, 100)?;
    ethl2::ensure_eq!(l2.header_reserve(alice.index()), 14);
    ethl2::ensure_eq!(l2.header_reserve(bob.index()), 18);
    ethl2::ensure_eq!(l2.context().enabled_interfaces(), vec![bob.index()]);
    Ok(())
}

#[test]
fn readers_see_consistent_vlan_state() -> Result<()> {
    let l2: Arc<EthernetL2> = Arc::new(common::new_link_layer()?);
    let nic: Arc<Nic> = Arc::new(Nic::new(1, ALICE_MAC));
    l2.init(nic.as_ref());

    // The control thread hangs up once it is done, which tells readers to stop.
    let (done_tx, done_rx): (Sender<()>, Receiver<()>) = crossbeam_channel::bounded(0);
    let (seen_tx, seen_rx): (Sender<usize>, Receiver<usize>) = crossbeam_channel::unbounded();

    let mut readers: Vec<JoinHandle<Result<()>>> = Vec::with_capacity(NUM_READERS);
    for _ in 0..NUM_READERS {
        let l2: Arc<EthernetL2> = l2.clone();
        let idx: IfIndex = nic.index();
        let done_rx: Receiver<()> = done_rx.clone();
        let seen_tx: Sender<usize> = seen_tx.clone();
        readers.push(thread::spawn(move || -> Result<()> {
            let mut seen: usize = 0;
            while let Err(TryRecvError::Empty) = done_rx.try_recv() {
                let reserve: usize = l2.header_reserve(idx);
                anyhow::ensure!(reserve == 14 || reserve == 18, "bad header reserve {}", reserve);
                anyhow::ensure!(l2.context().enabled_count() <= VLAN_COUNT);
                seen += 1;
            }
            seen_tx.send(seen)?;
            Ok(())
        }));
    }
    drop(done_rx);
    drop(seen_tx);

    let control: JoinHandle<Result<()>> = {
        let l2: Arc<EthernetL2> = l2.clone();
        let nic: Arc<Nic> = nic.clone();
        thread::spawn(move || -> Result<()> {
            for round in 0..NUM_ROUNDS {
                let tag: u16 = 1 + (round % 100);
                l2.vlan_enable(nic.as_ref(), tag)?;
                l2.vlan_disable(nic.as_ref(), tag)?;
            }
            drop(done_tx);
            Ok(())
        })
    };

    match control.join() {
        Ok(result) => result?,
        Err(_) => anyhow::bail!("control thread panicked"),
    }
    for reader in readers {
        match reader.join() {
            Ok(result) => result?,
            Err(_) => anyhow::bail!("reader thread panicked"),
        }
    }

    let reports: Vec<usize> = seen_rx.iter().collect();
    ethl2::ensure_eq!(reports.len(), NUM_READERS);
    ethl2::ensure_eq!(l2.context().enabled_count(), 0);
    ethl2::ensure_eq!(l2.is_vlan_enabled(nic.index()), false);
    ethl2::ensure_eq!(nic.vlan_setups(), 2 * NUM_ROUNDS as usize);
    Ok(())
}
