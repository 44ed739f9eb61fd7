// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::{
    fail::Fail,
    network::{
        consts::{
            MAX_INTERFACE_COUNT,
            VLAN_COUNT,
            VLAN_TAG_UNSPEC,
        },
        EthernetHwCaps,
        IfIndex,
        L2Kind,
        NetworkInterface,
    },
};
use ::arrayvec::ArrayVec;
use ::bit_iter::BitIter;
use ::libc::{
    EALREADY,
    EBADF,
    EINVAL,
    ENOSPC,
    EPERM,
    ESRCH,
};
use ::std::sync::{
    atomic::{
        AtomicU64,
        AtomicUsize,
        Ordering,
    },
    Mutex,
    MutexGuard,
    PoisonError,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// One slot of the VLAN table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VlanEntry {
    tag: u16,
    iface: Option<IfIndex>,
}

/// Slots of the table together with the initialization flag. Both change under the same lock.
#[derive(Debug)]
struct VlanTable {
    entries: [VlanEntry; VLAN_COUNT],
    is_init: bool,
}

/// Per-instance state of the Ethernet layer: the VLAN table plus the cached summaries read on the data path.
///
/// The table is only changed by [EthernetContext::init], [EthernetContext::enable] and [EthernetContext::disable],
/// which serialize on a lock. The data path only looks at the enabled count and the interface bitset, which are
/// atomics and can be read while a change is in flight.
#[derive(Debug)]
pub struct EthernetContext {
    table: Mutex<VlanTable>,
    /// Number of tags currently enabled, clamped to [VLAN_COUNT].
    enabled_count: AtomicUsize,
    /// Bit `i` is set when the interface with index `i` has VLAN processing turned on.
    interfaces: AtomicU64,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl VlanEntry {
    const FREE: Self = Self {
        tag: VLAN_TAG_UNSPEC,
        iface: None,
    };

    /// Tag held by this slot, [VLAN_TAG_UNSPEC] if none.
    pub fn tag(&self) -> u16 {
        self.tag
    }

    /// Interface this slot is bound to.
    pub fn iface(&self) -> Option<IfIndex> {
        self.iface
    }

    /// Returns true if this slot is bound to `iface` and holds no tag.
    fn is_free_for(&self, iface: IfIndex) -> bool {
        self.iface == Some(iface) && self.tag == VLAN_TAG_UNSPEC
    }

    fn matches(&self, iface: IfIndex, tag: u16) -> bool {
        self.iface == Some(iface) && self.tag == tag
    }
}

impl EthernetContext {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(VlanTable {
                entries: [VlanEntry::FREE; VLAN_COUNT],
                is_init: false,
            }),
            enabled_count: AtomicUsize::new(0),
            interfaces: AtomicU64::new(0),
        }
    }

    /// Binds `iface` to the first unbound slot of the table. Interfaces whose device cannot handle VLANs are skipped.
    /// Calling this again for an interface that still has an untagged slot has no effect.
    pub fn init(&self, iface: &dyn NetworkInterface) {
        if !iface.hw_capabilities().contains(EthernetHwCaps::VLAN) {
            return;
        }

        let idx: IfIndex = iface.index();
        let mut table: MutexGuard<VlanTable> = self.lock();
        debug!("init(): iface={}", idx);

        if !table.entries.iter().any(|entry| entry.is_free_for(idx)) {
            let is_init: bool = table.is_init;
            match table
                .entries
                .iter_mut()
                .enumerate()
                .find(|(_, entry)| entry.iface.is_none())
            {
                Some((i, entry)) => {
                    debug!("init(): slot {} bound to {}", i, idx);
                    entry.tag = VLAN_TAG_UNSPEC;
                    entry.iface = Some(idx);
                    if !is_init {
                        self.interfaces.store(0, Ordering::Release);
                    }
                },
                None => warn!("init(): no free VLAN slot for {}", idx),
            }
        }

        table.is_init = true;
    }

    /// Turns on VLAN `tag` for `iface`, consuming one of the untagged slots bound to it.
    pub fn enable(&self, iface: &dyn NetworkInterface, tag: u16) -> Result<(), Fail> {
        if iface.l2_kind() != L2Kind::Ethernet {
            return Err(Fail::new(EINVAL, "not an ethernet interface"));
        }

        let idx: IfIndex = iface.index();
        let mut table: MutexGuard<VlanTable> = self.lock();
        if !table.is_init {
            return Err(Fail::new(EPERM, "ethernet context not initialized"));
        }
        if !is_valid_tag(tag) {
            return Err(Fail::new(EBADF, "invalid vlan tag"));
        }
        // The fast path tracks enabled interfaces in a 64-bit set.
        if interface_bit(idx).is_none() {
            return Err(Fail::new(EINVAL, "interface index out of range"));
        }
        if table.entries.iter().any(|entry| entry.matches(idx, tag)) {
            return Err(Fail::new(EALREADY, "vlan tag already enabled"));
        }

        let (i, entry): (usize, &mut VlanEntry) = match table
            .entries
            .iter_mut()
            .enumerate()
            .find(|(_, entry)| entry.is_free_for(idx))
        {
            Some(found) => found,
            None => return Err(Fail::new(ENOSPC, "no free vlan slot")),
        };
        debug!("enable(): slot {} tag={} iface={}", i, tag, idx);
        entry.tag = tag;

        self.set_interface(idx);
        if let Err(e) = iface.vlan_setup(tag, true) {
            warn!("enable(): vlan setup failed (iface={}, tag={}): {:?}", idx, tag, e);
        }
        let _ = self
            .enabled_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some((n + 1).min(VLAN_COUNT)));

        Ok(())
    }

    /// Turns off VLAN `tag` for `iface`. The slot stays bound to the interface and can be reused.
    pub fn disable(&self, iface: &dyn NetworkInterface, tag: u16) -> Result<(), Fail> {
        if iface.l2_kind() != L2Kind::Ethernet {
            return Err(Fail::new(EINVAL, "not an ethernet interface"));
        }
        if !is_valid_tag(tag) {
            return Err(Fail::new(EBADF, "invalid vlan tag"));
        }

        let idx: IfIndex = iface.index();
        let mut table: MutexGuard<VlanTable> = self.lock();
        let entry: &mut VlanEntry = match table.entries.iter_mut().find(|entry| entry.matches(idx, tag)) {
            Some(entry) => entry,
            None => return Err(Fail::new(ESRCH, "vlan tag not found")),
        };
        debug!("disable(): tag={} iface={}", tag, idx);
        entry.tag = VLAN_TAG_UNSPEC;

        // Other tags may still be active on this interface.
        if !table
            .entries
            .iter()
            .any(|entry| entry.iface == Some(idx) && entry.tag != VLAN_TAG_UNSPEC)
        {
            self.clear_interface(idx);
        }
        if let Err(e) = iface.vlan_setup(tag, false) {
            warn!("disable(): vlan setup failed (iface={}, tag={}): {:?}", idx, tag, e);
        }
        let _ = self
            .enabled_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some(n.saturating_sub(1)));

        Ok(())
    }

    /// Returns true if frames on `iface` carry VLAN tags.
    pub fn is_vlan_enabled(&self, iface: IfIndex) -> bool {
        match self.enabled_count.load(Ordering::Acquire) {
            0 => false,
            // Every slot holds a tag, so every bound interface takes part.
            VLAN_COUNT => true,
            _ => self.is_interface_set(iface),
        }
    }

    /// Returns the interface bound to `tag`. If no slot holds that tag, falls back to the first interface that has
    /// an untagged slot.
    pub fn get_vlan_iface(&self, tag: u16) -> Option<IfIndex> {
        let table: MutexGuard<VlanTable> = self.lock();
        let mut first_untagged: Option<IfIndex> = None;
        for entry in table.entries.iter() {
            if entry.tag == VLAN_TAG_UNSPEC {
                if first_untagged.is_none() {
                    first_untagged = entry.iface;
                }
                continue;
            }
            if entry.tag == tag {
                trace!("get_vlan_iface(): tag={} iface={:?}", tag, entry.iface);
                return entry.iface;
            }
        }
        first_untagged
    }

    /// Returns the tag of the first slot bound to `iface`, [VLAN_TAG_UNSPEC] if there is none.
    pub fn get_vlan_tag(&self, iface: IfIndex) -> u16 {
        self.lock()
            .entries
            .iter()
            .find(|entry| entry.iface == Some(iface))
            .map_or(VLAN_TAG_UNSPEC, |entry| entry.tag)
    }

    /// Returns the first tag enabled on `iface`, skipping untagged slots.
    pub fn find_tag(&self, iface: IfIndex) -> Option<u16> {
        self.lock()
            .entries
            .iter()
            .find(|entry| entry.iface == Some(iface) && entry.tag != VLAN_TAG_UNSPEC)
            .map(|entry| entry.tag)
    }

    /// Snapshot of the bound slots.
    pub fn entries(&self) -> ArrayVec<VlanEntry, VLAN_COUNT> {
        self.lock()
            .entries
            .iter()
            .filter(|entry| entry.iface.is_some())
            .copied()
            .collect()
    }

    /// Interfaces that currently have VLAN processing turned on.
    pub fn enabled_interfaces(&self) -> Vec<IfIndex> {
        BitIter::from(self.interfaces.load(Ordering::Acquire)).map(IfIndex).collect()
    }

    /// Number of tags currently enabled.
    pub fn enabled_count(&self) -> usize {
        self.enabled_count.load(Ordering::Acquire)
    }

    pub fn is_init(&self) -> bool {
        self.lock().is_init
    }

    fn lock(&self) -> MutexGuard<VlanTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_interface(&self, iface: IfIndex) {
        if let Some(bit) = interface_bit(iface) {
            self.interfaces.fetch_or(bit, Ordering::AcqRel);
        }
    }

    fn clear_interface(&self, iface: IfIndex) {
        if let Some(bit) = interface_bit(iface) {
            self.interfaces.fetch_and(!bit, Ordering::AcqRel);
        }
    }

    fn is_interface_set(&self, iface: IfIndex) -> bool {
        match interface_bit(iface) {
            Some(bit) => self.interfaces.load(Ordering::Acquire) & bit != 0,
            None => false,
        }
    }
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Returns true if `tag` fits the 12-bit identifier field and is not the unused marker.
fn is_valid_tag(tag: u16) -> bool {
    tag < VLAN_TAG_UNSPEC
}

fn interface_bit(iface: IfIndex) -> Option<u64> {
    if iface.0 < MAX_INTERFACE_COUNT {
        Some(1 << iface.0)
    } else {
        None
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for EthernetContext {
    fn default() -> Self {
        Self::new()
    }
}
