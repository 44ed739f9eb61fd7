// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

// A NetBuf is one fragment of a packet. It owns a fixed block of storage and exposes a window onto it: bytes before
// the window are headroom (where lower layers write their headers), bytes after it are tailroom. The basic operations
// mirror those of a DPDK MBuf: adjust() pulls bytes off the front, prepend() pushes them back, trim() removes bytes
// from the end. None of them move data.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::fail::Fail;
use ::std::{
    fmt,
    ops::{
        Deref,
        DerefMut,
    },
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// One fragment of a packet's buffer chain.
#[derive(Clone)]
pub struct NetBuf {
    // Backing storage. Never resized after allocation.
    storage: Box<[u8]>,
    // Offset of the first data byte in `storage`.
    data_off: usize,
    // Number of data bytes.
    data_len: usize,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl NetBuf {
    /// Creates an empty fragment with `headroom` bytes reserved in front of the data and room for `capacity` data
    /// bytes.
    pub fn new(headroom: usize, capacity: usize) -> Self {
        Self {
            storage: vec![0; headroom + capacity].into_boxed_slice(),
            data_off: headroom,
            data_len: 0,
        }
    }

    /// Creates a fragment holding a copy of `bytes`, with `headroom` bytes reserved in front of it.
    pub fn from_slice(headroom: usize, bytes: &[u8]) -> Self {
        let mut buf: NetBuf = Self::new(headroom, bytes.len());
        buf.storage[headroom..].copy_from_slice(bytes);
        buf.data_len = bytes.len();
        buf
    }

    /// Returns the number of data bytes in this fragment.
    pub fn len(&self) -> usize {
        self.data_len
    }

    pub fn is_empty(&self) -> bool {
        self.data_len == 0
    }

    /// Returns the number of bytes available in front of the data.
    pub fn headroom(&self) -> usize {
        self.data_off
    }

    /// Returns the number of bytes available after the data.
    pub fn tailroom(&self) -> usize {
        self.storage.len() - self.data_off - self.data_len
    }

    /// Returns the offset of the first data byte in the backing storage.
    pub fn data_offset(&self) -> usize {
        self.data_off
    }

    /// Returns the whole backing storage, headroom and tailroom included.
    pub fn storage(&self) -> &[u8] {
        &self.storage
    }

    /// Removes `nbytes` bytes from the beginning of the fragment. They become headroom.
    pub fn adjust(&mut self, nbytes: usize) -> Result<(), Fail> {
        if nbytes > self.data_len {
            return Err(Fail::new(libc::EINVAL, "tried to remove more bytes than are present"));
        }
        self.data_off += nbytes;
        self.data_len -= nbytes;
        Ok(())
    }

    /// Adds `nbytes` bytes of headroom to the beginning of the fragment.
    pub fn prepend(&mut self, nbytes: usize) -> Result<(), Fail> {
        if nbytes > self.data_off {
            return Err(Fail::new(libc::EINVAL, "tried to prepend more bytes than are available"));
        }
        self.data_off -= nbytes;
        self.data_len += nbytes;
        Ok(())
    }

    /// Removes `nbytes` bytes from the end of the fragment.
    pub fn trim(&mut self, nbytes: usize) -> Result<(), Fail> {
        if nbytes > self.data_len {
            return Err(Fail::new(libc::EINVAL, "tried to remove more bytes than are present"));
        }
        self.data_len -= nbytes;
        Ok(())
    }

    /// Shortens the fragment to `len` bytes. Has no effect if the fragment is already that short.
    pub fn truncate(&mut self, len: usize) {
        self.data_len = self.data_len.min(len);
    }

    /// Copies `bytes` into the tailroom, after the existing data.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), Fail> {
        if bytes.len() > self.tailroom() {
            return Err(Fail::new(libc::ENOSPC, "not enough tailroom"));
        }
        let end: usize = self.data_off + self.data_len;
        self.storage[end..end + bytes.len()].copy_from_slice(bytes);
        self.data_len += bytes.len();
        Ok(())
    }

    /// Returns the last `reserve` bytes of headroom, where a link header of that size sits.
    pub fn link_header(&self, reserve: usize) -> Option<&[u8]> {
        let start: usize = self.data_off.checked_sub(reserve)?;
        Some(&self.storage[start..self.data_off])
    }

    /// Mutable version of [NetBuf::link_header].
    pub fn link_header_mut(&mut self, reserve: usize) -> Option<&mut [u8]> {
        let start: usize = self.data_off.checked_sub(reserve)?;
        Some(&mut self.storage[start..self.data_off])
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Deref for NetBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.storage[self.data_off..self.data_off + self.data_len]
    }
}

impl DerefMut for NetBuf {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.storage[self.data_off..self.data_off + self.data_len]
    }
}

impl fmt::Debug for NetBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetBuf")
            .field("headroom", &self.headroom())
            .field("len", &self.len())
            .field("tailroom", &self.tailroom())
            .finish()
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
