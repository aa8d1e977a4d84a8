// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Mock window implementation for testing.
//!
//! This module provides a window backed by a heap-allocated buffer, allowing
//! the transport to be tested without a UIO device. Every store and barrier
//! is recorded so tests can assert exactly what the transport touched.

use std::cell::Cell;

use uhtif_abi::WindowOffset;

use super::{WindowError, WindowMemory, checked_range};

/// Kind of store recorded by [`MockWindow`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessKind {
    /// Bytes copied in with `write`.
    Write,
    /// Bytes cleared with `zero`.
    Zero,
}

/// One store performed on a [`MockWindow`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessRecord {
    /// Store kind.
    pub kind: AccessKind,
    /// First window offset written.
    pub offset: WindowOffset,
    /// Number of bytes written.
    pub len: usize,
    /// Barriers issued before this store.
    pub barriers_before: usize,
}

/// A window backed by a heap-allocated buffer.
pub struct MockWindow {
    memory: Box<[u8]>,
    stores: Vec<AccessRecord>,
    barriers: Cell<usize>,
}

impl MockWindow {
    /// Create a zero-filled mock window of `size` bytes.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            memory: vec![0u8; size].into_boxed_slice(),
            stores: Vec::new(),
            barriers: Cell::new(0),
        }
    }

    /// Get raw access to the backing memory.
    #[must_use]
    pub fn raw_memory(&self) -> &[u8] {
        &self.memory
    }

    /// Get mutable raw access to the backing memory.
    ///
    /// Stores through this slice are not recorded; use it to play the part
    /// of the remote core.
    #[must_use]
    pub fn raw_memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    /// Stores performed through [`WindowMemory`], oldest first.
    #[must_use]
    pub fn stores(&self) -> &[AccessRecord] {
        &self.stores
    }

    /// Number of barriers issued so far.
    #[must_use]
    pub fn barrier_count(&self) -> usize {
        self.barriers.get()
    }

    fn record(&mut self, kind: AccessKind, offset: WindowOffset, len: usize) {
        self.stores.push(AccessRecord {
            kind,
            offset,
            len,
            barriers_before: self.barriers.get(),
        });
    }
}

impl core::fmt::Debug for MockWindow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MockWindow")
            .field("size", &self.memory.len())
            .field("stores", &self.stores.len())
            .field("barriers", &self.barriers.get())
            .finish()
    }
}

impl WindowMemory for MockWindow {
    fn size(&self) -> u64 {
        self.memory.len() as u64
    }

    fn read(&self, offset: WindowOffset, dst: &mut [u8]) -> Result<(), WindowError> {
        let range = checked_range(offset, dst.len(), self.size())?;
        dst.copy_from_slice(&self.memory[range]);
        Ok(())
    }

    fn write(&mut self, offset: WindowOffset, src: &[u8]) -> Result<(), WindowError> {
        let range = checked_range(offset, src.len(), self.size())?;
        self.memory[range].copy_from_slice(src);
        self.record(AccessKind::Write, offset, src.len());
        Ok(())
    }

    fn zero(&mut self, offset: WindowOffset, len: usize) -> Result<(), WindowError> {
        let range = checked_range(offset, len, self.size())?;
        self.memory[range].fill(0);
        self.record(AccessKind::Zero, offset, len);
        Ok(())
    }

    fn barrier(&self) {
        std::sync::atomic::fence(std::sync::atomic::Ordering::SeqCst);
        self.barriers.set(self.barriers.get() + 1);
    }
}
