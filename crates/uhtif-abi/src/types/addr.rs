// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Target address and window offset types.

use core::fmt;
use core::ops::Add;

/// An address in the remote core's physical address space.
///
/// Target addresses are what the remote core sees. They're used for:
/// - Program image placement by the loader
/// - The `tohost`/`fromhost` mailbox words
/// - Device registers such as the CLINT `msip` word
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Taddr(u64);

impl Taddr {
    /// Create a new target address.
    #[inline]
    #[must_use]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Get the raw address value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Add an offset to this address.
    #[inline]
    #[must_use]
    pub const fn add(self, offset: u64) -> Self {
        Self(self.0.wrapping_add(offset))
    }

    /// Add an offset, returning `None` if the result would wrap.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, offset: u64) -> Option<Self> {
        match self.0.checked_add(offset) {
            Some(addr) => Some(Self(addr)),
            None => None,
        }
    }

    /// Distance from `base` up to this address.
    ///
    /// Returns `None` if this address lies below `base`.
    #[inline]
    #[must_use]
    pub const fn offset_from(self, base: Self) -> Option<u64> {
        self.0.checked_sub(base.0)
    }

    /// Align this address down to the given alignment.
    ///
    /// Returns `None` if alignment is zero or not a power of two.
    #[inline]
    #[must_use]
    pub const fn align_down(self, alignment: u64) -> Option<Self> {
        if !alignment.is_power_of_two() {
            return None;
        }
        let mask = alignment - 1;
        Some(Self(self.0 & !mask))
    }
}

impl fmt::Debug for Taddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Taddr({:#x})", self.0)
    }
}

impl fmt::Display for Taddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u64> for Taddr {
    fn from(addr: u64) -> Self {
        Self(addr)
    }
}

impl Add<u64> for Taddr {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        self.add(rhs)
    }
}

/// A byte offset into the host-mapped window.
///
/// Offset 0 is the first byte of the mapping. An offset is only meaningful
/// together with the window size it was computed for.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct WindowOffset(u64);

impl WindowOffset {
    /// The first byte of the window.
    pub const ZERO: Self = Self(0);

    /// Create a new window offset.
    #[inline]
    #[must_use]
    pub const fn new(offset: u64) -> Self {
        Self(offset)
    }

    /// Get the raw offset value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Add a byte count, returning `None` if the result would wrap.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, len: u64) -> Option<Self> {
        match self.0.checked_add(len) {
            Some(offset) => Some(Self(offset)),
            None => None,
        }
    }
}

impl fmt::Debug for WindowOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowOffset({:#x})", self.0)
    }
}

impl fmt::Display for WindowOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{:#x}", self.0)
    }
}

impl From<u64> for WindowOffset {
    fn from(offset: u64) -> Self {
        Self(offset)
    }
}
