// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Region descriptors and the fixed region map.
//!
//! A [`RegionMap`] places the three target regions into one host window:
//!
//! ```text
//! window offset 0                         window_size - 16K  - 8K   end
//! +----------------------------------------+----------+---------+
//! | DRAM (dram_size)            | unused   | Boot ROM |  CLINT  |
//! +----------------------------------------+----------+---------+
//! ```
//!
//! Regions are pairwise disjoint in both address spaces and every window
//! range lies inside the window. The map is immutable once built.

#[cfg(test)]
mod region_test;

use core::fmt;

use crate::layout::{
    BOOTROM_BASE, BOOTROM_FROM_TOP, BOOTROM_SIZE, CLINT_BASE, CLINT_FROM_TOP, CLINT_SIZE,
    DRAM_BASE, DRAM_WINDOW_OFFSET, RESERVED_TOP, default_dram_size,
};
use crate::types::{Taddr, WindowOffset};

/// Which of the fixed target regions a descriptor describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RegionKind {
    /// Boot ROM holding the reset vector and wait loop.
    BootRom = 0,

    /// Core-local interruptor; only `msip` for hart 0 is written.
    Clint = 1,

    /// Main memory the program image is loaded into.
    Dram = 2,
}

impl RegionKind {
    /// All kinds, in lookup order.
    pub const ALL: [Self; 3] = [Self::BootRom, Self::Clint, Self::Dram];

    /// Short lowercase name used in log output.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BootRom => "bootrom",
            Self::Clint => "clint",
            Self::Dram => "dram",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One target region and its placement in the host window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionDescriptor {
    kind: RegionKind,
    target_base: Taddr,
    target_len: u64,
    window_base: WindowOffset,
    window_len: u64,
}

impl RegionDescriptor {
    /// Region kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> RegionKind {
        self.kind
    }

    /// First target address of the region.
    #[inline]
    #[must_use]
    pub const fn target_base(&self) -> Taddr {
        self.target_base
    }

    /// Length of the region in target address space.
    #[inline]
    #[must_use]
    pub const fn target_len(&self) -> u64 {
        self.target_len
    }

    /// One past the last target address of the region.
    #[inline]
    #[must_use]
    pub const fn target_end(&self) -> Taddr {
        self.target_base.add(self.target_len)
    }

    /// Window offset the region's first byte is mapped to.
    #[inline]
    #[must_use]
    pub const fn window_base(&self) -> WindowOffset {
        self.window_base
    }

    /// Number of bytes of the region backed by the window.
    ///
    /// Equal to `target_len` except for the CLINT, whose 64 KiB target
    /// extent sits in an 8 KiB window slot.
    #[inline]
    #[must_use]
    pub const fn window_len(&self) -> u64 {
        self.window_len
    }

    /// Check if a target address lies inside the region's target range.
    #[inline]
    #[must_use]
    pub const fn contains(&self, addr: Taddr) -> bool {
        match addr.offset_from(self.target_base) {
            Some(delta) => delta < self.target_len,
            None => false,
        }
    }

    /// Check if `[addr, addr + len)` lies entirely inside the target range.
    ///
    /// A zero-length interval is contained if `addr` itself is.
    #[must_use]
    pub const fn contains_range(&self, addr: Taddr, len: u64) -> bool {
        if !self.contains(addr) {
            return false;
        }
        let Some(delta) = addr.offset_from(self.target_base) else {
            return false;
        };
        match delta.checked_add(len) {
            Some(end) => end <= self.target_len,
            None => false,
        }
    }

    /// Window offset of `addr`, assuming it belongs to this region.
    ///
    /// Computes `window_base + (addr - target_base)` without checking the
    /// region's upper bound; callers validate the full interval separately.
    /// Returns `None` if `addr` lies below the region or the sum overflows.
    #[inline]
    #[must_use]
    pub const fn offset_of(&self, addr: Taddr) -> Option<WindowOffset> {
        match addr.offset_from(self.target_base) {
            Some(delta) => self.window_base.checked_add(delta),
            None => None,
        }
    }

    /// Check whether two descriptors overlap in either address space.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        let t_a = self.target_base.as_u64();
        let t_b = other.target_base.as_u64();
        let w_a = self.window_base.as_u64();
        let w_b = other.window_base.as_u64();
        let target = t_a < t_b.saturating_add(other.target_len)
            && t_b < t_a.saturating_add(self.target_len);
        let window = w_a < w_b.saturating_add(other.window_len)
            && w_b < w_a.saturating_add(self.window_len);
        target || window
    }
}

impl fmt::Display for RegionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<8} window {:#010x}..{:#010x} -> target {:#010x}",
            self.kind.name(),
            self.window_base.as_u64(),
            self.window_base.as_u64().saturating_add(self.window_len),
            self.target_base.as_u64(),
        )
    }
}

/// Errors detected while building a [`RegionMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// Window cannot hold the reserved boot ROM and CLINT slots.
    WindowTooSmall {
        /// Requested window size.
        window_size: u64,
    },
    /// DRAM region would have no bytes.
    DramEmpty,
    /// DRAM would run into the boot ROM slot or past the address space.
    DramTooLarge {
        /// Requested DRAM size.
        dram_size: u64,
        /// Largest DRAM size the window can hold.
        limit: u64,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindowTooSmall { window_size } => write!(
                f,
                "window size {window_size:#x} is smaller than the reserved {RESERVED_TOP:#x} bytes"
            ),
            Self::DramEmpty => write!(f, "DRAM size must be non-zero"),
            Self::DramTooLarge { dram_size, limit } => write!(
                f,
                "DRAM size {dram_size:#x} exceeds the {limit:#x} bytes available below the boot ROM"
            ),
        }
    }
}

impl core::error::Error for LayoutError {}

/// The three fixed regions placed into a window of a given size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionMap {
    window_size: u64,
    /// Indexed by `RegionKind as usize`, which is also the lookup order.
    regions: [RegionDescriptor; 3],
}

impl RegionMap {
    /// Build the region map for a window of `window_size` bytes with
    /// `dram_size` bytes of DRAM.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if the window cannot hold the reserved top
    /// region, if DRAM is empty, or if DRAM would overlap the boot ROM slot.
    pub const fn new(window_size: u64, dram_size: u64) -> Result<Self, LayoutError> {
        let Some(limit) = default_dram_size(window_size) else {
            return Err(LayoutError::WindowTooSmall { window_size });
        };
        if dram_size == 0 {
            return Err(LayoutError::DramEmpty);
        }
        if dram_size > limit || DRAM_BASE.checked_add(dram_size).is_none() {
            return Err(LayoutError::DramTooLarge { dram_size, limit });
        }

        let bootrom = RegionDescriptor {
            kind: RegionKind::BootRom,
            target_base: Taddr::new(BOOTROM_BASE),
            target_len: BOOTROM_SIZE,
            window_base: WindowOffset::new(window_size - BOOTROM_FROM_TOP),
            window_len: BOOTROM_SIZE,
        };
        let clint = RegionDescriptor {
            kind: RegionKind::Clint,
            target_base: Taddr::new(CLINT_BASE),
            target_len: CLINT_SIZE,
            window_base: WindowOffset::new(window_size - CLINT_FROM_TOP),
            window_len: CLINT_FROM_TOP,
        };
        let dram = RegionDescriptor {
            kind: RegionKind::Dram,
            target_base: Taddr::new(DRAM_BASE),
            target_len: dram_size,
            window_base: WindowOffset::new(DRAM_WINDOW_OFFSET),
            window_len: dram_size,
        };

        Ok(Self {
            window_size,
            regions: [bootrom, clint, dram],
        })
    }

    /// Build the region map with DRAM filling everything below the boot ROM.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if the window cannot hold any DRAM.
    pub const fn with_default_dram(window_size: u64) -> Result<Self, LayoutError> {
        match default_dram_size(window_size) {
            Some(dram_size) => Self::new(window_size, dram_size),
            None => Err(LayoutError::WindowTooSmall { window_size }),
        }
    }

    /// Total window size this map was built for.
    #[inline]
    #[must_use]
    pub const fn window_size(&self) -> u64 {
        self.window_size
    }

    /// Descriptor for a region kind.
    #[inline]
    #[must_use]
    pub const fn get(&self, kind: RegionKind) -> &RegionDescriptor {
        &self.regions[kind as usize]
    }

    /// Boot ROM descriptor.
    #[inline]
    #[must_use]
    pub const fn bootrom(&self) -> &RegionDescriptor {
        self.get(RegionKind::BootRom)
    }

    /// CLINT descriptor.
    #[inline]
    #[must_use]
    pub const fn clint(&self) -> &RegionDescriptor {
        self.get(RegionKind::Clint)
    }

    /// DRAM descriptor.
    #[inline]
    #[must_use]
    pub const fn dram(&self) -> &RegionDescriptor {
        self.get(RegionKind::Dram)
    }

    /// Iterate over the descriptors in lookup order.
    pub fn iter(&self) -> impl Iterator<Item = &RegionDescriptor> {
        self.regions.iter()
    }

    /// Find the region responsible for a target address.
    ///
    /// Boot ROM and CLINT match on their exact target ranges; everything at
    /// or above the DRAM base belongs to DRAM, even past the configured DRAM
    /// size (such accesses are rejected later by bounds validation).
    /// Addresses below the DRAM base outside the two small regions are
    /// unmapped.
    #[must_use]
    pub const fn find(&self, addr: Taddr) -> Option<&RegionDescriptor> {
        if self.bootrom().contains(addr) {
            return Some(self.bootrom());
        }
        if self.clint().contains(addr) {
            return Some(self.clint());
        }
        if addr.as_u64() >= DRAM_BASE {
            return Some(self.dram());
        }
        None
    }
}
