// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Fixed target address layout and window placement constants.
//!
//! The remote core (a Rocket-class RISC-V hart) sees three regions the host
//! needs to reach. The FPGA bridge exposes them through one contiguous UIO
//! window, with DRAM at the bottom and the two small regions packed into the
//! top 16 KiB.
//!
//! # Target layout
//!
//! ```text
//! 0x0000_1000  Boot ROM (8 KiB)
//! 0x0200_0000  CLINT (64 KiB, msip for hart 0 at offset 0)
//! 0x8000_0000  DRAM (configurable, up to window size - 16 KiB)
//! ```
//!
//! # Window layout (default 1 GiB window)
//!
//! ```text
//! +0x0000_0000  DRAM      -> 0x8000_0000
//! +0x3FFF_C000  Boot ROM  -> 0x0000_1000
//! +0x3FFF_E000  CLINT     -> 0x0200_0000
//! +0x4000_0000  end of window
//! ```

/// One gigabyte in bytes.
const GB: u64 = 1024 * 1024 * 1024;

/// One megabyte in bytes.
const MB: u64 = 1024 * 1024;

/// One kilobyte in bytes.
const KB: u64 = 1024;

// =============================================================================
// Target Region Base Addresses
// =============================================================================

/// Target base address of the boot ROM.
pub const BOOTROM_BASE: u64 = 0x0000_1000;

/// Size of the boot ROM region (8 KiB).
pub const BOOTROM_SIZE: u64 = 8 * KB;

/// Target base address of the core-local interruptor (CLINT).
pub const CLINT_BASE: u64 = 0x0200_0000;

/// Size of the CLINT target region (64 KiB).
///
/// Only the top 8 KiB of the window back it, so just the first 8 KiB of
/// the target extent are reachable.
pub const CLINT_SIZE: u64 = 64 * KB;

/// Target address of the `msip` register for hart 0.
///
/// Writing 1 raises a machine software interrupt, which releases the hart
/// from the boot ROM wait loop.
pub const MSIP_HART0: u64 = CLINT_BASE;

/// Width of the `msip` register in bytes.
pub const MSIP_WIDTH: u64 = 4;

/// Target base address of DRAM.
pub const DRAM_BASE: u64 = 0x8000_0000;

// =============================================================================
// Window Placement
// =============================================================================

/// Bytes reserved at the top of the window for boot ROM and CLINT (16 KiB).
pub const RESERVED_TOP: u64 = 16 * KB;

/// Distance of the boot ROM slot from the end of the window.
pub const BOOTROM_FROM_TOP: u64 = 16 * KB;

/// Distance of the CLINT slot from the end of the window.
pub const CLINT_FROM_TOP: u64 = 8 * KB;

/// Window offset of DRAM.
pub const DRAM_WINDOW_OFFSET: u64 = 0;

/// Default size of the host window (1 GiB).
pub const DEFAULT_WINDOW_SIZE: u64 = GB;

// =============================================================================
// Chunk Policy
// =============================================================================

/// Required alignment of every chunk request (bytes).
pub const CHUNK_ALIGN: usize = 8;

/// Largest single chunk request (1 MiB).
pub const CHUNK_MAX_SIZE: usize = MB as usize;

/// Default DRAM size for a window of `window_size` bytes.
///
/// DRAM extends up to the boot ROM slot. Returns `None` if the window is
/// too small to hold the reserved top region.
#[inline]
#[must_use]
pub const fn default_dram_size(window_size: u64) -> Option<u64> {
    window_size.checked_sub(RESERVED_TOP)
}

// Compile-time verification of the layout constants
const _: () = {
    assert!(BOOTROM_BASE + BOOTROM_SIZE <= CLINT_BASE);
    assert!(CLINT_BASE + CLINT_SIZE <= DRAM_BASE);
    assert!(BOOTROM_FROM_TOP - CLINT_FROM_TOP == BOOTROM_SIZE);
    assert!(BOOTROM_FROM_TOP == RESERVED_TOP);
    assert!(CHUNK_ALIGN.is_power_of_two());
    assert!(CHUNK_MAX_SIZE % CHUNK_ALIGN == 0);
    assert!(MSIP_WIDTH <= CLINT_FROM_TOP);
};
