// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Memory self-test run when no payload is given.
//!
//! Each tested range gets a position-dependent pattern, which is read
//! back, cleared and checked to read as zero. Ranges cover both ends of
//! DRAM and the whole boot ROM. The interrupt controller is never
//! touched, since any store there could start the target.

#[cfg(test)]
mod selftest_test;

use tracing::{debug, info};
use uhtif_abi::layout::CHUNK_ALIGN;
use uhtif_abi::{RegionKind, RegionMap, Taddr};

use crate::error::Error;
use crate::memif::{ChunkedMemory, MemIf};

/// Largest DRAM range checked at each end.
pub const DRAM_CHECK_LEN: u64 = 64 * 1024;

/// One range checked by the self-test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TestRange {
    /// Region the range belongs to.
    pub region: RegionKind,
    /// First target address.
    pub addr: Taddr,
    /// Length in bytes.
    pub len: usize,
    /// Pattern seed, so neighbouring ranges write different data.
    pub seed: u8,
}

/// Self-test failure.
#[derive(Debug, thiserror::Error)]
pub enum SelfTestError {
    /// A chunk request failed.
    #[error(transparent)]
    Transport(#[from] Error),

    /// A byte read back differs from the one written.
    #[error("{region} at {addr}: wrote {expected:#04x}, read {found:#04x}")]
    Mismatch {
        /// Region under test.
        region: RegionKind,
        /// Address of the first differing byte.
        addr: Taddr,
        /// Byte written.
        expected: u8,
        /// Byte read back.
        found: u8,
    },
}

/// Outcome of a passing self-test.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelfTestReport {
    /// Ranges that passed, in order.
    pub ranges: Vec<TestRange>,
}

impl SelfTestReport {
    /// Total number of bytes verified.
    #[must_use]
    pub fn bytes_checked(&self) -> usize {
        self.ranges.iter().map(|p| p.len).sum()
    }
}

/// Plan the ranges for a layout.
///
/// DRAM ranges are trimmed to whole chunks so that no read-modify-write
/// reaches past the end of DRAM. A DRAM smaller than one chunk is skipped.
#[must_use]
pub fn plan(regions: &RegionMap) -> Vec<TestRange> {
    let dram = regions.dram();
    let bootrom = regions.bootrom();
    let base = dram.target_base();
    let end = dram
        .target_end()
        .align_down(CHUNK_ALIGN as u64)
        .unwrap_or(base);
    let usable = end.offset_from(base).unwrap_or(0);
    let dram_len = usable.min(DRAM_CHECK_LEN);

    let mut ranges = Vec::with_capacity(3);
    if dram_len > 0 {
        ranges.push(TestRange {
            region: RegionKind::Dram,
            addr: base,
            len: dram_len as usize,
            seed: 0x11,
        });
    }
    if usable > dram_len {
        ranges.push(TestRange {
            region: RegionKind::Dram,
            addr: Taddr::new(end.as_u64() - dram_len),
            len: dram_len as usize,
            seed: 0x5A,
        });
    }
    ranges.push(TestRange {
        region: RegionKind::BootRom,
        addr: bootrom.target_base(),
        len: bootrom.target_len() as usize,
        seed: 0xA5,
    });
    ranges
}

/// Byte written at `index` of a range seeded with `seed`.
#[must_use]
pub const fn pattern_byte(seed: u8, index: usize) -> u8 {
    (index as u8).wrapping_mul(31).wrapping_add(seed) ^ ((index >> 8) as u8)
}

/// Run every range in `ranges` against `mem`.
///
/// # Errors
///
/// Stops at the first failing chunk request or mismatching byte.
pub fn run<M: ChunkedMemory + ?Sized>(
    mem: &mut M,
    ranges: &[TestRange],
) -> Result<SelfTestReport, SelfTestError> {
    let mut report = SelfTestReport::default();
    for range in ranges {
        check(mem, range)?;
        info!(
            region = %range.region,
            addr = %range.addr,
            len = format_args!("{:#x}", range.len),
            "self-test range passed"
        );
        report.ranges.push(*range);
    }
    Ok(report)
}

fn check<M: ChunkedMemory + ?Sized>(mem: &mut M, range: &TestRange) -> Result<(), SelfTestError> {
    let mut memif = MemIf::new(mem);
    let pattern: Vec<u8> = (0..range.len)
        .map(|i| pattern_byte(range.seed, i))
        .collect();

    debug!(addr = %range.addr, "writing pattern");
    memif.write(range.addr, &pattern)?;
    let mut readback = vec![0u8; range.len];
    memif.read(range.addr, &mut readback)?;
    compare(range, &pattern, &readback)?;

    debug!(addr = %range.addr, "clearing");
    memif.clear(range.addr, range.len)?;
    memif.read(range.addr, &mut readback)?;
    compare(range, &vec![0u8; range.len], &readback)
}

fn compare(range: &TestRange, expected: &[u8], found: &[u8]) -> Result<(), SelfTestError> {
    match expected.iter().zip(found).position(|(e, f)| e != f) {
        None => Ok(()),
        Some(index) => Err(SelfTestError::Mismatch {
            region: range.region,
            addr: range.addr.add(index as u64),
            expected: expected[index],
            found: found[index],
        }),
    }
}
