// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the memory self-test.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use uhtif_abi::layout::{BOOTROM_BASE, CHUNK_ALIGN, DRAM_BASE};

use super::*;
use crate::config::UnmappedPolicy;
use crate::error::Result;
use crate::transport::UioTransport;
use crate::window::MockWindow;

const WINDOW: usize = 0x10_0000;
const CLINT_SLOT: usize = 0xF_E000;

fn transport(dram_size: Option<u64>) -> UioTransport<MockWindow> {
    UioTransport::with_window(MockWindow::new(WINDOW), dram_size, UnmappedPolicy::Strict).unwrap()
}

#[test]
fn plan_covers_both_dram_ends_and_bootrom() {
    let t = transport(None);
    let ranges = plan(t.regions());
    assert_eq!(ranges.len(), 3);
    assert_eq!(ranges[0].addr, Taddr::new(DRAM_BASE));
    assert_eq!(ranges[0].len, 0x1_0000);
    assert_eq!(ranges[1].addr, Taddr::new(DRAM_BASE + 0xF_C000 - 0x1_0000));
    assert_eq!(ranges[2].region, RegionKind::BootRom);
    assert_eq!(ranges[2].addr, Taddr::new(BOOTROM_BASE));
    assert_eq!(ranges[2].len, 0x2000);
    assert!(ranges.iter().all(|p| p.region != RegionKind::Clint));
}

#[test]
fn plan_uses_one_range_for_small_dram() {
    let t = transport(Some(0x8000));
    let ranges = plan(t.regions());
    assert_eq!(ranges.len(), 2);
    assert_eq!(ranges[0].len, 0x8000);
}

#[test]
fn plan_trims_dram_to_whole_chunks() {
    let t = transport(Some(0xF_BFFF));
    let ranges = plan(t.regions());
    assert_eq!(ranges.len(), 3);
    assert_eq!(ranges[1].addr, Taddr::new(DRAM_BASE + 0xF_BFF8 - 0x1_0000));
    assert_eq!(ranges[1].len, 0x1_0000);
    for range in &ranges {
        assert_eq!(range.addr.as_u64() % CHUNK_ALIGN as u64, 0);
        assert_eq!(range.len % CHUNK_ALIGN, 0);
    }
}

#[test]
fn self_test_passes_with_unaligned_dram_size() {
    let mut t = transport(Some(0xF_BFFF));
    let ranges = plan(t.regions());
    let report = run(&mut t, &ranges).unwrap();
    assert_eq!(report.bytes_checked(), 0x1_0000 + 0x1_0000 + 0x2000);
}

#[test]
fn dram_below_one_chunk_is_skipped() {
    let mut t = transport(Some(4));
    let ranges = plan(t.regions());
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].region, RegionKind::BootRom);
    run(&mut t, &ranges).unwrap();
    assert!(t.window().stores().iter().all(|s| s.offset.as_u64() >= 0xF_C000));
}

#[test]
fn self_test_passes_and_leaves_memory_cleared() {
    let mut t = transport(None);
    let ranges = plan(t.regions());
    let report = run(&mut t, &ranges).unwrap();

    assert_eq!(report.ranges, ranges);
    assert_eq!(report.bytes_checked(), 0x1_0000 + 0x1_0000 + 0x2000);
    assert!(!t.is_reset());
    assert!(t.window().raw_memory().iter().all(|&b| b == 0));
}

#[test]
fn self_test_never_stores_to_the_interrupt_controller() {
    let mut t = transport(None);
    let ranges = plan(t.regions());
    run(&mut t, &ranges).unwrap();

    for store in t.window().stores() {
        let end = store.offset.as_u64() as usize + store.len;
        assert!(end <= CLINT_SLOT, "store reached CLINT: {store:?}");
    }
}

#[test]
fn pattern_differs_between_neighbours() {
    assert_ne!(pattern_byte(0x11, 0), pattern_byte(0x11, 1));
    assert_ne!(pattern_byte(0x11, 0), pattern_byte(0x11, 256));
    assert_ne!(pattern_byte(0x11, 7), pattern_byte(0x5A, 7));
}

/// Flat DRAM whose byte at `stuck` always reads as zero.
struct StuckByte {
    memory: Vec<u8>,
    stuck: usize,
}

impl ChunkedMemory for StuckByte {
    fn read_chunk(&self, addr: Taddr, dst: &mut [u8]) -> Result<()> {
        let start = (addr.as_u64() - DRAM_BASE) as usize;
        dst.copy_from_slice(&self.memory[start..start + dst.len()]);
        if (start..start + dst.len()).contains(&self.stuck) {
            dst[self.stuck - start] = 0;
        }
        Ok(())
    }

    fn write_chunk(&mut self, addr: Taddr, src: &[u8]) -> Result<()> {
        let start = (addr.as_u64() - DRAM_BASE) as usize;
        self.memory[start..start + src.len()].copy_from_slice(src);
        Ok(())
    }

    fn clear_chunk(&mut self, addr: Taddr, len: usize) -> Result<()> {
        let start = (addr.as_u64() - DRAM_BASE) as usize;
        self.memory[start..start + len].fill(0);
        Ok(())
    }

    fn chunk_align(&self) -> usize {
        8
    }

    fn chunk_max_size(&self) -> usize {
        4096
    }

    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}

#[test]
fn self_test_reports_first_mismatch() {
    let mut mem = StuckByte {
        memory: vec![0; 0x1000],
        stuck: 0x123,
    };
    let range = TestRange {
        region: RegionKind::Dram,
        addr: Taddr::new(DRAM_BASE),
        len: 0x1000,
        seed: 0x11,
    };
    let err = run(&mut mem, &[range]).unwrap_err();
    match err {
        SelfTestError::Mismatch {
            region,
            addr,
            expected,
            found,
        } => {
            assert_eq!(region, RegionKind::Dram);
            assert_eq!(addr, Taddr::new(DRAM_BASE + 0x123));
            assert_eq!(expected, pattern_byte(0x11, 0x123));
            assert_eq!(found, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn self_test_propagates_transport_errors() {
    let mut t = transport(None);
    let range = TestRange {
        region: RegionKind::Dram,
        addr: Taddr::new(DRAM_BASE + 0xF_C000),
        len: 8,
        seed: 0,
    };
    let err = run(&mut t, &[range]).unwrap_err();
    assert!(matches!(err, SelfTestError::Transport(Error::OutOfBounds { .. })));
}
