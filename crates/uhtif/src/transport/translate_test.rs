// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for address translation and bounds validation.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use uhtif_abi::layout::{BOOTROM_BASE, CLINT_BASE, DRAM_BASE};
use uhtif_abi::{RegionMap, Taddr, WindowOffset};

use super::*;
use crate::config::UnmappedPolicy;
use crate::error::Error;

const WINDOW: u64 = 0x4000_0000;
const DRAM: u64 = 0x3FFF_C000;

fn translator(policy: UnmappedPolicy) -> AddressTranslator {
    AddressTranslator::new(RegionMap::new(WINDOW, DRAM).unwrap(), policy)
}

fn offset(t: &AddressTranslator, addr: u64) -> u64 {
    t.translate(Taddr::new(addr)).unwrap().as_u64()
}

// =============================================================================
// Translation
// =============================================================================

#[test]
fn dram_translates_from_window_start() {
    let t = translator(UnmappedPolicy::Strict);
    assert_eq!(offset(&t, 0x8000_0000), 0);
    assert_eq!(offset(&t, 0x8000_1234), 0x1234);
    assert_eq!(offset(&t, 0x8000_0000 + DRAM - 8), DRAM - 8);
}

#[test]
fn bootrom_translates_below_clint() {
    let t = translator(UnmappedPolicy::Strict);
    assert_eq!(offset(&t, 0x1000), 0x3FFF_C000);
    assert_eq!(offset(&t, 0x1800), 0x3FFF_C800);
    assert_eq!(offset(&t, 0x2FFF), 0x3FFF_DFFF);
}

#[test]
fn clint_translates_to_top_page() {
    let t = translator(UnmappedPolicy::Strict);
    assert_eq!(offset(&t, 0x0200_0000), 0x3FFF_E000);
    assert_eq!(offset(&t, 0x0200_0004), 0x3FFF_E004);
}

#[test]
fn strict_rejects_unmapped() {
    let t = translator(UnmappedPolicy::Strict);
    for addr in [0x0, 0x0FFF, 0x3000, 0x0201_0000, 0x7FFF_FFFF] {
        let err = t.translate(Taddr::new(addr)).unwrap_err();
        assert!(
            matches!(err, Error::UnmappedAddress { addr: a } if a == Taddr::new(addr)),
            "{addr:#x}: {err}"
        );
    }
}

#[test]
fn alias_maps_unmapped_to_zero() {
    let t = translator(UnmappedPolicy::Alias);
    assert_eq!(t.translate(Taddr::new(0x10)).unwrap(), WindowOffset::ZERO);
    assert_eq!(t.translate(Taddr::new(0x7FFF_FFFF)).unwrap(), WindowOffset::ZERO);
}

#[test]
fn translator_exposes_its_parts() {
    let t = translator(UnmappedPolicy::Alias);
    assert_eq!(t.policy(), UnmappedPolicy::Alias);
    assert_eq!(t.regions().window_size(), WINDOW);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn validate_accepts_accesses_inside_one_region() {
    let t = translator(UnmappedPolicy::Strict);
    assert!(t.validate(Taddr::new(DRAM_BASE), 8));
    assert!(t.validate(Taddr::new(DRAM_BASE + DRAM - 8), 8));
    assert!(t.validate(Taddr::new(BOOTROM_BASE), 0x2000));
    assert!(t.validate(Taddr::new(CLINT_BASE), 4));
    assert!(t.validate(Taddr::new(CLINT_BASE), 0x2000));
}

#[test]
fn validate_accepts_zero_length_inside_a_region() {
    let t = translator(UnmappedPolicy::Strict);
    assert!(t.validate(Taddr::new(DRAM_BASE), 0));
    assert!(t.validate(Taddr::new(BOOTROM_BASE + 0x10), 0));
}

#[test]
fn validate_rejects_spanning_accesses() {
    let t = translator(UnmappedPolicy::Strict);
    assert!(!t.validate(Taddr::new(0x1000), 0x3000));
    assert!(!t.validate(Taddr::new(0x2FF8), 16));
}

#[test]
fn validate_rejects_dram_past_its_size() {
    let t = translator(UnmappedPolicy::Strict);
    assert!(!t.validate(Taddr::new(DRAM_BASE + DRAM - 8), 16));
    assert!(!t.validate(Taddr::new(DRAM_BASE + DRAM), 8));
    assert!(!t.validate(Taddr::new(u64::MAX - 3), 4));
}

#[test]
fn validate_rejects_clint_outside_the_window() {
    let t = translator(UnmappedPolicy::Strict);
    assert!(!t.validate(Taddr::new(CLINT_BASE), 0x2001));
    assert!(!t.validate(Taddr::new(CLINT_BASE + 0x4000), 4));
}

#[test]
fn validate_rejects_overflowing_lengths() {
    let t = translator(UnmappedPolicy::Strict);
    assert!(!t.validate(Taddr::new(DRAM_BASE), u64::MAX));
    assert!(!t.validate(Taddr::new(BOOTROM_BASE), u64::MAX));
}

#[test]
fn validate_never_accepts_unmapped() {
    let t = translator(UnmappedPolicy::Alias);
    assert!(!t.validate(Taddr::new(0x10), 0));
    assert!(!t.validate(Taddr::new(0x10), 4));
}

#[test]
fn resolve_reports_the_right_error() {
    let strict = translator(UnmappedPolicy::Strict);
    assert!(matches!(
        strict.resolve(Taddr::new(0x10), 4),
        Err(Error::UnmappedAddress { .. })
    ));
    assert!(matches!(
        strict.resolve(Taddr::new(0x1000), 0x3000),
        Err(Error::OutOfBounds { len: 0x3000, .. })
    ));

    let alias = translator(UnmappedPolicy::Alias);
    assert!(matches!(
        alias.resolve(Taddr::new(0x10), 4),
        Err(Error::OutOfBounds { len: 4, .. })
    ));
    assert_eq!(
        alias.resolve(Taddr::new(0x1008), 8).unwrap().as_u64(),
        0x3FFF_C008
    );
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #[test]
    fn dram_offset_is_linear(delta in 0u64..DRAM) {
        let t = translator(UnmappedPolicy::Strict);
        prop_assert_eq!(offset(&t, DRAM_BASE + delta), delta);
    }

    #[test]
    fn valid_access_stays_in_one_window_region(addr in any::<u64>(), len in 1u64..0x4000) {
        let t = translator(UnmappedPolicy::Strict);
        let addr = Taddr::new(addr);
        if t.validate(addr, len) {
            let start = t.translate(addr).unwrap().as_u64();
            let end = start + len;
            prop_assert!(end <= WINDOW);
            let owner = t
                .regions()
                .iter()
                .filter(|r| {
                    let base = r.window_base().as_u64();
                    start >= base && end <= base + r.window_len()
                })
                .count();
            prop_assert_eq!(owner, 1);
        }
    }

    #[test]
    fn bootrom_and_clint_cover_the_reserved_top(delta in 0u64..0x4000) {
        let t = translator(UnmappedPolicy::Strict);
        let addr = if delta < 0x2000 {
            BOOTROM_BASE + delta
        } else {
            CLINT_BASE + delta - 0x2000
        };
        prop_assert_eq!(offset(&t, addr), DRAM + delta);
    }
}
