// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the region map.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;

use super::*;
use crate::layout::{DEFAULT_WINDOW_SIZE, MSIP_HART0};

const WINDOW: u64 = 0x4000_0000;

fn default_map() -> RegionMap {
    RegionMap::with_default_dram(WINDOW).unwrap()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn default_map_places_regions() {
    let map = default_map();
    assert_eq!(map.window_size(), WINDOW);

    assert_eq!(map.dram().window_base(), WindowOffset::new(0));
    assert_eq!(map.dram().target_len(), 0x3FFF_C000);
    assert_eq!(map.bootrom().window_base(), WindowOffset::new(0x3FFF_C000));
    assert_eq!(map.bootrom().window_len(), 0x2000);
    assert_eq!(map.clint().window_base(), WindowOffset::new(0x3FFF_E000));
    assert_eq!(map.clint().window_len(), 0x2000);
    assert_eq!(map.clint().target_len(), 0x1_0000);
}

#[test]
fn default_window_size_is_one_gib() {
    assert_eq!(DEFAULT_WINDOW_SIZE, WINDOW);
}

#[test]
fn get_matches_named_accessors() {
    let map = default_map();
    assert_eq!(map.get(RegionKind::BootRom), map.bootrom());
    assert_eq!(map.get(RegionKind::Clint), map.clint());
    assert_eq!(map.get(RegionKind::Dram), map.dram());
    let kinds: Vec<_> = map.iter().map(RegionDescriptor::kind).collect();
    assert_eq!(kinds, RegionKind::ALL);
}

#[test]
fn rejects_window_smaller_than_reserved_top() {
    assert_eq!(
        RegionMap::new(0x2000, 0x1000),
        Err(LayoutError::WindowTooSmall {
            window_size: 0x2000
        })
    );
    assert_eq!(
        RegionMap::with_default_dram(0),
        Err(LayoutError::WindowTooSmall { window_size: 0 })
    );
}

#[test]
fn rejects_empty_dram() {
    assert_eq!(RegionMap::new(WINDOW, 0), Err(LayoutError::DramEmpty));
    assert_eq!(
        RegionMap::with_default_dram(RESERVED_TOP),
        Err(LayoutError::DramEmpty)
    );
}

#[test]
fn rejects_dram_overlapping_bootrom() {
    assert_eq!(
        RegionMap::new(WINDOW, 0x3FFF_C001),
        Err(LayoutError::DramTooLarge {
            dram_size: 0x3FFF_C001,
            limit: 0x3FFF_C000
        })
    );
    assert!(RegionMap::new(WINDOW, 0x3FFF_C000).is_ok());
}

#[test]
fn rejects_dram_wrapping_address_space() {
    let window = u64::MAX;
    let dram = u64::MAX - RESERVED_TOP;
    assert!(matches!(
        RegionMap::new(window, dram),
        Err(LayoutError::DramTooLarge { .. })
    ));
}

#[test]
fn layout_error_display() {
    let err = LayoutError::DramTooLarge {
        dram_size: 0x4000_0000,
        limit: 0x3FFF_C000,
    };
    assert_eq!(
        format!("{err}"),
        "DRAM size 0x40000000 exceeds the 0x3fffc000 bytes available below the boot ROM"
    );
    assert_eq!(format!("{}", LayoutError::DramEmpty), "DRAM size must be non-zero");
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn find_matches_scenario_addresses() {
    let map = default_map();
    assert_eq!(map.find(Taddr::new(0x1000)).map(|r| r.kind()), Some(RegionKind::BootRom));
    assert_eq!(map.find(Taddr::new(0x2FFF)).map(|r| r.kind()), Some(RegionKind::BootRom));
    assert_eq!(map.find(Taddr::new(MSIP_HART0)).map(|r| r.kind()), Some(RegionKind::Clint));
    assert_eq!(map.find(Taddr::new(0x8000_0000)).map(|r| r.kind()), Some(RegionKind::Dram));
}

#[test]
fn find_treats_high_addresses_as_dram() {
    let map = default_map();
    let far = Taddr::new(0xFFFF_FFFF_0000_0000);
    assert_eq!(map.find(far).map(|r| r.kind()), Some(RegionKind::Dram));
    assert!(!map.dram().contains(far));
}

#[test]
fn find_rejects_unmapped_low_addresses() {
    let map = default_map();
    assert!(map.find(Taddr::new(0)).is_none());
    assert!(map.find(Taddr::new(0xFFF)).is_none());
    assert!(map.find(Taddr::new(0x3000)).is_none());
    assert!(map.find(Taddr::new(0x201_0000)).is_none());
    assert!(map.find(Taddr::new(0x7FFF_FFFF)).is_none());
}

#[test]
fn offset_of_scenario_addresses() {
    let map = default_map();
    assert_eq!(
        map.dram().offset_of(Taddr::new(0x8000_0010)),
        Some(WindowOffset::new(0x10))
    );
    assert_eq!(
        map.bootrom().offset_of(Taddr::new(0x1000)),
        Some(WindowOffset::new(0x3FFF_C000))
    );
    assert_eq!(
        map.clint().offset_of(Taddr::new(0x200_0000)),
        Some(WindowOffset::new(0x3FFF_E000))
    );
    assert_eq!(map.dram().offset_of(Taddr::new(0x1000)), None);
}

#[test]
fn contains_range_rejects_spanning_requests() {
    let map = default_map();
    assert!(map.bootrom().contains_range(Taddr::new(0x1000), 0x2000));
    assert!(!map.bootrom().contains_range(Taddr::new(0x1000), 0x3000));
    assert!(map.bootrom().contains_range(Taddr::new(0x2FF8), 8));
    assert!(!map.bootrom().contains_range(Taddr::new(0x2FF8), 9));
    assert!(map.bootrom().contains_range(Taddr::new(0x1000), 0));
    assert!(!map.bootrom().contains_range(Taddr::new(0x3000), 0));
    assert!(!map.dram().contains_range(Taddr::new(0x8000_0000), u64::MAX));
}

#[test]
fn regions_are_pairwise_disjoint() {
    let map = default_map();
    for (i, a) in map.iter().enumerate() {
        for b in map.iter().skip(i + 1) {
            assert!(!a.overlaps(b), "{a} overlaps {b}");
        }
    }
}

#[test]
fn descriptor_display() {
    let map = default_map();
    assert_eq!(
        format!("{}", map.bootrom()),
        "bootrom  window 0x3fffc000..0x3fffe000 -> target 0x00001000"
    );
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn window_ranges_stay_inside_window(
        window in RESERVED_TOP + 8..(1u64 << 40),
        dram_fraction in 1u64..=1000,
    ) {
        let limit = window - RESERVED_TOP;
        let dram = (limit / 1000 * dram_fraction).max(1);
        let map = RegionMap::new(window, dram).unwrap();
        for region in map.iter() {
            let end = region.window_base().as_u64() + region.window_len();
            prop_assert!(end <= window);
        }
        for (i, a) in map.iter().enumerate() {
            for b in map.iter().skip(i + 1) {
                prop_assert!(!a.overlaps(b));
            }
        }
    }

    #[test]
    fn bootrom_offsets_are_linear(delta in 0u64..BOOTROM_SIZE) {
        let map = default_map();
        let addr = Taddr::new(BOOTROM_BASE + delta);
        prop_assert_eq!(map.find(addr).map(|r| r.kind()), Some(RegionKind::BootRom));
        prop_assert_eq!(
            map.bootrom().offset_of(addr),
            Some(WindowOffset::new(WINDOW - BOOTROM_FROM_TOP + delta))
        );
    }

    #[test]
    fn dram_offsets_are_linear(delta in 0u64..0x3FFF_C000) {
        let map = default_map();
        let addr = Taddr::new(DRAM_BASE + delta);
        prop_assert_eq!(map.find(addr).map(|r| r.kind()), Some(RegionKind::Dram));
        prop_assert_eq!(map.dram().offset_of(addr), Some(WindowOffset::new(delta)));
    }
}
