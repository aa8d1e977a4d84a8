// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Target address layout for the uhtif memory-mapped host interface.
//!
//! This crate defines the contract between the host transport and the remote
//! core's address space:
//! - Address newtypes for target addresses and window offsets
//! - Fixed layout constants (boot ROM, CLINT, DRAM)
//! - The region map that places each target region inside the host window
//!
//! # Design Principles
//!
//! - **No dependencies**: Pure data types, 100% host-testable
//! - **Immutable layout**: A [`RegionMap`] never changes after construction
//! - **Checked arithmetic**: Every interval computation that can overflow
//!   returns `None` instead of wrapping
//!
//! # Modules
//!
//! - [`types`]: `Taddr` and `WindowOffset`
//! - [`layout`]: Target base addresses, region sizes, chunk policy
//! - [`region`]: `RegionKind`, `RegionDescriptor`, `RegionMap`

#![cfg_attr(not(test), no_std)]

pub mod layout;
pub mod region;
pub mod types;

// Re-export commonly used types at crate root
pub use region::{LayoutError, RegionDescriptor, RegionKind, RegionMap};
pub use types::{Taddr, WindowOffset};
