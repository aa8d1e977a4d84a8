// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Address types for the two address spaces the transport bridges.
//!
//! These newtypes prevent accidentally passing a target address where a
//! window offset is expected (and vice versa) at compile time.

mod addr;


pub use addr::{Taddr, WindowOffset};
