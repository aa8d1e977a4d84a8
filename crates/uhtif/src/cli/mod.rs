// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Command line parsing.
//!
//! The HTIF front-end hands the transport its options as plusargs
//! (`+uio=/dev/uio0`). [`Cli::parse_with_plusargs`] rewrites the ones the
//! transport understands into long flags and sets every other plusarg
//! aside before clap sees the argument list.


use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use uhtif_abi::Taddr;

use crate::config::{TransportConfig, UnmappedPolicy, parse_size};

/// Fixed placement of the target regions inside the window.
const LAYOUT_HELP: &str = "\
Window layout:
  region    target base   target size   window offset
  bootrom   0x00001000    8 KiB         window_size - 16 KiB
  clint     0x02000000    64 KiB        window_size - 8 KiB
  dram      0x80000000    dram_size     0

Plusargs +uio=, +uio_size= and +dram_size= are accepted in place of the
matching long options. Other plusargs are ignored.";

/// Plusargs translated into long options.
const PLUSARGS: &[(&str, &str)] = &[
    ("+uio=", "--uio="),
    ("+uio_size=", "--uio-size="),
    ("+dram_size=", "--dram-size="),
];

/// What to do once the window is mapped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// Exercise DRAM and the boot ROM without starting the target.
    SelfTest,
    /// Load a flat binary image and start the target.
    Image(PathBuf),
}

fn parse_payload(arg: &str) -> Result<Payload, String> {
    match arg {
        "" => Err("payload must not be empty".to_owned()),
        "none" => Ok(Payload::SelfTest),
        path => Ok(Payload::Image(PathBuf::from(path))),
    }
}

/// Host side of an HTIF link to a remote RISC-V core over a UIO window.
#[derive(Clone, Debug, Parser)]
#[command(name = "uhtif", version, about, after_help = LAYOUT_HELP)]
pub struct Cli {
    /// UIO device exposing the shared window.
    #[arg(long = "uio", value_name = "DEVICE")]
    pub device: Option<PathBuf>,

    /// Window size in bytes [default: 0x40000000].
    #[arg(long = "uio-size", value_name = "BYTES", value_parser = parse_size)]
    pub window_size: Option<u64>,

    /// DRAM size in bytes [default: window size - 16 KiB].
    #[arg(long = "dram-size", value_name = "BYTES", value_parser = parse_size)]
    pub dram_size: Option<u64>,

    /// Target address the image is loaded at.
    #[arg(long = "load-addr", value_name = "ADDR", value_parser = parse_size, default_value = "0x80000000")]
    pub load_addr: u64,

    /// Handling of target addresses outside every region.
    #[arg(long, value_enum, default_value_t)]
    pub unmapped: UnmappedPolicy,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Flat image to load, or `none` to run the memory self-test.
    #[arg(value_name = "PAYLOAD", value_parser = parse_payload, default_value = "none")]
    pub payload: Payload,
}

/// Arguments after plusarg translation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizedArgs {
    /// Arguments to hand to clap, program name first.
    pub args: Vec<OsString>,
    /// Plusargs that were dropped.
    pub ignored: Vec<String>,
}

/// Rewrite known plusargs into long options and drop the rest.
///
/// The first argument is the program name and passes through untouched,
/// as does everything after a literal `--`.
pub fn normalize_args<I, T>(args: I) -> NormalizedArgs
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = NormalizedArgs::default();
    let mut verbatim = false;
    for (index, arg) in args.into_iter().map(Into::into).enumerate() {
        if index == 0 || verbatim {
            out.args.push(arg);
            continue;
        }
        let Some(text) = arg.to_str() else {
            out.args.push(arg);
            continue;
        };
        if text == "--" {
            verbatim = true;
            out.args.push(arg);
            continue;
        }
        if !text.starts_with('+') {
            out.args.push(arg);
            continue;
        }
        match PLUSARGS
            .iter()
            .find_map(|&(plus, long)| text.strip_prefix(plus).map(|value| (long, value)))
        {
            Some((long, value)) => out.args.push(format!("{long}{value}").into()),
            None => out.ignored.push(text.to_owned()),
        }
    }
    out
}

impl Cli {
    /// Parse a full argument list, program name first, accepting plusargs.
    ///
    /// Returns the parsed options together with the plusargs that were
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid options, `--help` and `--version`.
    pub fn parse_with_plusargs<I, T>(args: I) -> Result<(Self, Vec<String>), clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let NormalizedArgs { args, ignored } = normalize_args(args);
        let cli = Self::try_parse_from(args)?;
        Ok((cli, ignored))
    }

    /// Transport parameters named on the command line.
    #[must_use]
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            device: self.device.clone(),
            window_size: self.window_size,
            dram_size: self.dram_size,
            unmapped: self.unmapped,
        }
    }

    /// Target address the image is loaded at.
    #[must_use]
    pub const fn load_addr(&self) -> Taddr {
        Taddr::new(self.load_addr)
    }
}
