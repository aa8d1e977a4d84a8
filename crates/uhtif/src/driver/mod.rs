// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Session driver.
//!
//! A session maps the window, reports the layout and then runs the
//! payload:
//!
//! - `none`: the memory self-test, leaving the target in reset
//! - an image path: load the flat image, raise `msip`, then wait for the
//!   shutdown future before unmapping


use std::future::Future;
use std::io;
use std::path::PathBuf;

use tracing::info;
use uhtif_abi::Taddr;

use crate::cli::{Cli, Payload};
use crate::error::Error;
use crate::memif::{ChunkedMemory, MemIf};
use crate::selftest::{self, SelfTestError, SelfTestReport};
use crate::shutdown::StopSignal;
use crate::transport::UioTransport;
use crate::window::WindowMemory;

/// How a session ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The self-test passed; the target was never started.
    SelfTest(SelfTestReport),
    /// An image ran until a stop signal arrived.
    Stopped {
        /// Bytes loaded.
        image_len: usize,
        /// Signal that ended the session.
        signal: StopSignal,
    },
}

/// Fatal session errors.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Mapping, translation or reset failed.
    #[error(transparent)]
    Transport(#[from] Error),

    /// The image file could not be read.
    #[error("cannot read image {}: {source}", path.display())]
    Image {
        /// Image path as given.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The memory self-test failed.
    #[error("self-test failed: {0}")]
    SelfTest(#[from] SelfTestError),
}

/// Run one session as described by `cli`.
///
/// The transport is dropped, and the window unmapped, before this returns.
///
/// # Errors
///
/// Returns the first fatal error; see [`DriverError`].
pub async fn run<F>(cli: &Cli, shutdown: F) -> Result<Outcome, DriverError>
where
    F: Future<Output = StopSignal>,
{
    let mut transport = UioTransport::open(&cli.transport_config())?;
    transport.log_layout();
    serve(&mut transport, &cli.payload, cli.load_addr(), shutdown).await
}

/// Run `payload` over an open transport.
///
/// # Errors
///
/// Returns the first fatal error; see [`DriverError`].
pub async fn serve<W, F>(
    transport: &mut UioTransport<W>,
    payload: &Payload,
    load_addr: Taddr,
    shutdown: F,
) -> Result<Outcome, DriverError>
where
    W: WindowMemory,
    F: Future<Output = StopSignal>,
{
    match payload {
        Payload::SelfTest => {
            info!("no payload given, running memory self-test");
            let ranges = selftest::plan(transport.regions());
            let report = selftest::run(transport, &ranges)?;
            info!(
                ranges = report.ranges.len(),
                bytes = report.bytes_checked(),
                "self-test passed"
            );
            Ok(Outcome::SelfTest(report))
        }
        Payload::Image(path) => {
            let image = tokio::fs::read(path)
                .await
                .map_err(|source| DriverError::Image {
                    path: path.clone(),
                    source,
                })?;
            load_and_start(transport, load_addr, &image)?;

            info!("target running, waiting for SIGINT or SIGTERM");
            let signal = shutdown.await;
            info!(%signal, "stopping");
            Ok(Outcome::Stopped {
                image_len: image.len(),
                signal,
            })
        }
    }
}

/// Copy `image` to `addr` and start the target.
///
/// # Errors
///
/// Fails if the image does not fit into one region or the reset was
/// already issued.
pub fn load_and_start<M: ChunkedMemory + ?Sized>(
    mem: &mut M,
    addr: Taddr,
    image: &[u8],
) -> Result<(), Error> {
    info!(
        %addr,
        len = format_args!("{:#x}", image.len()),
        "loading image"
    );
    MemIf::new(mem).write(addr, image)?;
    mem.reset()
}
