// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Memory interface consumed by loaders and syscall proxies.
//!
//! [`ChunkedMemory`] is the capability a transport offers: aligned,
//! size-limited chunk accesses plus the one-shot reset. [`MemIf`] sits on
//! top of any implementation and turns arbitrary transfers into chunk
//! requests the transport accepts:
//!
//! ```text
//!   addr                                                 addr+len
//!    │ head │          body (≤ chunk_max_size each)        │ tail │
//!  ──┼──────┼──────────────────────────────────────────────┼──────┼──
//!  aligned chunk                                      aligned chunk
//!  (read-modify-write)                               (read-modify-write)
//! ```


use uhtif_abi::Taddr;

use crate::error::Result;

/// Chunk-level access to target memory.
///
/// Callers must keep every request aligned to [`chunk_align`] and no longer
/// than [`chunk_max_size`]; implementations do not split requests.
/// [`MemIf`] takes care of both.
///
/// [`chunk_align`]: Self::chunk_align
/// [`chunk_max_size`]: Self::chunk_max_size
pub trait ChunkedMemory {
    /// Copy `dst.len()` bytes of live target memory at `addr` into `dst`.
    ///
    /// # Errors
    ///
    /// Fails if the interval is unmapped or out of bounds.
    fn read_chunk(&self, addr: Taddr, dst: &mut [u8]) -> Result<()>;

    /// Store `src` at `addr`; the store is visible to the target on return.
    ///
    /// # Errors
    ///
    /// Fails if the interval is unmapped or out of bounds.
    fn write_chunk(&mut self, addr: Taddr, src: &[u8]) -> Result<()>;

    /// Zero `len` bytes at `addr`; visible to the target on return.
    ///
    /// # Errors
    ///
    /// Fails if the interval is unmapped or out of bounds.
    fn clear_chunk(&mut self, addr: Taddr, len: usize) -> Result<()>;

    /// Required alignment of chunk addresses and lengths.
    fn chunk_align(&self) -> usize;

    /// Largest chunk accepted in one request.
    fn chunk_max_size(&self) -> usize;

    /// Start the target after loading; valid exactly once.
    ///
    /// # Errors
    ///
    /// Fails if the reset store cannot be performed or was already issued.
    fn reset(&mut self) -> Result<()>;
}

/// Splits arbitrary transfers into chunk requests.
pub struct MemIf<'a, M: ChunkedMemory + ?Sized> {
    mem: &'a mut M,
}

impl<'a, M: ChunkedMemory + ?Sized> MemIf<'a, M> {
    /// Wrap a chunked memory.
    pub const fn new(mem: &'a mut M) -> Self {
        Self { mem }
    }

    fn align(&self) -> usize {
        self.mem.chunk_align().max(1)
    }

    /// Largest body chunk, rounded down to the alignment.
    fn max_chunk(&self) -> usize {
        let align = self.align();
        let max = self.mem.chunk_max_size();
        (max - max % align).max(align)
    }

    /// Length of the unaligned head of a `len`-byte transfer at `addr`.
    fn head_len(&self, addr: Taddr, len: usize) -> usize {
        match self.skew(addr) {
            0 => 0,
            skew => (self.align() - skew).min(len),
        }
    }

    /// Bytes between `addr` and the previous aligned address.
    fn skew(&self, addr: Taddr) -> usize {
        (addr.as_u64() % self.align() as u64) as usize
    }

    /// Aligned address at or below `addr`.
    fn aligned_base(&self, addr: Taddr) -> Taddr {
        Taddr::new(addr.as_u64() - self.skew(addr) as u64)
    }

    /// Read `dst.len()` bytes starting at `addr`.
    ///
    /// # Errors
    ///
    /// Propagates the first failing chunk request.
    pub fn read(&self, addr: Taddr, dst: &mut [u8]) -> Result<()> {
        let align = self.align();
        let (head, rest) = dst.split_at_mut(self.head_len(addr, dst.len()));
        if !head.is_empty() {
            let skew = self.skew(addr);
            let mut chunk = vec![0u8; align];
            self.mem.read_chunk(self.aligned_base(addr), &mut chunk)?;
            head.copy_from_slice(&chunk[skew..skew + head.len()]);
        }
        let mut addr = addr.add(head.len() as u64);

        let body_len = rest.len() - rest.len() % align;
        let (body, tail) = rest.split_at_mut(body_len);
        for piece in body.chunks_mut(self.max_chunk()) {
            self.mem.read_chunk(addr, piece)?;
            addr = addr.add(piece.len() as u64);
        }

        if !tail.is_empty() {
            let mut chunk = vec![0u8; align];
            self.mem.read_chunk(addr, &mut chunk)?;
            tail.copy_from_slice(&chunk[..tail.len()]);
        }
        Ok(())
    }

    /// Write `src` starting at `addr`.
    ///
    /// Unaligned heads and tails are merged into the surrounding aligned
    /// chunk with a read-modify-write.
    ///
    /// # Errors
    ///
    /// Propagates the first failing chunk request.
    pub fn write(&mut self, addr: Taddr, src: &[u8]) -> Result<()> {
        let (head, rest) = src.split_at(self.head_len(addr, src.len()));
        if !head.is_empty() {
            self.merge(self.aligned_base(addr), self.skew(addr), head)?;
        }
        let mut addr = addr.add(head.len() as u64);

        let body_len = rest.len() - rest.len() % self.align();
        let (body, tail) = rest.split_at(body_len);
        for piece in body.chunks(self.max_chunk()) {
            self.mem.write_chunk(addr, piece)?;
            addr = addr.add(piece.len() as u64);
        }

        if !tail.is_empty() {
            self.merge(addr, 0, tail)?;
        }
        Ok(())
    }

    /// Zero `len` bytes starting at `addr`.
    ///
    /// # Errors
    ///
    /// Propagates the first failing chunk request.
    pub fn clear(&mut self, addr: Taddr, len: usize) -> Result<()> {
        let head = self.head_len(addr, len);
        if head != 0 {
            self.merge(self.aligned_base(addr), self.skew(addr), &vec![0u8; head])?;
        }
        let mut addr = addr.add(head as u64);
        let rest = len - head;

        let body_len = rest - rest % self.align();
        let mut remaining = body_len;
        while remaining != 0 {
            let n = remaining.min(self.max_chunk());
            self.mem.clear_chunk(addr, n)?;
            addr = addr.add(n as u64);
            remaining -= n;
        }

        let tail = rest - body_len;
        if tail != 0 {
            self.merge(addr, 0, &vec![0u8; tail])?;
        }
        Ok(())
    }

    /// Overwrite `bytes` at `skew` inside the aligned chunk at `base`.
    fn merge(&mut self, base: Taddr, skew: usize, bytes: &[u8]) -> Result<()> {
        let mut chunk = vec![0u8; self.align()];
        self.mem.read_chunk(base, &mut chunk)?;
        chunk[skew..skew + bytes.len()].copy_from_slice(bytes);
        self.mem.write_chunk(base, &chunk)
    }
}
