/*
 * stream.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Tagliacarte, a cross-platform email client.
 *
 * Tagliacarte is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Tagliacarte is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Tagliacarte.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Byte source over a content buffer and buffered stream copy.

use std::io::{self, Read, Write};

use bytes::{Buf, Bytes};
use tracing::trace;

use crate::progress::ProgressListener;

/// Size of the chunks moved by [`buffered_stream_copy`] and by the codecs.
pub const COPY_BUFFER_SIZE: usize = 16384;

/// Sequential reader over an in-memory buffer with a known total length.
/// Cloning the underlying `Bytes` is a reference count bump; the data is never copied.
#[derive(Debug, Clone)]
pub struct ByteSource {
    data: Bytes,
    total: usize,
}

impl ByteSource {
    pub fn new(data: Bytes) -> Self {
        let total = data.len();
        Self { data, total }
    }

    /// Total length of the source, independent of how much has been read.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Bytes not yet read.
    pub fn remaining(&self) -> usize {
        self.data.remaining()
    }
}

impl Read for ByteSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.data.remaining());
        self.data.copy_to_slice(&mut buf[..n]);
        Ok(n)
    }
}

/// Read from `input` until end of stream, retrying on `Interrupted`.
pub(crate) fn read_chunk(input: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match input.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            r => return r,
        }
    }
}

/// Copy `input` to `output` in fixed-size chunks. `length` is the expected total, used only for
/// progress. Returns the number of bytes copied.
pub fn buffered_stream_copy(
    input: &mut dyn Read,
    output: &mut dyn Write,
    length: u64,
    mut progress: Option<&mut dyn ProgressListener>,
) -> io::Result<u64> {
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut total = 0u64;
    if let Some(p) = progress.as_deref_mut() {
        p.start(length);
    }
    loop {
        let n = read_chunk(input, &mut buf)?;
        if n == 0 {
            break;
        }
        output.write_all(&buf[..n])?;
        total += n as u64;
        trace!(chunk = n, total, "stream copy");
        if let Some(p) = progress.as_deref_mut() {
            p.progress(total, length.max(total));
        }
    }
    if let Some(p) = progress.as_deref_mut() {
        p.stop(total);
    }
    Ok(total)
}
