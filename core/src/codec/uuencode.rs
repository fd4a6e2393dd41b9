/*
 * uuencode.rs
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

//! UUEncode (begin/end framed, 45 bytes per line).

use std::io::{BufRead, BufReader, Read, Write};

use tracing::warn;

use super::{Decoder, Encoder, EncodingOptions};
use crate::error::TranscodeError;
use crate::progress::{ProgressListener, ProgressTracker};
use crate::stream::{read_chunk, COPY_BUFFER_SIZE};

const NAME: &str = "uuencode";

const HEADER: &[u8] = b"begin 644 no_name";

/// Most input bytes carried by one line (length character `M`).
const MAX_LINE_BYTES: usize = 45;

#[inline]
fn enc(v: u8) -> u8 {
    let v = v & 0x3f;
    if v == 0 {
        b'`'
    } else {
        v + b' '
    }
}

#[inline]
fn dec(c: u8) -> u8 {
    c.wrapping_sub(b' ') & 0x3f
}

fn encode_line(chunk: &[u8], line: &mut Vec<u8>) {
    line.clear();
    line.push(enc(chunk.len() as u8));
    for group in chunk.chunks(3) {
        let b0 = group[0];
        let b1 = group.get(1).copied().unwrap_or(0);
        let b2 = group.get(2).copied().unwrap_or(0);
        line.push(enc(b0 >> 2));
        line.push(enc((b0 << 4) | (b1 >> 4)));
        line.push(enc((b1 << 2) | (b2 >> 6)));
        line.push(enc(b2));
    }
    line.extend_from_slice(b"\r\n");
}

#[derive(Debug, Default)]
pub struct UuEncoder;

impl Encoder for UuEncoder {
    fn encode(
        &mut self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        options: EncodingOptions,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<u64, TranscodeError> {
        if options.max_line_length < HEADER.len() {
            return Err(TranscodeError::codec(
                NAME,
                format!("max line length {} below minimum {}", options.max_line_length, HEADER.len()),
            ));
        }
        let per_line = ((options.max_line_length - 1) / 4 * 3).min(MAX_LINE_BYTES);
        let mut tracker = ProgressTracker::start(progress);
        let mut written = 0u64;

        emit(output, HEADER, &mut written)?;
        emit(output, b"\r\n", &mut written)?;
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let mut pending: Vec<u8> = Vec::with_capacity(COPY_BUFFER_SIZE + per_line);
        let mut line = Vec::with_capacity(MAX_LINE_BYTES / 3 * 4 + 3);
        loop {
            let n = read_chunk(input, &mut buf)?;
            if n == 0 {
                break;
            }
            tracker.advance(n);
            pending.extend_from_slice(&buf[..n]);
            let whole = pending.len() / per_line * per_line;
            for chunk in pending[..whole].chunks(per_line) {
                encode_line(chunk, &mut line);
                emit(output, &line, &mut written)?;
            }
            pending.drain(..whole);
        }
        if !pending.is_empty() {
            encode_line(&pending, &mut line);
            emit(output, &line, &mut written)?;
        }
        emit(output, b"`\r\nend\r\n", &mut written)?;
        tracker.stop();
        Ok(written)
    }
}

fn emit(out: &mut dyn Write, data: &[u8], written: &mut u64) -> std::io::Result<()> {
    out.write_all(data)?;
    *written += data.len() as u64;
    Ok(())
}

/// Decodes uuencoded lines. The `begin` line is optional; decoding stops at the zero-length
/// line or `end`. Short lines are zero-filled rather than rejected.
#[derive(Debug, Default)]
pub struct UuDecoder;

impl Decoder for UuDecoder {
    fn decode(
        &mut self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<u64, TranscodeError> {
        let mut tracker = ProgressTracker::start(progress);
        let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, input);
        let mut raw = Vec::new();
        let mut out = Vec::with_capacity(MAX_LINE_BYTES + 3);
        let mut written = 0u64;
        let mut short_lines = 0usize;

        loop {
            raw.clear();
            let n = reader.read_until(b'\n', &mut raw)?;
            if n == 0 {
                break;
            }
            tracker.advance(n);
            let line = trim_line_end(&raw);
            // Transport may pad lines with trailing blanks; frame lines are matched without them.
            let bare = line.trim_ascii_end();
            if bare.is_empty() || bare.starts_with(b"begin ") {
                continue;
            }
            if bare == b"end" {
                break;
            }
            let count = dec(line[0]) as usize;
            if count == 0 {
                break;
            }
            let chars = &line[1..];
            if chars.len() < count.div_ceil(3) * 4 {
                short_lines += 1;
            }
            out.clear();
            let mut i = 0;
            while out.len() < count {
                let c = |k: usize| chars.get(i + k).map(|&c| dec(c)).unwrap_or(0);
                let (c0, c1, c2, c3) = (c(0), c(1), c(2), c(3));
                out.push((c0 << 2) | (c1 >> 4));
                out.push((c1 << 4) | (c2 >> 2));
                out.push((c2 << 6) | c3);
                i += 4;
            }
            out.truncate(count);
            output.write_all(&out)?;
            written += out.len() as u64;
        }
        if short_lines > 0 {
            warn!(short_lines, "zero-filled truncated uuencode lines");
        }
        tracker.stop();
        Ok(written)
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && (line[end - 1] == b'\n' || line[end - 1] == b'\r') {
        end -= 1;
    }
    &line[..end]
}
