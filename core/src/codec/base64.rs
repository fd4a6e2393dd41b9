/*
 * base64.rs
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

//! Base64 Content-Transfer-Encoding (RFC 2045 section 6.8).

use std::io::{Read, Write};
use std::sync::OnceLock;

use ::base64::engine::general_purpose::STANDARD;
use ::base64::Engine;
use tracing::warn;

use super::{Decoder, Encoder, EncodingOptions, LineFolder};
use crate::error::TranscodeError;
use crate::progress::{ProgressListener, ProgressTracker};
use crate::stream::{read_chunk, COPY_BUFFER_SIZE};

const NAME: &str = "base64";

const INVALID: i8 = -1;
const WHITESPACE: i8 = -2;

fn decode_table() -> &'static [i8; 256] {
    static TABLE: OnceLock<[i8; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut t = [INVALID; 256];
        t[b' ' as usize] = WHITESPACE;
        t[b'\t' as usize] = WHITESPACE;
        t[b'\r' as usize] = WHITESPACE;
        t[b'\n' as usize] = WHITESPACE;
        for i in 0..26u8 {
            t[(b'A' + i) as usize] = i as i8;
            t[(b'a' + i) as usize] = (26 + i) as i8;
        }
        for i in 0..10u8 {
            t[(b'0' + i) as usize] = (52 + i) as i8;
        }
        t[b'+' as usize] = 62;
        t[b'/' as usize] = 63;
        t
    })
}

/// Encodes in whole 3-byte groups; a short tail is carried to the next read and padded at the end.
#[derive(Debug, Default)]
pub struct Base64Encoder;

impl Encoder for Base64Encoder {
    fn encode(
        &mut self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        options: EncodingOptions,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<u64, TranscodeError> {
        let line_length = options.line_length_within(NAME, 4)?;
        let mut tracker = ProgressTracker::start(progress);
        let mut folder = LineFolder::new(output, line_length);
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let mut pending: Vec<u8> = Vec::with_capacity(COPY_BUFFER_SIZE + 2);
        let mut encoded = String::with_capacity(COPY_BUFFER_SIZE / 3 * 4 + 4);

        loop {
            let n = read_chunk(input, &mut buf)?;
            if n == 0 {
                break;
            }
            tracker.advance(n);
            pending.extend_from_slice(&buf[..n]);
            let whole = pending.len() / 3 * 3;
            if whole == 0 {
                continue;
            }
            encoded.clear();
            STANDARD.encode_string(&pending[..whole], &mut encoded);
            folder.write_folded(encoded.as_bytes())?;
            pending.drain(..whole);
        }
        if !pending.is_empty() {
            encoded.clear();
            STANDARD.encode_string(&pending, &mut encoded);
            folder.write_folded(encoded.as_bytes())?;
        }
        tracker.stop();
        Ok(folder.written())
    }
}

/// Decodes 4-character quanta, skipping whitespace and characters outside the alphabet.
/// Padding flushes the current quantum; decoding resumes after it so concatenated
/// base64 runs decode as one stream.
#[derive(Debug, Default)]
pub struct Base64Decoder;

impl Decoder for Base64Decoder {
    fn decode(
        &mut self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<u64, TranscodeError> {
        let table = decode_table();
        let mut tracker = ProgressTracker::start(progress);
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let mut out: Vec<u8> = Vec::with_capacity(COPY_BUFFER_SIZE / 4 * 3 + 3);
        let mut quantum: u32 = 0;
        let mut quantum_bits: u32 = 0;
        let mut invalid = 0usize;
        let mut written = 0u64;

        loop {
            let n = read_chunk(input, &mut buf)?;
            if n == 0 {
                break;
            }
            for &b in &buf[..n] {
                let val = table[b as usize];
                if val >= 0 {
                    quantum = (quantum << 6) | (val as u32);
                    quantum_bits += 6;
                    if quantum_bits == 24 {
                        out.push((quantum >> 16) as u8);
                        out.push((quantum >> 8) as u8);
                        out.push(quantum as u8);
                        quantum = 0;
                        quantum_bits = 0;
                    }
                } else if b == b'=' {
                    flush_quantum(quantum, quantum_bits, &mut out);
                    quantum = 0;
                    quantum_bits = 0;
                } else if val == INVALID {
                    invalid += 1;
                }
            }
            output.write_all(&out)?;
            written += out.len() as u64;
            out.clear();
            tracker.advance(n);
        }
        flush_quantum(quantum, quantum_bits, &mut out);
        output.write_all(&out)?;
        written += out.len() as u64;
        if invalid > 0 {
            warn!(invalid, "skipped characters outside the base64 alphabet");
        }
        tracker.stop();
        Ok(written)
    }
}

/// Emit the whole bytes held in a partial quantum (12 bits -> 1 byte, 18 bits -> 2 bytes).
fn flush_quantum(quantum: u32, quantum_bits: u32, out: &mut Vec<u8>) {
    if quantum_bits >= 8 {
        out.push((quantum >> (quantum_bits - 8)) as u8);
        if quantum_bits >= 16 {
            out.push((quantum >> (quantum_bits - 16)) as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(data: &[u8], max: usize) -> Vec<u8> {
        let mut out = Vec::new();
        Base64Encoder
            .encode(&mut &data[..], &mut out, EncodingOptions::new(max, false), None)
            .unwrap();
        out
    }

    fn decode(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        Base64Decoder.decode(&mut &data[..], &mut out, None).unwrap();
        out
    }

    #[test]
    fn encode_hello_world() {
        assert_eq!(encode(b"Hello, World!", 76), b"SGVsbG8sIFdvcmxkIQ==");
    }

    #[test]
    fn encode_folds_lines() {
        let out = encode(&[0u8; 60], 76);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 76);
        assert_eq!(lines[1].len(), 4);
    }

    #[test]
    fn encode_clamps_to_rfc_limit() {
        let out = encode(&[0xffu8; 300], 1000);
        let text = String::from_utf8(out).unwrap();
        assert!(text.split("\r\n").all(|l| l.len() <= 76));
    }

    #[test]
    fn encode_rejects_tiny_line_length() {
        let mut out = Vec::new();
        let err = Base64Encoder
            .encode(&mut &b"abc"[..], &mut out, EncodingOptions::new(3, false), None)
            .unwrap_err();
        assert!(matches!(err, TranscodeError::Codec { .. }));
    }

    #[test]
    fn decode_ignores_whitespace_and_garbage() {
        assert_eq!(decode(b"SGVs\r\nbG8s IFdv*cmxk\tIQ==\r\n"), b"Hello, World!");
    }

    #[test]
    fn decode_without_padding() {
        assert_eq!(decode(b"SGk"), b"Hi");
    }

    #[test]
    fn decode_concatenated_runs() {
        assert_eq!(decode(b"SGk=SGk="), b"HiHi");
    }

    #[test]
    fn decode_across_read_boundaries() {
        let encoded = encode(&vec![0xa5u8; COPY_BUFFER_SIZE * 2 + 1], 76);
        let decoded = decode(&encoded);
        assert_eq!(decoded, vec![0xa5u8; COPY_BUFFER_SIZE * 2 + 1]);
    }
}
