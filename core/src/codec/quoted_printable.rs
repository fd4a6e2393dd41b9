/*
 * quoted_printable.rs
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

//! Quoted-Printable Content-Transfer-Encoding (RFC 2045 section 6.7).

use std::io::{self, Read, Write};

use tracing::warn;

use super::{Decoder, Encoder, EncodingOptions, LineFolder};
use crate::error::TranscodeError;
use crate::progress::{ProgressListener, ProgressTracker};
use crate::stream::{read_chunk, COPY_BUFFER_SIZE};

const NAME: &str = "quoted-printable";

const HEX_ENCODE: &[u8; 16] = b"0123456789ABCDEF";

const HEX_DECODE: [i8; 256] = {
    let mut t = [-1i8; 256];
    let mut i = 0u8;
    while i < 10 {
        t[(b'0' + i) as usize] = i as i8;
        i = i.wrapping_add(1);
    }
    let mut i = 0u8;
    while i < 6 {
        t[(b'A' + i) as usize] = (10 + i) as i8;
        t[(b'a' + i) as usize] = (10 + i) as i8;
        i = i.wrapping_add(1);
    }
    t
};

#[inline]
fn is_literal(b: u8) -> bool {
    (33..=126).contains(&b) && b != b'='
}

/// Encoder state carried across input chunks.
struct QpWriter {
    line_length: usize,
    text: bool,
    /// Space or tab whose encoding depends on whether a line break follows.
    pending_ws: Option<u8>,
    /// Text mode: CR seen, waiting to see whether LF follows.
    saw_cr: bool,
}

impl QpWriter {
    fn push(&mut self, b: u8, f: &mut LineFolder<'_>) -> io::Result<()> {
        if self.saw_cr {
            self.saw_cr = false;
            if b == b'\n' {
                return f.write_raw(b"\r\n");
            }
            self.escape(b'\r', f)?;
        }
        match b {
            b'\r' if self.text => {
                self.flush_ws(f, true)?;
                self.saw_cr = true;
                Ok(())
            }
            b'\n' if self.text => {
                self.flush_ws(f, true)?;
                f.write_raw(b"\r\n")
            }
            b' ' | b'\t' => {
                self.flush_ws(f, false)?;
                self.pending_ws = Some(b);
                Ok(())
            }
            _ => {
                self.flush_ws(f, false)?;
                if is_literal(b) {
                    self.token(&[b], f)
                } else {
                    self.escape(b, f)
                }
            }
        }
    }

    fn finish(&mut self, f: &mut LineFolder<'_>) -> io::Result<()> {
        if self.saw_cr {
            self.saw_cr = false;
            self.escape(b'\r', f)?;
        }
        self.flush_ws(f, true)
    }

    fn flush_ws(&mut self, f: &mut LineFolder<'_>, at_line_end: bool) -> io::Result<()> {
        match self.pending_ws.take() {
            Some(ws) if at_line_end => self.escape(ws, f),
            Some(ws) => self.token(&[ws], f),
            None => Ok(()),
        }
    }

    fn escape(&mut self, b: u8, f: &mut LineFolder<'_>) -> io::Result<()> {
        let token = [b'=', HEX_ENCODE[(b >> 4) as usize], HEX_ENCODE[(b & 0x0f) as usize]];
        self.token(&token, f)
    }

    /// Write one indivisible token, inserting a soft break first if it would not fit.
    /// One column is always kept free for the `=` of a soft break.
    fn token(&mut self, token: &[u8], f: &mut LineFolder<'_>) -> io::Result<()> {
        if f.column() + token.len() > self.line_length - 1 {
            f.write_raw(b"=\r\n")?;
        }
        f.write_raw(token)
    }
}

/// Quoted-printable encoder. In text mode CRLF and bare LF become hard line breaks;
/// otherwise every CR and LF is escaped.
#[derive(Debug, Default)]
pub struct QuotedPrintableEncoder;

impl Encoder for QuotedPrintableEncoder {
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
        let mut state = QpWriter {
            line_length,
            text: options.text_mode,
            pending_ws: None,
            saw_cr: false,
        };
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        loop {
            let n = read_chunk(input, &mut buf)?;
            if n == 0 {
                break;
            }
            for &b in &buf[..n] {
                state.push(b, &mut folder)?;
            }
            tracker.advance(n);
        }
        state.finish(&mut folder)?;
        tracker.stop();
        Ok(folder.written())
    }
}

#[derive(Clone, Copy)]
enum DecodeState {
    Normal,
    /// Saw `=`.
    Equals,
    /// Saw `=` and one hex digit (the raw byte is kept for malformed output).
    Hex(u8),
    /// Saw `=` CR.
    SoftCr,
}

/// Quoted-printable decoder. Handles `=XX`, soft line breaks (`=CRLF`, `=LF`) and passes
/// malformed escapes through literally. Unencoded space and tab at the end of a line are
/// transport padding and are dropped (RFC 2045 section 6.7 rule 3).
#[derive(Debug, Default)]
pub struct QuotedPrintableDecoder;

impl Decoder for QuotedPrintableDecoder {
    fn decode(
        &mut self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<u64, TranscodeError> {
        let mut tracker = ProgressTracker::start(progress);
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let mut out: Vec<u8> = Vec::with_capacity(COPY_BUFFER_SIZE + 2);
        let mut state = DecodeState::Normal;
        // Literal whitespace not yet known to be followed by data on the same line.
        let mut ws: Vec<u8> = Vec::new();
        let mut malformed = 0usize;
        let mut written = 0u64;

        loop {
            let n = read_chunk(input, &mut buf)?;
            if n == 0 {
                break;
            }
            for &b in &buf[..n] {
                state = match state {
                    DecodeState::Normal => literal_or_escape(b, &mut out, &mut ws),
                    DecodeState::Equals => {
                        if HEX_DECODE[b as usize] >= 0 {
                            DecodeState::Hex(b)
                        } else if b == b'\r' {
                            DecodeState::SoftCr
                        } else if b == b'\n' {
                            DecodeState::Normal
                        } else {
                            malformed += 1;
                            out.push(b'=');
                            literal_or_escape(b, &mut out, &mut ws)
                        }
                    }
                    DecodeState::Hex(h) => {
                        let v2 = HEX_DECODE[b as usize];
                        if v2 >= 0 {
                            out.push(((HEX_DECODE[h as usize] as u8) << 4) | v2 as u8);
                            DecodeState::Normal
                        } else {
                            malformed += 1;
                            out.push(b'=');
                            out.push(h);
                            literal_or_escape(b, &mut out, &mut ws)
                        }
                    }
                    DecodeState::SoftCr => {
                        if b == b'\n' {
                            DecodeState::Normal
                        } else {
                            malformed += 1;
                            out.extend_from_slice(b"=\r");
                            literal_or_escape(b, &mut out, &mut ws)
                        }
                    }
                };
            }
            output.write_all(&out)?;
            written += out.len() as u64;
            out.clear();
            tracker.advance(n);
        }
        match state {
            DecodeState::Equals => {
                malformed += 1;
                out.push(b'=');
            }
            DecodeState::Hex(h) => {
                malformed += 1;
                out.push(b'=');
                out.push(h);
            }
            DecodeState::SoftCr => {
                malformed += 1;
                out.extend_from_slice(b"=\r");
            }
            DecodeState::Normal => {}
        }
        output.write_all(&out)?;
        written += out.len() as u64;
        if malformed > 0 {
            warn!(malformed, "passed malformed quoted-printable escapes through");
        }
        tracker.stop();
        Ok(written)
    }
}

/// Handle `b` in the normal state. Space and tab are held in `ws` until a non-break byte
/// follows; a line break (or end of input) discards them.
fn literal_or_escape(b: u8, out: &mut Vec<u8>, ws: &mut Vec<u8>) -> DecodeState {
    match b {
        b' ' | b'\t' => {
            ws.push(b);
            return DecodeState::Normal;
        }
        b'\r' | b'\n' => ws.clear(),
        _ => out.append(ws),
    }
    if b == b'=' {
        DecodeState::Equals
    } else {
        out.push(b);
        DecodeState::Normal
    }
}
