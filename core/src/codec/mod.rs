/*
 * mod.rs
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

//! Transfer-encoding codecs (RFC 2045) and the registry that selects them by name.

mod base64;
mod passthrough;
mod quoted_printable;
mod registry;
mod uuencode;

use std::io::{Read, Write};

use crate::error::TranscodeError;
use crate::progress::ProgressListener;

pub use self::base64::{Base64Decoder, Base64Encoder};
pub use passthrough::PassthroughCodec;
pub use quoted_printable::{QuotedPrintableDecoder, QuotedPrintableEncoder};
pub use registry::{boxed_decoder, boxed_encoder, CodecFactory, EncoderRegistry};
pub use uuencode::{UuDecoder, UuEncoder};

/// Default line length for generated content (RFC 2045).
pub const DEFAULT_MAX_LINE_LENGTH: usize = 76;

/// Hard ceiling for base64 and quoted-printable lines (RFC 2045 section 6.7/6.8).
pub const MAX_RFC_LINE_LENGTH: usize = 76;

/// Options for one encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingOptions {
    /// Encoders never emit a line longer than this (excluding CRLF).
    pub max_line_length: usize,
    /// Content is text: line breaks in the input are line breaks, not data.
    pub text_mode: bool,
}

impl EncodingOptions {
    pub fn new(max_line_length: usize, text_mode: bool) -> Self {
        Self { max_line_length, text_mode }
    }

    /// Line length for encodings capped at 76 characters; errors when below `min`.
    pub(crate) fn line_length_within(&self, encoding: &str, min: usize) -> Result<usize, TranscodeError> {
        if self.max_line_length < min {
            return Err(TranscodeError::codec(
                encoding,
                format!("max line length {} below minimum {}", self.max_line_length, min),
            ));
        }
        Ok(self.max_line_length.min(MAX_RFC_LINE_LENGTH))
    }
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LENGTH, false)
    }
}

/// Encodes raw bytes read from `input` into `output`. Returns bytes written.
pub trait Encoder: Send {
    fn encode(
        &mut self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        options: EncodingOptions,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<u64, TranscodeError>;
}

/// Decodes encoded bytes read from `input` into `output`. Returns bytes written.
/// Progress is reported in bytes of input consumed.
pub trait Decoder: Send {
    fn decode(
        &mut self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<u64, TranscodeError>;
}

/// Writes encoder output, inserting CRLF so no line exceeds `max`. A break is only written
/// when more output follows, so encoded data never ends with a dangling CRLF.
pub(crate) struct LineFolder<'a> {
    out: &'a mut dyn Write,
    max: usize,
    column: usize,
    written: u64,
}

impl<'a> LineFolder<'a> {
    pub(crate) fn new(out: &'a mut dyn Write, max: usize) -> Self {
        Self { out, max, column: 0, written: 0 }
    }

    pub(crate) fn write_folded(&mut self, mut data: &[u8]) -> std::io::Result<()> {
        while !data.is_empty() {
            if self.column >= self.max {
                self.write_raw(b"\r\n")?;
            }
            let n = (self.max - self.column).min(data.len());
            self.write_raw(&data[..n])?;
            data = &data[n..];
        }
        Ok(())
    }

    /// Write without folding; a CRLF in `data` resets the column.
    pub(crate) fn write_raw(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.out.write_all(data)?;
        self.written += data.len() as u64;
        if data.ends_with(b"\n") {
            self.column = 0;
        } else {
            self.column += data.len();
        }
        Ok(())
    }

    pub(crate) fn column(&self) -> usize {
        self.column
    }

    pub(crate) fn written(&self) -> u64 {
        self.written
    }
}
