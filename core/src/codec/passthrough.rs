/*
 * passthrough.rs
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

//! Identity codec for 7bit, 8bit and binary (RFC 2045 section 6.2).

use std::io::{Read, Write};

use super::{Decoder, Encoder, EncodingOptions};
use crate::error::TranscodeError;
use crate::progress::{ProgressListener, ProgressTracker};
use crate::stream::{read_chunk, COPY_BUFFER_SIZE};

/// These encodings only label the data; bytes are copied unchanged in both directions.
#[derive(Debug, Default)]
pub struct PassthroughCodec;

impl PassthroughCodec {
    fn copy(
        input: &mut dyn Read,
        output: &mut dyn Write,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<u64, TranscodeError> {
        let mut tracker = ProgressTracker::start(progress);
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let mut written = 0u64;
        loop {
            let n = read_chunk(input, &mut buf)?;
            if n == 0 {
                break;
            }
            output.write_all(&buf[..n])?;
            written += n as u64;
            tracker.advance(n);
        }
        tracker.stop();
        Ok(written)
    }
}

impl Encoder for PassthroughCodec {
    fn encode(
        &mut self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        _options: EncodingOptions,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<u64, TranscodeError> {
        Self::copy(input, output, progress)
    }
}

impl Decoder for PassthroughCodec {
    fn decode(
        &mut self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<u64, TranscodeError> {
        Self::copy(input, output, progress)
    }
}
