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

//! Content handlers: hold a body either raw or transfer-encoded and hand it out under any encoding.

mod buffer;

use std::fmt;
use std::io::Write;

use crate::encoding::Encoding;
use crate::error::TranscodeError;
use crate::mime::MediaType;
use crate::progress::ProgressListener;

pub use buffer::BufferContentHandler;

/// Contract shared by content handlers. Read operations take `&self` and never change the
/// handler; the only mutators need `&mut self`, so a handler being read from cannot be
/// modified at the same time.
pub trait ContentHandler: fmt::Debug + Send + Sync {
    /// Write the content to `sink` encoded under `encoding`, with lines no longer than
    /// `max_line_length` where the encoding folds lines. Returns bytes written.
    fn generate(
        &self,
        sink: &mut dyn Write,
        encoding: &Encoding,
        max_line_length: usize,
    ) -> Result<u64, TranscodeError>;

    /// Write the decoded content to `sink`. Progress counts stored bytes consumed.
    fn extract(
        &self,
        sink: &mut dyn Write,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<u64, TranscodeError>;

    /// Write the stored bytes to `sink` verbatim, encoded or not.
    fn extract_raw(
        &self,
        sink: &mut dyn Write,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<u64, TranscodeError>;

    /// Length of the stored data (encoded length when encoded).
    fn get_length(&self) -> usize;

    fn is_empty(&self) -> bool;

    /// True if the stored data is transfer-encoded.
    fn is_encoded(&self) -> bool;

    /// Encoding of the stored data; [`Encoding::None`] when not encoded.
    fn get_encoding(&self) -> &Encoding;

    /// True if the data is held in memory and can be read any number of times.
    fn is_buffered(&self) -> bool;

    fn set_content_type_hint(&mut self, media_type: MediaType);

    fn get_content_type_hint(&self) -> &MediaType;

    fn clone_box(&self) -> Box<dyn ContentHandler>;
}

impl Clone for Box<dyn ContentHandler> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
