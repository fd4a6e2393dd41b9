/*
 * buffer.rs
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

//! In-memory content handler.

use std::io::{self, Read, Write};

use bytes::Bytes;
use tracing::debug;

use super::ContentHandler;
use crate::codec::{EncoderRegistry, EncodingOptions};
use crate::encoding::Encoding;
use crate::error::TranscodeError;
use crate::mime::MediaType;
use crate::progress::{ProgressListener, ProgressListenerSizeAdapter};
use crate::stream::{buffered_stream_copy, ByteSource};

/// Content held in memory. If `encoding` is [`Encoding::None`] the buffer holds raw bytes,
/// otherwise bytes already encoded under `encoding`. The two only ever change together.
#[derive(Debug, Clone, Default)]
pub struct BufferContentHandler {
    content_type: MediaType,
    encoding: Encoding,
    data: Bytes,
}

impl BufferContentHandler {
    pub fn new(data: impl Into<Bytes>, encoding: Encoding) -> Self {
        Self {
            content_type: MediaType::default(),
            encoding,
            data: data.into(),
        }
    }

    /// Handler over unencoded bytes.
    pub fn from_raw(data: impl Into<Bytes>) -> Self {
        Self::new(data, Encoding::None)
    }

    /// Replace data and encoding together.
    pub fn set_data(&mut self, data: impl Into<Bytes>, encoding: Encoding) {
        let data = data.into();
        (self.data, self.encoding) = (data, encoding);
    }

    /// Replace the data with unencoded bytes.
    pub fn set_raw(&mut self, data: impl Into<Bytes>) {
        self.set_data(data, Encoding::None);
    }

    /// Read `reader` to the end and replace data and encoding with the result. On a read error
    /// the handler keeps its previous data and encoding.
    pub fn set_data_from_reader(&mut self, reader: &mut dyn Read, encoding: Encoding) -> io::Result<()> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.set_data(data, encoding);
        Ok(())
    }

    /// The stored bytes, encoded if [`is_encoded`](ContentHandler::is_encoded).
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    fn source(&self) -> ByteSource {
        ByteSource::new(self.data.clone())
    }

    fn encoding_options(&self, max_line_length: usize) -> EncodingOptions {
        EncodingOptions::new(max_line_length, self.content_type.is_text())
    }

    /// [`ContentHandler::generate`] against an explicit registry.
    pub fn generate_with(
        &self,
        registry: &EncoderRegistry,
        sink: &mut dyn Write,
        encoding: &Encoding,
        max_line_length: usize,
    ) -> Result<u64, TranscodeError> {
        if !self.is_encoded() {
            if encoding.is_none() {
                debug!(len = self.data.len(), "generate: raw copy");
                return Ok(buffered_stream_copy(&mut self.source(), sink, self.data.len() as u64, None)?);
            }
            debug!(to = %encoding, len = self.data.len(), "generate: encode");
            let mut encoder = registry.encoder(encoding)?;
            return encoder.encode(&mut self.source(), sink, self.encoding_options(max_line_length), None);
        }

        if self.encoding == *encoding {
            debug!(encoding = %encoding, len = self.data.len(), "generate: passthrough");
            sink.write_all(&self.data)?;
            return Ok(self.data.len() as u64);
        }

        let mut decoder = registry.decoder(&self.encoding)?;
        if encoding.is_none() {
            debug!(from = %self.encoding, len = self.data.len(), "generate: decode");
            return decoder.decode(&mut self.source(), sink, None);
        }

        // Whole decoded payload is held in memory for the encoder and dropped on return.
        // TODO: payloads larger than memory need a spill-to-disk intermediate.
        let mut encoder = registry.encoder(encoding)?;
        debug!(from = %self.encoding, to = %encoding, len = self.data.len(), "generate: re-encode");
        let mut decoded = Vec::with_capacity(self.data.len());
        decoder.decode(&mut self.source(), &mut decoded, None)?;
        encoder.encode(&mut decoded.as_slice(), sink, self.encoding_options(max_line_length), None)
    }

    /// [`ContentHandler::extract`] against an explicit registry.
    pub fn extract_with(
        &self,
        registry: &EncoderRegistry,
        sink: &mut dyn Write,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<u64, TranscodeError> {
        let total = self.data.len() as u64;
        let mut plsa = ProgressListenerSizeAdapter::new(progress, total);
        if !self.is_encoded() {
            return Ok(buffered_stream_copy(&mut self.source(), sink, total, Some(&mut plsa))?);
        }
        let mut decoder = registry.decoder(&self.encoding)?;
        decoder.decode(&mut self.source(), sink, Some(&mut plsa))
    }
}

impl ContentHandler for BufferContentHandler {
    fn generate(
        &self,
        sink: &mut dyn Write,
        encoding: &Encoding,
        max_line_length: usize,
    ) -> Result<u64, TranscodeError> {
        self.generate_with(EncoderRegistry::global(), sink, encoding, max_line_length)
    }

    fn extract(
        &self,
        sink: &mut dyn Write,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<u64, TranscodeError> {
        self.extract_with(EncoderRegistry::global(), sink, progress)
    }

    fn extract_raw(
        &self,
        sink: &mut dyn Write,
        progress: Option<&mut dyn ProgressListener>,
    ) -> Result<u64, TranscodeError> {
        let total = self.data.len() as u64;
        let mut plsa = ProgressListenerSizeAdapter::new(progress, total);
        Ok(buffered_stream_copy(&mut self.source(), sink, total, Some(&mut plsa))?)
    }

    fn get_length(&self) -> usize {
        self.data.len()
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn is_encoded(&self) -> bool {
        !self.encoding.is_none()
    }

    fn get_encoding(&self) -> &Encoding {
        &self.encoding
    }

    fn is_buffered(&self) -> bool {
        true
    }

    fn set_content_type_hint(&mut self, media_type: MediaType) {
        self.content_type = media_type;
    }

    fn get_content_type_hint(&self) -> &MediaType {
        &self.content_type
    }

    fn clone_box(&self) -> Box<dyn ContentHandler> {
        Box::new(self.clone())
    }
}

impl From<&str> for BufferContentHandler {
    fn from(s: &str) -> Self {
        Self::from_raw(Bytes::copy_from_slice(s.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(h: &BufferContentHandler, enc: Encoding, max: usize) -> Vec<u8> {
        let mut out = Vec::new();
        h.generate(&mut out, &enc, max).unwrap();
        out
    }

    fn extract(h: &BufferContentHandler) -> Vec<u8> {
        let mut out = Vec::new();
        h.extract(&mut out, None).unwrap();
        out
    }

    #[test]
    fn raw_hello_world() {
        let h = BufferContentHandler::from("Hello, World!");
        assert_eq!(generate(&h, Encoding::Base64, 76), b"SGVsbG8sIFdvcmxkIQ==");
        assert_eq!(extract(&h), b"Hello, World!");
        assert!(!h.is_encoded());
        assert_eq!(h.get_encoding(), &Encoding::None);
    }

    #[test]
    fn same_encoding_is_passthrough() {
        // Not canonical base64 (odd whitespace): passthrough must not normalise it.
        let stored = b"SGVs bG8=\n";
        let h = BufferContentHandler::new(&stored[..], Encoding::Base64);
        assert_eq!(generate(&h, Encoding::Base64, 76), stored);
    }

    #[test]
    fn reencode_qp_to_base64() {
        let h = BufferContentHandler::new(&b"Caf=C3=A9"[..], Encoding::QuotedPrintable);
        assert_eq!(generate(&h, Encoding::Base64, 76), b"Q2Fmw6k=");
    }

    #[test]
    fn encoded_to_none_decodes() {
        let h = BufferContentHandler::new(&b"SGk="[..], Encoding::Base64);
        assert_eq!(generate(&h, Encoding::None, 76), b"Hi");
    }

    #[test]
    fn raw_to_none_copies() {
        let h = BufferContentHandler::from("as is");
        assert_eq!(generate(&h, Encoding::None, 76), b"as is");
    }

    #[test]
    fn text_hint_enables_text_mode() {
        let mut h = BufferContentHandler::from("a\nb");
        assert_eq!(generate(&h, Encoding::QuotedPrintable, 76), b"a=0Ab");
        h.set_content_type_hint(MediaType::new("text", "plain"));
        assert_eq!(generate(&h, Encoding::QuotedPrintable, 76), b"a\r\nb");
        assert_eq!(h.get_length(), 3);
    }

    #[test]
    fn hint_does_not_touch_data() {
        let mut h = BufferContentHandler::new(&b"SGk="[..], Encoding::Base64);
        h.set_content_type_hint(MediaType::new("text", "plain"));
        assert_eq!(h.data().as_ref(), b"SGk=");
        assert_eq!(h.get_encoding(), &Encoding::Base64);
        assert!(h.get_content_type_hint().is_text());
    }

    #[test]
    fn extract_raw_bypasses_decoding() {
        let h = BufferContentHandler::new(&b"SGk="[..], Encoding::Base64);
        let mut out = Vec::new();
        h.extract_raw(&mut out, None).unwrap();
        assert_eq!(out, b"SGk=");
        assert_eq!(extract(&h), b"Hi");
    }

    #[test]
    fn set_data_replaces_both() {
        let mut h = BufferContentHandler::from("plain");
        h.set_data(&b"SGk="[..], Encoding::Base64);
        assert!(h.is_encoded());
        assert_eq!(extract(&h), b"Hi");
        h.set_raw(&b""[..]);
        assert!(h.is_empty());
        assert!(!h.is_encoded());
    }

    #[test]
    fn clone_is_independent() {
        let mut a = BufferContentHandler::new(&b"SGk="[..], Encoding::Base64);
        a.set_content_type_hint(MediaType::new("text", "plain"));
        let b = a.clone();
        a.set_raw(&b"changed"[..]);
        a.set_content_type_hint(MediaType::default());
        assert_eq!(b.data().as_ref(), b"SGk=");
        assert_eq!(b.get_encoding(), &Encoding::Base64);
        assert!(b.get_content_type_hint().is_text());
    }

    #[test]
    fn unknown_target_leaves_state() {
        let h = BufferContentHandler::from("data");
        let mut out = Vec::new();
        let err = h.generate(&mut out, &Encoding::from_name("x-unknown"), 76).unwrap_err();
        assert!(matches!(err, TranscodeError::UnknownEncoding { .. }));
        assert!(out.is_empty());
        assert_eq!(h.get_length(), 4);
    }

    #[test]
    fn is_buffered() {
        assert!(BufferContentHandler::default().is_buffered());
        assert!(BufferContentHandler::default().is_empty());
    }
}
