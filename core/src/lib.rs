/*
 * lib.rs
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

//! Tagliacarte content handling: message bodies held raw or transfer-encoded, written out under
//! any Content-Transfer-Encoding (RFC 2045) through pluggable codecs.
//!
//! A [`BufferContentHandler`] keeps its bytes together with the encoding they are stored in.
//! [`ContentHandler::generate`] produces the content under a requested encoding (copying,
//! encoding, or decoding and re-encoding as needed); [`ContentHandler::extract`] yields the
//! decoded bytes and [`ContentHandler::extract_raw`] the stored ones.

pub mod codec;
pub mod config;
pub mod content;
pub mod encoding;
pub mod error;
pub mod mime;
pub mod progress;
pub mod stream;

pub use codec::{Decoder, Encoder, EncoderRegistry, EncodingOptions};
pub use content::{BufferContentHandler, ContentHandler};
pub use encoding::Encoding;
pub use error::{ConfigError, TranscodeError};
pub use mime::MediaType;
pub use progress::ProgressListener;
