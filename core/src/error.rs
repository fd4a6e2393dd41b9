/*
 * error.rs
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

//! Transcoding and configuration errors.

use std::io;

use thiserror::Error;

/// Errors from generate, extract or a codec. Handler state is never modified when one is returned;
/// bytes already written to the sink stay written.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// Malformed input to a decoder, or an encoder rejecting its options.
    #[error("{encoding} codec error: {reason}")]
    Codec { encoding: String, reason: String },

    /// Sink write failure or source read failure, passed through unchanged.
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// No encoder/decoder registered under this name.
    #[error("unknown encoding: {name}")]
    UnknownEncoding { name: String },
}

impl TranscodeError {
    pub fn codec<S: ToString>(encoding: &str, reason: S) -> Self {
        Self::Codec {
            encoding: encoding.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn unknown_encoding<S: ToString>(name: S) -> Self {
        Self::UnknownEncoding { name: name.to_string() }
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Errors loading the transcoding configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("XML parse error: {reason}")]
    Xml { reason: String },

    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}

impl ConfigError {
    pub fn xml<S: ToString>(reason: S) -> Self {
        Self::Xml { reason: reason.to_string() }
    }

    pub fn invalid<S: ToString>(reason: S) -> Self {
        Self::Invalid { reason: reason.to_string() }
    }
}
