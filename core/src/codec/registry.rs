/*
 * registry.rs
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

//! Encoder/decoder registry: encoding name -> pair of factories.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::{
    Base64Decoder, Base64Encoder, Decoder, Encoder, PassthroughCodec, QuotedPrintableDecoder,
    QuotedPrintableEncoder, UuDecoder, UuEncoder,
};
use crate::encoding::Encoding;
use crate::error::TranscodeError;

/// Factories for one encoding. Each call yields a fresh codec, so nothing is shared between
/// unrelated transcoding calls.
#[derive(Clone, Copy)]
pub struct CodecFactory {
    pub encoder: fn() -> Box<dyn Encoder>,
    pub decoder: fn() -> Box<dyn Decoder>,
}

impl std::fmt::Debug for CodecFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CodecFactory")
    }
}

/// Factory for any default-constructible encoder.
pub fn boxed_encoder<E: Encoder + Default + 'static>() -> Box<dyn Encoder> {
    Box::new(E::default())
}

/// Factory for any default-constructible decoder.
pub fn boxed_decoder<D: Decoder + Default + 'static>() -> Box<dyn Decoder> {
    Box::new(D::default())
}

#[derive(Debug, Default)]
struct Tables {
    codecs: HashMap<String, CodecFactory>,
    aliases: HashMap<String, String>,
}

/// Maps encoding names (case-insensitive) to codec factories. Extended by registration.
#[derive(Debug, Default)]
pub struct EncoderRegistry {
    tables: RwLock<Tables>,
}

impl EncoderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the standard transfer encodings.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(
            "base64",
            CodecFactory {
                encoder: boxed_encoder::<Base64Encoder>,
                decoder: boxed_decoder::<Base64Decoder>,
            },
        );
        registry.register(
            "quoted-printable",
            CodecFactory {
                encoder: boxed_encoder::<QuotedPrintableEncoder>,
                decoder: boxed_decoder::<QuotedPrintableDecoder>,
            },
        );
        registry.register(
            "uuencode",
            CodecFactory {
                encoder: boxed_encoder::<UuEncoder>,
                decoder: boxed_decoder::<UuDecoder>,
            },
        );
        let passthrough = CodecFactory {
            encoder: boxed_encoder::<PassthroughCodec>,
            decoder: boxed_decoder::<PassthroughCodec>,
        };
        for name in ["7bit", "8bit", "binary"] {
            registry.register(name, passthrough);
        }
        registry.alias("x-uuencode", "uuencode");
        registry.alias("x-uue", "uuencode");
        registry
    }

    /// Process-wide registry, initialised with the standard encodings on first use.
    pub fn global() -> &'static EncoderRegistry {
        static GLOBAL: OnceLock<EncoderRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::with_defaults)
    }

    /// Register (or replace) the codecs for `name`.
    pub fn register(&self, name: &str, factory: CodecFactory) {
        let name = name.trim().to_ascii_lowercase();
        debug!(encoding = %name, "register codec");
        self.write().codecs.insert(name, factory);
    }

    /// Make `alias` resolve to the codecs registered for `target`.
    pub fn alias(&self, alias: &str, target: &str) {
        self.write()
            .aliases
            .insert(alias.trim().to_ascii_lowercase(), target.trim().to_ascii_lowercase());
    }

    pub fn contains(&self, encoding: &Encoding) -> bool {
        self.lookup(encoding).is_ok()
    }

    /// Names of all registered encodings (aliases excluded), sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().codecs.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn encoder(&self, encoding: &Encoding) -> Result<Box<dyn Encoder>, TranscodeError> {
        self.lookup(encoding).map(|f| (f.encoder)())
    }

    pub fn decoder(&self, encoding: &Encoding) -> Result<Box<dyn Decoder>, TranscodeError> {
        self.lookup(encoding).map(|f| (f.decoder)())
    }

    fn lookup(&self, encoding: &Encoding) -> Result<CodecFactory, TranscodeError> {
        let tables = self.read();
        let name = encoding.name().to_ascii_lowercase();
        let name = tables.aliases.get(&name).map(String::as_str).unwrap_or(&name);
        tables
            .codecs
            .get(name)
            .copied()
            .ok_or_else(|| TranscodeError::unknown_encoding(encoding.name()))
    }

    // A panic while holding the lock cannot leave the maps half-updated (each write is a
    // single insert), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }
}
