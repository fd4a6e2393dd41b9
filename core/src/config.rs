/*
 * config.rs
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

//! Transcoding settings: default line length and encoding aliases, read from
//! ~/.tagliacarte/transcode.xml with the quick_xml reader.
//!
//! ```xml
//! <transcode>
//!   <max-line-length>76</max-line-length>
//!   <alias name="x-uuencode" encoding="uuencode"/>
//! </transcode>
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::debug;

use crate::codec::{EncoderRegistry, DEFAULT_MAX_LINE_LENGTH};
use crate::error::ConfigError;

/// Line length used when a caller does not give one.
static DEFAULT_LINE_LENGTH: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_LINE_LENGTH);

/// Set the process-wide default line length. Zero is ignored.
pub fn set_default_max_line_length(max_line_length: usize) {
    if max_line_length > 0 {
        DEFAULT_LINE_LENGTH.store(max_line_length, Ordering::SeqCst);
    }
}

/// Process-wide default line length (76 unless configured).
pub fn default_max_line_length() -> usize {
    DEFAULT_LINE_LENGTH.load(Ordering::SeqCst)
}

/// Default config directory: ~/.tagliacarte.
pub fn default_config_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from).map(|h| h.join(".tagliacarte"))
}

/// Default settings path: ~/.tagliacarte/transcode.xml.
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|d| d.join("transcode.xml"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeConfig {
    pub max_line_length: usize,
    /// (alias, target encoding name).
    pub aliases: Vec<(String, String)>,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            aliases: Vec::new(),
        }
    }
}

impl TranscodeConfig {
    /// Register the aliases in `registry` and make `max_line_length` the process default.
    pub fn apply(&self, registry: &EncoderRegistry) {
        for (alias, target) in &self.aliases {
            registry.alias(alias, target);
        }
        set_default_max_line_length(self.max_line_length);
    }
}

/// Load settings from `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<TranscodeConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no transcode config, using defaults");
            return Ok(TranscodeConfig::default());
        }
        Err(e) => return Err(e.into()),
    };
    parse_config(&content)
}

/// Parse settings XML. Unknown elements are ignored.
pub fn parse_config(content: &str) -> Result<TranscodeConfig, ConfigError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);
    let mut config = TranscodeConfig::default();
    let mut in_line_length = false;

    loop {
        match reader.read_event() {
            Err(e) => return Err(ConfigError::xml(e)),
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let name = e.name();
                if name.as_ref() == b"max-line-length" {
                    in_line_length = true;
                } else if name.as_ref() == b"alias" {
                    config.aliases.push(parse_alias(&e)?);
                }
            }
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"alias" {
                    config.aliases.push(parse_alias(&e)?);
                }
            }
            Ok(Event::Text(e)) => {
                if !in_line_length {
                    continue;
                }
                let text = e.unescape().map_err(ConfigError::xml)?;
                let text = text.trim();
                config.max_line_length = match text.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => return Err(ConfigError::invalid(format!("bad max-line-length: {:?}", text))),
                };
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"max-line-length" {
                    in_line_length = false;
                }
            }
            _ => {}
        }
    }
    Ok(config)
}

/// `<alias name="..." encoding="..."/>`: both attributes required.
fn parse_alias(e: &BytesStart<'_>) -> Result<(String, String), ConfigError> {
    let mut name = None;
    let mut encoding = None;
    for attr in e.attributes() {
        let attr = attr.map_err(ConfigError::xml)?;
        let value = attr.unescape_value().map_err(ConfigError::xml)?.trim().to_string();
        match attr.key.as_ref() {
            b"name" => name = Some(value),
            b"encoding" => encoding = Some(value),
            _ => {}
        }
    }
    match (name, encoding) {
        (Some(n), Some(enc)) if !n.is_empty() && !enc.is_empty() => Ok((n, enc)),
        _ => Err(ConfigError::invalid("alias needs name and encoding attributes")),
    }
}
