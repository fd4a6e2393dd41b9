/*
 * encoding.rs
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

//! Content-Transfer-Encoding identifiers (RFC 2045) and encoding selection.

use std::fmt;
use std::str::FromStr;

/// Transfer encoding of a content buffer. `None` means the buffer holds raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    #[default]
    None,
    SevenBit,
    EightBit,
    Binary,
    Base64,
    QuotedPrintable,
    UuEncode,
    /// Any other name, resolved through the encoder registry.
    Other(String),
}

/// Longest line allowed in 7bit/8bit data, excluding CRLF (RFC 5322).
const MAX_7BIT_LINE: usize = 998;

impl Encoding {
    pub fn name(&self) -> &str {
        match self {
            Encoding::None => "none",
            Encoding::SevenBit => "7bit",
            Encoding::EightBit => "8bit",
            Encoding::Binary => "binary",
            Encoding::Base64 => "base64",
            Encoding::QuotedPrintable => "quoted-printable",
            Encoding::UuEncode => "uuencode",
            Encoding::Other(name) => name,
        }
    }

    /// Parse a Content-Transfer-Encoding value. Case-insensitive; never fails, unknown names
    /// become [`Encoding::Other`] in lowercase.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "" | "none" => Encoding::None,
            "7bit" => Encoding::SevenBit,
            "8bit" => Encoding::EightBit,
            "binary" => Encoding::Binary,
            "base64" => Encoding::Base64,
            "quoted-printable" => Encoding::QuotedPrintable,
            "uuencode" => Encoding::UuEncode,
            _ => Encoding::Other(name),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Encoding::None)
    }

    /// Choose a transfer encoding for `data`: 7bit when it already fits, quoted-printable for
    /// mostly-ASCII text, base64 for everything else.
    pub fn decide(data: &[u8], text: bool) -> Encoding {
        let mut needs_escape = 0usize;
        let mut line_len = 0usize;
        let mut long_line = false;
        for &b in data {
            match b {
                b'\n' => line_len = 0,
                b'\r' => {}
                _ => {
                    line_len += 1;
                    if line_len > MAX_7BIT_LINE {
                        long_line = true;
                    }
                }
            }
            if b == 0 || b >= 0x80 {
                needs_escape += 1;
            }
        }
        if needs_escape == 0 && !long_line {
            return Encoding::SevenBit;
        }
        if text && needs_escape * 6 <= data.len() {
            return Encoding::QuotedPrintable;
        }
        Encoding::Base64
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Encoding::from_name(s))
    }
}

impl From<&str> for Encoding {
    fn from(s: &str) -> Self {
        Encoding::from_name(s)
    }
}
