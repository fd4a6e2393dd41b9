/*
 * media_type.rs
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

//! Media type (RFC 2045 type/subtype) used as a content-type hint.

use std::fmt;

/// `type/subtype`, compared case-insensitively. Parameters are not kept: the hint only
/// decides whether content is text.
#[derive(Debug, Clone)]
pub struct MediaType {
    primary_type: String,
    sub_type: String,
}

impl MediaType {
    pub fn new(primary_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            primary_type: primary_type.into().to_ascii_lowercase(),
            sub_type: sub_type.into().to_ascii_lowercase(),
        }
    }

    /// Parse `type/subtype`, ignoring any `;` parameters. Returns None if either part is not a token.
    pub fn parse(value: &str) -> Option<MediaType> {
        let value = value.trim();
        let type_part = match value.find(';') {
            Some(i) => value[..i].trim(),
            None => value,
        };
        let slash = type_part.find('/')?;
        let primary = type_part[..slash].trim();
        let sub = type_part[slash + 1..].trim();
        if !is_token(primary) || !is_token(sub) {
            return None;
        }
        Some(MediaType::new(primary, sub))
    }

    pub fn get_primary_type(&self) -> &str {
        &self.primary_type
    }

    pub fn get_sub_type(&self) -> &str {
        &self.sub_type
    }

    pub fn is_primary_type(&self, t: &str) -> bool {
        self.primary_type.eq_ignore_ascii_case(t)
    }

    pub fn is_mime_type(&self, primary: &str, sub: &str) -> bool {
        self.is_primary_type(primary) && self.sub_type.eq_ignore_ascii_case(sub)
    }

    /// True for `text/*`: encoders then treat line breaks as line breaks.
    pub fn is_text(&self) -> bool {
        self.is_primary_type("text")
    }
}

impl Default for MediaType {
    fn default() -> Self {
        MediaType::new("application", "octet-stream")
    }
}

impl PartialEq for MediaType {
    fn eq(&self, other: &Self) -> bool {
        self.is_mime_type(&other.primary_type, &other.sub_type)
    }
}

impl Eq for MediaType {}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.primary_type, self.sub_type)
    }
}

/// RFC 2045 token: one or more characters outside tspecials, space and CTLs.
pub fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|c| {
            c.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`{|}~".contains(&c)
        })
}
