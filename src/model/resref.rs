// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Maximum byte length of a resource reference in the container format.
pub const RESREF_MAX_LEN: usize = 16;

/// A short resource name (script, sound, conversation end handler).
///
/// The engine stores these as a one-byte length prefix followed by at most 16 ASCII bytes, so the
/// limit is enforced at construction rather than at write time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResRef(SmolStr);

impl ResRef {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ResRefError> {
        let value = value.as_ref();
        if value.len() > RESREF_MAX_LEN {
            return Err(ResRefError::TooLong {
                value: value.to_owned(),
                len: value.len(),
            });
        }
        if let Some(ch) = value.chars().find(|ch| !ch.is_ascii() || ch.is_ascii_control()) {
            return Err(ResRefError::InvalidChar {
                value: value.to_owned(),
                ch,
            });
        }
        Ok(Self(SmolStr::new(value)))
    }

    /// Builds a resref from bytes read off disk, dropping anything the writer could not re-emit.
    pub(crate) fn from_lossy_bytes(bytes: &[u8]) -> Self {
        let text: String = bytes
            .iter()
            .filter(|b| b.is_ascii() && !b.is_ascii_control())
            .take(RESREF_MAX_LEN)
            .map(|&b| b as char)
            .collect();
        Self(SmolStr::new(text))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `None` for the empty resref, which the format uses to mean "unset".
    pub fn non_empty(&self) -> Option<&Self> {
        (!self.is_empty()).then_some(self)
    }
}

impl fmt::Display for ResRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResRef {
    type Err = ResRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResRef {
    type Error = ResRefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ResRef> for String {
    fn from(value: ResRef) -> Self {
        value.0.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResRefError {
    #[error("resref {value:?} is {len} bytes (max {RESREF_MAX_LEN})")]
    TooLong { value: String, len: usize },
    #[error("resref {value:?} contains unsupported character {ch:?}")]
    InvalidChar { value: String, ch: char },
}
