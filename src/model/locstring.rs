// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// String id of the default (English, masculine) substring.
pub const DEFAULT_LANGUAGE: u32 = 0;

/// Talk-table reference meaning "no reference".
pub const NO_STR_REF: u32 = u32::MAX;

/// A localized string: an optional talk-table reference plus inline substrings.
///
/// Keys are the container's substring ids (`language * 2 + gender`), kept verbatim so that
/// substrings the editor does not understand survive a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocString {
    str_ref: u32,
    strings: BTreeMap<u32, String>,
}

impl Default for LocString {
    fn default() -> Self {
        Self {
            str_ref: NO_STR_REF,
            strings: BTreeMap::new(),
        }
    }
}

impl LocString {
    pub fn new(text: impl Into<String>) -> Self {
        let mut loc = Self::default();
        loc.set_default(text);
        loc
    }

    pub fn str_ref(&self) -> u32 {
        self.str_ref
    }

    pub fn set_str_ref(&mut self, str_ref: u32) {
        self.str_ref = str_ref;
    }

    pub fn strings(&self) -> &BTreeMap<u32, String> {
        &self.strings
    }

    pub fn get(&self, language: u32) -> Option<&str> {
        self.strings.get(&language).map(String::as_str)
    }

    /// Text in the default language, falling back to the lowest-numbered substring.
    pub fn default_text(&self) -> &str {
        self.get(DEFAULT_LANGUAGE)
            .or_else(|| self.strings.values().next().map(String::as_str))
            .unwrap_or("")
    }

    pub fn set(&mut self, language: u32, text: impl Into<String>) {
        self.strings.insert(language, text.into());
    }

    pub fn set_default(&mut self, text: impl Into<String>) {
        self.set(DEFAULT_LANGUAGE, text);
    }

    pub fn remove(&mut self, language: u32) -> Option<String> {
        self.strings.remove(&language)
    }

    pub fn is_empty(&self) -> bool {
        self.str_ref == NO_STR_REF && self.strings.values().all(String::is_empty)
    }

    pub fn word_count(&self) -> u32 {
        self.strings
            .values()
            .map(|text| text.split_whitespace().count() as u32)
            .fold(0u32, u32::saturating_add)
    }
}
