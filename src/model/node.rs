// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::locstring::LocString;
use super::pointer::Pointer;
use super::resref::ResRef;

/// Script parameters, passed through untouched.
pub type Params = BTreeMap<String, String>;

/// Response delay value meaning "engine default".
pub const DEFAULT_DELAY: u32 = u32::MAX;

/// The two alternating node kinds of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A line spoken by an NPC.
    Entry,
    /// A line chosen by the player.
    Reply,
}

impl NodeKind {
    /// The kind a non-link child of this kind must have.
    pub fn child_kind(self) -> Self {
        match self {
            Self::Entry => Self::Reply,
            Self::Reply => Self::Entry,
        }
    }

    pub fn flipped(self) -> Self {
        self.child_kind()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry => f.write_str("entry"),
            Self::Reply => f.write_str("reply"),
        }
    }
}

/// Every attribute of a node other than its kind and outgoing pointers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    pub text: LocString,
    /// Speaker tag. Empty means the owner of the conversation for entries and the player for
    /// replies.
    pub speaker: String,
    pub comment: String,
    /// Empty when no sound plays.
    pub sound: ResRef,
    /// Action script run when the line is shown. Empty when none.
    pub script: ResRef,
    pub action_params: Params,
    pub quest: String,
    /// Journal entry number; only entries persist it.
    pub quest_entry: Option<u32>,
    pub animation: u32,
    pub anim_loop: bool,
    pub delay: u32,
}

impl Default for NodeData {
    fn default() -> Self {
        Self {
            text: LocString::default(),
            speaker: String::new(),
            comment: String::new(),
            sound: ResRef::empty(),
            script: ResRef::empty(),
            action_params: Params::new(),
            quest: String::new(),
            quest_entry: None,
            animation: 0,
            anim_loop: false,
            delay: DEFAULT_DELAY,
        }
    }
}

impl NodeData {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: LocString::new(text),
            ..Self::default()
        }
    }

    pub fn sound(&self) -> Option<&ResRef> {
        self.sound.non_empty()
    }

    pub fn script(&self) -> Option<&ResRef> {
        self.script.non_empty()
    }

    /// Short single-line preview of the default-language text.
    pub fn preview(&self, max_chars: usize) -> String {
        let text = self.text.default_text();
        let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if flat.chars().count() <= max_chars {
            return flat;
        }
        let mut out: String = flat.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}

/// A conversation line together with its outgoing pointers.
///
/// Nodes live in the dialog's arena; pointers refer to them by handle only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    data: NodeData,
    pointers: Vec<Pointer>,
}

impl Node {
    pub fn new(kind: NodeKind, data: NodeData) -> Self {
        Self {
            kind,
            data,
            pointers: Vec::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }

    pub fn text(&self) -> &LocString {
        &self.data.text
    }

    pub fn comment(&self) -> &str {
        &self.data.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.data.comment = comment.into();
    }

    pub fn pointers(&self) -> &[Pointer] {
        &self.pointers
    }

    /// Mutable access to pointer payloads. Structural changes must go through the dialog so the
    /// link registry stays in sync.
    pub(crate) fn pointers_mut(&mut self) -> &mut Vec<Pointer> {
        &mut self.pointers
    }
}
