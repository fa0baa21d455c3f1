// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Labels and fixed field counts of the conversation structs.

use crate::model::NodeKind;

pub const DLG_FILE_TYPE: [u8; 4] = *b"DLG ";

/// Struct type of `Key`/`Value` parameter structs.
pub const PARAM_STRUCT_TYPE: u32 = 0;

/// Stored in `QuestEntry` when the entry has no journal entry.
pub const NO_QUEST_ENTRY: u32 = u32::MAX;

pub const DELAY_ENTRY: &str = "DelayEntry";
pub const DELAY_REPLY: &str = "DelayReply";
pub const NUM_WORDS: &str = "NumWords";
pub const END_CONVER_ABORT: &str = "EndConverAbort";
pub const END_CONVERSATION: &str = "EndConversation";
pub const PREVENT_ZOOM_IN: &str = "PreventZoomIn";
pub const ENTRY_LIST: &str = "EntryList";
pub const REPLY_LIST: &str = "ReplyList";
pub const STARTING_LIST: &str = "StartingList";

/// The nine root fields, in emission order.
pub const ROOT_FIELDS: [&str; 9] = [
    DELAY_ENTRY,
    DELAY_REPLY,
    NUM_WORDS,
    END_CONVER_ABORT,
    END_CONVERSATION,
    PREVENT_ZOOM_IN,
    ENTRY_LIST,
    REPLY_LIST,
    STARTING_LIST,
];

pub const SPEAKER: &str = "Speaker";
pub const ANIMATION: &str = "Animation";
pub const ANIM_LOOP: &str = "AnimLoop";
pub const TEXT: &str = "Text";
pub const SCRIPT: &str = "Script";
pub const ACTION_PARAMS: &str = "ActionParams";
pub const DELAY: &str = "Delay";
pub const COMMENT: &str = "Comment";
pub const SOUND: &str = "Sound";
pub const QUEST: &str = "Quest";
pub const QUEST_ENTRY: &str = "QuestEntry";
pub const REPLIES_LIST: &str = "RepliesList";
pub const ENTRIES_LIST: &str = "EntriesList";

pub const INDEX: &str = "Index";
pub const ACTIVE: &str = "Active";
pub const CONDITION_PARAMS: &str = "ConditionParams";
pub const IS_CHILD: &str = "IsChild";
pub const LINK_COMMENT: &str = "LinkComment";

pub const KEY: &str = "Key";
pub const VALUE: &str = "Value";

pub const ROOT_FIELD_COUNT: u32 = 9;
pub const ENTRY_FIELD_COUNT: u32 = 12;
pub const REPLY_FIELD_COUNT: u32 = 11;
pub const POINTER_FIELD_COUNT: u32 = 4;
pub const LINK_POINTER_FIELD_COUNT: u32 = 5;
pub const START_FIELD_COUNT: u32 = 3;

/// Label of the root list holding nodes of `kind`.
pub fn node_list_label(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Entry => ENTRY_LIST,
        NodeKind::Reply => REPLY_LIST,
    }
}

/// Label of the pointer list on a node of `kind`.
pub fn child_list_label(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Entry => REPLIES_LIST,
        NodeKind::Reply => ENTRIES_LIST,
    }
}

pub fn node_field_count(kind: NodeKind) -> u32 {
    match kind {
        NodeKind::Entry => ENTRY_FIELD_COUNT,
        NodeKind::Reply => REPLY_FIELD_COUNT,
    }
}

pub fn pointer_field_count(is_link: bool) -> u32 {
    if is_link {
        LINK_POINTER_FIELD_COUNT
    } else {
        POINTER_FIELD_COUNT
    }
}
