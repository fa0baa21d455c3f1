// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;

use super::schema::{self, NO_QUEST_ENTRY, PARAM_STRUCT_TYPE};
use super::DlgError;
use crate::format::gff::{FieldValue, GffWriter, StructRef, ROOT_STRUCT_TYPE};
use crate::model::{Dialog, Node, NodeId, NodeKind, Params, Parent, Pointer};

/// Encodes `dialog` as a complete conversation file.
///
/// The whole graph is validated before anything is laid out, so an invalid dialog produces an
/// error and no bytes. Struct order is root, every entry (each followed by its parameter and
/// pointer structs), every reply likewise, then the start list.
pub fn write_dialog(dialog: &Dialog) -> Result<Vec<u8>, DlgError> {
    validate(dialog)?;

    let positions = Positions::of(dialog);
    let mut out = GffWriter::new(schema::DLG_FILE_TYPE);
    let root = out.add_struct(ROOT_STRUCT_TYPE);

    let meta = dialog.meta();
    let num_words = dialog
        .nodes()
        .map(|(_, node)| node.text().word_count())
        .fold(0u32, u32::saturating_add);
    out.add_field(root, schema::DELAY_ENTRY, FieldValue::Dword(meta.delay_entry))?;
    out.add_field(root, schema::DELAY_REPLY, FieldValue::Dword(meta.delay_reply))?;
    out.add_field(root, schema::NUM_WORDS, FieldValue::Dword(num_words))?;
    out.add_field(
        root,
        schema::END_CONVER_ABORT,
        FieldValue::ResRef(meta.end_conver_abort.clone()),
    )?;
    out.add_field(
        root,
        schema::END_CONVERSATION,
        FieldValue::ResRef(meta.end_conversation.clone()),
    )?;
    out.add_field(
        root,
        schema::PREVENT_ZOOM_IN,
        FieldValue::Byte(u8::from(meta.prevent_zoom_in)),
    )?;
    let entry_list = out.add_field(root, schema::ENTRY_LIST, FieldValue::List(Vec::new()))?;
    let reply_list = out.add_field(root, schema::REPLY_LIST, FieldValue::List(Vec::new()))?;
    let start_list = out.add_field(root, schema::STARTING_LIST, FieldValue::List(Vec::new()))?;

    for (kind, list_field) in [(NodeKind::Entry, entry_list), (NodeKind::Reply, reply_list)] {
        let mut structs = Vec::with_capacity(dialog.collection(kind).len());
        for (position, id) in dialog.collection(kind).iter().enumerate() {
            let Some(node) = dialog.node(*id) else {
                continue;
            };
            structs.push(write_node(&mut out, &positions, position as u32, node)?.index());
        }
        out.set_value(list_field, FieldValue::List(structs));
    }

    let mut starts = Vec::with_capacity(dialog.starts().len());
    for (position, pointer) in dialog.starts().iter().enumerate() {
        let start = out.add_struct(position as u32);
        out.add_field(
            start,
            schema::INDEX,
            FieldValue::Dword(positions.get(pointer.target())),
        )?;
        out.add_field(
            start,
            schema::ACTIVE,
            FieldValue::ResRef(pointer.data().condition.clone()),
        )?;
        write_params(
            &mut out,
            start,
            schema::CONDITION_PARAMS,
            &pointer.data().condition_params,
        )?;
        starts.push(start.index());
    }
    out.set_value(start_list, FieldValue::List(starts));

    let structs = out.struct_count();
    let bytes = out.finish()?;
    tracing::debug!(
        entries = dialog.entries().len(),
        replies = dialog.replies().len(),
        structs,
        bytes = bytes.len(),
        "encoded dialog"
    );
    Ok(bytes)
}

fn write_node(
    out: &mut GffWriter,
    positions: &Positions,
    position: u32,
    node: &Node,
) -> Result<StructRef, DlgError> {
    let data = node.data();
    let s = out.add_struct(position);
    out.add_field(s, schema::SPEAKER, FieldValue::ExoString(data.speaker.clone()))?;
    out.add_field(s, schema::ANIMATION, FieldValue::Dword(data.animation))?;
    out.add_field(s, schema::ANIM_LOOP, FieldValue::Byte(u8::from(data.anim_loop)))?;
    out.add_field(s, schema::TEXT, FieldValue::LocString(data.text.clone()))?;
    out.add_field(s, schema::SCRIPT, FieldValue::ResRef(data.script.clone()))?;
    let action_params =
        out.add_field(s, schema::ACTION_PARAMS, FieldValue::List(Vec::new()))?;
    out.add_field(s, schema::DELAY, FieldValue::Dword(data.delay))?;
    out.add_field(s, schema::COMMENT, FieldValue::ExoString(data.comment.clone()))?;
    out.add_field(s, schema::SOUND, FieldValue::ResRef(data.sound.clone()))?;
    out.add_field(s, schema::QUEST, FieldValue::ExoString(data.quest.clone()))?;
    if node.kind() == NodeKind::Entry {
        out.add_field(
            s,
            schema::QUEST_ENTRY,
            FieldValue::Dword(data.quest_entry.unwrap_or(NO_QUEST_ENTRY)),
        )?;
    }
    let children = out.add_field(
        s,
        schema::child_list_label(node.kind()),
        FieldValue::List(Vec::new()),
    )?;

    let params = param_structs(out, &data.action_params)?;
    out.set_value(action_params, FieldValue::List(params));

    let mut pointers = Vec::with_capacity(node.pointers().len());
    for (slot, pointer) in node.pointers().iter().enumerate() {
        pointers.push(write_pointer(out, positions, slot as u32, pointer)?.index());
    }
    out.set_value(children, FieldValue::List(pointers));
    Ok(s)
}

fn write_pointer(
    out: &mut GffWriter,
    positions: &Positions,
    slot: u32,
    pointer: &Pointer,
) -> Result<StructRef, DlgError> {
    let s = out.add_struct(slot);
    out.add_field(
        s,
        schema::INDEX,
        FieldValue::Dword(positions.get(pointer.target())),
    )?;
    out.add_field(
        s,
        schema::ACTIVE,
        FieldValue::ResRef(pointer.data().condition.clone()),
    )?;
    let condition_params =
        out.add_field(s, schema::CONDITION_PARAMS, FieldValue::List(Vec::new()))?;
    out.add_field(s, schema::IS_CHILD, FieldValue::Byte(u8::from(pointer.is_link())))?;
    if pointer.is_link() {
        out.add_field(
            s,
            schema::LINK_COMMENT,
            FieldValue::ExoString(pointer.link_comment().to_owned()),
        )?;
    }
    let params = param_structs(out, &pointer.data().condition_params)?;
    out.set_value(condition_params, FieldValue::List(params));
    Ok(s)
}

/// Adds a parameter list field to `owner` with its structs emitted right after.
fn write_params(
    out: &mut GffWriter,
    owner: StructRef,
    label: &'static str,
    params: &Params,
) -> Result<(), DlgError> {
    let field = out.add_field(owner, label, FieldValue::List(Vec::new()))?;
    let structs = param_structs(out, params)?;
    out.set_value(field, FieldValue::List(structs));
    Ok(())
}

fn param_structs(out: &mut GffWriter, params: &Params) -> Result<Vec<u32>, DlgError> {
    let mut structs = Vec::with_capacity(params.len());
    for (key, value) in params {
        let s = out.add_struct(PARAM_STRUCT_TYPE);
        out.add_field(s, schema::KEY, FieldValue::ExoString(key.clone()))?;
        out.add_field(s, schema::VALUE, FieldValue::ExoString(value.clone()))?;
        structs.push(s.index());
    }
    Ok(structs)
}

/// Final collection positions, recomputed for this write.
struct Positions(HashMap<NodeId, u32>);

impl Positions {
    fn of(dialog: &Dialog) -> Self {
        let mut map = HashMap::with_capacity(dialog.node_count());
        for list in [dialog.entries(), dialog.replies()] {
            for (position, id) in list.iter().enumerate() {
                map.insert(*id, position as u32);
            }
        }
        Self(map)
    }

    fn get(&self, node: NodeId) -> u32 {
        // Validation guarantees every target is present.
        self.0.get(&node).copied().unwrap_or(u32::MAX)
    }
}

/// Checks every pointer before any layout happens.
fn validate(dialog: &Dialog) -> Result<(), DlgError> {
    let check = |parent: Parent, expected: NodeKind, pointer: &Pointer| {
        let Some(target_kind) = dialog.kind_of(pointer.target()) else {
            return Err(DlgError::DanglingPointer {
                pointer: pointer.id(),
                parent,
                target: pointer.target(),
            });
        };
        if target_kind != expected {
            return Err(match parent {
                Parent::Root => DlgError::ReplyInStarts {
                    pointer: pointer.id(),
                    target: pointer.target(),
                },
                Parent::Node(_) => DlgError::TypeAlternation {
                    pointer: pointer.id(),
                    parent,
                    parent_kind: expected.child_kind(),
                    target_kind,
                },
            });
        }
        Ok(())
    };

    for pointer in dialog.starts() {
        check(Parent::Root, NodeKind::Entry, pointer)?;
    }
    for (id, node) in dialog.nodes() {
        if node.data().quest_entry == Some(NO_QUEST_ENTRY) {
            return Err(DlgError::ReservedQuestEntry { node: id });
        }
        for pointer in node.pointers() {
            check(Parent::Node(id), node.kind().child_kind(), pointer)?;
        }
    }
    Ok(())
}
