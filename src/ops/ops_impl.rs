// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Applies one op to the working copy and records what it touched.
fn apply_op(dialog: &mut Dialog, op: &Op, delta: &mut DeltaBuilder) -> Result<(), EditError> {
    match op {
        Op::AddNode { parent, data } => {
            let kind = match parent {
                Parent::Root => NodeKind::Entry,
                Parent::Node(node) => node_kind(dialog, *node)?.child_kind(),
            };
            if kind == NodeKind::Reply && data.quest_entry.is_some() {
                return Err(EditError::QuestEntryOnReply { node: None });
            }
            if data.quest_entry == Some(NO_QUEST_ENTRY) {
                return Err(EditError::ReservedQuestEntry { node: None });
            }
            let node = dialog.insert_node(kind, data.clone());
            dialog.attach_pointer(*parent, None, node, false, PointerData::default())?;
            tracing::debug!(?node, %kind, ?parent, "added node");
            delta.record_added(node);
            delta.record_parent(*parent);
            Ok(())
        }
        Op::UpdateNode { node, patch } => {
            let kind = node_kind(dialog, *node)?;
            if kind == NodeKind::Reply && matches!(patch.quest_entry, Some(Some(_))) {
                return Err(EditError::QuestEntryOnReply { node: Some(*node) });
            }
            if patch.quest_entry == Some(Some(NO_QUEST_ENTRY)) {
                return Err(EditError::ReservedQuestEntry { node: Some(*node) });
            }
            let data = dialog
                .node_data_mut(*node)
                .ok_or(DialogError::UnknownNode(*node))?;
            apply_node_patch(data, patch);
            delta.record_updated(*node);
            Ok(())
        }
        Op::UpdatePointer { pointer, patch } => {
            let existing = dialog
                .pointer(*pointer)
                .ok_or(DialogError::UnknownPointer(*pointer))?;
            if patch.link_comment.is_some() && !existing.is_link() {
                return Err(EditError::LinkCommentOnChild { pointer: *pointer });
            }
            let (parent, _) = dialog
                .pointer_slot(*pointer)
                .ok_or(DialogError::UnknownPointer(*pointer))?;
            let data = dialog
                .pointer_data_mut(*pointer)
                .ok_or(DialogError::UnknownPointer(*pointer))?;
            if let Some(condition) = &patch.condition {
                data.condition = condition.clone();
            }
            if let Some(params) = &patch.condition_params {
                data.condition_params = params.clone();
            }
            if let Some(comment) = &patch.link_comment {
                data.link_comment = comment.clone();
            }
            delta.record_parent(parent);
            Ok(())
        }
        Op::AddLink { parent, target } => {
            link_in_place(dialog, *parent, *target)?;
            delta.record_updated(*parent);
            Ok(())
        }
        Op::AddStart { target } => {
            let kind = node_kind(dialog, *target)?;
            if kind != NodeKind::Entry {
                return Err(EditError::TypeAlternationViolation {
                    parent: Parent::Root,
                    child_kind: kind,
                });
            }
            dialog.attach_pointer(Parent::Root, None, *target, false, PointerData::default())?;
            delta.record_updated(*target);
            Ok(())
        }
        Op::RemovePointer { pointer } => {
            let (parent, removed) = dialog.remove_pointer(*pointer)?;
            tracing::debug!(%pointer, ?parent, target = ?removed.target(), "removed pointer");
            delta.record_parent(parent);
            Ok(())
        }
        Op::MovePointer { pointer, to_index } => {
            let (parent, _) = dialog
                .pointer_slot(*pointer)
                .ok_or(DialogError::UnknownPointer(*pointer))?;
            dialog.move_pointer(*pointer, *to_index)?;
            delta.record_parent(parent);
            Ok(())
        }
        Op::DeleteNode { node } => {
            let report = delete::delete_in_place(dialog, *node)?;
            for removed in &report.deleted {
                delta.record_removed(*removed);
            }
            for site in &report.dangling_removed {
                delta.record_parent(site.parent);
            }
            Ok(())
        }
    }
}

/// Adds a link pointer after checking that `target` may follow `parent`.
fn link_in_place(
    dialog: &mut Dialog,
    parent: NodeId,
    target: NodeId,
) -> Result<PointerId, EditError> {
    let parent_kind = node_kind(dialog, parent)?;
    let target_kind = node_kind(dialog, target)?;
    if target_kind != parent_kind.child_kind() {
        return Err(EditError::TypeAlternationViolation {
            parent: Parent::Node(parent),
            child_kind: target_kind,
        });
    }
    let pointer =
        dialog.attach_pointer(Parent::Node(parent), None, target, true, PointerData::default())?;
    tracing::debug!(%pointer, ?parent, ?target, "added link");
    Ok(pointer)
}

fn node_kind(dialog: &Dialog, node: NodeId) -> Result<NodeKind, EditError> {
    dialog
        .kind_of(node)
        .ok_or(EditError::Graph(DialogError::UnknownNode(node)))
}

fn apply_node_patch(data: &mut NodeData, patch: &NodePatch) {
    if let Some(text) = &patch.text {
        data.text = text.clone();
    }
    if let Some(speaker) = &patch.speaker {
        data.speaker = speaker.clone();
    }
    if let Some(comment) = &patch.comment {
        data.comment = comment.clone();
    }
    if let Some(sound) = &patch.sound {
        data.sound = sound.clone();
    }
    if let Some(script) = &patch.script {
        data.script = script.clone();
    }
    if let Some(params) = &patch.action_params {
        data.action_params = params.clone();
    }
    if let Some(quest) = &patch.quest {
        data.quest = quest.clone();
    }
    if let Some(quest_entry) = patch.quest_entry {
        data.quest_entry = quest_entry;
    }
    if let Some(animation) = patch.animation {
        data.animation = animation;
    }
    if let Some(anim_loop) = patch.anim_loop {
        data.anim_loop = anim_loop;
    }
    if let Some(delay) = patch.delay {
        data.delay = delay;
    }
}
