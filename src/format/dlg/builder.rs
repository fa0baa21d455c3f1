// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smallvec::SmallVec;

use super::schema::{self, NO_QUEST_ENTRY};
use super::{BuildReport, DanglingIndex, DlgError};
use crate::format::gff::{read_gff, FieldType, FieldValue, GffFile};
use crate::model::{
    Dialog, NodeData, NodeId, NodeKind, Params, Parent, PointerData, ResRef, DEFAULT_DELAY,
};

/// Parses `bytes` and builds the conversation they hold.
pub fn read_dialog(bytes: &[u8]) -> Result<BuildReport, DlgError> {
    let file = read_gff(bytes)?;
    build_dialog(&file)
}

/// Materializes a [`Dialog`] from a parsed container.
///
/// Fields are resolved by label, never by position. Pointers whose `Index` is out of range are
/// dropped and reported; everything else that is structurally wrong aborts the build.
pub fn build_dialog(file: &GffFile) -> Result<BuildReport, DlgError> {
    if file.file_type() != &schema::DLG_FILE_TYPE {
        return Err(DlgError::WrongFileType {
            found: String::from_utf8_lossy(file.file_type()).into_owned(),
        });
    }
    file.root()?;
    let root = StructView::open(file, 0)?;
    for label in schema::ROOT_FIELDS {
        root.require(label)?;
    }

    let mut dialog = Dialog::new();
    {
        let meta = dialog.meta_mut();
        meta.delay_entry = root.u32_or(schema::DELAY_ENTRY, 0)?;
        meta.delay_reply = root.u32_or(schema::DELAY_REPLY, 0)?;
        meta.end_conver_abort = root.resref(schema::END_CONVER_ABORT)?;
        meta.end_conversation = root.resref(schema::END_CONVERSATION)?;
        meta.prevent_zoom_in = root.u32_or(schema::PREVENT_ZOOM_IN, 0)? != 0;
    }

    let entry_structs = root.require_list(schema::ENTRY_LIST)?;
    let reply_structs = root.require_list(schema::REPLY_LIST)?;
    let start_structs = root.require_list(schema::STARTING_LIST)?;

    // Nodes first so pointers can resolve forward and backward references alike.
    let mut entry_ids = Vec::with_capacity(entry_structs.len());
    let mut entry_views = Vec::with_capacity(entry_structs.len());
    for index in &entry_structs {
        let view = StructView::open(file, *index)?;
        let data = node_data(&view, NodeKind::Entry)?;
        entry_ids.push(dialog.insert_node(NodeKind::Entry, data));
        entry_views.push(view);
    }
    let mut reply_ids = Vec::with_capacity(reply_structs.len());
    let mut reply_views = Vec::with_capacity(reply_structs.len());
    for index in &reply_structs {
        let view = StructView::open(file, *index)?;
        let data = node_data(&view, NodeKind::Reply)?;
        reply_ids.push(dialog.insert_node(NodeKind::Reply, data));
        reply_views.push(view);
    }

    let mut dangling = Vec::new();
    attach_child_lists(
        file,
        &mut dialog,
        &mut dangling,
        NodeKind::Entry,
        &entry_ids,
        &entry_views,
        &reply_ids,
    )?;
    attach_child_lists(
        file,
        &mut dialog,
        &mut dangling,
        NodeKind::Reply,
        &reply_ids,
        &reply_views,
        &entry_ids,
    )?;

    for start_struct in start_structs {
        let start = StructView::open(file, start_struct)?;
        let index = start.require_u32(schema::INDEX)?;
        let data = PointerData {
            condition: start.resref(schema::ACTIVE)?,
            condition_params: start.params(schema::CONDITION_PARAMS)?,
            link_comment: String::new(),
        };
        attach(
            &mut dialog,
            &mut dangling,
            Parent::Root,
            NodeKind::Entry,
            &entry_ids,
            index,
            false,
            data,
        );
    }

    dialog.recalculate_indices();
    tracing::debug!(
        entries = dialog.entries().len(),
        replies = dialog.replies().len(),
        starts = dialog.starts().len(),
        dangling = dangling.len(),
        "built dialog"
    );
    Ok(BuildReport { dialog, dangling })
}

#[allow(clippy::too_many_arguments)]
fn attach_child_lists(
    file: &GffFile,
    dialog: &mut Dialog,
    dangling: &mut Vec<DanglingIndex>,
    kind: NodeKind,
    owners: &[NodeId],
    views: &[StructView<'_>],
    targets: &[NodeId],
) -> Result<(), DlgError> {
    for (owner, view) in owners.iter().zip(views) {
        for pointer_struct in view.require_list(schema::child_list_label(kind))? {
            let pointer = StructView::open(file, pointer_struct)?;
            let index = pointer.require_u32(schema::INDEX)?;
            let is_link = pointer.u32_or(schema::IS_CHILD, 0)? != 0;
            let data = PointerData {
                condition: pointer.resref(schema::ACTIVE)?,
                condition_params: pointer.params(schema::CONDITION_PARAMS)?,
                link_comment: pointer.string(schema::LINK_COMMENT)?,
            };
            attach(
                dialog,
                dangling,
                Parent::Node(*owner),
                kind.child_kind(),
                targets,
                index,
                is_link,
                data,
            );
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn attach(
    dialog: &mut Dialog,
    dangling: &mut Vec<DanglingIndex>,
    parent: Parent,
    target_kind: NodeKind,
    targets: &[NodeId],
    index: u32,
    is_link: bool,
    data: PointerData,
) {
    let Some(target) = targets.get(index as usize).copied() else {
        tracing::warn!(?parent, %target_kind, index, "dropping pointer with out-of-range index");
        dangling.push(DanglingIndex {
            parent,
            target_kind,
            index,
            is_link,
        });
        return;
    };
    if let Err(err) = dialog.attach_pointer(parent, None, target, is_link, data) {
        tracing::warn!(?parent, %err, "dropping pointer that failed to attach");
    }
}

fn node_data(view: &StructView<'_>, kind: NodeKind) -> Result<NodeData, DlgError> {
    let text = view
        .require(schema::TEXT)?
        .into_locstring()
        .ok_or_else(|| view.type_error(schema::TEXT, FieldType::LocString))?;
    view.require_list(schema::child_list_label(kind))?;

    let quest_entry = match kind {
        NodeKind::Entry => Some(view.u32_or(schema::QUEST_ENTRY, NO_QUEST_ENTRY)?)
            .filter(|value| *value != NO_QUEST_ENTRY),
        NodeKind::Reply => None,
    };

    Ok(NodeData {
        text,
        speaker: view.string(schema::SPEAKER)?,
        comment: view.string(schema::COMMENT)?,
        sound: view.resref(schema::SOUND)?,
        script: view.resref(schema::SCRIPT)?,
        action_params: view.params(schema::ACTION_PARAMS)?,
        quest: view.string(schema::QUEST)?,
        quest_entry,
        animation: view.u32_or(schema::ANIMATION, 0)?,
        anim_loop: view.u32_or(schema::ANIM_LOOP, 0)? != 0,
        delay: view.u32_or(schema::DELAY, DEFAULT_DELAY)?,
    })
}

/// Label-indexed view of one struct's fields.
struct StructView<'a> {
    file: &'a GffFile,
    index: u32,
    fields: SmallVec<[(&'a str, u32); 16]>,
}

impl<'a> StructView<'a> {
    fn open(file: &'a GffFile, index: u32) -> Result<Self, DlgError> {
        let mut fields = SmallVec::new();
        for field_index in file.struct_field_indices(index)? {
            let field = file.field_at(field_index)?;
            fields.push((file.label_of(field)?, field_index));
        }
        Ok(Self {
            file,
            index,
            fields,
        })
    }

    fn get(&self, label: &'static str) -> Result<Option<FieldValue>, DlgError> {
        match self.fields.iter().find(|(name, _)| *name == label) {
            Some((_, field_index)) => Ok(Some(self.file.value(*field_index)?)),
            None => Ok(None),
        }
    }

    fn require(&self, label: &'static str) -> Result<FieldValue, DlgError> {
        self.get(label)?.ok_or(DlgError::MissingRequiredField {
            struct_index: self.index,
            label,
        })
    }

    fn found_type(&self, label: &'static str) -> FieldType {
        self.fields
            .iter()
            .find(|(name, _)| *name == label)
            .and_then(|(_, index)| self.file.field_at(*index).ok())
            .map_or(FieldType::Void, |field| field.field_type)
    }

    fn type_error(&self, label: &'static str, expected: FieldType) -> DlgError {
        DlgError::UnexpectedFieldType {
            struct_index: self.index,
            label,
            expected,
            found: self.found_type(label),
        }
    }

    fn require_u32(&self, label: &'static str) -> Result<u32, DlgError> {
        self.require(label)?
            .as_u32()
            .ok_or_else(|| self.type_error(label, FieldType::Dword))
    }

    fn u32_or(&self, label: &'static str, default: u32) -> Result<u32, DlgError> {
        match self.get(label)? {
            Some(value) => value
                .as_u32()
                .ok_or_else(|| self.type_error(label, FieldType::Dword)),
            None => Ok(default),
        }
    }

    fn string(&self, label: &'static str) -> Result<String, DlgError> {
        match self.get(label)? {
            Some(value) => value
                .into_string()
                .ok_or_else(|| self.type_error(label, FieldType::ExoString)),
            None => Ok(String::new()),
        }
    }

    fn resref(&self, label: &'static str) -> Result<ResRef, DlgError> {
        match self.get(label)? {
            Some(value) => value
                .into_resref()
                .ok_or_else(|| self.type_error(label, FieldType::ResRef)),
            None => Ok(ResRef::empty()),
        }
    }

    fn require_list(&self, label: &'static str) -> Result<Vec<u32>, DlgError> {
        self.require(label)?
            .into_list()
            .ok_or_else(|| self.type_error(label, FieldType::List))
    }

    fn params(&self, label: &'static str) -> Result<Params, DlgError> {
        let Some(value) = self.get(label)? else {
            return Ok(Params::new());
        };
        let items = value
            .into_list()
            .ok_or_else(|| self.type_error(label, FieldType::List))?;
        let mut params = Params::new();
        for item in items {
            let param = StructView::open(self.file, item)?;
            params.insert(param.string(schema::KEY)?, param.string(schema::VALUE)?);
        }
        Ok(params)
    }
}
