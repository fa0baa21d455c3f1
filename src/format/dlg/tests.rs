// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;

use rstest::rstest;

use super::schema::*;
use super::{read_dialog, write_dialog, DlgError};
use crate::format::gff::{read_gff, FieldValue, GffFile, GffWriter, ROOT_STRUCT_TYPE};
use crate::model::fixtures;
use crate::model::{Dialog, LocString, NodeData, NodeKind, Parent, PointerData, ResRef};

fn round_trip(dialog: &Dialog) -> Dialog {
    let bytes = write_dialog(dialog).expect("write");
    let report = read_dialog(&bytes).expect("read");
    assert!(report.is_clean(), "dangling: {:?}", report.dangling);
    report.dialog
}

#[test]
fn richly_populated_dialog_round_trips() {
    let dialog = fixtures::richly_populated();
    let loaded = round_trip(&dialog);
    assert!(dialog.same_structure(&loaded));
    assert!(loaded.link_registry_matches_graph());
}

#[test]
fn every_fixture_round_trips() {
    for dialog in [
        fixtures::linear().dialog,
        fixtures::shared_reply().dialog,
        fixtures::link_parent().dialog,
        fixtures::cycle(true).dialog,
        fixtures::cycle(false).dialog,
        Dialog::new(),
    ] {
        assert!(dialog.same_structure(&round_trip(&dialog)));
    }
}

#[test]
fn rewriting_a_loaded_file_is_byte_identical() {
    let first = write_dialog(&fixtures::richly_populated()).expect("write");
    let loaded = read_dialog(&first).expect("read").dialog;
    let second = write_dialog(&loaded).expect("rewrite");
    assert_eq!(first, second);
}

fn field_counts(file: &GffFile) -> Vec<(u32, u32)> {
    file.structs
        .iter()
        .map(|raw| (raw.type_id, raw.field_count))
        .collect()
}

#[test]
fn structs_are_emitted_entries_then_replies_then_starts() {
    let linear = fixtures::linear();
    let bytes = write_dialog(&linear.dialog).expect("write");
    let file = read_gff(&bytes).expect("gff");

    assert_eq!(
        field_counts(&file),
        vec![
            (ROOT_STRUCT_TYPE, ROOT_FIELD_COUNT),
            (0, ENTRY_FIELD_COUNT),
            (0, POINTER_FIELD_COUNT),
            (0, REPLY_FIELD_COUNT),
            (0, START_FIELD_COUNT),
        ]
    );
}

#[test]
fn parameter_structs_follow_their_owner() {
    let mut dialog = Dialog::new();
    let mut data = NodeData::with_text("Hi");
    data.action_params.insert("a".to_owned(), "1".to_owned());
    data.action_params.insert("b".to_owned(), "2".to_owned());
    let entry = dialog.insert_node(NodeKind::Entry, data);
    let mut condition = PointerData::default();
    condition
        .condition_params
        .insert("c".to_owned(), "3".to_owned());
    dialog
        .attach_pointer(Parent::Root, None, entry, false, condition)
        .expect("start");

    let bytes = write_dialog(&dialog).expect("write");
    let file = read_gff(&bytes).expect("gff");
    assert_eq!(
        field_counts(&file),
        vec![
            (ROOT_STRUCT_TYPE, ROOT_FIELD_COUNT),
            (0, ENTRY_FIELD_COUNT),
            (PARAM_STRUCT_TYPE, 2),
            (PARAM_STRUCT_TYPE, 2),
            (0, START_FIELD_COUNT),
            (PARAM_STRUCT_TYPE, 2),
        ]
    );
}

#[test]
fn link_pointers_carry_a_fifth_field() {
    let dialog = fixtures::link_parent().dialog;
    let bytes = write_dialog(&dialog).expect("write");
    let file = read_gff(&bytes).expect("gff");

    let mut pointer_counts = Vec::new();
    for (index, raw) in file.structs.iter().enumerate() {
        let labels: Vec<&str> = file
            .struct_field_indices(index as u32)
            .expect("fields")
            .iter()
            .map(|f| file.label_of(file.field_at(*f).expect("field")).expect("label"))
            .collect();
        if labels.contains(&IS_CHILD) {
            pointer_counts.push((raw.field_count, labels.contains(&LINK_COMMENT)));
        }
    }
    pointer_counts.sort();
    assert_eq!(
        pointer_counts,
        vec![(4, false), (4, false), (4, false), (5, true)]
    );
}

#[test]
fn num_words_is_recomputed() {
    let mut dialog = fixtures::linear().dialog;
    let e0 = dialog.entries()[0];
    dialog
        .node_data_mut(e0)
        .expect("node")
        .text
        .set(1, "Hallo du da");
    let bytes = write_dialog(&dialog).expect("write");
    let file = read_gff(&bytes).expect("gff");
    let root_fields = file.struct_field_indices(0).expect("fields");
    // "Greetings." + "Farewell." + three words in the second language.
    assert_eq!(file.value(root_fields[2]).expect("words"), FieldValue::Dword(5));
}

#[test]
fn link_comment_and_node_comment_stay_separate() {
    let mut dialog = fixtures::link_parent().dialog;
    let c = dialog.entries()[1];
    let b = dialog.replies()[0];
    let link = dialog.node(c).expect("c").pointers()[0].id();
    dialog.pointer_data_mut(link).expect("link").link_comment = "see A".to_owned();
    dialog.node_data_mut(b).expect("b").comment = "B itself".to_owned();

    let loaded = round_trip(&dialog);
    let c = loaded.entries()[1];
    let b = loaded.replies()[0];
    assert_eq!(loaded.node(c).expect("c").pointers()[0].link_comment(), "see A");
    assert_eq!(loaded.node(b).expect("b").comment(), "B itself");
}

#[test]
fn quest_entry_is_entry_only() {
    let mut dialog = Dialog::new();
    let mut quest = NodeData::with_text("Journal");
    quest.quest = "q".to_owned();
    quest.quest_entry = Some(0);
    dialog.insert_node(NodeKind::Entry, quest);
    dialog.insert_node(NodeKind::Entry, NodeData::with_text("Plain"));

    let loaded = round_trip(&dialog);
    assert_eq!(
        loaded.node(loaded.entries()[0]).expect("n").data().quest_entry,
        Some(0)
    );
    assert_eq!(
        loaded.node(loaded.entries()[1]).expect("n").data().quest_entry,
        None
    );
}

#[test]
fn largest_usable_quest_entry_survives_and_reserved_value_is_refused() {
    let mut dialog = Dialog::new();
    let mut last = NodeData::with_text("Final journal entry");
    last.quest_entry = Some(NO_QUEST_ENTRY - 1);
    dialog.insert_node(NodeKind::Entry, last);
    let loaded = round_trip(&dialog);
    assert!(dialog.same_structure(&loaded));

    let mut reserved = NodeData::with_text("Looks like no entry");
    reserved.quest_entry = Some(NO_QUEST_ENTRY);
    let node = dialog.insert_node(NodeKind::Entry, reserved);
    assert_eq!(
        write_dialog(&dialog),
        Err(DlgError::ReservedQuestEntry { node })
    );
}

/// Hand-laid file with one entry and one start, for probing the builder.
struct Handmade {
    root_order: Vec<&'static str>,
    omit_root: Option<&'static str>,
    entry_has_text: bool,
    start_index: u32,
    file_type: [u8; 4],
}

impl Default for Handmade {
    fn default() -> Self {
        Self {
            root_order: ROOT_FIELDS.to_vec(),
            omit_root: None,
            entry_has_text: true,
            start_index: 0,
            file_type: DLG_FILE_TYPE,
        }
    }
}

impl Handmade {
    fn bytes(&self) -> Vec<u8> {
        let mut w = GffWriter::new(self.file_type);
        let root = w.add_struct(ROOT_STRUCT_TYPE);
        let mut lists = HashMap::new();
        for label in &self.root_order {
            if Some(*label) == self.omit_root {
                continue;
            }
            let value = match *label {
                ENTRY_LIST | REPLY_LIST | STARTING_LIST => FieldValue::List(Vec::new()),
                END_CONVER_ABORT | END_CONVERSATION => FieldValue::ResRef(ResRef::empty()),
                PREVENT_ZOOM_IN => FieldValue::Byte(0),
                _ => FieldValue::Dword(0),
            };
            lists.insert(*label, w.add_field(root, label, value).expect("root field"));
        }

        // Deliberately not in the order the writer uses.
        let entry = w.add_struct(0);
        w.add_field(entry, REPLIES_LIST, FieldValue::List(Vec::new()))
            .expect("field");
        if self.entry_has_text {
            w.add_field(
                entry,
                TEXT,
                FieldValue::LocString(LocString::new("Hello there")),
            )
            .expect("field");
        }
        w.add_field(entry, SPEAKER, FieldValue::ExoString("guard".to_owned()))
            .expect("field");

        let start = w.add_struct(0);
        w.add_field(start, INDEX, FieldValue::Dword(self.start_index))
            .expect("field");

        if let Some(field) = lists.get(ENTRY_LIST) {
            w.set_value(*field, FieldValue::List(vec![entry.index()]));
        }
        if let Some(field) = lists.get(STARTING_LIST) {
            w.set_value(*field, FieldValue::List(vec![start.index()]));
        }
        w.finish().expect("layout")
    }
}

#[test]
fn fields_are_found_by_label_in_any_order() {
    let mut order = ROOT_FIELDS.to_vec();
    order.reverse();
    let bytes = Handmade {
        root_order: order,
        ..Handmade::default()
    }
    .bytes();

    let report = read_dialog(&bytes).expect("read");
    let dialog = report.dialog;
    assert_eq!(dialog.entries().len(), 1);
    let entry = dialog.node(dialog.entries()[0]).expect("entry");
    assert_eq!(entry.text().default_text(), "Hello there");
    assert_eq!(entry.data().speaker, "guard");
    assert_eq!(entry.data().delay, crate::model::DEFAULT_DELAY);
    assert_eq!(dialog.starts().len(), 1);
}

#[rstest]
#[case(DELAY_ENTRY)]
#[case(DELAY_REPLY)]
#[case(NUM_WORDS)]
#[case(END_CONVER_ABORT)]
#[case(END_CONVERSATION)]
#[case(PREVENT_ZOOM_IN)]
#[case(ENTRY_LIST)]
#[case(REPLY_LIST)]
#[case(STARTING_LIST)]
fn missing_root_field_is_fatal(#[case] label: &'static str) {
    let bytes = Handmade {
        omit_root: Some(label),
        ..Handmade::default()
    }
    .bytes();
    let err = read_dialog(&bytes).expect_err("missing field");
    assert_eq!(
        err,
        DlgError::MissingRequiredField {
            struct_index: 0,
            label,
        }
    );
}

#[test]
fn missing_node_text_is_fatal() {
    let bytes = Handmade {
        entry_has_text: false,
        ..Handmade::default()
    }
    .bytes();
    let err = read_dialog(&bytes).expect_err("missing text");
    assert_eq!(
        err,
        DlgError::MissingRequiredField {
            struct_index: 1,
            label: TEXT,
        }
    );
}

#[test]
fn out_of_range_index_is_dropped_and_reported() {
    let bytes = Handmade {
        start_index: 7,
        ..Handmade::default()
    }
    .bytes();
    let report = read_dialog(&bytes).expect("read");
    assert!(report.dialog.starts().is_empty());
    assert_eq!(report.dangling.len(), 1);
    assert_eq!(report.dangling[0].parent, Parent::Root);
    assert_eq!(report.dangling[0].index, 7);
    assert_eq!(report.dangling[0].target_kind, NodeKind::Entry);
}

#[test]
fn other_file_types_are_rejected() {
    let bytes = Handmade {
        file_type: *b"UTC ",
        ..Handmade::default()
    }
    .bytes();
    assert!(matches!(
        read_dialog(&bytes),
        Err(DlgError::WrongFileType { .. })
    ));
}

#[test]
fn truncated_file_surfaces_container_error() {
    let mut bytes = write_dialog(&fixtures::linear().dialog).expect("write");
    bytes.truncate(40);
    assert!(matches!(read_dialog(&bytes), Err(DlgError::Gff(_))));
}

#[test]
fn writing_a_dangling_pointer_fails() {
    let mut linear = fixtures::linear();
    linear.dialog.remove_node(linear.r0).expect("removed");
    let err = write_dialog(&linear.dialog).expect_err("dangling");
    assert!(matches!(
        err,
        DlgError::DanglingPointer { parent: Parent::Node(p), target, .. }
            if p == linear.e0 && target == linear.r0
    ));
}

#[test]
fn writing_same_kind_edge_fails() {
    let mut dialog = Dialog::new();
    let a = dialog.insert_node(NodeKind::Entry, NodeData::with_text("a"));
    let b = dialog.insert_node(NodeKind::Entry, NodeData::with_text("b"));
    dialog
        .attach_pointer(Parent::Node(a), None, b, false, PointerData::default())
        .expect("attach");
    assert!(matches!(
        write_dialog(&dialog),
        Err(DlgError::TypeAlternation {
            parent_kind: NodeKind::Entry,
            target_kind: NodeKind::Entry,
            ..
        })
    ));
}

#[test]
fn writing_reply_start_fails() {
    let mut dialog = Dialog::new();
    let r = dialog.insert_node(NodeKind::Reply, NodeData::with_text("r"));
    dialog
        .attach_pointer(Parent::Root, None, r, false, PointerData::default())
        .expect("attach");
    assert!(matches!(
        write_dialog(&dialog),
        Err(DlgError::ReplyInStarts { .. })
    ));
}
