// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::dialog::Dialog;
use super::ids::NodeId;
use super::node::{NodeData, NodeKind};
use super::pointer::{Parent, PointerData};
use super::resref::ResRef;

pub(crate) fn entry(dialog: &mut Dialog, text: &str) -> NodeId {
    dialog.insert_node(NodeKind::Entry, NodeData::with_text(text))
}

pub(crate) fn reply(dialog: &mut Dialog, text: &str) -> NodeId {
    dialog.insert_node(NodeKind::Reply, NodeData::with_text(text))
}

pub(crate) fn start(dialog: &mut Dialog, target: NodeId) {
    dialog
        .attach_pointer(Parent::Root, None, target, false, PointerData::default())
        .expect("start pointer");
}

pub(crate) fn child(dialog: &mut Dialog, parent: NodeId, target: NodeId) {
    dialog
        .attach_pointer(Parent::Node(parent), None, target, false, PointerData::default())
        .expect("child pointer");
}

pub(crate) fn link(dialog: &mut Dialog, parent: NodeId, target: NodeId) {
    dialog
        .attach_pointer(Parent::Node(parent), None, target, true, PointerData::default())
        .expect("link pointer");
}

/// `starts = [E0]`, `E0 -> R0`.
pub(crate) struct Linear {
    pub dialog: Dialog,
    pub e0: NodeId,
    pub r0: NodeId,
}

pub(crate) fn linear() -> Linear {
    let mut dialog = Dialog::new();
    let e0 = entry(&mut dialog, "Greetings.");
    let r0 = reply(&mut dialog, "Farewell.");
    start(&mut dialog, e0);
    child(&mut dialog, e0, r0);
    Linear { dialog, e0, r0 }
}

/// Started chain of `len` alternating nodes, entry first.
pub(crate) fn chain(len: usize) -> (Dialog, NodeId) {
    let mut dialog = Dialog::new();
    let root = entry(&mut dialog, "0");
    start(&mut dialog, root);
    let mut previous = root;
    for i in 1..len {
        let next = if i % 2 == 0 {
            entry(&mut dialog, &i.to_string())
        } else {
            reply(&mut dialog, &i.to_string())
        };
        child(&mut dialog, previous, next);
        previous = next;
    }
    (dialog, root)
}

/// Two started entries both owning the same reply through non-link pointers.
pub(crate) struct SharedReply {
    pub dialog: Dialog,
    pub e1: NodeId,
    pub e2: NodeId,
    pub shared: NodeId,
}

pub(crate) fn shared_reply() -> SharedReply {
    let mut dialog = Dialog::new();
    let e1 = entry(&mut dialog, "First opener.");
    let e2 = entry(&mut dialog, "Second opener.");
    let shared = reply(&mut dialog, "Shared answer.");
    start(&mut dialog, e1);
    start(&mut dialog, e2);
    child(&mut dialog, e1, shared);
    child(&mut dialog, e2, shared);
    SharedReply {
        dialog,
        e1,
        e2,
        shared,
    }
}

/// `A -> B` (child), `C -> B` (link), `B -> D` (child), `A -> X` (child, unshared).
pub(crate) struct LinkParent {
    pub dialog: Dialog,
    pub a: NodeId,
    pub b: NodeId,
    pub c: NodeId,
    pub d: NodeId,
    pub x: NodeId,
}

pub(crate) fn link_parent() -> LinkParent {
    let mut dialog = Dialog::new();
    let a = entry(&mut dialog, "A");
    let c = entry(&mut dialog, "C");
    let d = entry(&mut dialog, "D");
    let b = reply(&mut dialog, "B");
    let x = reply(&mut dialog, "X");
    start(&mut dialog, a);
    start(&mut dialog, c);
    child(&mut dialog, a, b);
    child(&mut dialog, a, x);
    link(&mut dialog, c, b);
    child(&mut dialog, b, d);
    LinkParent {
        dialog,
        a,
        b,
        c,
        d,
        x,
    }
}

/// `E0 -> R0 -> E1 -> R1`, with `R1 -> E0` closing a loop back to the root.
pub(crate) struct Cycle {
    pub dialog: Dialog,
    pub e0: NodeId,
    pub r0: NodeId,
    pub e1: NodeId,
    pub r1: NodeId,
}

pub(crate) fn cycle(back_edge_is_link: bool) -> Cycle {
    let mut dialog = Dialog::new();
    let e0 = entry(&mut dialog, "Loop start.");
    let e1 = entry(&mut dialog, "Loop middle.");
    let r0 = reply(&mut dialog, "Continue.");
    let r1 = reply(&mut dialog, "Again.");
    start(&mut dialog, e0);
    child(&mut dialog, e0, r0);
    child(&mut dialog, r0, e1);
    child(&mut dialog, e1, r1);
    if back_edge_is_link {
        link(&mut dialog, r1, e0);
    } else {
        child(&mut dialog, r1, e0);
    }
    Cycle {
        dialog,
        e0,
        r0,
        e1,
        r1,
    }
}

/// Every attribute populated, including parameters and a commented link.
pub(crate) fn richly_populated() -> Dialog {
    let mut dialog = Dialog::new();
    dialog.meta_mut().delay_entry = 2;
    dialog.meta_mut().delay_reply = 3;
    dialog.meta_mut().end_conversation = ResRef::new("nw_end").expect("resref");
    dialog.meta_mut().end_conver_abort = ResRef::new("nw_abort").expect("resref");
    dialog.meta_mut().prevent_zoom_in = true;

    let mut greeting = NodeData::with_text("Well met, traveller.");
    greeting.text.set(2, "Bien le bonjour, voyageur.");
    greeting.speaker = "innkeeper".to_owned();
    greeting.comment = "first contact".to_owned();
    greeting.sound = ResRef::new("vs_inn_hello").expect("resref");
    greeting.script = ResRef::new("ga_give_item").expect("resref");
    greeting
        .action_params
        .insert("sItem".to_owned(), "ale".to_owned());
    greeting.quest = "q_inn".to_owned();
    greeting.quest_entry = Some(10);
    greeting.animation = 28;
    greeting.anim_loop = true;
    greeting.delay = 5;
    let greeting = dialog.insert_node(NodeKind::Entry, greeting);

    let mut ask = NodeData::with_text("Any rooms free?");
    ask.quest = "q_inn".to_owned();
    ask.comment = "player asks".to_owned();
    let ask = dialog.insert_node(NodeKind::Reply, ask);
    let leave = reply(&mut dialog, "Goodbye.");
    let answer = entry(&mut dialog, "Only the attic.");

    start(&mut dialog, greeting);
    let mut condition = PointerData::default();
    condition.condition = ResRef::new("gc_has_gold").expect("resref");
    condition
        .condition_params
        .insert("nGold".to_owned(), "5".to_owned());
    dialog
        .attach_pointer(Parent::Node(greeting), None, ask, false, condition)
        .expect("pointer");
    child(&mut dialog, greeting, leave);
    child(&mut dialog, ask, answer);
    let link_data = PointerData {
        link_comment: "loops back to goodbye".to_owned(),
        ..PointerData::default()
    };
    dialog
        .attach_pointer(Parent::Node(answer), None, leave, true, link_data)
        .expect("link");
    dialog
}
