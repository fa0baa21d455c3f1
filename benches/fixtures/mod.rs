// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG) and criterion settings.

use std::str::FromStr;
use std::time::Duration;

use colloquy::model::{Dialog, NodeData, NodeId, NodeKind, Parent, PointerData};
use criterion::Criterion;

#[derive(Debug, Clone, Copy)]
pub enum Case {
    /// A handful of openers, three levels deep.
    Small,
    /// Wide branching with shared replies.
    MediumShared,
    /// Deep chains where every fifth entry links back to an earlier reply.
    LargeLinked,
}

impl Case {
    pub fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::MediumShared => "medium_shared",
            Self::LargeLinked => "large_linked",
        }
    }

    fn shape(self) -> (usize, usize, usize) {
        // (openers, fan-out, depth)
        match self {
            Self::Small => (3, 2, 3),
            Self::MediumShared => (8, 3, 5),
            Self::LargeLinked => (20, 2, 9),
        }
    }
}

pub const ALL: [Case; 3] = [Case::Small, Case::MediumShared, Case::LargeLinked];

/// Cases named in `COLLOQUY_BENCH_CASES` (comma separated ids), or all of them.
pub fn cases() -> Vec<Case> {
    let Ok(raw) = std::env::var("COLLOQUY_BENCH_CASES") else {
        return ALL.to_vec();
    };
    let wanted = raw.split(',').map(str::trim).collect::<Vec<_>>();
    ALL.into_iter().filter(|case| wanted.contains(&case.id())).collect()
}

fn knob<T: FromStr + Ord>(name: &str, default: T, min: T, max: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .unwrap_or(default)
        .clamp(min, max)
}

/// Criterion settings for every colloquy bench. Dialog edits are cheap, so runs default short.
pub fn criterion() -> Criterion {
    let samples = knob("COLLOQUY_BENCH_SAMPLES", 40usize, 10, 200);
    let warmup_ms = knob("COLLOQUY_BENCH_WARMUP_MS", 1_000u64, 100, 60_000);
    let measure_ms = knob("COLLOQUY_BENCH_MEASURE_MS", 3_000u64, 500, 120_000);

    Criterion::default()
        .sample_size(samples)
        .warm_up_time(Duration::from_millis(warmup_ms))
        .measurement_time(Duration::from_millis(measure_ms))
}

fn line(kind: NodeKind, idx: usize) -> NodeData {
    let mut data = NodeData::with_text(format!("{kind} line {idx:05}: the quick brown fox"));
    if idx % 4 == 0 {
        data.comment = format!("note {idx}");
    }
    if idx % 7 == 0 {
        data.action_params.insert("nStep".to_owned(), idx.to_string());
    }
    data
}

/// Deterministic branching conversation.
pub fn dialog(case: Case) -> Dialog {
    let (openers, fan_out, depth) = case.shape();
    let mut dialog = Dialog::new();
    let mut counter = 0usize;
    let mut replies_seen: Vec<NodeId> = Vec::new();

    for _ in 0..openers {
        let opener = dialog.insert_node(NodeKind::Entry, line(NodeKind::Entry, counter));
        counter += 1;
        dialog
            .attach_pointer(Parent::Root, None, opener, false, PointerData::default())
            .expect("start");

        let mut frontier = vec![opener];
        for level in 0..depth {
            let mut next = Vec::with_capacity(frontier.len() * fan_out);
            for parent in frontier {
                let kind = dialog.kind_of(parent).expect("parent").child_kind();
                for _ in 0..fan_out {
                    let child = dialog.insert_node(kind, line(kind, counter));
                    counter += 1;
                    dialog
                        .attach_pointer(Parent::Node(parent), None, child, false, PointerData::default())
                        .expect("child");
                    if kind == NodeKind::Reply {
                        replies_seen.push(child);
                    }
                    next.push(child);
                }

                match case {
                    Case::MediumShared if kind == NodeKind::Reply && level % 2 == 1 => {
                        if let Some(shared) = replies_seen.get(counter % replies_seen.len().max(1)) {
                            let _ = dialog.attach_pointer(
                                Parent::Node(parent),
                                None,
                                *shared,
                                false,
                                PointerData::default(),
                            );
                        }
                    }
                    Case::LargeLinked if kind == NodeKind::Reply && counter % 5 == 0 => {
                        if let Some(target) = replies_seen.first() {
                            let link = PointerData {
                                link_comment: "loop back".to_owned(),
                                ..PointerData::default()
                            };
                            let _ = dialog.attach_pointer(Parent::Node(parent), None, *target, true, link);
                        }
                    }
                    _ => {}
                }
            }
            frontier = next;
        }
    }
    dialog.recalculate_indices();
    dialog
}

/// First start target of `dialog`.
pub fn first_opener(dialog: &Dialog) -> NodeId {
    dialog.starts()[0].target()
}
