// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use crate::model::{Dialog, NodeId, NodeKind, Parent, Pointer, PointerId};

/// A reference-integrity problem found by [`audit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// The pointer's target is no longer in the dialog. The cleanup pass removes these.
    DanglingPointer {
        pointer: PointerId,
        parent: Parent,
        target: NodeId,
    },
    /// The pointer connects two nodes of the same kind.
    TypeAlternation {
        pointer: PointerId,
        parent: Parent,
        kind: NodeKind,
    },
    /// A start pointer targets a reply.
    ReplyInStarts { pointer: PointerId, target: NodeId },
    /// The pointer's recorded target kind disagrees with the node it points at.
    StaleTargetKind { pointer: PointerId, target: NodeId },
    /// The incrementally maintained link registry no longer matches the graph.
    StaleRegistry,
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingPointer {
                pointer,
                parent,
                target,
            } => write!(f, "pointer {pointer} from {parent:?} dangles (target {target:?})"),
            Self::TypeAlternation {
                pointer,
                parent,
                kind,
            } => write!(f, "pointer {pointer} from {parent:?} joins two {kind} nodes"),
            Self::ReplyInStarts { pointer, target } => {
                write!(f, "start pointer {pointer} targets reply {target:?}")
            }
            Self::StaleTargetKind { pointer, target } => {
                write!(f, "pointer {pointer} records the wrong kind for {target:?}")
            }
            Self::StaleRegistry => f.write_str("link registry is out of sync with the graph"),
        }
    }
}

impl IntegrityIssue {
    pub fn is_dangling(&self) -> bool {
        matches!(self, Self::DanglingPointer { .. })
    }
}

/// Walks every pointer and reports what is wrong. An empty result means the dialog can be
/// written.
pub fn audit(dialog: &Dialog) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    let mut check = |parent: Parent, expected: NodeKind, pointer: &Pointer| {
        let Some(kind) = dialog.kind_of(pointer.target()) else {
            issues.push(IntegrityIssue::DanglingPointer {
                pointer: pointer.id(),
                parent,
                target: pointer.target(),
            });
            return;
        };
        if kind != pointer.target_kind() {
            issues.push(IntegrityIssue::StaleTargetKind {
                pointer: pointer.id(),
                target: pointer.target(),
            });
        }
        if kind != expected {
            issues.push(match parent {
                Parent::Root => IntegrityIssue::ReplyInStarts {
                    pointer: pointer.id(),
                    target: pointer.target(),
                },
                Parent::Node(_) => IntegrityIssue::TypeAlternation {
                    pointer: pointer.id(),
                    parent,
                    kind,
                },
            });
        }
    };

    for pointer in dialog.starts() {
        check(Parent::Root, NodeKind::Entry, pointer);
    }
    for (id, node) in dialog.nodes() {
        for pointer in node.pointers() {
            check(Parent::Node(id), node.kind().child_kind(), pointer);
        }
    }

    if !dialog.link_registry_matches_graph() {
        issues.push(IntegrityIssue::StaleRegistry);
    }
    if !issues.is_empty() {
        tracing::warn!(issues = issues.len(), "integrity audit found problems");
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::{audit, IntegrityIssue};
    use crate::model::fixtures;
    use crate::model::{NodeData, NodeKind, Parent, PointerData};

    #[test]
    fn fixtures_are_clean() {
        assert!(audit(&fixtures::richly_populated()).is_empty());
        assert!(audit(&fixtures::cycle(true).dialog).is_empty());
    }

    #[test]
    fn removed_target_is_reported_as_dangling() {
        let mut linear = fixtures::linear();
        linear.dialog.remove_node(linear.r0).expect("removed");
        let issues = audit(&linear.dialog);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_dangling());
    }

    #[test]
    fn same_kind_edges_and_reply_starts_are_reported() {
        let mut dialog = fixtures::linear().dialog;
        let e0 = dialog.entries()[0];
        let r0 = dialog.replies()[0];
        let extra = dialog.insert_node(NodeKind::Entry, NodeData::default());
        dialog
            .attach_pointer(Parent::Node(e0), None, extra, false, PointerData::default())
            .expect("attach");
        dialog
            .attach_pointer(Parent::Root, None, r0, false, PointerData::default())
            .expect("attach");

        let issues = audit(&dialog);
        assert!(issues.iter().any(|issue| matches!(
            issue,
            IntegrityIssue::TypeAlternation { kind: NodeKind::Entry, .. }
        )));
        assert!(issues
            .iter()
            .any(|issue| matches!(issue, IntegrityIssue::ReplyInStarts { target, .. } if *target == r0)));
    }
}
