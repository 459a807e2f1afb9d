//! Projection of an alignment onto source and target panes

use crate::change::{AlignmentOp, OpKind};
use serde::Serialize;

/// A renderable fragment of one pane
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderSpan {
    pub text: String,
    pub highlighted: bool,
    /// Kind of the op this span was projected from
    pub origin: OpKind,
}

/// One side of a side-by-side comparison
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pane {
    pub spans: Vec<RenderSpan>,
}

impl Pane {
    /// Full pane text (concatenation of all spans)
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn highlighted_count(&self) -> usize {
        self.spans.iter().filter(|s| s.highlighted).count()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Source (old) and target (new) panes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Panes {
    pub source: Pane,
    pub target: Pane,
}

/// Walk the op sequence once, projecting each op onto the pane(s) it belongs to.
///
/// Source receives UNCHANGED and REMOVED ops, target receives UNCHANGED and
/// ADDED ops. Ops that do not belong to a side leave no trace in it.
pub fn project(ops: &[AlignmentOp]) -> Panes {
    let mut panes = Panes::default();

    for op in ops {
        let highlighted = op.is_change();
        if op.kind.in_old() {
            panes.source.spans.push(RenderSpan {
                text: op.text.clone(),
                highlighted,
                origin: op.kind,
            });
        }
        if op.kind.in_new() {
            panes.target.spans.push(RenderSpan {
                text: op.text.clone(),
                highlighted,
                origin: op.kind,
            });
        }
    }

    panes
}
