//! Alignment operation representation

use serde::{Deserialize, Serialize};

/// The kind of an alignment operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Present in both texts
    Unchanged,
    /// Present only in the old (source) text
    Removed,
    /// Present only in the new (target) text
    Added,
}

impl OpKind {
    /// Whether ops of this kind contribute text to the old side
    pub fn in_old(self) -> bool {
        matches!(self, OpKind::Unchanged | OpKind::Removed)
    }

    /// Whether ops of this kind contribute text to the new side
    pub fn in_new(self) -> bool {
        matches!(self, OpKind::Unchanged | OpKind::Added)
    }
}

/// A tagged span of the two compared texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentOp {
    pub kind: OpKind,
    pub text: String,
}

impl AlignmentOp {
    pub fn new(kind: OpKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn unchanged(text: impl Into<String>) -> Self {
        Self::new(OpKind::Unchanged, text)
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self::new(OpKind::Removed, text)
    }

    pub fn added(text: impl Into<String>) -> Self {
        Self::new(OpKind::Added, text)
    }

    /// Check if this is an actual change (not just context)
    pub fn is_change(&self) -> bool {
        self.kind != OpKind::Unchanged
    }
}

/// Rebuild the old text from an op sequence (drops ADDED ops)
pub fn reconstruct_old(ops: &[AlignmentOp]) -> String {
    ops.iter()
        .filter(|op| op.kind.in_old())
        .map(|op| op.text.as_str())
        .collect()
}

/// Rebuild the new text from an op sequence (drops REMOVED ops)
pub fn reconstruct_new(ops: &[AlignmentOp]) -> String {
    ops.iter()
        .filter(|op| op.kind.in_new())
        .map(|op| op.text.as_str())
        .collect()
}

/// Byte and fragment counts over an op sequence, used for summary headers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentStats {
    pub unchanged_bytes: usize,
    pub removed_bytes: usize,
    pub added_bytes: usize,
    /// Number of REMOVED fragments
    pub removals: usize,
    /// Number of ADDED fragments
    pub additions: usize,
}

impl AlignmentStats {
    pub fn from_ops(ops: &[AlignmentOp]) -> Self {
        let mut stats = Self::default();
        for op in ops {
            match op.kind {
                OpKind::Unchanged => stats.unchanged_bytes += op.text.len(),
                OpKind::Removed => {
                    stats.removed_bytes += op.text.len();
                    stats.removals += 1;
                }
                OpKind::Added => {
                    stats.added_bytes += op.text.len();
                    stats.additions += 1;
                }
            }
        }
        stats
    }

    /// True when the two sides are identical
    pub fn is_identical(&self) -> bool {
        self.removals == 0 && self.additions == 0
    }
}
