//! Token alignment engine

use crate::change::{AlignmentOp, OpKind};
use similar::{Algorithm, ChangeTag, TextDiff};
use std::time::Duration;

/// Split text into maximal whitespace runs and maximal non-whitespace runs.
///
/// Concatenating the returned tokens always reproduces the input exactly.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (idx, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != is_space => {
                tokens.push(&text[start..idx]);
                start = idx;
            }
            _ => {}
        }
        in_space = Some(is_space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// Computes token-level alignments between two texts
#[derive(Debug, Clone, Default)]
pub struct AlignmentEngine {
    /// Upper bound on diff computation time. Past the deadline the diff
    /// degrades to a coarser alignment that still reconstructs both sides.
    timeout: Option<Duration>,
}

impl AlignmentEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Align `old` against `new`, producing merged UNCHANGED/REMOVED/ADDED ops.
    ///
    /// Within each run of changes between two unchanged spans, the removed
    /// text is emitted before the added text.
    pub fn align(&self, old: &str, new: &str) -> Vec<AlignmentOp> {
        match (old.is_empty(), new.is_empty()) {
            (true, true) => return Vec::new(),
            (true, false) => return vec![AlignmentOp::added(new)],
            (false, true) => return vec![AlignmentOp::removed(old)],
            (false, false) => {}
        }

        let old_tokens = tokenize(old);
        let new_tokens = tokenize(new);

        let mut config = TextDiff::configure();
        config.algorithm(Algorithm::Myers);
        if let Some(timeout) = self.timeout {
            config.timeout(timeout);
        }
        let token_diff = config.diff_slices(&old_tokens, &new_tokens);

        let mut ops = Vec::new();
        let mut pending_removed = String::new();
        let mut pending_added = String::new();

        for change in token_diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Equal => {
                    flush_pending(&mut pending_removed, &mut pending_added, &mut ops);
                    push_merged(&mut ops, OpKind::Unchanged, change.value());
                }
                ChangeTag::Delete => pending_removed.push_str(change.value()),
                ChangeTag::Insert => pending_added.push_str(change.value()),
            }
        }
        flush_pending(&mut pending_removed, &mut pending_added, &mut ops);

        ops
    }
}

/// Align two texts with the default engine (no deadline)
pub fn align(old: &str, new: &str) -> Vec<AlignmentOp> {
    AlignmentEngine::new().align(old, new)
}

fn flush_pending(removed: &mut String, added: &mut String, ops: &mut Vec<AlignmentOp>) {
    if !removed.is_empty() {
        push_merged(ops, OpKind::Removed, removed);
        removed.clear();
    }
    if !added.is_empty() {
        push_merged(ops, OpKind::Added, added);
        added.clear();
    }
}

fn push_merged(ops: &mut Vec<AlignmentOp>, kind: OpKind, text: &str) {
    if let Some(last) = ops.last_mut() {
        if last.kind == kind {
            last.text.push_str(text);
            return;
        }
    }
    ops.push(AlignmentOp::new(kind, text));
}
