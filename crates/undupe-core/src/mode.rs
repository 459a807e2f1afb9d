//! Result mode state machine
//!
//! Owns the active result view and its payload. A result is only entered from
//! [`ResultMode::None`], and only when the response belongs to the most recently
//! issued request of its own form while that form's tab is selected. Each form
//! keeps its own latest request, so the two forms never supersede each other.

use crate::change::{AlignmentOp, AlignmentStats};
use crate::diff::AlignmentEngine;
use crate::pane::{project, Panes};
use crate::result::{ComparisonResult, DedupeResult, DirectoryResult, SinglePairResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Submission tab. Independent of the result mode and kept across `back`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Dedupe,
    #[default]
    Compare,
}

impl Tab {
    pub fn toggle(self) -> Self {
        match self {
            Tab::Dedupe => Tab::Compare,
            Tab::Compare => Tab::Dedupe,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Dedupe => "Deduplication",
            Tab::Compare => "Comparison",
        }
    }
}

/// A single-pair result together with its derived alignment
#[derive(Debug, Clone, PartialEq)]
pub struct SinglePairView {
    pub result: SinglePairResult,
    pub ops: Vec<AlignmentOp>,
    pub panes: Panes,
    pub stats: AlignmentStats,
}

impl SinglePairView {
    pub fn build(result: SinglePairResult, engine: &AlignmentEngine) -> Self {
        let ops = engine.align(&result.query_text, &result.target_text);
        let panes = project(&ops);
        let stats = AlignmentStats::from_ops(&ops);
        Self {
            result,
            ops,
            panes,
            stats,
        }
    }
}

/// A result ready to be displayed (alignment already computed for single pairs)
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedResult {
    Dedupe(DedupeResult),
    SinglePair(Box<SinglePairView>),
    Directory(DirectoryResult),
}

impl PreparedResult {
    pub fn prepare(result: ComparisonResult, engine: &AlignmentEngine) -> Self {
        match result {
            ComparisonResult::Dedupe(r) => PreparedResult::Dedupe(r),
            ComparisonResult::SinglePair(r) => {
                PreparedResult::SinglePair(Box::new(SinglePairView::build(r, engine)))
            }
            ComparisonResult::Directory(r) => PreparedResult::Directory(r),
        }
    }
}

/// The active result view, carrying its payload
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultMode {
    #[default]
    None,
    Dedupe(DedupeResult),
    SinglePair(Box<SinglePairView>),
    Directory(DirectoryResult),
}

impl From<PreparedResult> for ResultMode {
    fn from(prepared: PreparedResult) -> Self {
        match prepared {
            PreparedResult::Dedupe(r) => ResultMode::Dedupe(r),
            PreparedResult::SinglePair(v) => ResultMode::SinglePair(v),
            PreparedResult::Directory(r) => ResultMode::Directory(r),
        }
    }
}

/// Payload-free discriminant of [`ResultMode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    None,
    Dedupe,
    SinglePair,
    Directory,
}

impl ResultMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            ResultMode::None => ModeKind::None,
            ResultMode::Dedupe(_) => ModeKind::Dedupe,
            ResultMode::SinglePair(_) => ModeKind::SinglePair,
            ResultMode::Directory(_) => ModeKind::Directory,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ResultMode::None)
    }
}

/// Identifies one submitted request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
    tab: Tab,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The form that issued the request
    pub fn tab(&self) -> Tab {
        self.tab
    }
}

/// Latest issued sequence number per form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LatestRequests {
    dedupe: u64,
    compare: u64,
}

impl LatestRequests {
    fn get(&self, tab: Tab) -> u64 {
        match tab {
            Tab::Dedupe => self.dedupe,
            Tab::Compare => self.compare,
        }
    }

    fn set(&mut self, tab: Tab, seq: u64) {
        match tab {
            Tab::Dedupe => self.dedupe = seq,
            Tab::Compare => self.compare = seq,
        }
    }
}

/// What happened when a request outcome was offered to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// The result view was entered
    Entered(ModeKind),
    /// The request failed; the message belongs on the submitting form.
    /// Reported even when the user has since moved to another tab or view.
    Failed(String),
    /// A success arrived for a superseded request or an abandoned view,
    /// or a failure arrived for a superseded request
    Stale,
}

/// Owns the active [`ResultMode`] and the selected [`Tab`]
#[derive(Debug, Default)]
pub struct ResultModeController {
    tab: Tab,
    mode: ResultMode,
    engine: AlignmentEngine,
    /// Global sequence counter; never reused
    last_issued: u64,
    latest: LatestRequests,
}

impl ResultModeController {
    pub fn new(engine: AlignmentEngine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.tab = tab;
        self
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn mode(&self) -> &ResultMode {
        &self.mode
    }

    pub fn engine(&self) -> &AlignmentEngine {
        &self.engine
    }

    /// Switch submission tab. Only possible while no result is displayed.
    pub fn select_tab(&mut self, tab: Tab) -> bool {
        if !self.mode.is_none() {
            return false;
        }
        if self.tab != tab {
            debug!(from = ?self.tab, to = ?tab, "tab switched");
            self.tab = tab;
        }
        true
    }

    /// Issue a ticket for a new submission from the current tab
    pub fn issue(&mut self) -> RequestTicket {
        self.last_issued += 1;
        let ticket = RequestTicket {
            seq: self.last_issued,
            tab: self.tab,
        };
        self.latest.set(ticket.tab, ticket.seq);
        debug!(seq = ticket.seq, tab = ?ticket.tab, "request issued");
        ticket
    }

    /// Whether the ticket is still its form's most recent request
    pub fn is_latest_for_form(&self, ticket: RequestTicket) -> bool {
        ticket.seq == self.latest.get(ticket.tab)
    }

    /// Whether a successful outcome for this ticket may enter a result view
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.is_latest_for_form(ticket) && ticket.tab == self.tab && self.mode.is_none()
    }

    /// Offer a raw outcome; single-pair results are aligned here
    pub fn accept(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<ComparisonResult, String>,
    ) -> Applied {
        if outcome.is_ok() && !self.is_current(ticket) {
            return self.stale(ticket);
        }
        let prepared = outcome.map(|r| PreparedResult::prepare(r, &self.engine));
        self.accept_prepared(ticket, prepared)
    }

    /// Offer an outcome whose alignment was computed elsewhere
    pub fn accept_prepared(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<PreparedResult, String>,
    ) -> Applied {
        if !self.is_latest_for_form(ticket) {
            return self.stale(ticket);
        }
        match outcome {
            Ok(_) if !self.is_current(ticket) => self.stale(ticket),
            Ok(prepared) => {
                self.mode = prepared.into();
                let kind = self.mode.kind();
                info!(seq = ticket.seq, mode = ?kind, "result mode entered");
                Applied::Entered(kind)
            }
            Err(message) => {
                debug!(seq = ticket.seq, %message, "request failed");
                Applied::Failed(message)
            }
        }
    }

    /// Return to the submission forms, discarding the displayed result
    pub fn back(&mut self) {
        if !self.mode.is_none() {
            info!(from = ?self.mode.kind(), "back to forms");
        }
        self.mode = ResultMode::None;
    }

    fn stale(&self, ticket: RequestTicket) -> Applied {
        debug!(
            seq = ticket.seq,
            latest = self.latest.get(ticket.tab),
            form = ?ticket.tab,
            tab = ?self.tab,
            mode = ?self.mode.kind(),
            "ignoring stale response"
        );
        Applied::Stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::OpKind;
    use crate::result::{DedupeFiles, DirectoryMatch};
    use std::collections::BTreeMap;

    fn pair(query: &str, target: &str) -> ComparisonResult {
        ComparisonResult::SinglePair(SinglePairResult {
            query_text: query.to_string(),
            target_text: target.to_string(),
            cosine_similarity: 0.8,
            levenshtein_ratio: 70.0,
            is_duplicate: false,
            query_filename: "q.txt".to_string(),
            target_filename: "t.txt".to_string(),
            timestamp: None,
        })
    }

    fn dedupe() -> ComparisonResult {
        ComparisonResult::Dedupe(DedupeResult {
            total_records: 10,
            exact_duplicates_removed: 2,
            near_duplicates_removed: 1,
            deduplication_rate: 0.3,
            files: DedupeFiles {
                cleaned: "c.csv".to_string(),
                near_dups: "n.csv".to_string(),
                exact_dups: "e.csv".to_string(),
                report: Some("r.json".to_string()),
                extra: BTreeMap::new(),
            },
            final_records: Some(7),
            input_filename: None,
            timestamp: None,
        })
    }

    fn directory() -> ComparisonResult {
        ComparisonResult::Directory(DirectoryResult {
            matches: vec![DirectoryMatch {
                filename: "x.txt".to_string(),
                cosine_similarity: 0.91,
                levenshtein_ratio: 95.0,
                is_duplicate: true,
            }],
            query_filename: None,
            target_zip: None,
            timestamp: None,
        })
    }

    #[test]
    fn test_initial_state() {
        let controller = ResultModeController::default();
        assert_eq!(controller.mode().kind(), ModeKind::None);
        assert_eq!(controller.tab(), Tab::Compare);
    }

    #[test]
    fn test_each_result_enters_its_mode() {
        for (result, tab, expected) in [
            (dedupe(), Tab::Dedupe, ModeKind::Dedupe),
            (pair("a", "b"), Tab::Compare, ModeKind::SinglePair),
            (directory(), Tab::Compare, ModeKind::Directory),
        ] {
            let mut controller = ResultModeController::default().with_tab(tab);
            let ticket = controller.issue();
            assert_eq!(controller.accept(ticket, Ok(result)), Applied::Entered(expected));
            assert_eq!(controller.mode().kind(), expected);
        }
    }

    #[test]
    fn test_failure_keeps_mode_none() {
        let mut controller = ResultModeController::default();
        let ticket = controller.issue();
        let applied = controller.accept(ticket, Err("500 Internal Server Error".to_string()));
        assert_eq!(applied, Applied::Failed("500 Internal Server Error".to_string()));
        assert!(controller.mode().is_none());
    }

    #[test]
    fn test_back_discards_previous_panes() {
        let mut controller = ResultModeController::default();
        let first = controller.issue();
        controller.accept(first, Ok(pair("the quick fox", "the slow fox")));
        controller.back();
        assert!(controller.mode().is_none());

        let second = controller.issue();
        controller.accept(second, Ok(pair("red apple", "green apple")));
        let ResultMode::SinglePair(view) = controller.mode() else {
            panic!("expected single pair mode");
        };
        let all_text: Vec<&str> = view
            .panes
            .source
            .spans
            .iter()
            .chain(view.panes.target.spans.iter())
            .map(|s| s.text.as_str())
            .collect();
        for stale in ["quick", "slow", "fox"] {
            assert!(all_text.iter().all(|t| !t.contains(stale)));
        }
        assert_eq!(view.panes.source.text(), "red apple");
        assert_eq!(view.panes.target.text(), "green apple");
    }

    #[test]
    fn test_tab_persists_across_back() {
        let mut controller = ResultModeController::default();
        assert!(controller.select_tab(Tab::Dedupe));
        let ticket = controller.issue();
        controller.accept(ticket, Ok(dedupe()));
        assert!(!controller.select_tab(Tab::Compare));
        controller.back();
        assert_eq!(controller.tab(), Tab::Dedupe);
    }

    #[test]
    fn test_superseded_request_is_ignored() {
        let mut controller = ResultModeController::default();
        let old = controller.issue();
        let new = controller.issue();
        assert_eq!(controller.accept(old, Ok(pair("a", "b"))), Applied::Stale);
        assert!(controller.mode().is_none());
        assert_eq!(
            controller.accept(new, Ok(directory())),
            Applied::Entered(ModeKind::Directory)
        );
    }

    #[test]
    fn test_response_after_tab_switch_is_ignored() {
        let mut controller = ResultModeController::default();
        let ticket = controller.issue();
        controller.select_tab(Tab::Dedupe);
        assert_eq!(controller.accept(ticket, Ok(pair("a", "b"))), Applied::Stale);
        assert!(controller.mode().is_none());
    }

    #[test]
    fn test_failure_after_tab_switch_still_reported() {
        let mut controller = ResultModeController::default();
        let ticket = controller.issue();
        controller.select_tab(Tab::Dedupe);
        assert_eq!(
            controller.accept(ticket, Err("boom".to_string())),
            Applied::Failed("boom".to_string())
        );
        assert!(controller.mode().is_none());
    }

    #[test]
    fn test_forms_do_not_supersede_each_other() {
        let mut controller = ResultModeController::default();
        let compare = controller.issue();
        controller.select_tab(Tab::Dedupe);
        let dedupe_ticket = controller.issue();
        controller.select_tab(Tab::Compare);

        assert!(controller.is_current(compare));
        assert!(!controller.is_current(dedupe_ticket));
        assert_eq!(
            controller.accept(compare, Ok(pair("a b", "a c"))),
            Applied::Entered(ModeKind::SinglePair)
        );

        // the dedupe response lands while a comparison is on screen
        assert_eq!(controller.accept(dedupe_ticket, Ok(dedupe())), Applied::Stale);
        assert_eq!(controller.mode().kind(), ModeKind::SinglePair);
    }

    #[test]
    fn test_other_form_failure_is_not_stale() {
        let mut controller = ResultModeController::default();
        let compare = controller.issue();
        controller.select_tab(Tab::Dedupe);
        let _dedupe = controller.issue();
        controller.select_tab(Tab::Compare);
        assert_eq!(
            controller.accept(compare, Err("timed out".to_string())),
            Applied::Failed("timed out".to_string())
        );
    }

    #[test]
    fn test_superseded_failure_is_stale() {
        let mut controller = ResultModeController::default();
        let old = controller.issue();
        let _new = controller.issue();
        assert_eq!(controller.accept(old, Err("boom".to_string())), Applied::Stale);
    }

    #[test]
    fn test_no_transition_while_result_showing() {
        let mut controller = ResultModeController::default();
        let ticket = controller.issue();
        controller.accept(ticket, Ok(directory()));
        assert_eq!(controller.accept(ticket, Ok(pair("a", "b"))), Applied::Stale);
        assert_eq!(controller.mode().kind(), ModeKind::Directory);
    }

    #[test]
    fn test_duplicate_pair_has_no_highlights() {
        let mut controller = ResultModeController::default();
        let ticket = controller.issue();
        let text = "identical body of text";
        let mut result = pair(text, text);
        if let ComparisonResult::SinglePair(r) = &mut result {
            r.is_duplicate = true;
        }
        controller.accept(ticket, Ok(result));
        let ResultMode::SinglePair(view) = controller.mode() else {
            panic!("expected single pair mode");
        };
        assert_eq!(view.ops.len(), 1);
        assert_eq!(view.ops[0].kind, OpKind::Unchanged);
        assert_eq!(view.panes.source.highlighted_count(), 0);
        assert_eq!(view.panes.target.highlighted_count(), 0);
        assert!(view.stats.is_identical());
    }
}
