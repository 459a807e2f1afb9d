//! Undupe Core - token alignment and result state for the undupe client
//!
//! This library aligns two documents at token granularity, projects the
//! alignment onto side-by-side panes, and tracks which comparison result is
//! currently displayed.

pub mod change;
pub mod diff;
pub mod form;
pub mod mode;
pub mod pane;
pub mod result;

pub use change::{reconstruct_new, reconstruct_old, AlignmentOp, AlignmentStats, OpKind};
pub use diff::{align, tokenize, AlignmentEngine};
pub use form::{
    CompareForm, CompareKind, CompareRequest, DedupeForm, DedupeRequest, FormError, FormStatus,
    Settings, SubmitGuard, Thresholds,
};
pub use mode::{
    Applied, ModeKind, PreparedResult, RequestTicket, ResultMode, ResultModeController,
    SinglePairView, Tab,
};
pub use pane::{project, Pane, Panes, RenderSpan};
pub use result::{
    format_ratio, ComparisonResult, DedupeFiles, DedupeResult, DirectoryMatch, DirectoryResult,
    SinglePairResult,
};
