//! Application state and input handling

use crate::client::ApiClient;
use crate::config::Config;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};
use tui_textarea::TextArea;
use undupe_core::{
    AlignmentEngine, Applied, CompareForm, CompareKind, CompareRequest, ComparisonResult, DedupeForm,
    DedupeRequest, FormStatus, PreparedResult, RequestTicket, ResultMode, ResultModeController,
    Settings, SubmitGuard, Tab,
};

/// Messages delivered to the draw loop by background tasks
#[derive(Debug)]
pub enum AppEvent {
    Response {
        ticket: RequestTicket,
        outcome: Result<PreparedResult, String>,
    },
    Downloaded(Result<PathBuf, String>),
}

/// An editable row of a submission form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Kind,
    Query,
    Target,
    File,
    TextColumn,
    Model,
    Stopwords,
    Cosine,
    Fuzzy,
}

const COMPARE_FIELDS: [Field; 6] = [
    Field::Kind,
    Field::Query,
    Field::Target,
    Field::Stopwords,
    Field::Cosine,
    Field::Fuzzy,
];

const DEDUPE_FIELDS: [Field; 6] = [
    Field::File,
    Field::TextColumn,
    Field::Model,
    Field::Stopwords,
    Field::Cosine,
    Field::Fuzzy,
];

impl Field {
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Field::Query | Field::Target | Field::File | Field::TextColumn | Field::Model
        )
    }
}

/// One submission form with its inputs and request state
pub struct FormPanel {
    pub tab: Tab,
    pub kind: CompareKind,
    pub settings: Settings,
    inputs: Vec<(Field, TextArea<'static>)>,
    pub focus: usize,
    pub guard: SubmitGuard,
    pub status: FormStatus,
}

fn text_input(initial: &str, placeholder: &str) -> TextArea<'static> {
    let mut input = TextArea::new(vec![initial.to_string()]);
    input.set_placeholder_text(placeholder);
    input.set_cursor_line_style(ratatui::style::Style::default());
    input.move_cursor(tui_textarea::CursorMove::End);
    input
}

impl FormPanel {
    pub fn new(tab: Tab, config: &Config) -> Self {
        let inputs = match tab {
            Tab::Compare => vec![
                (Field::Query, text_input("", "path to the first file")),
                (Field::Target, text_input("", "path to the second file")),
            ],
            Tab::Dedupe => vec![
                (Field::File, text_input("", "CSV, JSON, TXT, PDF, DOCX or ZIP")),
                (
                    Field::TextColumn,
                    text_input(
                        config.text_column.as_deref().unwrap_or(""),
                        "auto-detect",
                    ),
                ),
                (Field::Model, text_input(&config.settings.model, "embedding model")),
            ],
        };
        Self {
            tab,
            kind: CompareKind::default(),
            settings: config.settings.clone(),
            inputs,
            focus: 0,
            guard: SubmitGuard::default(),
            status: FormStatus::default(),
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        match self.tab {
            Tab::Compare => &COMPARE_FIELDS,
            Tab::Dedupe => &DEDUPE_FIELDS,
        }
    }

    pub fn focused(&self) -> Field {
        self.fields()[self.focus % self.fields().len()]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn input(&self, field: Field) -> Option<&TextArea<'static>> {
        self.inputs.iter().find(|(f, _)| *f == field).map(|(_, t)| t)
    }

    fn input_mut(&mut self, field: Field) -> Option<&mut TextArea<'static>> {
        self.inputs
            .iter_mut()
            .find(|(f, _)| *f == field)
            .map(|(_, t)| t)
    }

    pub fn value(&self, field: Field) -> String {
        self.input(field)
            .and_then(|t| t.lines().first().cloned())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub fn set_value(&mut self, field: Field, value: &str) {
        if let Some(input) = self.input_mut(field) {
            *input = text_input(value, "");
        }
    }

    pub fn dedupe_form(&self) -> DedupeForm {
        let mut settings = self.settings.clone();
        let model = self.value(Field::Model);
        if !model.trim().is_empty() {
            settings.model = model.trim().to_string();
        }
        DedupeForm {
            file: self.value(Field::File),
            text_column: self.value(Field::TextColumn),
            settings,
        }
    }

    pub fn compare_form(&self) -> CompareForm {
        CompareForm {
            kind: self.kind,
            query: self.value(Field::Query),
            target: self.value(Field::Target),
            settings: self.settings.clone(),
        }
    }

    /// Edit the focused field
    fn edit(&mut self, key: KeyEvent) {
        let field = self.focused();
        let changed = if field.is_text() {
            self.input_mut(field).map(|input| input.input(key)).unwrap_or(false)
        } else {
            self.adjust(field, key.code)
        };
        if changed && self.status.error().is_some() {
            self.status = FormStatus::Idle;
        }
    }

    fn adjust(&mut self, field: Field, code: KeyCode) -> bool {
        let step: i8 = match code {
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') => -1,
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') | KeyCode::Char(' ') => 1,
            _ => return false,
        };
        match field {
            Field::Kind => self.kind = self.kind.toggle(),
            Field::Stopwords => self.settings.remove_stopwords = !self.settings.remove_stopwords,
            Field::Cosine => self.settings.thresholds.nudge_cosine(step as f64 * 0.01),
            Field::Fuzzy => self.settings.thresholds.nudge_fuzzy(step as i16),
            _ => return false,
        }
        true
    }
}

/// Align single-pair texts on a blocking worker so the draw loop keeps running
pub async fn prepare_off_thread(
    result: ComparisonResult,
    engine: AlignmentEngine,
) -> Result<PreparedResult, String> {
    tokio::task::spawn_blocking(move || PreparedResult::prepare(result, &engine))
        .await
        .map_err(|e| format!("Alignment failed: {e}"))
}

enum Job {
    Dedupe(DedupeRequest),
    Compare(CompareRequest),
}

/// The main application state
pub struct App {
    pub controller: ResultModeController,
    pub dedupe: FormPanel,
    pub compare: FormPanel,
    /// Vertical scroll of the active result view (panes scroll together)
    pub scroll_offset: usize,
    /// Body height seen by the last render, used for paging
    pub viewport_height: usize,
    /// Highlighted artifact in the dedupe summary
    pub selected_artifact: usize,
    /// One-line message under the result view (downloads)
    pub notice: Option<String>,
    pub show_help: bool,
    pub should_quit: bool,
    client: ApiClient,
    download_dir: PathBuf,
    top_k: Option<u32>,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: &Config, client: ApiClient, events: UnboundedSender<AppEvent>) -> Self {
        let controller =
            ResultModeController::new(config.alignment_engine()).with_tab(config.default_tab);
        Self {
            controller,
            dedupe: FormPanel::new(Tab::Dedupe, config),
            compare: FormPanel::new(Tab::Compare, config),
            scroll_offset: 0,
            viewport_height: 0,
            selected_artifact: 0,
            notice: None,
            show_help: false,
            should_quit: false,
            client,
            download_dir: config.download_dir(),
            top_k: config.top_k,
            events,
        }
    }

    pub fn api_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn panel(&self, tab: Tab) -> &FormPanel {
        match tab {
            Tab::Dedupe => &self.dedupe,
            Tab::Compare => &self.compare,
        }
    }

    pub fn panel_mut(&mut self, tab: Tab) -> &mut FormPanel {
        match tab {
            Tab::Dedupe => &mut self.dedupe,
            Tab::Compare => &mut self.compare,
        }
    }

    pub fn active_panel(&self) -> &FormPanel {
        self.panel(self.controller.tab())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.show_help {
            self.show_help = false;
            return;
        }
        if self.controller.mode().is_none() {
            self.handle_form_key(key);
        } else {
            self.handle_result_key(key);
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::F(1) => self.show_help = true,
            KeyCode::F(2) => self.switch_tab(),
            KeyCode::Char('t') if ctrl => self.switch_tab(),
            KeyCode::Tab | KeyCode::Down => self.panel_mut(self.controller.tab()).focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.panel_mut(self.controller.tab()).focus_prev(),
            KeyCode::Enter => self.submit(),
            _ => self.panel_mut(self.controller.tab()).edit(key),
        }
    }

    fn handle_result_key(&mut self, key: KeyEvent) {
        let page = self.viewport_height.max(2) / 2;
        let in_dedupe = matches!(self.controller.mode(), ResultMode::Dedupe(_));
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => self.back(),
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') | KeyCode::F(1) => self.show_help = true,
            KeyCode::Down | KeyCode::Char('j') if in_dedupe => self.select_artifact(1),
            KeyCode::Up | KeyCode::Char('k') if in_dedupe => self.select_artifact(-1),
            KeyCode::Enter | KeyCode::Char('d') if in_dedupe => self.download_selected(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_offset += 1,
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1)
            }
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_offset += page,
            KeyCode::PageUp => self.scroll_offset = self.scroll_offset.saturating_sub(page),
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_offset += page
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_offset = self.scroll_offset.saturating_sub(page)
            }
            KeyCode::Home | KeyCode::Char('g') => self.scroll_offset = 0,
            // clamped by the next render
            KeyCode::End | KeyCode::Char('G') => self.scroll_offset = usize::MAX,
            _ => {}
        }
    }

    fn switch_tab(&mut self) {
        let next = self.controller.tab().toggle();
        self.controller.select_tab(next);
    }

    pub fn back(&mut self) {
        self.controller.back();
        self.scroll_offset = 0;
        self.selected_artifact = 0;
        self.notice = None;
    }

    fn select_artifact(&mut self, delta: isize) {
        let ResultMode::Dedupe(result) = self.controller.mode() else {
            return;
        };
        let count = result.files.artifacts().len();
        if count == 0 {
            return;
        }
        let next = self.selected_artifact as isize + delta;
        self.selected_artifact = next.clamp(0, count as isize - 1) as usize;
    }

    /// Validate the active form and send it in the background
    pub fn submit(&mut self) {
        let tab = self.controller.tab();
        let panel = self.panel_mut(tab);
        if panel.guard.is_in_flight() {
            debug!(?tab, "submit ignored, request in flight");
            return;
        }
        let job = match tab {
            Tab::Dedupe => panel.dedupe_form().validate().map(Job::Dedupe),
            Tab::Compare => panel.compare_form().validate().map(Job::Compare),
        };
        let job = match job {
            Ok(job) => job,
            Err(err) => {
                panel.status = FormStatus::Error(err.to_string());
                return;
            }
        };
        if let Err(err) = panel.guard.begin() {
            panel.status = FormStatus::Error(err.to_string());
            return;
        }
        panel.status = FormStatus::Submitting;

        let ticket = self.controller.issue();
        let client = self.client.clone();
        let engine = self.controller.engine().clone();
        let events = self.events.clone();
        let top_k = self.top_k;

        tokio::spawn(async move {
            let fetched = match job {
                Job::Dedupe(request) => client.process(&request).await.map(ComparisonResult::from),
                Job::Compare(request) => client.submit_compare(&request, top_k).await,
            };
            let outcome = match fetched {
                Ok(result) => prepare_off_thread(result, engine).await,
                Err(err) => Err(err.to_string()),
            };
            if events.send(AppEvent::Response { ticket, outcome }).is_err() {
                debug!("draw loop gone, dropping response");
            }
        });
    }

    fn download_selected(&mut self) {
        let ResultMode::Dedupe(result) = self.controller.mode() else {
            return;
        };
        let Some((label, path)) = result.files.artifacts().get(self.selected_artifact).copied()
        else {
            return;
        };
        self.notice = Some(format!("Downloading {label}..."));
        let server_path = path.to_string();
        let client = self.client.clone();
        let dir = self.download_dir.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let saved = client
                .download_to(&server_path, &dir)
                .await
                .map_err(|e| e.to_string());
            let _ = events.send(AppEvent::Downloaded(saved));
        });
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Response { ticket, outcome } => {
                let tab = ticket.tab();
                self.panel_mut(tab).guard.finish();
                match self.controller.accept_prepared(ticket, outcome) {
                    Applied::Entered(_) => {
                        self.panel_mut(tab).status = FormStatus::Idle;
                        self.scroll_offset = 0;
                        self.selected_artifact = 0;
                        self.notice = None;
                    }
                    Applied::Failed(message) => {
                        warn!(?tab, %message, "submission failed");
                        self.panel_mut(tab).status = FormStatus::Error(message);
                    }
                    Applied::Stale => {
                        let panel = self.panel_mut(tab);
                        if panel.status == FormStatus::Submitting {
                            panel.status = FormStatus::Idle;
                        }
                    }
                }
            }
            AppEvent::Downloaded(saved) => {
                if !matches!(self.controller.mode(), ResultMode::Dedupe(_)) {
                    return;
                }
                self.notice = Some(match saved {
                    Ok(path) => format!("Saved {}", path.display()),
                    Err(err) => format!("Download failed: {err}"),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use undupe_core::{ModeKind, SinglePairResult};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = ApiClient::new(
            "http://127.0.0.1:9",
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap();
        (App::new(&Config::default(), client, tx), rx)
    }

    fn pair(query: &str, target: &str) -> PreparedResult {
        let result = ComparisonResult::SinglePair(SinglePairResult {
            query_text: query.to_string(),
            target_text: target.to_string(),
            cosine_similarity: 0.5,
            levenshtein_ratio: 50.0,
            is_duplicate: false,
            query_filename: "q".to_string(),
            target_filename: "t".to_string(),
            timestamp: None,
        });
        PreparedResult::prepare(result, &AlignmentEngine::new())
    }

    #[test]
    fn test_submit_without_files_shows_inline_error() {
        let (mut app, mut rx) = app();
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            app.compare.status,
            FormStatus::Error("Please select both files to compare.".to_string())
        );
        assert!(!app.compare.guard.is_in_flight());
        assert!(app.controller.mode().is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_editing_clears_error() {
        let (mut app, _rx) = app();
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.compare.focused(), Field::Query);
        app.handle_key(key(KeyCode::Char('a')));
        assert_eq!(app.compare.status, FormStatus::Idle);
        assert_eq!(app.compare.value(Field::Query), "a");
    }

    #[test]
    fn test_option_fields_adjust() {
        let (mut app, _rx) = app();
        assert_eq!(app.compare.focused(), Field::Kind);
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.compare.kind, CompareKind::FileVsFolder);
        for _ in 0..4 {
            app.handle_key(key(KeyCode::Tab));
        }
        assert_eq!(app.compare.focused(), Field::Cosine);
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.compare.settings.thresholds.cosine, 0.89);
    }

    #[test]
    fn test_tab_switch_keeps_forms() {
        let (mut app, _rx) = app();
        app.compare.set_value(Field::Query, "a.txt");
        app.handle_key(key(KeyCode::F(2)));
        assert_eq!(app.controller.tab(), Tab::Dedupe);
        app.handle_key(key(KeyCode::F(2)));
        assert_eq!(app.compare.value(Field::Query), "a.txt");
    }

    #[test]
    fn test_dedupe_form_uses_model_input() {
        let (mut app, _rx) = app();
        app.dedupe.set_value(Field::Model, "BAAI/bge-small-en-v1.5");
        app.dedupe.set_value(Field::File, "data.csv");
        let form = app.dedupe.dedupe_form();
        assert_eq!(form.settings.model, "BAAI/bge-small-en-v1.5");
        assert_eq!(form.file, "data.csv");
    }

    #[test]
    fn test_response_enters_result_and_back_returns() {
        let (mut app, _rx) = app();
        let ticket = app.controller.issue();
        app.compare.guard.begin().unwrap();
        app.compare.status = FormStatus::Submitting;
        app.handle_event(AppEvent::Response {
            ticket,
            outcome: Ok(pair("the quick fox", "the slow fox")),
        });
        assert_eq!(app.controller.mode().kind(), ModeKind::SinglePair);
        assert!(!app.compare.guard.is_in_flight());
        assert_eq!(app.compare.status, FormStatus::Idle);

        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.scroll_offset, 1);
        app.handle_key(key(KeyCode::Esc));
        assert!(app.controller.mode().is_none());
        assert_eq!(app.scroll_offset, 0);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_failed_response_annotates_form() {
        let (mut app, _rx) = app();
        let ticket = app.controller.issue();
        app.compare.guard.begin().unwrap();
        app.handle_event(AppEvent::Response {
            ticket,
            outcome: Err("API error (500): boom".to_string()),
        });
        assert!(app.controller.mode().is_none());
        assert_eq!(app.compare.status.error(), Some("API error (500): boom"));
        assert!(!app.compare.guard.is_in_flight());
    }

    #[test]
    fn test_late_response_after_tab_switch_is_dropped() {
        let (mut app, _rx) = app();
        let ticket = app.controller.issue();
        app.compare.guard.begin().unwrap();
        app.compare.status = FormStatus::Submitting;
        app.handle_key(key(KeyCode::F(2)));
        app.handle_event(AppEvent::Response {
            ticket,
            outcome: Ok(pair("a", "b")),
        });
        assert!(app.controller.mode().is_none());
        assert_eq!(app.compare.status, FormStatus::Idle);
        assert!(!app.compare.guard.is_in_flight());
    }

    #[tokio::test]
    async fn test_prepare_off_thread_aligns_pair() {
        let result = ComparisonResult::SinglePair(SinglePairResult {
            query_text: "a b".to_string(),
            target_text: "a c".to_string(),
            cosine_similarity: 0.5,
            levenshtein_ratio: 66.0,
            is_duplicate: false,
            query_filename: String::new(),
            target_filename: String::new(),
            timestamp: None,
        });
        let prepared = prepare_off_thread(result, AlignmentEngine::new()).await.unwrap();
        let PreparedResult::SinglePair(view) = prepared else {
            panic!("expected a single-pair result");
        };
        assert_eq!(view.panes.source.text(), "a b");
        assert_eq!(view.panes.target.text(), "a c");
    }

    #[test]
    fn test_failure_after_tab_switch_reaches_its_form() {
        let (mut app, _rx) = app();
        let ticket = app.controller.issue();
        app.compare.guard.begin().unwrap();
        app.compare.status = FormStatus::Submitting;
        app.handle_key(key(KeyCode::F(2)));
        app.handle_event(AppEvent::Response {
            ticket,
            outcome: Err("HTTP request failed: connection refused".to_string()),
        });
        assert_eq!(
            app.compare.status.error(),
            Some("HTTP request failed: connection refused")
        );
        assert_eq!(app.dedupe.status, FormStatus::Idle);
        assert!(!app.compare.guard.is_in_flight());
    }

    #[test]
    fn test_compare_result_survives_dedupe_submission() {
        let (mut app, _rx) = app();
        let compare = app.controller.issue();
        app.handle_key(key(KeyCode::F(2)));
        let dedupe_ticket = app.controller.issue();
        app.handle_key(key(KeyCode::F(2)));
        assert_eq!(app.controller.tab(), Tab::Compare);

        app.handle_event(AppEvent::Response {
            ticket: compare,
            outcome: Ok(pair("a b", "a c")),
        });
        assert_eq!(app.controller.mode().kind(), ModeKind::SinglePair);

        app.handle_event(AppEvent::Response {
            ticket: dedupe_ticket,
            outcome: Err("API error (500): boom".to_string()),
        });
        assert_eq!(app.controller.mode().kind(), ModeKind::SinglePair);
        assert_eq!(app.dedupe.status.error(), Some("API error (500): boom"));
    }

    #[test]
    fn test_download_notice_ignored_outside_dedupe() {
        let (mut app, _rx) = app();
        app.handle_event(AppEvent::Downloaded(Ok(PathBuf::from("/tmp/x.csv"))));
        assert!(app.notice.is_none());
    }
}
