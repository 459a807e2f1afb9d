//! View rendering modules

mod dedupe;
mod directory;
mod forms;
mod side_by_side;

use crate::app::App;
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use undupe_core::{FormStatus, ResultMode, Tab};

pub(crate) fn removed_style() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(120, 30, 30))
}

pub(crate) fn added_style() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(25, 100, 45))
}

pub(crate) fn context_style() -> Style {
    Style::default().fg(Color::Gray)
}

pub(crate) fn dim_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub(crate) fn accent_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

/// Render the whole screen
pub fn render(frame: &mut Frame, app: &mut App) {
    let [top, body, bottom] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_top_bar(frame, app, top);
    app.viewport_height = body.height as usize;

    match app.controller.mode() {
        ResultMode::None => forms::render_form(frame, app.active_panel(), body),
        ResultMode::SinglePair(view) => {
            side_by_side::render_single_pair(frame, view, &mut app.scroll_offset, body)
        }
        ResultMode::Dedupe(result) => dedupe::render_dedupe(
            frame,
            result,
            app.selected_artifact,
            app.notice.as_deref(),
            body,
        ),
        ResultMode::Directory(result) => {
            directory::render_directory(frame, result, &mut app.scroll_offset, body)
        }
    }

    render_help_bar(frame, app, bottom);
    if app.show_help {
        render_help_popup(frame, app, frame.area());
    }
}

fn render_top_bar(frame: &mut Frame, app: &App, area: Rect) {
    let active = app.controller.tab();
    let mut spans = vec![Span::styled(" undupe ", accent_style()), Span::raw(" ")];
    for tab in [Tab::Compare, Tab::Dedupe] {
        let style = if tab == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            dim_style()
        };
        spans.push(Span::styled(format!(" {} ", tab.label()), style));
        if app.panel(tab).status == FormStatus::Submitting {
            spans.push(Span::styled("●", Style::default().fg(Color::Yellow)));
        }
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(format!("│ {}", app.api_url()), dim_style()));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn help_hints(app: &App) -> &'static str {
    match app.controller.mode() {
        ResultMode::None => {
            " Tab/↑↓ field  ←→ adjust  Enter submit  F2 switch tab  F1 help  Esc quit"
        }
        ResultMode::Dedupe(_) => " ↑↓ select  Enter download  Esc back  q quit",
        ResultMode::SinglePair(_) | ResultMode::Directory(_) => {
            " ↑↓ scroll  PgUp/PgDn page  g/G top/bottom  Esc back  q quit"
        }
    }
}

fn render_help_bar(frame: &mut Frame, app: &App, area: Rect) {
    let back = match app.controller.mode() {
        ResultMode::None => String::new(),
        _ => format!("← Back to {} ", app.controller.tab().label()),
    };
    let line = Line::from(vec![
        Span::styled(back, accent_style()),
        Span::styled(help_hints(app), dim_style()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    rect
}

fn render_help_popup(frame: &mut Frame, app: &App, area: Rect) {
    let rows: &[(&str, &str)] = if app.controller.mode().is_none() {
        &[
            ("Tab / ↓", "next field"),
            ("Shift-Tab / ↑", "previous field"),
            ("← → Space", "toggle or nudge the focused option"),
            ("Enter", "submit the form"),
            ("F2 / Ctrl-T", "switch between Comparison and Deduplication"),
            ("Esc / Ctrl-C", "quit"),
        ]
    } else {
        &[
            ("j / ↓, k / ↑", "scroll (select artifact in summaries)"),
            ("PgDn / PgUp", "page"),
            ("g / G", "top / bottom"),
            ("Enter / d", "download selected artifact"),
            ("Esc / b", "back to the form"),
            ("q", "quit"),
        ]
    };
    let lines: Vec<Line> = rows
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{keys:>16}  "), accent_style()),
                Span::raw(*what),
            ])
        })
        .collect();
    let popup = centered(area, 64.min(area.width), (rows.len() as u16 + 2).min(area.height));
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Keys ")),
        popup,
    );
}
