//! Submission form view

use super::{accent_style, dim_style};
use crate::app::{Field, FormPanel};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use undupe_core::{CompareKind, FormStatus, Tab};

fn field_label(panel: &FormPanel, field: Field) -> &'static str {
    match field {
        Field::Kind => "Mode",
        Field::Query => "First file",
        Field::Target => match panel.kind {
            CompareKind::FileVsFile => "Second file",
            CompareKind::FileVsFolder => "Folder archive (.zip)",
        },
        Field::File => "Dataset file",
        Field::TextColumn => "Text column (optional)",
        Field::Model => "Embedding model",
        Field::Stopwords => "Remove stopwords",
        Field::Cosine => "Cosine threshold",
        Field::Fuzzy => "Fuzzy threshold",
    }
}

fn option_value(panel: &FormPanel, field: Field) -> String {
    let settings = &panel.settings;
    match field {
        Field::Kind => panel.kind.label().to_string(),
        Field::Stopwords => {
            let mark = if settings.remove_stopwords { "[x]" } else { "[ ]" };
            mark.to_string()
        }
        Field::Cosine => format!("{:.2}", settings.thresholds.cosine),
        Field::Fuzzy => settings.thresholds.fuzzy.to_string(),
        _ => String::new(),
    }
}

fn render_text_field(
    frame: &mut Frame,
    panel: &FormPanel,
    field: Field,
    focused: bool,
    area: Rect,
) {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        dim_style()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {} ", field_label(panel, field)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(input) = panel.input(field) else {
        return;
    };
    if focused {
        frame.render_widget(input, inner);
        return;
    }
    let value = panel.value(field);
    let line = if value.is_empty() {
        Span::styled(input.placeholder_text().to_string(), dim_style())
    } else {
        Span::raw(value)
    };
    frame.render_widget(Paragraph::new(Line::from(line)), inner);
}

fn render_option_field(
    frame: &mut Frame,
    panel: &FormPanel,
    field: Field,
    focused: bool,
    area: Rect,
) {
    let marker = if focused { "▶ " } else { "  " };
    let value_style = if focused {
        accent_style()
    } else {
        Style::default()
    };
    let line = Line::from(vec![
        Span::styled(marker, accent_style()),
        Span::styled(format!("{:<24}", field_label(panel, field)), dim_style()),
        Span::styled(if focused { "◀ " } else { "  " }, dim_style()),
        Span::styled(option_value(panel, field), value_style),
        Span::styled(if focused { " ▶" } else { "" }, dim_style()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn status_line(panel: &FormPanel) -> Line<'static> {
    match &panel.status {
        FormStatus::Idle => Line::from(Span::styled("Press Enter to submit", dim_style())),
        FormStatus::Submitting => Line::from(Span::styled(
            "Submitting... waiting for the service",
            Style::default().fg(Color::Yellow),
        )),
        FormStatus::Error(message) => Line::from(Span::styled(
            format!("✗ {message}"),
            Style::default().fg(Color::Red),
        )),
    }
}

/// Render the active submission form
pub fn render_form(frame: &mut Frame, panel: &FormPanel, area: Rect) {
    let title = match panel.tab {
        Tab::Compare => " Compare Files ",
        Tab::Dedupe => " Upload Dataset ",
    };
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(dim_style())
        .title(Span::styled(title, accent_style()));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let fields = panel.fields();
    let mut constraints: Vec<Constraint> = fields
        .iter()
        .map(|f| Constraint::Length(if f.is_text() { 3 } else { 1 }))
        .collect();
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));
    let rows = Layout::vertical(constraints).split(inner);

    let focused = panel.focused();
    for (idx, &field) in fields.iter().enumerate() {
        let is_focused = field == focused;
        if field.is_text() {
            render_text_field(frame, panel, field, is_focused, rows[idx]);
        } else {
            render_option_field(frame, panel, field, is_focused, rows[idx]);
        }
    }
    frame.render_widget(Paragraph::new(status_line(panel)), rows[fields.len() + 1]);
}
