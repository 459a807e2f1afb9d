//! Dataset deduplication summary

use super::{accent_style, dim_style};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use undupe_core::DedupeResult;

fn artifact_description(label: &str) -> (&'static str, &'static str) {
    match label {
        "cleaned" => ("Cleaned Dataset", "Final deduplicated file"),
        "near_dups" => ("Near Duplicates", "Removed fuzzy matches"),
        "exact_dups" => ("Exact Duplicates", "Removed exact matches"),
        "report" => ("Full Report", "JSON analysis report"),
        "ingested" => ("Ingested Records", "Rows as read from the upload"),
        "normalized" => ("Normalized Text", "Text after preprocessing"),
        _ => ("Artifact", ""),
    }
}

fn stat_card(
    frame: &mut Frame,
    title: &str,
    value: String,
    note: Option<String>,
    color: Color,
    area: Rect,
) {
    let mut lines = vec![
        Line::from(Span::styled(title.to_string(), dim_style())).centered(),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .centered(),
    ];
    if let Some(note) = note {
        lines.push(Line::from(Span::styled(note, dim_style())).centered());
    }
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(dim_style()),
        ),
        area,
    );
}

/// Render totals, reduction and the downloadable artifacts
pub fn render_dedupe(
    frame: &mut Frame,
    result: &DedupeResult,
    selected: usize,
    notice: Option<&str>,
    area: Rect,
) {
    let [cards, artifacts, footer] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [total, removed, reduction] = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .areas(cards);

    stat_card(
        frame,
        "Total Records",
        result.total_records.to_string(),
        Some(format!("{} kept", result.records_kept())),
        Color::White,
        total,
    );
    stat_card(
        frame,
        "Duplicates Removed",
        result.duplicates_removed().to_string(),
        Some(format!(
            "({} exact, {} near)",
            result.exact_duplicates_removed, result.near_duplicates_removed
        )),
        Color::Red,
        removed,
    );
    stat_card(
        frame,
        "Reduction",
        format!("{:.1}%", result.reduction_percent()),
        None,
        Color::Green,
        reduction,
    );

    let lines: Vec<Line> = result
        .files
        .artifacts()
        .into_iter()
        .enumerate()
        .map(|(idx, (label, path))| {
            let (name, description) = artifact_description(label);
            let is_selected = idx == selected;
            let marker = if is_selected { "▶ " } else { "  " };
            let name_style = if is_selected {
                accent_style()
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(marker, accent_style()),
                Span::styled(format!("{name:<20}"), name_style),
                Span::styled(format!("{description:<30}"), dim_style()),
                Span::styled(path.to_string(), dim_style()),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Download Results "),
        ),
        artifacts,
    );

    if let Some(notice) = notice {
        frame.render_widget(
            Paragraph::new(Span::styled(
                notice.to_string(),
                Style::default().fg(Color::Yellow),
            )),
            footer,
        );
    }
}
