//! File-vs-folder match table

use super::{accent_style, dim_style};
use crate::text::truncate_to_width;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use undupe_core::{format_ratio, DirectoryResult};

const NAME_MIN_WIDTH: u16 = 20;

fn render_summary(frame: &mut Frame, result: &DirectoryResult, area: Rect) {
    let query = result.query_filename.as_deref().unwrap_or("query file");
    let folder = result.target_zip.as_deref().unwrap_or("folder");
    let lines = vec![
        Line::from(Span::styled(format!("{query} vs {folder}"), accent_style())),
        Line::from(vec![
            Span::styled(format!("{} candidates", result.matches.len()), dim_style()),
            Span::raw("  "),
            Span::styled(
                format!("{} duplicates", result.duplicate_count()),
                Style::default().fg(Color::Red),
            ),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .title(" Folder Comparison "),
        ),
        area,
    );
}

/// Render the ranked candidate list, one row per file in the archive
pub fn render_directory(
    frame: &mut Frame,
    result: &DirectoryResult,
    scroll: &mut usize,
    area: Rect,
) {
    let [summary, body] = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
    render_summary(frame, result, summary);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(dim_style());

    if result.matches.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("No files found in the archive.", dim_style()))
                .block(block),
            body,
        );
        return;
    }

    // border plus header row
    let visible = body.height.saturating_sub(3) as usize;
    *scroll = (*scroll).min(result.matches.len().saturating_sub(visible));

    let name_width = body.width.saturating_sub(2 + 10 + 13 + 12 + 3).max(NAME_MIN_WIDTH) as usize;
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let rows = result.matches.iter().skip(*scroll).map(|m| {
        let verdict = if m.is_duplicate {
            Cell::from(Span::styled(
                "Yes",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))
        } else {
            Cell::from(Span::styled("No", Style::default().fg(Color::Green)))
        };
        Row::new(vec![
            Cell::from(truncate_to_width(&m.filename, name_width)),
            Cell::from(format!("{:.4}", m.cosine_similarity)),
            Cell::from(format_ratio(m.levenshtein_ratio)),
            verdict,
        ])
    });

    let header = Row::new(vec!["File", "Cosine", "Levenshtein", "Duplicate?"]).style(bold);
    let table = Table::new(
        rows,
        [
            Constraint::Min(NAME_MIN_WIDTH),
            Constraint::Length(10),
            Constraint::Length(13),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use undupe_core::DirectoryMatch;

    fn sample(n: usize) -> DirectoryResult {
        DirectoryResult {
            matches: (0..n)
                .map(|i| DirectoryMatch {
                    filename: format!("doc{i}.txt"),
                    cosine_similarity: 0.9,
                    levenshtein_ratio: 88.0,
                    is_duplicate: i == 0,
                })
                .collect(),
            query_filename: Some("query.txt".to_string()),
            target_zip: Some("docs.zip".to_string()),
            timestamp: None,
        }
    }

    fn draw(result: &DirectoryResult, scroll: &mut usize) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal
            .draw(|f| render_directory(f, result, scroll, f.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_rows_and_verdicts() {
        let mut scroll = 0;
        let text = draw(&sample(2), &mut scroll);
        assert!(text.contains("query.txt vs docs.zip"));
        assert!(text.contains("doc0.txt"));
        assert!(text.contains("0.9000"));
        assert!(text.contains("88"));
        assert!(text.contains("Yes"));
        assert!(text.contains("No"));
    }

    #[test]
    fn test_empty_archive_message() {
        let mut scroll = 0;
        let text = draw(&sample(0), &mut scroll);
        assert!(text.contains("No files found"));
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut scroll = usize::MAX;
        let text = draw(&sample(20), &mut scroll);
        // 12 rows: 3 summary, 2 border, 1 header leaves 6 visible
        assert_eq!(scroll, 14);
        assert!(text.contains("doc19.txt"));
        assert!(!text.contains("doc0.txt"));
    }
}
