//! Side-by-side view of a single-pair comparison

use super::{accent_style, added_style, context_style, dim_style, removed_style};
use crate::text::sanitize;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use undupe_core::{format_ratio, Pane, SinglePairView};

/// Shown after a highlighted line break so removed/added newlines stay visible
const NEWLINE_MARKER: &str = "↵";

/// Split a pane's spans into display lines, styling highlighted spans
pub(crate) fn pane_lines(pane: &Pane, highlight: Style) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = vec![Line::default()];

    for span in &pane.spans {
        let style = if span.highlighted {
            highlight
        } else {
            context_style()
        };
        let text = sanitize(&span.text);
        for (idx, part) in text.split('\n').enumerate() {
            if idx > 0 {
                if span.highlighted {
                    if let Some(line) = lines.last_mut() {
                        line.spans.push(Span::styled(NEWLINE_MARKER, highlight));
                    }
                }
                lines.push(Line::default());
            }
            if part.is_empty() {
                continue;
            }
            if let Some(line) = lines.last_mut() {
                line.spans.push(Span::styled(part.to_string(), style));
            }
        }
    }

    lines
}

fn render_header(frame: &mut Frame, view: &SinglePairView, area: Rect) {
    let result = &view.result;
    let (verdict, verdict_color) = if result.is_duplicate {
        ("Duplicate", Color::Red)
    } else {
        ("Unique", Color::Green)
    };
    let bold = |color: Color| Style::default().fg(color).add_modifier(Modifier::BOLD);

    let title = Line::from(Span::styled(
        format!("{} vs {}", result.query_filename, result.target_filename),
        accent_style(),
    ));
    let scores = Line::from(vec![
        Span::styled("Cosine ", dim_style()),
        Span::styled(format!("{:.4}", result.cosine_similarity), bold(Color::Blue)),
        Span::styled("   Levenshtein ", dim_style()),
        Span::styled(format_ratio(result.levenshtein_ratio), bold(Color::Magenta)),
    ]);
    let verdict = Line::from(vec![
        Span::styled("Verdict ", dim_style()),
        Span::styled(verdict, bold(verdict_color)),
    ]);
    let stats = &view.stats;
    let changes = if stats.is_identical() {
        Line::from(Span::styled("Texts are identical", dim_style()))
    } else {
        Line::from(vec![
            Span::styled(format!("-{} removed", stats.removals), removed_style()),
            Span::raw(" "),
            Span::styled(format!("+{} added", stats.additions), added_style()),
            Span::styled(
                format!(
                    "  ({} of {} bytes unchanged)",
                    stats.unchanged_bytes,
                    stats.unchanged_bytes + stats.removed_bytes
                ),
                dim_style(),
            ),
        ])
    };

    frame.render_widget(
        Paragraph::new(vec![title, scores, verdict, changes])
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .title(" Comparison Analysis "),
            )
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn pane_paragraph(title: &str, lines: Vec<Line<'static>>) -> Paragraph<'static> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(dim_style())
        .title(format!(" {title} "));
    let lines = if lines.iter().all(|l| l.spans.is_empty()) {
        vec![Line::from(Span::styled("(no text)", dim_style()))]
    } else {
        lines
    };
    Paragraph::new(lines).block(block).wrap(Wrap { trim: false })
}

/// Largest scroll offset that still fills the viewport, measured on wrapped rows
/// of the taller pane
fn max_scroll(panes: [(&Paragraph, Rect); 2]) -> usize {
    panes
        .iter()
        .map(|(paragraph, area)| {
            // line_count adds the block's top and bottom rows but wraps at the
            // width it is given, so pass the width inside the side borders
            paragraph
                .line_count(area.width.saturating_sub(2))
                .saturating_sub(area.height as usize)
        })
        .max()
        .unwrap_or(0)
}

/// Render the single-pair comparison: score header plus synchronized panes
pub fn render_single_pair(
    frame: &mut Frame,
    view: &SinglePairView,
    scroll: &mut usize,
    area: Rect,
) {
    let [header, body] = Layout::vertical([Constraint::Length(5), Constraint::Min(0)]).areas(area);
    render_header(frame, view, header);

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(body);

    let source = pane_lines(&view.panes.source, removed_style());
    let target = pane_lines(&view.panes.target, added_style());

    let query_title = match view.result.query_filename.as_str() {
        "" => "Query File",
        name => name,
    };
    let target_title = match view.result.target_filename.as_str() {
        "" => "Target File",
        name => name,
    };
    let source = pane_paragraph(query_title, source);
    let target = pane_paragraph(target_title, target);
    *scroll = (*scroll).min(max_scroll([(&source, left), (&target, right)]));

    let offset = (*scroll).min(u16::MAX as usize) as u16;
    frame.render_widget(source.scroll((offset, 0)), left);
    frame.render_widget(target.scroll((offset, 0)), right);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use undupe_core::{align, project, AlignmentEngine, SinglePairResult};

    fn line_texts(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_pane_lines_single_line() {
        let panes = project(&align("the quick fox", "the slow fox"));
        let lines = pane_lines(&panes.source, removed_style());
        assert_eq!(line_texts(&lines), vec!["the quick fox"]);
        let styles: Vec<Style> = lines[0].spans.iter().map(|s| s.style).collect();
        assert_eq!(styles, vec![context_style(), removed_style(), context_style()]);
    }

    #[test]
    fn test_pane_lines_split_on_newlines() {
        let panes = project(&align("one\ntwo\n\nthree", "one\ntwo\n\nthree"));
        let lines = pane_lines(&panes.target, added_style());
        assert_eq!(line_texts(&lines), vec!["one", "two", "", "three"]);
    }

    #[test]
    fn test_highlighted_newline_is_marked() {
        let panes = project(&align("a b", "a\nb"));
        let lines = pane_lines(&panes.target, added_style());
        assert_eq!(line_texts(&lines), vec!["a↵", "b"]);
    }

    #[test]
    fn test_pane_lines_expand_tabs() {
        let panes = project(&align("a\tb", "a\tb"));
        let lines = pane_lines(&panes.source, removed_style());
        assert_eq!(line_texts(&lines), vec!["a    b"]);
    }

    fn single_pair(query: &str, target: &str) -> SinglePairView {
        let result = SinglePairResult {
            query_text: query.to_string(),
            target_text: target.to_string(),
            cosine_similarity: 0.93,
            levenshtein_ratio: 88.0,
            is_duplicate: false,
            query_filename: "a.pdf".to_string(),
            target_filename: "b.pdf".to_string(),
            timestamp: None,
        };
        SinglePairView::build(result, &AlignmentEngine::new())
    }

    fn draw(view: &SinglePairView, scroll: &mut usize, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| render_single_pair(f, view, scroll, f.area()))
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
    fn test_wrapped_paragraph_scrolls_to_end() {
        let words: Vec<String> = (0..60).map(|i| format!("w{i:02}")).collect();
        let text = format!("{} END", words.join(" "));
        let view = single_pair(&text, &text);

        let mut scroll = usize::MAX;
        let screen = draw(&view, &mut scroll, 40, 14);
        assert!(scroll > 0);
        assert!(screen.contains("END"));
        assert!(!screen.contains("w00"));

        let mut top = 0;
        let screen = draw(&view, &mut top, 40, 14);
        assert_eq!(top, 0);
        assert!(screen.contains("w00"));
        assert!(!screen.contains("END"));
    }

    #[test]
    fn test_short_text_does_not_scroll() {
        let view = single_pair("one line", "one line");
        let mut scroll = usize::MAX;
        draw(&view, &mut scroll, 80, 20);
        assert_eq!(scroll, 0);
    }

    #[test]
    fn test_header_keeps_verdict_on_narrow_screen() {
        let view = single_pair("a b", "a c");
        let mut scroll = 0;
        let screen = draw(&view, &mut scroll, 34, 16);
        assert!(screen.contains("Verdict Unique"));
        assert!(screen.contains("0.9300"));
    }
}
