//! Plain-terminal output for CLI subcommands

use crossterm::style::{style, Stylize};
use std::io::{self, Write};
use undupe_core::{
    format_ratio, AlignmentStats, DedupeResult, DirectoryResult, Pane, Panes, SinglePairView,
};

fn write_pane<W: Write>(out: &mut W, pane: &Pane, removed: bool, color: bool) -> io::Result<()> {
    for span in &pane.spans {
        if !span.highlighted {
            write!(out, "{}", span.text)?;
            continue;
        }
        match (color, removed) {
            (true, true) => write!(out, "{}", style(&span.text).white().on_red())?,
            (true, false) => write!(out, "{}", style(&span.text).black().on_green())?,
            (false, true) => write!(out, "[-{}-]", span.text)?,
            (false, false) => write!(out, "{{+{}+}}", span.text)?,
        }
    }
    if !pane.text().ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

/// Write the source pane then the target pane, each under its own heading
pub fn write_panes<W: Write>(
    out: &mut W,
    panes: &Panes,
    source_title: &str,
    target_title: &str,
    color: bool,
) -> io::Result<()> {
    let heading = |title: &str| {
        if color {
            format!("{}", style(title).bold())
        } else {
            title.to_string()
        }
    };
    writeln!(out, "{}", heading(&format!("--- {source_title}")))?;
    write_pane(out, &panes.source, true, color)?;
    writeln!(out, "{}", heading(&format!("+++ {target_title}")))?;
    write_pane(out, &panes.target, false, color)?;
    Ok(())
}

pub fn write_stats<W: Write>(out: &mut W, stats: &AlignmentStats) -> io::Result<()> {
    if stats.is_identical() {
        return writeln!(out, "texts are identical");
    }
    writeln!(
        out,
        "{} removed ({} bytes), {} added ({} bytes), {} bytes unchanged",
        stats.removals,
        stats.removed_bytes,
        stats.additions,
        stats.added_bytes,
        stats.unchanged_bytes
    )
}

pub fn write_single_pair<W: Write>(
    out: &mut W,
    view: &SinglePairView,
    color: bool,
) -> io::Result<()> {
    let result = &view.result;
    writeln!(out, "{} vs {}", result.query_filename, result.target_filename)?;
    writeln!(out, "cosine similarity  {:.4}", result.cosine_similarity)?;
    writeln!(out, "levenshtein ratio  {}", format_ratio(result.levenshtein_ratio))?;
    let verdict = if result.is_duplicate {
        "duplicate"
    } else {
        "unique"
    };
    writeln!(out, "verdict            {verdict}")?;
    write_stats(out, &view.stats)?;
    writeln!(out)?;
    write_panes(
        out,
        &view.panes,
        &result.query_filename,
        &result.target_filename,
        color,
    )
}

pub fn write_directory<W: Write>(out: &mut W, result: &DirectoryResult) -> io::Result<()> {
    if let (Some(query), Some(zip)) = (&result.query_filename, &result.target_zip) {
        writeln!(out, "{query} vs {zip}")?;
    }
    if result.matches.is_empty() {
        return writeln!(out, "no files found in the archive");
    }
    let width = result
        .matches
        .iter()
        .map(|m| m.filename.len())
        .max()
        .unwrap_or(0)
        .max(4);
    writeln!(
        out,
        "{:<width$}  {:>8}  {:>11}  DUPLICATE",
        "FILE", "COSINE", "LEVENSHTEIN"
    )?;
    for m in &result.matches {
        writeln!(
            out,
            "{:<width$}  {:>8.4}  {:>11}  {}",
            m.filename,
            m.cosine_similarity,
            format_ratio(m.levenshtein_ratio),
            if m.is_duplicate { "yes" } else { "no" }
        )?;
    }
    writeln!(
        out,
        "{} of {} files are duplicates",
        result.duplicate_count(),
        result.matches.len()
    )
}

pub fn write_dedupe<W: Write>(out: &mut W, result: &DedupeResult) -> io::Result<()> {
    if let Some(name) = &result.input_filename {
        writeln!(out, "{name}")?;
    }
    writeln!(out, "total records       {}", result.total_records)?;
    writeln!(
        out,
        "duplicates removed  {} ({} exact, {} near)",
        result.duplicates_removed(),
        result.exact_duplicates_removed,
        result.near_duplicates_removed
    )?;
    writeln!(out, "records kept        {}", result.records_kept())?;
    writeln!(out, "reduction           {:.1}%", result.reduction_percent())?;
    writeln!(out, "artifacts:")?;
    for (label, path) in result.files.artifacts() {
        writeln!(out, "  {label:<12} {path}")?;
    }
    Ok(())
}
