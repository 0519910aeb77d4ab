//! Line-level helpers over `proc-macro2` spans.
//!
//! With `span-locations` enabled, every parsed file appends to a per-thread
//! position table. The scanner slices source text out of each file while its
//! spans are still live, then calls [`reset_span_locations`] before moving
//! on, so the table never grows past one file.

use proc_macro2::{LineColumn, TokenStream, TokenTree};

/// Drop the current thread's span table.
///
/// Spans from earlier parses stop resolving afterwards, so line numbers
/// must be read before calling this.
#[inline]
pub fn reset_span_locations() {
    proc_macro2::extra::invalidate_current_thread_spans();
}

/// Start and end positions of a token stream.
///
/// Groups are measured by their delimiters so a body spanning many lines
/// ends at its closing brace.
pub fn span_bounds(tokens: TokenStream) -> Option<(LineColumn, LineColumn)> {
    let mut iter = tokens.into_iter();
    let first = iter.next()?;
    let last = iter.last().unwrap_or_else(|| first.clone());
    let start = match &first {
        TokenTree::Group(group) => group.span_open().start(),
        other => other.span().start(),
    };
    let end = match &last {
        TokenTree::Group(group) => group.span_close().end(),
        other => other.span().end(),
    };
    (start.line > 0 && end.line >= start.line).then_some((start, end))
}

/// First and last line (1-based, inclusive) covered by a token stream
pub fn line_span(tokens: TokenStream) -> Option<(usize, usize)> {
    span_bounds(tokens).map(|(start, end)| (start.line, end.line))
}

/// Source text from `start` to `end`, newline-terminated.
///
/// Leading indentation of the first line is kept; code sharing the first or
/// last line with the item is cut off. Columns count chars, as
/// `proc_macro2` reports them.
pub fn source_text(content: &str, start: LineColumn, end: LineColumn) -> Option<String> {
    let block = source_lines(content, start.line, end.line)?;
    let mut lines: Vec<&str> = block.lines().collect();
    let last = lines.len().checked_sub(1)?;
    lines[last] = char_prefix(lines[last], end.column);

    let first = lines[0];
    let lead = char_prefix(first, start.column);
    if !lead.trim().is_empty() {
        lines[0] = &first[lead.len()..];
    }

    let mut text = lines.join("\n");
    text.push('\n');
    Some(text)
}

fn char_prefix(line: &str, chars: usize) -> &str {
    line.char_indices()
        .nth(chars)
        .map_or(line, |(offset, _)| &line[..offset])
}

/// Whole source lines `start..=end` (1-based), newline-terminated.
pub fn source_lines(content: &str, start: usize, end: usize) -> Option<String> {
    if end < start {
        return None;
    }
    let lines: Vec<&str> = content
        .lines()
        .skip(start.checked_sub(1)?)
        .take(end + 1 - start)
        .collect();
    if lines.len() != end + 1 - start {
        return None;
    }
    let mut text = lines.join("\n");
    text.push('\n');
    Some(text)
}
