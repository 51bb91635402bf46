//! Word wrapping for styled lines
//!
//! The chat pane draws rows that are already wrapped, so the row count used
//! for scrolling is exactly what ends up on screen.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// Wrap `lines` to `width` columns, keeping span styles and alignment
pub fn wrap_lines(lines: &[Line<'static>], width: usize) -> Vec<Line<'static>> {
    let mut rows = Vec::with_capacity(lines.len());
    for line in lines {
        rows.extend(wrap_line(line, width));
    }
    rows
}

fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 || line.width() <= width {
        return vec![line.clone()];
    }

    let styled: Vec<(char, Style)> = line
        .spans
        .iter()
        .flat_map(|span| span.content.chars().map(move |c| (c, span.style)))
        .collect();
    let plain: String = styled.iter().map(|(c, _)| c).collect();

    let mut rows = Vec::new();
    let mut idx = 0;
    for piece in textwrap::wrap(&plain, width) {
        // textwrap drops the whitespace it breaks on
        while idx < styled.len() && styled[idx].0.is_whitespace() && !piece.starts_with(styled[idx].0) {
            idx += 1;
        }

        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut text = String::new();
        let mut style: Option<Style> = None;
        for expected in piece.chars() {
            let (c, s) = styled.get(idx).copied().unwrap_or((expected, Style::default()));
            idx += 1;
            if style.is_some_and(|current| current != s) {
                spans.push(Span::styled(std::mem::take(&mut text), style.unwrap_or_default()));
            }
            style = Some(s);
            text.push(c);
        }
        if !text.is_empty() {
            spans.push(Span::styled(text, style.unwrap_or_default()));
        }

        let mut row = Line::from(spans);
        row.alignment = line.alignment;
        rows.push(row);
    }

    if rows.is_empty() {
        rows.push(line.clone());
    }
    rows
}
