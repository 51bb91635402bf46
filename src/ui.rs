use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use unicode_width::UnicodeWidthChar;

use crate::app::App;
use crate::chat_view::thinking_line;
use crate::wrap::wrap_lines;

const TITLE: &str = " 🧠 Corolla Assistant ";
const PLACEHOLDER: &str = "Ask something about your Corolla...";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(TITLE, Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.client.endpoint(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

/// Rows for the thinking indicator, wrapped like the conversation
fn indicator_rows(app: &App, width: usize) -> Vec<Line<'static>> {
    if app.is_busy() {
        wrap_lines(&[thinking_line(app.animation_frame)], width)
    } else {
        Vec::new()
    }
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let inner_width = usize::from(area.width.saturating_sub(2));
    app.chat_height = area.height.saturating_sub(2);

    app.chat_view.sync(app.session.conversation(), inner_width);
    let indicator = indicator_rows(app, inner_width);
    let total = app.chat_view.rows().len() + indicator.len();
    app.chat_lines = u16::try_from(total).unwrap_or(u16::MAX);

    if app.follow_bottom {
        app.chat_scroll = app.max_scroll();
    } else {
        app.chat_scroll = app.chat_scroll.min(app.max_scroll());
    }

    let text = if total == 0 {
        Text::from(Span::styled(
            "No messages yet. Type a question below and press Enter.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        // Rows are already wrapped; only the visible window is drawn
        let visible: Vec<Line<'static>> = app
            .chat_view
            .rows()
            .iter()
            .chain(indicator.iter())
            .skip(usize::from(app.chat_scroll))
            .take(usize::from(app.chat_height))
            .cloned()
            .collect();
        Text::from(visible)
    };

    frame.render_widget(Paragraph::new(text).block(block), area);

    if app.max_scroll() > 0 {
        let mut state = ScrollbarState::new(usize::from(app.max_scroll()))
            .position(usize::from(app.chat_scroll));
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut state,
        );
    }
}

/// Visible slice of the draft and the cursor column, both in display cells.
///
/// The window starts as far left as possible while leaving the cell under
/// the cursor on screen.
fn input_viewport(draft: &str, cursor: usize, width: usize) -> (String, u16) {
    let chars: Vec<char> = draft.chars().collect();
    let cursor = cursor.min(chars.len());
    let cell_width = |c: &char| c.width().unwrap_or(0);

    let mut start = 0;
    let mut before: usize = chars[..cursor].iter().map(cell_width).sum();
    while width > 0 && start < cursor && before >= width {
        before -= cell_width(&chars[start]);
        start += 1;
    }

    let mut visible = String::new();
    let mut used = 0;
    for c in &chars[start..] {
        let w = cell_width(c);
        if used + w > width {
            break;
        }
        used += w;
        visible.push(*c);
    }

    (visible, u16::try_from(before).unwrap_or(u16::MAX))
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.is_busy() { Color::DarkGray } else { Color::Yellow };
    let title = if app.is_busy() { " Waiting for answer " } else { " Ask (Enter to send) " };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let draft = app.session.draft();
    let (visible_text, cursor_x) = input_viewport(draft, app.cursor, inner_width);

    let input = if draft.is_empty() {
        Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(input_block), area);
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ];
    hints.push(Span::styled(
        format!(" {} messages ", app.session.conversation().len()),
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}
