//! Rendered rows for the chat pane
//!
//! Markdown parsing and syntax highlighting are the expensive part of a
//! frame, so each message is rendered once and kept. The conversation only
//! grows, which makes the message index a stable cache key. A width change
//! only re-wraps the cached lines.

use ratatui::layout::Alignment;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::markdown;
use crate::message::{Conversation, Message, Role};
use crate::wrap::wrap_lines;

fn role_line(role: Role) -> Line<'static> {
    let color = match role {
        Role::User => Color::Cyan,
        Role::Assistant => Color::Green,
    };
    Line::from(Span::styled(
        format!("{}:", role.label()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

/// Label, markdown body and trailing blank line for one message
pub fn message_lines(msg: &Message) -> Vec<Line<'static>> {
    // User turns sit on the right like the web page
    let alignment = match msg.role() {
        Role::User => Alignment::Right,
        Role::Assistant => Alignment::Left,
    };

    let mut lines = vec![role_line(msg.role()).alignment(alignment)];
    lines.extend(
        markdown::render(msg.content())
            .into_iter()
            .map(|l| l.alignment(alignment)),
    );
    lines.push(Line::default());
    lines
}

/// Animated "thinking" line; the ellipsis cycles through ".", "..", "..."
pub fn thinking_line(frame: u8) -> Line<'static> {
    let dots = ".".repeat(usize::from(frame % 3) + 1);
    Line::from(Span::styled(
        format!("Assistant is thinking{dots}"),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    ))
}

#[derive(Debug, Default)]
pub struct ChatView {
    width: usize,
    rendered: Vec<Vec<Line<'static>>>,
    rows: Vec<Line<'static>>,
    renders: usize,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the cached rows up to date with `conversation` at `width`
    pub fn sync(&mut self, conversation: &Conversation, width: usize) {
        if width != self.width {
            self.width = width;
            self.rows = self
                .rendered
                .iter()
                .flat_map(|lines| wrap_lines(lines, width))
                .collect();
        }

        if conversation.len() < self.rendered.len() {
            // Only happens if a different conversation is handed in
            self.rendered.clear();
            self.rows.clear();
        }

        for msg in &conversation.as_slice()[self.rendered.len()..] {
            let lines = message_lines(msg);
            self.renders += 1;
            self.rows.extend(wrap_lines(&lines, self.width));
            self.rendered.push(lines);
        }
    }

    /// Wrapped rows for every synced message
    pub fn rows(&self) -> &[Line<'static>] {
        &self.rows
    }

    /// How many times a message went through the markdown renderer
    pub fn renders(&self) -> usize {
        self.renders
    }
}
