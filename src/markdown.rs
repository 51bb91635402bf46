//! Markdown → styled terminal lines
//!
//! Covers what assistant answers actually use: paragraphs, headings,
//! emphasis, lists, block quotes, inline code and fenced code blocks.
//! Fenced blocks with a language tag go through syntect; everything else
//! that is code gets the inline code style.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::syntax::{highlight_code_block, CODE_BG};

fn inline_code_style() -> Style {
    Style::default().fg(Color::LightRed).bg(Color::DarkGray)
}

#[derive(Default)]
struct Renderer {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    code_block: Option<(String, String)>,
}

impl Renderer {
    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, modifier: Modifier) {
        let style = self.style().add_modifier(modifier);
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    fn quote_prefix(&self) -> Option<Span<'static>> {
        (self.quote_depth > 0).then(|| {
            Span::styled("│ ".repeat(self.quote_depth), Style::default().fg(Color::DarkGray))
        })
    }

    fn push_line(&mut self, spans: Vec<Span<'static>>) {
        let mut all = Vec::with_capacity(spans.len() + 1);
        all.extend(self.quote_prefix());
        all.extend(spans);
        self.lines.push(Line::from(all));
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            let spans = std::mem::take(&mut self.current);
            self.push_line(spans);
        }
    }

    /// Separate top-level blocks by one blank line
    fn block_gap(&mut self) {
        self.flush();
        if !self.lists.is_empty() {
            return;
        }
        if self.lines.last().is_some_and(|l| l.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, buf)) = self.code_block.as_mut() {
            buf.push_str(text);
            return;
        }
        self.current.push(Span::styled(text.to_string(), self.style()));
    }

    fn start_item(&mut self) {
        self.flush();
        let depth = self.lists.len().saturating_sub(1);
        let marker = match self.lists.last_mut() {
            Some(Some(n)) => {
                let marker = format!("{n}. ");
                *n += 1;
                marker
            }
            _ => "• ".to_string(),
        };
        self.current
            .push(Span::raw(format!("{}{}", "  ".repeat(depth), marker)));
    }

    fn end_code_block(&mut self) {
        let Some((lang, code)) = self.code_block.take() else {
            return;
        };
        let code = code.strip_suffix('\n').unwrap_or(&code).to_string();

        let highlighted = if lang.is_empty() {
            None
        } else {
            highlight_code_block(&lang, &code)
        };
        let rendered = highlighted.unwrap_or_else(|| {
            let style = if lang.is_empty() {
                inline_code_style()
            } else {
                Style::default().bg(CODE_BG)
            };
            code.lines()
                .map(|l| Line::from(Span::styled(l.to_string(), style)))
                .collect()
        });

        let indent = "  ".repeat(self.lists.len());
        for line in rendered {
            let mut spans = Vec::with_capacity(line.spans.len() + 1);
            if !indent.is_empty() {
                spans.push(Span::raw(indent.clone()));
            }
            spans.extend(line.spans);
            self.push_line(spans);
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => match tag {
                // Inside a list item the paragraph continues the marker line
                Tag::Paragraph if !self.lists.is_empty() => {}
                Tag::Paragraph => self.block_gap(),
                Tag::Heading { .. } => {
                    self.block_gap();
                    self.push_style(Modifier::BOLD | Modifier::UNDERLINED);
                }
                Tag::BlockQuote(_) => {
                    self.block_gap();
                    self.quote_depth += 1;
                }
                Tag::List(start) => {
                    if self.lists.is_empty() {
                        self.block_gap();
                    } else {
                        self.flush();
                    }
                    self.lists.push(start);
                }
                Tag::Item => self.start_item(),
                Tag::CodeBlock(kind) => {
                    self.block_gap();
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().unwrap_or_default().to_string()
                        }
                        CodeBlockKind::Indented => String::new(),
                    };
                    self.code_block = Some((lang, String::new()));
                }
                Tag::Emphasis => self.push_style(Modifier::ITALIC),
                Tag::Strong => self.push_style(Modifier::BOLD),
                Tag::Strikethrough => self.push_style(Modifier::CROSSED_OUT),
                Tag::Link { .. } => self.push_style(Modifier::UNDERLINED),
                _ => {}
            },
            Event::End(tag_end) => match tag_end {
                TagEnd::Paragraph | TagEnd::Item => self.flush(),
                TagEnd::Heading(_) => {
                    self.flush();
                    self.pop_style();
                }
                TagEnd::BlockQuote(_) => {
                    self.flush();
                    self.quote_depth = self.quote_depth.saturating_sub(1);
                }
                TagEnd::List(_) => {
                    self.flush();
                    self.lists.pop();
                }
                TagEnd::CodeBlock => self.end_code_block(),
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                    self.pop_style()
                }
                _ => {}
            },
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self
                .current
                .push(Span::styled(code.to_string(), inline_code_style())),
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak | Event::HardBreak => self.flush(),
            Event::Rule => {
                self.block_gap();
                self.push_line(vec![Span::styled(
                    "─".repeat(24),
                    Style::default().fg(Color::DarkGray),
                )]);
            }
            _ => {}
        }
    }
}

/// Render message content as terminal lines
pub fn render(content: &str) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut renderer = Renderer::default();
    for event in Parser::new_ext(content, options) {
        renderer.event(event);
    }
    renderer.flush();
    renderer.lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn paragraphs_are_separated_by_blank_lines() {
        let lines = render("First paragraph.\n\nSecond one.");
        assert_eq!(plain(&lines), vec!["First paragraph.", "", "Second one."]);
    }

    #[test]
    fn soft_breaks_keep_their_line() {
        let lines = render("line one\nline two");
        assert_eq!(plain(&lines), vec!["line one", "line two"]);
    }

    #[test]
    fn strong_text_is_bold() {
        let lines = render("Use **0W-16** oil");
        let bold = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "0W-16")
            .unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn lists_get_markers() {
        let lines = render("- tires\n- brakes\n\n1. jack\n2. wrench");
        assert_eq!(
            plain(&lines),
            vec!["• tires", "• brakes", "", "1. jack", "2. wrench"]
        );
    }

    #[test]
    fn loose_list_items_keep_marker_on_text_line() {
        let lines = render("- first\n\n- second");
        assert_eq!(plain(&lines), vec!["• first", "• second"]);
    }

    #[test]
    fn inline_code_is_styled() {
        let lines = render("run `obd --scan` now");
        let code = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "obd --scan")
            .unwrap();
        assert_eq!(code.style, inline_code_style());
    }

    #[test]
    fn fenced_code_with_language_is_highlighted() {
        let lines = render("```python\nx = 1\n```");
        assert_eq!(plain(&lines), vec!["x = 1"]);
        assert!(lines[0].spans.iter().all(|s| s.style.bg == Some(CODE_BG)));
    }

    #[test]
    fn fenced_code_without_language_uses_inline_style() {
        let lines = render("```\nraw\ntext\n```");
        assert_eq!(plain(&lines), vec!["raw", "text"]);
        assert_eq!(lines[0].spans[0].style, inline_code_style());
    }

    #[test]
    fn empty_content_renders_nothing() {
        assert!(render("").is_empty());
    }
}
