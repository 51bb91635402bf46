use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

// Closest bundled match to the web client's oneDark
const THEME_NAME: &str = "base16-ocean.dark";

pub const CODE_BG: Color = Color::Rgb(40, 44, 52);

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme() -> Option<&'static Theme> {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    let ts = THEME_SET.get_or_init(ThemeSet::load_defaults);
    ts.themes
        .get(THEME_NAME)
        .or_else(|| ts.themes.values().next())
}

fn normalize_lang_hint(s: &str) -> String {
    let t = s.trim().to_ascii_lowercase();
    match t.as_str() {
        "py" | "python" => "python".into(),
        "bash" | "sh" | "zsh" | "shell" => "bash".into(),
        "js" | "javascript" | "jsx" => "javascript".into(),
        "ts" | "tsx" | "typescript" => "typescript".into(),
        "yml" | "yaml" => "yaml".into(),
        "rs" | "rust" => "rust".into(),
        "cpp" | "cc" | "cxx" | "hpp" => "cpp".into(),
        other => other.into(),
    }
}

/// Highlight a fenced code block. Returns `None` when the language is
/// unknown so the caller can fall back to plain code styling.
pub fn highlight_code_block(lang_hint: &str, code: &str) -> Option<Vec<Line<'static>>> {
    let ps = syntax_set();
    let lang = normalize_lang_hint(lang_hint);
    let syntax = ps
        .find_syntax_by_token(&lang)
        .or_else(|| ps.find_syntax_by_extension(&lang))?;
    let mut h = HighlightLines::new(syntax, theme()?);

    let mut out: Vec<Line<'static>> = Vec::new();
    for line in LinesWithEndings::from(code) {
        let ranges = h.highlight_line(line, ps).ok()?;
        let spans: Vec<Span<'static>> = ranges
            .into_iter()
            .map(|(style, text)| {
                let fg = style.foreground;
                Span::styled(
                    text.trim_end_matches('\n').to_string(),
                    Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)).bg(CODE_BG),
                )
            })
            .collect();
        out.push(Line::from(spans));
    }
    Some(out)
}
