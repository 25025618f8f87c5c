//! Markdown → ratatui `Text` renderer and code-fence extraction.
//!
//! Thin wrapper around `pulldown_cmark` that converts markdown events into
//! styled `Line`/`Span` values. Fenced code blocks carrying a language tag
//! are highlighted with syntect and labelled with the ordinal the copy keys
//! use (`[1]`, `[2]`, ...). Untagged fences, indented blocks, and inline
//! code render as plain monospaced text with no highlight and no copy
//! target. [`copyable_blocks`] yields the copy text for the tagged fences,
//! in render order.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const CODE_THEME: &str = "base16-ocean.dark";

fn parser_options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts
}

/// Parse markdown content into styled `Text`.
///
/// Returns owned text (`'static`) so callers aren't constrained by input lifetime.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut writer = Writer::new(base_fg);
    for event in Parser::new_ext(content, parser_options()) {
        writer.handle(event);
    }
    writer.text
}

/// A fenced, language-tagged code block — the unit the copy keys address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    /// Exact block text with exactly one trailing newline removed.
    pub text: String,
}

/// Extract the copy targets from a message, in the order [`render`] labels
/// them. Inline code, indented blocks, and untagged fences are not targets.
pub fn copyable_blocks(content: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<CodeBlock> = None;

    for event in Parser::new_ext(content, parser_options()) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) if !lang.is_empty() => {
                current = Some(CodeBlock {
                    language: lang.to_string(),
                    text: String::new(),
                });
            }
            Event::Text(t) => {
                if let Some(block) = current.as_mut() {
                    block.text.push_str(&t);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(mut block) = current.take() {
                    if block.text.ends_with('\n') {
                        block.text.truncate(block.text.len() - 1);
                    }
                    blocks.push(block);
                }
            }
            _ => {}
        }
    }

    blocks
}

// ── Writer ──────────────────────────────────────────────────────────────────

/// How the current code block renders its text events.
enum CodeMode {
    Highlighted(HighlightLines<'static>),
    Plain,
}

struct Writer {
    text: Text<'static>,
    base_fg: Color,
    /// Inline style stack (bold, italic, heading text, etc.). Styles compose
    /// via `patch` so nested bold+italic works.
    styles: Vec<Style>,
    /// Per-line prefix spans (blockquote `│`, code fence `│`).
    line_prefixes: Vec<Span<'static>>,
    /// List nesting: None = unordered, Some(n) = ordered at index n.
    list_indices: Vec<Option<u64>>,
    /// Set while inside a code fence.
    code: Option<CodeMode>,
    /// Running count of language-tagged fences; mirrors `copyable_blocks`.
    copy_ordinal: usize,
    /// Stored link URL, appended after the link text closes.
    link_url: Option<String>,
    /// Whether the next block element should be preceded by a blank line.
    needs_newline: bool,
}

impl Writer {
    fn new(base_fg: Color) -> Self {
        Self {
            text: Text::default(),
            base_fg,
            styles: vec![],
            line_prefixes: vec![],
            list_indices: vec![],
            code: None,
            copy_ordinal: 0,
            link_url: None,
            needs_newline: false,
        }
    }

    // ── Style helpers ───────────────────────────────────────────────────

    /// Current effective style: top of stack, or base foreground color.
    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    /// Push a style that composes with the current one (inherits parent modifiers).
    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    // ── Line/span helpers ───────────────────────────────────────────────

    fn push_line(&mut self, line: Line<'static>) {
        let mut out = line;
        for pfx in self.line_prefixes.iter().rev().cloned() {
            out.spans.insert(0, pfx);
        }
        self.text.lines.push(out);
    }

    fn push_span(&mut self, span: Span<'static>) {
        if let Some(line) = self.text.lines.last_mut() {
            line.push_span(span);
        } else {
            self.push_line(Line::from(vec![span]));
        }
    }

    fn blank_line_if_needed(&mut self) {
        if self.needs_newline {
            self.push_line(Line::default());
            self.needs_newline = false;
        }
    }

    // ── Event dispatch ──────────────────────────────────────────────────

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => self.inline_code(c),
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.push_line(Line::default()),
            Event::Rule => {
                self.blank_line_if_needed();
                self.push_line(Line::from(Span::styled(
                    "─".repeat(40),
                    Style::default().fg(Color::DarkGray),
                )));
                self.needs_newline = true;
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_span(Span::raw(marker));
            }
            _ => {} // HTML, footnotes, math — skip
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            // ── Block elements ──────────────────────────────────────────
            Tag::Paragraph => {
                self.blank_line_if_needed();
                self.push_line(Line::default());
            }
            Tag::Heading { level, .. } => {
                self.blank_line_if_needed();
                let hs = heading_style(self.base_fg, level);
                let depth = level as usize;
                self.push_line(Line::from(Span::styled(
                    format!("{} ", "#".repeat(depth)),
                    hs,
                )));
                self.push_style(hs);
            }
            Tag::BlockQuote(_) => {
                self.blank_line_if_needed();
                self.line_prefixes
                    .push(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
                self.push_style(
                    Style::default()
                        .fg(self.base_fg)
                        .add_modifier(Modifier::DIM | Modifier::ITALIC),
                );
            }
            Tag::CodeBlock(kind) => self.open_code_block(kind),
            Tag::List(start) => {
                if self.list_indices.is_empty() {
                    self.blank_line_if_needed();
                }
                self.list_indices.push(start);
            }
            Tag::Item => {
                self.push_line(Line::default());
                let depth = self.list_indices.len().saturating_sub(1);
                let indent = "  ".repeat(depth);
                if let Some(idx) = self.list_indices.last_mut() {
                    let marker = match idx {
                        None => format!("{indent}- "),
                        Some(n) => {
                            let s = format!("{indent}{}. ", n);
                            *n += 1;
                            s
                        }
                    };
                    self.push_span(Span::styled(marker, Style::default().fg(Color::DarkGray)));
                }
            }

            // ── Inline elements ─────────────────────────────────────────
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link_url = Some(dest_url.to_string());
                self.push_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            _ => {} // Tables, images, definitions — skip
        }
    }

    /// Opens a code fence: draws the top border (with language + copy
    /// ordinal when tagged) and picks the highlight mode.
    fn open_code_block(&mut self, kind: CodeBlockKind<'_>) {
        if !self.text.lines.is_empty() {
            self.push_line(Line::default());
        }
        let lang = match &kind {
            CodeBlockKind::Fenced(l) => l.as_ref(),
            CodeBlockKind::Indented => "",
        };

        let border = Style::default().fg(Color::DarkGray);
        if lang.is_empty() {
            // Untagged or indented: plain monospaced text, no copy target.
            self.push_line(Line::from(Span::styled("╭──", border)));
            self.code = Some(CodeMode::Plain);
        } else {
            self.copy_ordinal += 1;
            self.push_line(Line::from(vec![
                Span::styled("╭── ", border),
                Span::styled(lang.to_owned(), border.add_modifier(Modifier::BOLD)),
                Span::styled(format!(" [{}] ──", self.copy_ordinal), border),
            ]));
            // A tagged fence is still a copy target when syntect has no
            // grammar for the tag; it just renders unhighlighted.
            self.code = Some(match SYNTAX_SET.find_syntax_by_token(lang) {
                Some(syntax) => CodeMode::Highlighted(HighlightLines::new(
                    syntax,
                    &THEME_SET.themes[CODE_THEME],
                )),
                None => CodeMode::Plain,
            });
        }

        self.line_prefixes.push(Span::styled("│ ", border));
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.needs_newline = true,
            TagEnd::Heading(_) => {
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::BlockQuote(_) => {
                self.line_prefixes.pop();
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::CodeBlock => {
                self.code = None;
                self.line_prefixes.pop(); // remove │ prefix before bottom border
                self.push_line(Line::from(Span::styled(
                    "╰──",
                    Style::default().fg(Color::DarkGray),
                )));
                self.needs_newline = true;
            }
            TagEnd::List(_) => {
                self.list_indices.pop();
                self.needs_newline = true;
            }
            TagEnd::Item => {}
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link_url.take() {
                    self.push_span(Span::raw(" ("));
                    self.push_span(Span::styled(
                        url,
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::UNDERLINED),
                    ));
                    self.push_span(Span::raw(")"));
                }
            }
            _ => {}
        }
    }

    // ── Content handlers ────────────────────────────────────────────────

    fn text(&mut self, cow: CowStr<'_>) {
        // Expand tabs → 4 spaces (ratatui renders \t as zero-width)
        let raw = cow.to_string();
        let text = if raw.contains('\t') {
            raw.replace('\t', "    ")
        } else {
            raw
        };

        match self.code.take() {
            Some(CodeMode::Highlighted(mut hl)) => {
                // Take the highlighter out to avoid a double mutable borrow
                // (highlight_line borrows it, push_line borrows self).
                for line in LinesWithEndings::from(text.as_str()) {
                    let spans: Vec<Span<'static>> = match hl.highlight_line(line, &SYNTAX_SET) {
                        Ok(ranges) => ranges
                            .into_iter()
                            .filter_map(|(hl_style, frag)| {
                                let content = frag.trim_end_matches('\n').replace('\t', "    ");
                                if content.is_empty() {
                                    return None;
                                }
                                let fg = Color::Rgb(
                                    hl_style.foreground.r,
                                    hl_style.foreground.g,
                                    hl_style.foreground.b,
                                );
                                Some(Span::styled(content, Style::default().fg(fg)))
                            })
                            .collect(),
                        Err(_) => vec![Span::styled(
                            line.trim_end_matches('\n').to_owned(),
                            Style::default().fg(Color::White),
                        )],
                    };
                    self.push_line(Line::from(spans));
                }
                self.code = Some(CodeMode::Highlighted(hl));
            }
            Some(CodeMode::Plain) => {
                let code_style = Style::default().fg(Color::White);
                for line in text.split('\n') {
                    self.push_line(Line::from(Span::styled(line.to_owned(), code_style)));
                }
                // split('\n') yields one trailing empty entry for the final
                // newline of the event; drop it so blocks don't grow a
                // phantom last line.
                if text.ends_with('\n') {
                    self.text.lines.pop();
                }
                self.code = Some(CodeMode::Plain);
            }
            None => {
                let style = self.style();
                self.push_span(Span::styled(text, style));
            }
        }
    }

    fn inline_code(&mut self, cow: CowStr<'_>) {
        let style = Style::default().fg(Color::White).bg(Color::DarkGray);
        self.push_span(Span::styled(cow.to_string(), style));
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn heading_style(base_fg: Color, level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => Style::default()
            .fg(base_fg)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        HeadingLevel::H2 => Style::default().fg(base_fg).add_modifier(Modifier::BOLD),
        _ => Style::default()
            .fg(base_fg)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect::<String>()
    }

    fn all_lines(text: &Text) -> Vec<String> {
        text.lines.iter().map(line_text).collect()
    }

    // ── Rendering ────────────────────────────────────────────────────────

    #[test]
    fn tagged_fence_gets_language_label_and_copy_ordinal() {
        let text = render("```python\nprint('hi')\n```", Color::Blue);
        let lines = all_lines(&text);
        assert!(
            lines[0].contains("python") && lines[0].contains("[1]"),
            "expected labelled top border, got {:?}",
            lines[0]
        );
        assert!(lines.iter().any(|l| l.contains("print")));
        assert!(lines.last().unwrap().starts_with('╰'));
    }

    #[test]
    fn tagged_fence_is_syntax_highlighted() {
        let text = render("```python\nprint('hi')\n```", Color::Blue);
        // Syntect emits RGB foregrounds; plain code stays on named colors.
        let has_rgb = text.lines.iter().any(|l| {
            l.spans
                .iter()
                .any(|s| matches!(s.style.fg, Some(Color::Rgb(..))))
        });
        assert!(has_rgb, "tagged fence should carry syntect colors");
    }

    #[test]
    fn untagged_fence_renders_plain_without_copy_label() {
        let text = render("```\nline1\nline2\n```", Color::Blue);
        let lines = all_lines(&text);
        assert!(lines[0].starts_with('╭'));
        assert!(!lines[0].contains('['), "no copy ordinal without a tag");
        assert!(lines[1].starts_with("│ ") && lines[1].contains("line1"));
        assert!(lines[2].starts_with("│ ") && lines[2].contains("line2"));
        assert!(lines.last().unwrap().starts_with('╰'));
        let has_rgb = text.lines.iter().any(|l| {
            l.spans
                .iter()
                .any(|s| matches!(s.style.fg, Some(Color::Rgb(..))))
        });
        assert!(!has_rgb, "untagged fence must not be highlighted");
    }

    #[test]
    fn copy_ordinals_count_only_tagged_fences() {
        let content = "```\nplain\n```\n\n```rust\nfn a() {}\n```\n\n```python\nb = 1\n```";
        let text = render(content, Color::Blue);
        let lines = all_lines(&text);
        assert!(lines.iter().any(|l| l.contains("rust") && l.contains("[1]")));
        assert!(
            lines
                .iter()
                .any(|l| l.contains("python") && l.contains("[2]"))
        );
    }

    #[test]
    fn inline_code_styled_not_bordered() {
        let text = render("Use `foo()` here", Color::Blue);
        let line = &text.lines[0];
        let code_span = line.spans.iter().find(|s| s.content == "foo()").unwrap();
        assert_eq!(code_span.style.fg, Some(Color::White));
        assert_eq!(code_span.style.bg, Some(Color::DarkGray));
        assert_eq!(text.lines.len(), 1, "inline code must not open a block");
    }

    #[test]
    fn heading_text_inherits_heading_style() {
        let text = render("## Hello", Color::Blue);
        let line = &text.lines[0];
        assert!(line.spans.len() >= 2, "expected >= 2 spans, got {:?}", line);
        assert!(line.spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(line.spans[1].style.fg, Some(Color::Blue));
    }

    #[test]
    fn bold_text_is_bold() {
        let text = render("Some **bold** text", Color::Blue);
        let line = &text.lines[0];
        let bold_span = line.spans.iter().find(|s| s.content == "bold").unwrap();
        assert!(bold_span.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn plain_text_uses_base_color() {
        let text = render("hello", Color::Green);
        assert_eq!(text.lines[0].spans[0].style.fg, Some(Color::Green));
    }

    #[test]
    fn tabs_expanded_to_spaces() {
        let text = render("```\n\tindented\n```", Color::Blue);
        let has_tabs = text
            .lines
            .iter()
            .any(|l| l.spans.iter().any(|s| s.content.contains('\t')));
        assert!(!has_tabs, "no raw tabs should remain");
        let has_spaces = text
            .lines
            .iter()
            .any(|l| l.spans.iter().any(|s| s.content.starts_with("    ")));
        assert!(has_spaces, "tabs should be expanded to 4 spaces");
    }

    // ── Extraction ───────────────────────────────────────────────────────

    #[test]
    fn copyable_block_text_is_exact_minus_one_trailing_newline() {
        let blocks = copyable_blocks("```python\nprint('hi')\n```");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "python");
        assert_eq!(blocks[0].text, "print('hi')");
    }

    #[test]
    fn copyable_block_strips_exactly_one_newline_never_more() {
        // The block body ends in a blank line: "a\n\n". Exactly one trailing
        // newline is removed, leaving "a\n".
        let blocks = copyable_blocks("```python\na\n\n```");
        assert_eq!(blocks[0].text, "a\n");
    }

    #[test]
    fn copyable_blocks_preserve_interior_structure() {
        let blocks = copyable_blocks("```rust\nfn main() {\n    let x = 1;\n}\n```");
        assert_eq!(blocks[0].text, "fn main() {\n    let x = 1;\n}");
    }

    #[test]
    fn untagged_and_inline_code_are_not_copy_targets() {
        assert!(copyable_blocks("```\nplain\n```").is_empty());
        assert!(copyable_blocks("Use `foo()` here").is_empty());
        assert!(copyable_blocks("    indented code").is_empty());
    }

    #[test]
    fn multiple_blocks_in_render_order() {
        let content = "First:\n\n```rust\nfn a() {}\n```\n\nThen:\n\n```python\nb = 1\n```";
        let blocks = copyable_blocks(content);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language, "rust");
        assert_eq!(blocks[1].language, "python");
    }
}
