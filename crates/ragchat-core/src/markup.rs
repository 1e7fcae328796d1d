//! Turning answer markup into terminal text, and user text into markup.
//!
//! Every [`Message`](crate::state::Message) carries HTML: answers arrive as
//! markdown already rendered by the server, and typed questions are escaped
//! before they are stored.

use scraper::{ElementRef, Html, Node};

/// Escape text so it can be stored as markup and shown literally
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Visible text of an HTML fragment, laid out roughly the way a browser's
/// `innerText` would: blocks on their own lines, paragraphs separated by a
/// blank line, whitespace collapsed outside `<pre>`.
pub fn to_plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut writer = TextWriter::default();
    writer.walk(fragment.root_element());
    writer.finish()
}

/// [`to_plain_text`] split into display lines
pub fn to_lines(html: &str) -> Vec<String> {
    to_plain_text(html).lines().map(str::to_string).collect()
}

#[derive(Default)]
struct TextWriter {
    out: String,
    pending_newlines: usize,
    pending_space: bool,
    pre_depth: usize,
}

impl TextWriter {
    fn walk(&mut self, element: ElementRef) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        self.element(child_element);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, element: ElementRef) {
        let name = element.value().name();
        match name {
            "script" | "style" | "head" | "title" => {}
            "br" => {
                self.flush_breaks();
                self.out.push('\n');
                self.pending_space = false;
            }
            "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol" | "blockquote"
            | "table" | "hr" => {
                self.block_break(2);
                self.walk(element);
                self.block_break(2);
            }
            "pre" => {
                self.block_break(2);
                self.pre_depth += 1;
                self.walk(element);
                self.pre_depth -= 1;
                self.block_break(2);
            }
            "li" => {
                self.block_break(1);
                self.flush_breaks();
                self.out.push_str("• ");
                self.walk(element);
                self.block_break(1);
            }
            "div" | "tr" | "dt" | "dd" | "section" | "article" => {
                self.block_break(1);
                self.walk(element);
                self.block_break(1);
            }
            "td" | "th" => {
                self.pending_space = true;
                self.walk(element);
                self.pending_space = true;
            }
            _ => self.walk(element),
        }
    }

    fn text(&mut self, text: &str) {
        if self.pre_depth > 0 {
            self.flush_breaks();
            self.out.push_str(text);
            return;
        }

        for c in text.chars() {
            if c.is_whitespace() && c != '\u{00A0}' {
                self.pending_space = true;
                continue;
            }
            if self.pending_newlines > 0 {
                self.flush_breaks();
            } else if self.pending_space && !self.out.is_empty() && !self.out.ends_with(&[' ', '\n'][..]) {
                self.out.push(' ');
            }
            self.pending_space = false;
            self.out.push(c);
        }
    }

    fn block_break(&mut self, newlines: usize) {
        if !self.out.is_empty() {
            self.pending_newlines = self.pending_newlines.max(newlines);
        }
        self.pending_space = false;
    }

    fn flush_breaks(&mut self) {
        if self.out.is_empty() {
            self.pending_newlines = 0;
            return;
        }
        // Count newlines already at the end so explicit <br>s aren't doubled
        let trailing = self.out.chars().rev().take_while(|c| *c == '\n').count();
        for _ in trailing..self.pending_newlines {
            self.out.push('\n');
        }
        self.pending_newlines = 0;
    }

    fn finish(self) -> String {
        self.out
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}
