//! Reading the server-rendered chat page.
//!
//! The server renders the session's conversation into `#conversation`, one
//! `div.human` or `div.ai` per turn, answers followed by a `p.time` line.

use scraper::{ElementRef, Html, Node, Selector};

use crate::markup;
use crate::state::{Message, Role, Transcript};

/// What the client needs from a page load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub title: Option<String>,
    pub header: Option<String>,
    pub transcript: Transcript,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let title = select_text(&document, "title");
        let header = select_text(&document, "#ask-me-header");

        let mut messages = Vec::new();
        if let Ok(turns) = Selector::parse("#conversation > div") {
            for turn in document.select(&turns) {
                if let Some(message) = parse_turn(turn) {
                    messages.push(message);
                }
            }
        }

        Self {
            title,
            header,
            transcript: Transcript::from_messages(messages),
        }
    }
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let element = document.select(&selector).next()?;
    let text = markup::to_plain_text(&element.inner_html());
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn parse_turn(turn: ElementRef) -> Option<Message> {
    let role = turn.value().classes().find_map(Role::from_class)?;

    let mut text = String::new();
    let mut elapsed = None;
    for child in turn.children() {
        match child.value() {
            Node::Text(t) => text.push_str(&markup::escape(t)),
            Node::Element(_) => {
                let Some(element) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_time(element) {
                    elapsed = parse_elapsed(&element.text().collect::<String>());
                } else {
                    text.push_str(&element.html());
                }
            }
            _ => {}
        }
    }

    let text = unwrap_single_paragraph(text.trim());
    Some(match role {
        Role::Human => Message::human(text),
        Role::Ai => Message::ai(text, elapsed.unwrap_or(0.0)),
    })
}

fn is_time(element: ElementRef) -> bool {
    element.value().name() == "p" && element.value().classes().any(|c| c == "time")
}

/// `"12.3 seconds"` -> `12.3`
fn parse_elapsed(label: &str) -> Option<f64> {
    label.split_whitespace().next()?.parse().ok()
}

/// Turns are rendered as `<p>text</p>`; keep just the text when that
/// paragraph is the only thing in the turn.
fn unwrap_single_paragraph(html: &str) -> String {
    if let Some(inner) = html.strip_prefix("<p>").and_then(|s| s.strip_suffix("</p>")) {
        if !inner.contains("<p>") && !inner.contains("</p>") {
            return inner.to_string();
        }
    }
    html.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Backblaze B2 Docs</title></head>
<body>
  <div id="history">
    <div id="conversation">
      <div class="human"><p>What is B2?</p></div>
      <div class="ai"><p>B2 is <em>cloud storage</em>.</p>
<ul><li>cheap</li></ul><p class="time">4.2 seconds</p></div>
      <div class="human"><p>Thanks &amp; bye</p></div>
    </div>
  </div>
</body>
</html>"#;

    #[test]
    fn test_parse_conversation() {
        let page = Page::parse(PAGE);
        assert_eq!(page.title.as_deref(), Some("Backblaze B2 Docs"));
        assert_eq!(page.header, None);

        let messages = page.transcript.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], Message::human("What is B2?"));
        assert_eq!(messages[1].role, Role::Ai);
        assert_eq!(messages[1].elapsed_seconds, Some(4.2));
        assert!(markup::to_plain_text(&messages[1].text).starts_with("B2 is cloud storage."));
        assert!(!messages[1].text.contains("seconds"));
        assert_eq!(markup::to_plain_text(&messages[2].text), "Thanks & bye");
    }

    #[test]
    fn test_empty_page_has_header() {
        let page = Page::parse(
            r#"<html><body><h1 id="ask-me-header">Ask me about B2</h1><div id="conversation"></div></body></html>"#,
        );
        assert!(page.transcript.is_empty());
        assert_eq!(page.header.as_deref(), Some("Ask me about B2"));
    }

    #[test]
    fn test_parse_elapsed() {
        assert_eq!(parse_elapsed("12.3 seconds"), Some(12.3));
        assert_eq!(parse_elapsed("soon"), None);
    }
}
