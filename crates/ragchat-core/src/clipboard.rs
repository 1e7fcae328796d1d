//! Clipboard payloads for a selection of transcript turns.

use std::ops::RangeInclusive;

use crate::markup;
use crate::state::{Message, Role};

/// Inclusive range of transcript indices, in either direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub cursor: usize,
}

impl Selection {
    pub fn single(index: usize) -> Self {
        Self { anchor: index, cursor: index }
    }

    pub fn range(&self) -> RangeInclusive<usize> {
        self.anchor.min(self.cursor)..=self.anchor.max(self.cursor)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.range().contains(&index)
    }
}

/// Both flavours of the copied content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub plain: String,
    pub html: String,
}

/// Payload for exactly the selected turns, or `None` when the selection
/// doesn't land on any message
pub fn copy_selection(messages: &[Message], selection: Selection) -> Option<ClipboardPayload> {
    let range = selection.range();
    if *range.end() >= messages.len() {
        return None;
    }
    let selected = &messages[range];

    let plain = selected
        .iter()
        .map(plain_text)
        .collect::<Vec<_>>()
        .join("\n\n");

    let html = selected.iter().map(to_html).collect::<String>();

    Some(ClipboardPayload {
        plain: plain.trim().to_string(),
        html: html.trim().to_string(),
    })
}

fn plain_text(message: &Message) -> String {
    let text = markup::to_plain_text(&message.text);
    match message.elapsed_label() {
        Some(label) => format!("{}\n{}", text, label),
        None => text,
    }
}

/// Same block structure the server renders for a turn
pub fn to_html(message: &Message) -> String {
    let mut html = format!(
        "<div class=\"{}\"><p>{}</p>",
        message.role.as_str(),
        message.text.trim()
    );
    if message.role == Role::Ai {
        if let Some(label) = message.elapsed_label() {
            html.push_str(&format!("<p class=\"time\">{}</p>", label));
        }
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> Vec<Message> {
        vec![
            Message::human("  What is B2?\n"),
            Message::ai("\n<p>Cloud storage.</p>\n", 2.0),
            Message::human("Thanks"),
        ]
    }

    #[test]
    fn test_single_message_is_trimmed() {
        let payload = copy_selection(&transcript(), Selection::single(0)).unwrap();
        assert_eq!(payload.plain, "What is B2?");
        assert_eq!(payload.html, "<div class=\"human\"><p>What is B2?</p></div>");
    }

    #[test]
    fn test_range_in_either_direction() {
        let forward = copy_selection(&transcript(), Selection { anchor: 0, cursor: 1 }).unwrap();
        let backward = copy_selection(&transcript(), Selection { anchor: 1, cursor: 0 }).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.plain, "What is B2?\n\nCloud storage.\n2.0 seconds");
        assert!(forward.html.ends_with("<p class=\"time\">2.0 seconds</p></div>"));
        assert!(!forward.html.contains("Thanks"));
    }

    #[test]
    fn test_out_of_range_selection() {
        assert_eq!(copy_selection(&transcript(), Selection::single(3)), None);
        assert_eq!(copy_selection(&[], Selection::single(0)), None);
    }

    #[test]
    fn test_no_outer_whitespace() {
        let payload = copy_selection(&transcript(), Selection { anchor: 0, cursor: 2 }).unwrap();
        assert_eq!(payload.plain.trim(), payload.plain);
        assert_eq!(payload.html.trim(), payload.html);
    }
}
