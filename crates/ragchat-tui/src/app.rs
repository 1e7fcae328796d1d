use std::time::Duration;

use ragchat_core::markup;
use ragchat_core::{
    ChatController, ClipboardPayload, Config, CopyFormat, KeyPress, Layout, Navigation, RagClient,
    Role, Selection, Submission,
};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Prompt,
    Transcript,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: Focus,
    pub chat: ChatController,
    pub client: RagClient,
    pub copy_format: CopyFormat,
    events: UnboundedSender<AppEvent>,

    // Prompt editing
    pub cursor: usize, // char position in the prompt

    // Transcript view
    pub scroll: u16,
    pub chat_height: u16, // inner height of the transcript, set during render
    pub chat_width: u16,  // inner width, for wrap calculations
    pub selection: Option<Selection>,
    pub transcript_area: Option<Rect>,

    // Page loads in flight
    pub loading_page: bool,

    // One-line feedback in the footer
    pub status: Option<String>,
}

impl App {
    pub fn new(config: &Config, events: UnboundedSender<AppEvent>) -> anyhow::Result<Self> {
        let chat = ChatController::from_config(config)?;
        let client = RagClient::new(config.request_timeout_secs.map(Duration::from_secs))?;

        Ok(Self {
            should_quit: false,
            focus: Focus::Prompt,
            chat,
            client,
            copy_format: config.copy_format,
            events,

            cursor: 0,

            scroll: 0,
            chat_height: 0,
            chat_width: 0,
            selection: None,
            transcript_area: None,

            loading_page: false,

            status: None,
        })
    }

    // Requests

    /// Submit key pressed in the prompt
    pub fn press_submit(&mut self, repeat: bool) {
        let outcome = self.chat.handle_submit_key(KeyPress { repeat });
        if let Some(submission) = outcome.submission {
            self.cursor = 0;
            self.spawn_submission(submission);
        }
    }

    fn spawn_submission(&self, submission: Submission) {
        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = client.ask(&submission.endpoint, &submission.question).await;
            let _ = tx.send(AppEvent::Answer {
                token: submission.token,
                result,
            });
        });
    }

    /// Full page load; everything on screen is replaced when it lands
    pub fn navigate(&mut self, navigation: Navigation) {
        self.loading_page = true;
        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = client.load_page(&navigation.url).await;
            let _ = tx.send(AppEvent::PageLoaded {
                url: navigation.url,
                result,
            });
        });
    }

    pub fn new_chat(&mut self) {
        if self.loading_page {
            return;
        }
        if let Some(navigation) = self.chat.request_new_chat() {
            self.status = Some("Starting a new chat...".to_string());
            self.navigate(navigation);
        }
    }

    pub fn page_loaded(&mut self) {
        self.loading_page = false;
        self.status = None;
        self.selection = None;
        self.scroll = 0;
        self.cursor = 0;
        // The prompt takes focus on every load
        self.focus = Focus::Prompt;
    }

    // Prompt editing

    pub fn insert_char(&mut self, c: char) {
        let cursor = self.cursor;
        if let Some(input) = self.chat.input_mut() {
            let byte_pos = char_to_byte_index(input, cursor);
            input.insert(byte_pos, c);
            self.cursor += 1;
        }
    }

    pub fn backspace(&mut self) {
        let cursor = self.cursor;
        if cursor == 0 {
            return;
        }
        if let Some(input) = self.chat.input_mut() {
            let byte_pos = char_to_byte_index(input, cursor - 1);
            input.remove(byte_pos);
            self.cursor -= 1;
        }
    }

    pub fn delete(&mut self) {
        let cursor = self.cursor;
        if let Some(input) = self.chat.input_mut() {
            if cursor < input.chars().count() {
                let byte_pos = char_to_byte_index(input, cursor);
                input.remove(byte_pos);
            }
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.chat.input().value.chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.chat.input().value.chars().count();
    }

    // Focus

    pub fn toggle_focus(&mut self) {
        if self.chat.layout() == Layout::Empty {
            return;
        }
        self.focus = match self.focus {
            Focus::Prompt => {
                if self.selection.is_none() {
                    self.select_last();
                }
                Focus::Transcript
            }
            Focus::Transcript => Focus::Prompt,
        };
    }

    // Transcript selection

    fn message_count(&self) -> usize {
        self.chat.transcript().len()
    }

    fn select_last(&mut self) {
        let count = self.message_count();
        self.selection = count.checked_sub(1).map(Selection::single);
    }

    /// Move the selection cursor; a range keeps its anchor
    pub fn select_next(&mut self) {
        let count = self.message_count();
        if count == 0 {
            return;
        }
        match self.selection.as_mut() {
            Some(selection) => selection.cursor = (selection.cursor + 1).min(count - 1),
            None => self.selection = Some(Selection::single(0)),
        }
    }

    pub fn select_prev(&mut self) {
        if self.message_count() == 0 {
            return;
        }
        match self.selection.as_mut() {
            Some(selection) => selection.cursor = selection.cursor.saturating_sub(1),
            None => self.select_last(),
        }
    }

    /// Start a range at the cursor, or collapse an existing range
    pub fn toggle_range(&mut self) {
        if let Some(selection) = self.selection.as_mut() {
            if selection.anchor == selection.cursor {
                // anchor stays; moving the cursor now extends
                self.status = Some("Range selection: move with j/k, y to copy".to_string());
            } else {
                selection.anchor = selection.cursor;
                self.status = None;
            }
        }
    }

    pub fn copy_selection(&mut self) -> Option<ClipboardPayload> {
        let payload = self.selection.and_then(|s| self.chat.copy_selection(s))?;
        let text = match self.copy_format {
            CopyFormat::Plain => &payload.plain,
            CopyFormat::Html => &payload.html,
        };
        match copy_to_clipboard(text, self.copy_format) {
            Ok(tool) => {
                info!(tool, chars = text.chars().count(), "copied selection");
                self.status = Some(format!("Copied {} characters", text.chars().count()));
            }
            Err(e) => {
                warn!(error = %e, "clipboard copy failed");
                self.status = Some(format!("Copy failed: {}", e));
            }
        }
        Some(payload)
    }

    // Scrolling

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.total_lines().saturating_sub(self.chat_height);
        self.scroll = self.scroll.saturating_add(lines).min(max);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    /// Scroll so the newest turn (or the pending indicator) is visible
    pub fn scroll_to_bottom(&mut self) {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.scroll = self.total_lines().saturating_sub(visible_height);
    }

    /// Rendered height of the transcript, accounting for wrapping
    pub fn total_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;
        for msg in self.chat.transcript().messages() {
            total_lines += 1; // Role line ("You:" or "AI:")
            for line in markup::to_lines(&msg.text) {
                // Character count, not byte length, for UTF-8 text
                let char_count = line.chars().count();
                total_lines += (char_count.max(1) - 1) / wrap_width + 1;
            }
            if msg.role == Role::Ai {
                total_lines += 1; // elapsed time
            }
            total_lines += 1; // Blank line after message
        }

        if self.chat.is_pending() {
            total_lines += 2; // "AI:" + indicator
        }

        u16::try_from(total_lines).unwrap_or(u16::MAX)
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Write to the system clipboard with whichever tool the platform has.
/// Returns the tool that took the text.
fn copy_to_clipboard(text: &str, format: CopyFormat) -> anyhow::Result<&'static str> {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let html = format == CopyFormat::Html;
    let candidates: [(&'static str, Vec<&str>); 3] = [
        ("pbcopy", vec![]),
        ("wl-copy", if html { vec!["--type", "text/html"] } else { vec![] }),
        (
            "xclip",
            if html {
                vec!["-selection", "clipboard", "-t", "text/html"]
            } else {
                vec!["-selection", "clipboard"]
            },
        ),
    ];

    for (tool, args) in candidates {
        let Ok(mut child) = Command::new(tool).args(&args).stdin(Stdio::piped()).spawn() else {
            continue;
        };
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }
        if child.wait()?.success() {
            return Ok(tool);
        }
    }

    anyhow::bail!("no clipboard tool found (tried pbcopy, wl-copy, xclip)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragchat_core::{Answer, Message, Page, Transcript, Url};
    use tokio::sync::mpsc;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(&Config::new(), tx).unwrap()
    }

    fn with_transcript(app: &mut App, messages: Vec<Message>) {
        app.chat.load_page(
            Url::parse("http://localhost:8000/").unwrap(),
            Page {
                title: None,
                header: None,
                transcript: Transcript::from_messages(messages),
            },
        );
    }

    #[test]
    fn test_char_to_byte_index() {
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("abc", 10), 3);
    }

    #[test]
    fn test_prompt_editing_is_utf8_safe() {
        let mut app = app();
        for c in "héy".chars() {
            app.insert_char(c);
        }
        app.cursor_left();
        app.backspace();
        assert_eq!(app.chat.input().value, "hy");
        app.cursor_home();
        app.delete();
        assert_eq!(app.chat.input().value, "y");
        app.cursor_end();
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn test_editing_blocked_while_pending() {
        let mut app = app();
        app.chat.set_input("question");
        app.cursor_end();
        let submission = app.chat.submit_question().unwrap();
        app.insert_char('x');
        app.backspace();
        assert_eq!(app.chat.input().value, ragchat_core::controller::WAIT_PLACEHOLDER);

        app.chat.complete(submission.token, Ok(Answer { answer: "a".into(), elapsed: 1.0 }));
        app.insert_char('x');
        assert_eq!(app.chat.input().value, "x");
    }

    #[test]
    fn test_selection_moves_and_clamps() {
        let mut app = app();
        with_transcript(
            &mut app,
            vec![Message::human("q1"), Message::ai("a1", 1.0), Message::human("q2")],
        );

        app.toggle_focus();
        assert_eq!(app.focus, Focus::Transcript);
        assert_eq!(app.selection, Some(Selection::single(2)));

        app.select_next();
        assert_eq!(app.selection, Some(Selection::single(2)));

        app.toggle_range();
        app.select_prev();
        app.select_prev();
        app.select_prev();
        assert_eq!(app.selection, Some(Selection { anchor: 2, cursor: 0 }));

        app.toggle_range();
        assert_eq!(app.selection, Some(Selection::single(0)));
    }

    #[test]
    fn test_focus_stays_on_prompt_in_empty_layout() {
        let mut app = app();
        app.toggle_focus();
        assert_eq!(app.focus, Focus::Prompt);
    }

    #[test]
    fn test_total_lines_wraps_long_lines() {
        let mut app = app();
        app.chat_width = 10;
        with_transcript(
            &mut app,
            vec![Message::human("0123456789abc"), Message::ai("<p>x</p>", 1.0)],
        );
        // human: role + 2 wrapped + blank; ai: role + 1 + time + blank
        assert_eq!(app.total_lines(), 4 + 4);
    }

    #[test]
    fn test_total_lines_saturates() {
        let mut app = app();
        app.chat_width = 1;
        with_transcript(&mut app, vec![Message::ai("x".repeat(70_000), 1.0)]);
        assert_eq!(app.total_lines(), u16::MAX);

        with_transcript(&mut app, vec![Message::ai("x".repeat(60_000), 1.0)]);
        // role + wrapped lines + time + blank
        assert_eq!(app.total_lines(), 60_003);
    }

    #[test]
    fn test_scroll_to_bottom() {
        let mut app = app();
        app.chat_width = 80;
        app.chat_height = 3;
        with_transcript(&mut app, vec![Message::human("q"), Message::ai("a", 1.0)]);
        app.scroll_to_bottom();
        assert_eq!(app.scroll, 7 - 3);
        app.scroll_up(10);
        assert_eq!(app.scroll, 0);
        app.scroll_down(100);
        assert_eq!(app.scroll, 4);
    }
}
