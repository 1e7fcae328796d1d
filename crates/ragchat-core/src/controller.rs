//! The chat transcript controller.
//!
//! Owns everything the chat page shows: the transcript, the prompt input,
//! the pending indicator, the layout and the page location. Front ends feed
//! it input, perform the requests it hands out, and render its state.

use tracing::{debug, error, info, warn};
use url::Url;

use crate::api::Answer;
use crate::clipboard::{self, ClipboardPayload, Selection};
use crate::config::Config;
use crate::error::{AskError, AskResult};
use crate::indicator::PendingIndicator;
use crate::location::Location;
use crate::markup;
use crate::page::Page;
use crate::state::{Message, Transcript};

/// Shown in the prompt while a question is in flight
pub const WAIT_PLACEHOLDER: &str = "Please wait...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Centered prompt under the header, transcript hidden
    Empty,
    /// Transcript visible, prompt anchored at the bottom
    Conversation,
}

/// The prompt input region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptInput {
    pub value: String,
    pub enabled: bool,
}

/// A question that has been accepted and must be sent exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub token: u64,
    pub question: String,
    pub endpoint: Url,
}

/// In-flight state. Dropping it tears down the indicator.
#[derive(Debug)]
pub struct PendingRequest {
    pub token: u64,
    pub indicator: PendingIndicator,
}

/// A key press aimed at the prompt's submit key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyPress {
    /// Auto-repeat from the key being held down
    pub repeat: bool,
}

/// What the front end should do after a submit key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome {
    pub submission: Option<Submission>,
    /// The key's default action (inserting a newline) must not happen
    pub suppress_default: bool,
}

/// A page load the front end has to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub url: Url,
}

pub struct ChatController {
    transcript: Transcript,
    input: PromptInput,
    new_chat_enabled: bool,
    header: Option<String>,
    title: Option<String>,
    layout: Layout,
    location: Location,
    pending: Option<PendingRequest>,
    next_token: u64,
    scroll_to_bottom: bool,
    navigating: bool,
    error_message: String,
}

impl ChatController {
    pub fn new(location: Location, error_message: impl Into<String>) -> Self {
        Self {
            transcript: Transcript::new(),
            input: PromptInput {
                value: String::new(),
                enabled: true,
            },
            new_chat_enabled: true,
            header: None,
            title: None,
            layout: Layout::Empty,
            location,
            pending: None,
            next_token: 1,
            scroll_to_bottom: false,
            navigating: false,
            error_message: error_message.into(),
        }
    }

    pub fn from_config(config: &Config) -> AskResult<Self> {
        let location = Location::parse(&config.base_url)?;
        Ok(Self::new(location, config.error_message.clone()))
    }

    // Accessors

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &PromptInput {
        &self.input
    }

    pub fn new_chat_enabled(&self) -> bool {
        self.new_chat_enabled
    }

    /// New chat is only offered once there is a conversation to leave
    pub fn new_chat_visible(&self) -> bool {
        self.layout == Layout::Conversation
    }

    pub fn header(&self) -> Option<&str> {
        match self.layout {
            Layout::Empty => self.header.as_deref(),
            Layout::Conversation => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// A page load has been handed out and hasn't landed yet
    pub fn is_navigating(&self) -> bool {
        self.navigating
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingRequest> {
        self.pending.as_ref()
    }

    /// Text of the pending indicator, if one is showing
    pub fn indicator_text(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.indicator.text())
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Returns and clears the scroll-to-bottom request
    pub fn take_scroll_to_bottom(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_bottom)
    }

    // Prompt editing. Ignored while the input is disabled.

    pub fn set_input(&mut self, value: impl Into<String>) {
        if self.input.enabled {
            self.input.value = value.into();
        }
    }

    pub fn input_mut(&mut self) -> Option<&mut String> {
        if self.input.enabled {
            Some(&mut self.input.value)
        } else {
            None
        }
    }

    // Submission

    /// Submit key handling: auto-repeats never submit, and the default
    /// action is always suppressed so no newline lands in the prompt.
    pub fn handle_submit_key(&mut self, key: KeyPress) -> KeyOutcome {
        let submission = if key.repeat {
            None
        } else {
            self.submit_question()
        };
        KeyOutcome {
            submission,
            suppress_default: true,
        }
    }

    /// Accept the current input as a question. Returns `None` when the input
    /// is blank or a request is already pending.
    pub fn submit_question(&mut self) -> Option<Submission> {
        if self.navigating {
            debug!("submit ignored, page load in flight");
            return None;
        }
        if self.pending.is_some() || !self.input.enabled {
            debug!("submit ignored, request already pending");
            return None;
        }

        let question = self.input.value.clone();
        if question.trim().is_empty() {
            return None;
        }

        let endpoint = match self.location.ask_endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                error!(error = %e, "cannot resolve question endpoint");
                return None;
            }
        };

        self.input.value = WAIT_PLACEHOLDER.to_string();
        self.input.enabled = false;
        self.new_chat_enabled = false;

        self.append(Message::human(markup::escape(&question)));

        let token = self.next_token;
        self.next_token += 1;
        self.start_pending_indicator(token);
        self.scroll_to_bottom = true;

        info!(token, "question submitted");
        Some(Submission {
            token,
            question,
            endpoint,
        })
    }

    /// Deliver the outcome of a submission. Outcomes for anything but the
    /// current request are dropped.
    pub fn complete(&mut self, token: u64, result: Result<Answer, AskError>) {
        match &self.pending {
            Some(pending) if pending.token == token => {}
            _ => {
                warn!(token, "ignoring completion for a request that is not pending");
                return;
            }
        }

        self.stop_pending_indicator();

        let message = match result {
            Ok(answer) => Message::ai(answer.answer, answer.elapsed),
            Err(e) => {
                error!(token, error = %e, "question failed");
                Message::ai(self.error_message.clone(), 0.0)
            }
        };
        self.append(message);

        self.scroll_to_bottom = true;
        self.input.value.clear();
        self.input.enabled = !self.navigating;
        self.new_chat_enabled = !self.navigating;
    }

    // Pending indicator

    fn start_pending_indicator(&mut self, token: u64) {
        self.pending = Some(PendingRequest {
            token,
            indicator: PendingIndicator::start(),
        });
    }

    fn stop_pending_indicator(&mut self) {
        self.pending = None;
    }

    /// Advance the indicator one frame; a no-op when nothing is pending
    pub fn tick(&mut self) {
        if let Some(pending) = self.pending.as_mut() {
            pending.indicator.tick();
        }
    }

    // Layout

    fn append(&mut self, message: Message) {
        if self.transcript.is_empty() {
            self.layout_for_first_message();
        }
        self.transcript.push(message);
    }

    /// Reveal the transcript, drop the header, show new chat and move the
    /// prompt to the bottom. Runs once per page.
    pub fn layout_for_first_message(&mut self) {
        if self.layout == Layout::Conversation {
            return;
        }
        debug!("switching to conversation layout");
        self.layout = Layout::Conversation;
    }

    // Page lifecycle

    /// Set the new chat flag on the location and hand back the page load
    /// that starts the fresh conversation
    pub fn request_new_chat(&mut self) -> Option<Navigation> {
        if !self.new_chat_enabled || self.navigating {
            return None;
        }
        info!("new chat requested");
        let url = self.location.with_new_chat_flag();
        Some(self.begin_navigation(url))
    }

    /// The load the front end performs at startup
    pub fn initial_navigation(&mut self) -> Navigation {
        let url = self.location.url().clone();
        self.begin_navigation(url)
    }

    /// Nothing can be submitted until the page lands; the load replaces the
    /// whole transcript.
    fn begin_navigation(&mut self, url: Url) -> Navigation {
        self.navigating = true;
        self.input.enabled = false;
        self.new_chat_enabled = false;
        Navigation { url }
    }

    /// The page load failed; the current page stays and becomes usable again
    pub fn navigation_failed(&mut self) {
        if !self.navigating {
            return;
        }
        self.navigating = false;
        if self.pending.is_none() {
            self.input.enabled = true;
            self.new_chat_enabled = true;
        }
    }

    /// Replace all page state with a freshly loaded page, as a navigation
    /// would, then strip the one-shot flag from the location
    pub fn load_page(&mut self, url: Url, page: Page) {
        self.location = Location::from(url);
        self.transcript = page.transcript;
        self.header = page.header;
        self.title = page.title;
        self.layout = if self.transcript.is_empty() {
            Layout::Empty
        } else {
            Layout::Conversation
        };
        self.input = PromptInput {
            value: String::new(),
            enabled: true,
        };
        self.new_chat_enabled = true;
        self.navigating = false;
        self.pending = None;
        self.scroll_to_bottom = true;
        self.clear_new_chat_flag();
    }

    /// Remove the new chat flag from the location without navigating
    pub fn clear_new_chat_flag(&mut self) -> bool {
        let cleared = self.location.clear_new_chat_flag();
        if cleared {
            debug!(location = self.location.as_str(), "cleared new chat flag");
        }
        cleared
    }

    // Copy

    pub fn copy_selection(&self, selection: Selection) -> Option<ClipboardPayload> {
        clipboard::copy_selection(self.transcript.messages(), selection)
    }
}
