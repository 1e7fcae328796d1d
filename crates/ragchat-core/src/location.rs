//! The chat page's address and its one-shot "new chat" signal.

use url::Url;

use crate::error::AskResult;

/// Query parameter that asks the server to start a fresh conversation
pub const NEW_CHAT_PARAM: &str = "newchat";

/// Path of the question endpoint, relative to the chat page
pub const ASK_PATH: &str = "api/ask_question";

/// Current page address, as it would appear in an address bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    pub fn parse(input: &str) -> AskResult<Self> {
        Ok(Self { url: Url::parse(input)? })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// True when the flag is present with a non-empty value
    pub fn has_new_chat_flag(&self) -> bool {
        self.url
            .query_pairs()
            .any(|(key, value)| key == NEW_CHAT_PARAM && !value.is_empty())
    }

    /// This location with `newchat=1` set, keeping the rest of the query
    pub fn with_new_chat_flag(&self) -> Url {
        let mut url = self.url.clone();
        let mut pairs = other_pairs(&url);
        pairs.push((NEW_CHAT_PARAM.to_string(), "1".to_string()));
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url
    }

    /// Strip the flag without navigating. Returns whether anything changed;
    /// a location without the flag is left exactly as it was.
    pub fn clear_new_chat_flag(&mut self) -> bool {
        if !self.has_new_chat_flag() {
            return false;
        }

        let pairs = other_pairs(&self.url);
        if pairs.is_empty() {
            self.url.set_query(None);
        } else {
            self.url.query_pairs_mut().clear().extend_pairs(pairs);
        }
        true
    }

    /// Question endpoint, resolved against the page like a relative fetch
    pub fn ask_endpoint(&self) -> AskResult<Url> {
        Ok(self.url.join(ASK_PATH)?)
    }
}

impl From<Url> for Location {
    fn from(url: Url) -> Self {
        Self { url }
    }
}

fn other_pairs(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .filter(|(key, _)| key != NEW_CHAT_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}
