use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{AskError, AskResult};
use crate::page::Page;

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

/// Successful reply from the question endpoint
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Answer {
    /// Rendered HTML
    pub answer: String,
    /// Server-side processing time in seconds
    pub elapsed: f64,
}

/// HTTP side of the chat page. Cookies are kept for the life of the client
/// so the server keeps attributing questions to the same conversation.
#[derive(Clone)]
pub struct RagClient {
    client: Client,
}

impl RagClient {
    pub fn new(timeout: Option<Duration>) -> AskResult<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// POST `{"question": ...}` and decode `{"answer": ..., "elapsed": ...}`
    pub async fn ask(&self, endpoint: &Url, question: &str) -> AskResult<Answer> {
        debug!(%endpoint, "submitting question");

        let response = self
            .client
            .post(endpoint.clone())
            .json(&AskRequest { question })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AskError::Status { status });
        }

        let body = response.bytes().await?;
        let answer: Answer = serde_json::from_slice(&body)?;
        info!(elapsed = answer.elapsed, "received answer");
        Ok(answer)
    }

    /// Full page load, the equivalent of navigating to `location`
    pub async fn load_page(&self, location: &Url) -> AskResult<Page> {
        debug!(%location, "loading page");

        let response = self.client.get(location.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AskError::Status { status });
        }

        let html = response.text().await?;
        Ok(Page::parse(&html))
    }
}
