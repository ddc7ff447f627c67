//! Planning assistant chat.
//!
//! Replies come from an external text generator behind [`ReplyGenerator`]. The built-in
//! [`CannedReplies`] only cycles through configured suggestions after a short delay;
//! it does not interpret the prompt.

use crate::config::settings::AssistantSettings;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

/// Produces the assistant's answer to a prompt.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Answer to `prompt`.
    async fn reply(&self, prompt: &str) -> Result<String>;
}

/// Cycles through fixed replies.
#[derive(Debug)]
pub struct CannedReplies {
    replies: Vec<String>,
    delay: Duration,
    next: AtomicUsize,
}

impl CannedReplies {
    /// Fails when `replies` is empty.
    pub fn new(replies: Vec<String>, delay: Duration) -> Result<Self> {
        if replies.is_empty() {
            return Err(Error::Config {
                message: "assistant needs at least one canned reply".to_string(),
            });
        }
        Ok(Self {
            replies,
            delay,
            next: AtomicUsize::new(0),
        })
    }

    /// Builds the generator from the `[assistant]` settings.
    pub fn from_settings(settings: &AssistantSettings) -> Result<Self> {
        Self::new(
            settings.replies.clone(),
            Duration::from_millis(settings.reply_delay_ms),
        )
    }
}

#[async_trait]
impl ReplyGenerator for CannedReplies {
    async fn reply(&self, prompt: &str) -> Result<String> {
        debug!("Canned reply for prompt of {} chars", prompt.len());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.replies.len();
        Ok(self.replies[index].clone())
    }
}

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The planner's user
    User,
    /// The assistant
    Assistant,
}

/// One line of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author
    pub role: Role,
    /// Text
    pub content: String,
}

/// Chat transcript, opened by the assistant's greeting.
#[derive(Debug, Clone)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    /// Starts a transcript with `greeting` from the assistant.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: Role::Assistant,
                content: greeting.into(),
            }],
        }
    }

    /// Messages in order.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Records `prompt` and the generator's reply.
    ///
    /// Blank prompts are ignored and return `Ok(None)`. If the generator fails the
    /// prompt stays in the transcript without a reply.
    pub async fn ask<G>(&mut self, generator: &G, prompt: &str) -> Result<Option<&ChatMessage>>
    where
        G: ReplyGenerator + ?Sized,
    {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(None);
        }

        self.messages.push(ChatMessage {
            role: Role::User,
            content: prompt.to_string(),
        });
        let content = generator.reply(prompt).await?;
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content,
        });
        Ok(self.messages.last())
    }
}
