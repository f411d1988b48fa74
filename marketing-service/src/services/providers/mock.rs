//! Mock provider implementation for testing.

use super::{
    ChatMessage, ChatProvider, CompletionParams, FinishReason, ProviderError, ProviderResponse,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock chat provider with scripted replies.
///
/// Replies are handed out in order; the last one repeats once the script
/// runs out. A failing mock errors on every call.
pub struct MockChatProvider {
    replies: Vec<String>,
    fail: bool,
    finish_reason: FinishReason,
    calls: AtomicUsize,
    conversations: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockChatProvider {
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self::with_replies(vec![reply.into()])
    }

    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies,
            fail: false,
            finish_reason: FinishReason::Complete,
            calls: AtomicUsize::new(0),
            conversations: Mutex::new(Vec::new()),
        }
    }

    /// Provider whose every completion fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_replies(Vec::new())
        }
    }

    /// Report `finish_reason` on every reply.
    pub fn with_finish_reason(mut self, finish_reason: FinishReason) -> Self {
        self.finish_reason = finish_reason;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Conversations received so far, one per call.
    pub fn conversations(&self) -> Vec<Vec<ChatMessage>> {
        self.conversations
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _params: &CompletionParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut conversations) = self.conversations.lock() {
            conversations.push(messages.to_vec());
        }

        if self.fail {
            return Err(ProviderError::ApiError(
                "Mock chat provider failure".to_string(),
            ));
        }

        let reply = self
            .replies
            .get(call)
            .or_else(|| self.replies.last())
            .cloned()
            .ok_or_else(|| ProviderError::NotConfigured("Mock has no replies".to_string()))?;

        Ok(ProviderResponse {
            output_tokens: reply.len() as u32 / 4,
            text: Some(reply),
            input_tokens: messages.iter().map(|m| m.content.len() as u32 / 4).sum(),
            finish_reason: self.finish_reason,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
