use crate::chat::{outgoing, ChatSender, Conversation};
use crate::config::CoreConfig;
use crate::context::ContextCache;
use crate::processor::Processor;
use anyhow::Result;
use chrono::Duration;
use std::sync::Arc;

/// Shared handles for the command handler and the relay receiver.
pub struct BotHelp {
    pub trigger: String,
    pub contexts: ContextCache,
    pub sender: Arc<dyn ChatSender>,
    pub processor: Arc<dyn Processor>,
}

impl BotHelp {
    pub fn new(
        config: &CoreConfig,
        sender: Arc<dyn ChatSender>,
        processor: Arc<dyn Processor>,
    ) -> Self {
        BotHelp {
            trigger: config.command.trigger.clone(),
            contexts: ContextCache::new(Duration::seconds(config.context.retention_secs)),
            sender,
            processor,
        }
    }

    pub async fn send_text(
        &self,
        conversation: Conversation,
        text: impl Into<String>,
        reply_to: Option<&str>,
    ) -> Result<()> {
        self.sender
            .send(conversation, outgoing(text, reply_to))
            .await
    }
}
