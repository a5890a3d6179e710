use crate::chat::Conversation;
use chrono::{DateTime, Duration, Local};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// Last message worth replying to in a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationContext {
    pub message_id: String,
    pub stored_at: DateTime<Local>,
}

/// Reply-to contexts keyed by conversation, expired by [`ContextCache::sweep`].
pub struct ContextCache {
    retention: Duration,
    contexts: Mutex<HashMap<Conversation, ConversationContext>>,
}

impl ContextCache {
    pub fn new(retention: Duration) -> Self {
        ContextCache {
            retention,
            contexts: Mutex::new(HashMap::new()),
        }
    }

    pub fn remember(&self, conversation: Conversation, message_id: String) {
        self.insert(
            conversation,
            ConversationContext {
                message_id,
                stored_at: Local::now(),
            },
        );
    }

    pub fn insert(&self, conversation: Conversation, context: ConversationContext) {
        debug!("Stored Message Context For {}: {}", conversation, context.message_id);
        self.contexts.lock().insert(conversation, context);
    }

    pub fn reply_target(&self, conversation: &Conversation) -> Option<String> {
        self.contexts
            .lock()
            .get(conversation)
            .map(|context| context.message_id.clone())
    }

    pub fn forget(&self, conversation: &Conversation) -> bool {
        self.contexts.lock().remove(conversation).is_some()
    }

    pub fn clear(&self) -> usize {
        let mut contexts = self.contexts.lock();
        let cleared = contexts.len();
        contexts.clear();
        cleared
    }

    /// Drops contexts older than the retention window. Returns how many went.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Local::now())
    }

    fn sweep_at(&self, now: DateTime<Local>) -> usize {
        let cutoff = now - self.retention;
        let mut contexts = self.contexts.lock();
        let before = contexts.len();
        contexts.retain(|_, context| context.stored_at >= cutoff);
        before - contexts.len()
    }

    pub fn len(&self) -> usize {
        self.contexts.lock().len()
    }
}
