use crate::utils::reply_message::get_reply_original_message;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use onebot_v11::api::payload::{ApiPayload, SendGroupMsg, SendPrivateMsg};
use onebot_v11::connect::ws::WsConnect;
use onebot_v11::MessageSegment;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

/// A chat a message came from or goes to. Rendered as `group:<id>` or
/// `private:<id>`, which is also the `chat_id` used over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversation {
    Group(i64),
    Private(i64),
}

impl Display for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conversation::Group(id) => write!(f, "group:{}", id),
            Conversation::Private(id) => write!(f, "private:{}", id),
        }
    }
}

impl FromStr for Conversation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, id) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| anyhow!("chat id `{}` is not `<kind>:<id>`", s))?;
        let id = id.parse::<i64>()?;
        match kind {
            "group" => Ok(Conversation::Group(id)),
            "private" => Ok(Conversation::Private(id)),
            other => Err(anyhow!("unknown chat kind `{}`", other)),
        }
    }
}

/// Inbound message reduced to what the command handler needs.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub conversation: Conversation,
    pub message_id: String,
    pub sender_id: i64,
    pub from_self: bool,
    pub text: String,
    pub quoted_id: Option<String>,
}

impl ChatEvent {
    pub fn from_segments(
        conversation: Conversation,
        message_id: String,
        sender_id: i64,
        self_id: i64,
        segments: &[MessageSegment],
    ) -> Self {
        ChatEvent {
            conversation,
            message_id,
            sender_id,
            from_self: sender_id == self_id,
            text: segments_text(segments),
            quoted_id: reply_target(segments),
        }
    }
}

/// Concatenated text of every text segment.
pub fn segments_text(segments: &[MessageSegment]) -> String {
    segments
        .iter()
        .filter_map(|segment| match segment {
            MessageSegment::Text { data } => Some(data.text.as_str()),
            _ => None,
        })
        .collect()
}

/// Id of the message a reply segment points at, if any.
pub fn reply_target(segments: &[MessageSegment]) -> Option<String> {
    segments.iter().find_map(|segment| match segment {
        MessageSegment::Reply { data } => Some(data.id.clone()),
        _ => None,
    })
}

/// Text message, threaded under `reply_to` when given.
pub fn outgoing(text: impl Into<String>, reply_to: Option<&str>) -> Vec<MessageSegment> {
    let mut message = Vec::with_capacity(2);
    if let Some(id) = reply_to {
        message.push(MessageSegment::reply(id.to_string()));
    }
    message.push(MessageSegment::text(text.into()));
    message
}

#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send(&self, conversation: Conversation, message: Vec<MessageSegment>) -> Result<()>;

    /// Text body of an earlier message, looked up by id.
    async fn fetch_text(&self, message_id: &str) -> Result<String>;
}

pub struct OneBotSender {
    ws_connect: Arc<WsConnect>,
}

impl OneBotSender {
    pub fn new(ws_connect: Arc<WsConnect>) -> Self {
        OneBotSender { ws_connect }
    }
}

#[async_trait]
impl ChatSender for OneBotSender {
    async fn send(&self, conversation: Conversation, message: Vec<MessageSegment>) -> Result<()> {
        let payload = match conversation {
            Conversation::Group(group_id) => ApiPayload::SendGroupMsg(SendGroupMsg {
                group_id,
                message,
                auto_escape: false,
            }),
            Conversation::Private(user_id) => ApiPayload::SendPrivateMsg(SendPrivateMsg {
                user_id,
                message,
                auto_escape: false,
            }),
        };
        self.ws_connect.clone().call_api(payload).await?;
        Ok(())
    }

    async fn fetch_text(&self, message_id: &str) -> Result<String> {
        let original =
            get_reply_original_message(message_id.to_string(), self.ws_connect.clone()).await?;
        Ok(segments_text(&original.message))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Records every outgoing message instead of talking to a chat server.
    #[derive(Default)]
    pub struct RecordingSender {
        pub sent: Mutex<Vec<(Conversation, Vec<MessageSegment>)>>,
        pub originals: HashMap<String, String>,
        pub fail_sends: bool,
    }

    impl RecordingSender {
        /// A sender whose every send errors, as a dropped OneBot link would.
        pub fn failing() -> Self {
            RecordingSender {
                fail_sends: true,
                ..Default::default()
            }
        }

        pub fn with_original(mut self, message_id: &str, text: &str) -> Self {
            self.originals.insert(message_id.to_string(), text.to_string());
            self
        }

        /// `(conversation, reply target, text)` for each sent message.
        pub fn texts(&self) -> Vec<(Conversation, Option<String>, String)> {
            self.sent
                .lock()
                .iter()
                .map(|(conversation, message)| {
                    (*conversation, reply_target(message), segments_text(message))
                })
                .collect()
        }
    }

    #[async_trait]
    impl ChatSender for RecordingSender {
        async fn send(&self, conversation: Conversation, message: Vec<MessageSegment>) -> Result<()> {
            if self.fail_sends {
                return Err(anyhow!("Send Message To {} Failed", conversation));
            }
            self.sent.lock().push((conversation, message));
            Ok(())
        }

        async fn fetch_text(&self, message_id: &str) -> Result<String> {
            self.originals
                .get(message_id)
                .cloned()
                .ok_or_else(|| anyhow!("Get Original Message Failed"))
        }
    }
}
