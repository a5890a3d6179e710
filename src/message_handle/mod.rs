use crate::bot_help::BotHelp;
use crate::chat::{ChatEvent, Conversation};
use crate::status::CommandStatus;
use onebot_v11::event::message::Message;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub mod command;
pub mod reply;

pub fn chat_event(message: Message) -> ChatEvent {
    match message {
        Message::PrivateMessage(msg) => ChatEvent::from_segments(
            Conversation::Private(msg.user_id),
            msg.message_id.to_string(),
            msg.user_id,
            msg.self_id,
            &msg.message,
        ),
        Message::GroupMessage(msg) => ChatEvent::from_segments(
            Conversation::Group(msg.group_id),
            msg.message_id.to_string(),
            msg.user_id,
            msg.self_id,
            &msg.message,
        ),
    }
}

/// Hands a triggering message to its own task so a slow processing service
/// does not hold up the event loop.
pub fn handle_message(
    message: Message,
    bot_help: Arc<BotHelp>,
) -> Option<JoinHandle<CommandStatus>> {
    let event = chat_event(message);
    debug!("Message From {} Sender {}: {:?}", event.conversation, event.sender_id, event.text);
    if !command::is_triggered(&event, &bot_help.trigger) {
        return None;
    }
    info!("Recv Command From {} Sender {}", event.conversation, event.sender_id);
    Some(tokio::spawn(async move {
        let conversation = event.conversation;
        let status = command::handle_command(event, bot_help).await;
        info!("Command From {} {}", conversation, status);
        status
    }))
}
