use crate::bot_help::BotHelp;
use crate::chat::ChatEvent;
use crate::extract::{extract_driver_info, extract_quoted, ExtractedRecord};
use crate::message_handle::reply;
use crate::processor::ProcessRequest;
use crate::status::CommandStatus;
use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Input problems answered with a usage message. The display text is what
/// the chat sees.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("❌ Could not extract text from the message")]
    EmptyMessage,
    #[error("❌ Please reply to a message with '{0}' command")]
    DriverInfoWithoutQuote(String),
    #[error("❌ Could not extract text from the original message")]
    EmptyOriginal,
    #[error("❌ Please reply to a message or use '{0}' with driver info")]
    MissingQuote(String),
    #[error("❌ Could not extract text from the replied message")]
    EmptyReplied,
}

/// The trigger phrase appears anywhere in a message someone else sent.
pub fn is_triggered(event: &ChatEvent, trigger: &str) -> bool {
    !event.from_self && event.text.to_lowercase().contains(&trigger.to_lowercase())
}

/// Builds the record for a triggering message and the text it quotes.
///
/// A message starting with the trigger may carry a driver line; its fields
/// override those found in the quoted message.
pub fn build_record(
    trigger: &str,
    text: &str,
    quoted: Option<&str>,
) -> Result<ExtractedRecord, UsageError> {
    if text.is_empty() {
        return Err(UsageError::EmptyMessage);
    }
    let driver_command = text.trim().to_lowercase().starts_with(&trigger.to_lowercase());
    let quoted = match (quoted, driver_command) {
        (None, true) => return Err(UsageError::DriverInfoWithoutQuote(trigger.to_string())),
        (None, false) => return Err(UsageError::MissingQuote(trigger.to_string())),
        (Some(""), true) => return Err(UsageError::EmptyOriginal),
        (Some(""), false) => return Err(UsageError::EmptyReplied),
        (Some(quoted), _) => quoted,
    };

    let mut record = extract_quoted(quoted);
    if driver_command {
        let driver = extract_driver_info(text);
        if driver.is_present() {
            record.driver_name = driver.driver_name;
            record.driver_license = driver.driver_license;
            record.overlay(driver.additional);
        } else {
            warn!("No Driver Line In Command");
        }
    }
    Ok(record)
}

/// Runs one triggering event to completion. Never returns an error: anything
/// unexpected is logged and answered with a generic failure reply.
pub async fn handle_command(event: ChatEvent, bot_help: Arc<BotHelp>) -> CommandStatus {
    match respond(&event, &bot_help).await {
        Ok(status) => status,
        Err(err) => {
            error!("Command From {} Failed: {:?}", event.conversation, err);
            if let Err(send_err) = bot_help
                .send_text(event.conversation, reply::COMMAND_FAILED, Some(&event.message_id))
                .await
            {
                error!("Send Failure Reply Error: {:?}", send_err);
            }
            CommandStatus::Failed
        }
    }
}

async fn respond(event: &ChatEvent, bot_help: &BotHelp) -> Result<CommandStatus> {
    let conversation = event.conversation;
    bot_help
        .contexts
        .remember(conversation, event.message_id.clone());
    bot_help
        .send_text(conversation, reply::PROCESSING_NOTICE, None)
        .await?;

    let quoted = match &event.quoted_id {
        Some(id) => Some(bot_help.sender.fetch_text(id).await?),
        None => None,
    };
    let record = match build_record(&bot_help.trigger, &event.text, quoted.as_deref()) {
        Ok(record) => record,
        Err(usage) => {
            info!("Rejected Command From {}: {:?}", conversation, usage);
            bot_help
                .send_text(conversation, usage.to_string(), Some(&event.message_id))
                .await?;
            return Ok(CommandStatus::Rejected);
        }
    };
    if record.is_empty() {
        warn!("No Fields Found In Quoted Message From {}", conversation);
    } else {
        info!("Extracted Record: {:?}", record);
    }
    bot_help
        .send_text(conversation, reply::summary(&record), None)
        .await?;

    let request = ProcessRequest::new(&record, conversation, &event.message_id);
    match bot_help.processor.dispatch(&request).await {
        Ok(response) => {
            info!("Record From {} Processed", conversation);
            bot_help
                .send_text(
                    conversation,
                    reply::processing_succeeded(response.processed_data.as_ref()),
                    Some(&event.message_id),
                )
                .await?;
            Ok(CommandStatus::Responded)
        }
        Err(dispatch_error) => {
            warn!("Processing Record From {} Failed: {:?}", conversation, dispatch_error);
            bot_help
                .send_text(
                    conversation,
                    reply::processing_failed(&dispatch_error),
                    Some(&event.message_id),
                )
                .await?;
            Ok(CommandStatus::Failed)
        }
    }
}
