//! Client for the external processing service.
//!
//! The service receives an extracted record as JSON and answers with
//! `{status, processed_data?, message?}`. Every failure mode is reported as a
//! [`DispatchError`] so the command handler can tell the chat what went wrong.

use crate::chat::Conversation;
use crate::config::ProcessorConfig;
use crate::extract::ExtractedRecord;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Record fields under the names the processing service uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayload {
    pub driver_name: Option<String>,
    pub driver_license: Option<String>,
    pub vehicle_num: Option<String>,
    pub destination: Option<String>,
    pub weight: Option<String>,
    pub so_no: Option<String>,
    pub phone_num: Option<String>,
}

impl From<&ExtractedRecord> for RecordPayload {
    fn from(record: &ExtractedRecord) -> Self {
        RecordPayload {
            driver_name: record.driver_name.clone(),
            driver_license: record.driver_license.clone(),
            vehicle_num: record.vehicle_number.clone(),
            destination: record.destination.clone(),
            weight: record.weight.clone(),
            so_no: record.so_number.clone(),
            phone_num: record.phone_number.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessRequest {
    #[serde(flatten)]
    pub record: RecordPayload,
    pub chat_id: String,
    /// Echoed back by the service when it later pushes a status.
    pub message_key: String,
}

impl ProcessRequest {
    pub fn new(record: &ExtractedRecord, conversation: Conversation, message_id: &str) -> Self {
        ProcessRequest {
            record: RecordPayload::from(record),
            chat_id: conversation.to_string(),
            message_key: message_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessResponse {
    pub status: ProcessStatus,
    #[serde(default)]
    pub processed_data: Option<RecordPayload>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("processing service did not answer within {0} seconds")]
    Timeout(u64),
    #[error("{0}")]
    Transport(String),
    /// The service answered with `status: "error"`.
    #[error("{message}")]
    Rejected { message: String },
    #[error("unreadable response from processing service: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait Processor: Send + Sync {
    async fn dispatch(&self, request: &ProcessRequest) -> Result<ProcessResponse, DispatchError>;
}

pub struct HttpProcessor {
    client: Client,
    endpoint: Url,
    timeout_secs: u64,
}

impl HttpProcessor {
    pub fn new(config: &ProcessorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(HttpProcessor {
            client,
            endpoint: config.endpoint()?,
            timeout_secs: config.timeout_secs,
        })
    }

    fn transport_error(&self, error: reqwest::Error) -> DispatchError {
        if error.is_timeout() {
            DispatchError::Timeout(self.timeout_secs)
        } else {
            DispatchError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl Processor for HttpProcessor {
    async fn dispatch(&self, request: &ProcessRequest) -> Result<ProcessResponse, DispatchError> {
        debug!("Sending Record To {}: {:?}", self.endpoint, request);
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|error| self.transport_error(error))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| self.transport_error(error))?;
        info!("Processing Service Answered {}", status);
        interpret_response(status, &body)
    }
}

/// Error body that only names a message, as some failure pages do.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Maps an HTTP status and body onto the dispatch outcome.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<ProcessResponse, DispatchError> {
    match serde_json::from_str::<ProcessResponse>(body) {
        Ok(response) if response.status == ProcessStatus::Error || !status.is_success() => {
            Err(DispatchError::Rejected {
                message: response
                    .message
                    .unwrap_or_else(|| format!("processing service returned {}", status)),
            })
        }
        Ok(response) => Ok(response),
        Err(_) if !status.is_success() => {
            match serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(|body| body.message)
                .filter(|message| !message.is_empty())
            {
                Some(message) => Err(DispatchError::Rejected { message }),
                None => Err(DispatchError::Transport(format!(
                    "processing service returned {}",
                    status
                ))),
            }
        }
        Err(error) => Err(DispatchError::Malformed(error.to_string())),
    }
}
