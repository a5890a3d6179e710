//! HTTP receiver for messages pushed by the processing service.

use crate::bot_help::BotHelp;
use crate::chat::{Conversation, outgoing};
use crate::config::RelayConfig;
use crate::message_handle::reply::{status_text, StatusData};
use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use onebot_v11::MessageSegment;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

type RelayResult = (StatusCode, Json<RelayResponse>);

fn ok(message: &str) -> RelayResult {
    (
        StatusCode::OK,
        Json(RelayResponse {
            success: true,
            message: Some(message.to_string()),
            error: None,
        }),
    )
}

fn fail(status: StatusCode, error: impl ToString) -> RelayResult {
    (
        status,
        Json(RelayResponse {
            success: false,
            message: None,
            error: Some(error.to_string()),
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub chat_id: Option<String>,
    pub message: Option<Value>,
    #[serde(default = "default_message_type")]
    pub message_type: String,
    #[serde(default)]
    pub reply_to_original: bool,
}

#[derive(Debug, Deserialize)]
pub struct SendStatusRequest {
    pub chat_id: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<StatusData>,
    #[serde(default = "default_reply_to_original")]
    pub reply_to_original: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClearContextRequest {
    #[serde(default)]
    pub chat_id: Option<String>,
}

/// Body of a JSON request, with malformed bodies answered in the relay's own
/// `{success:false,error}` shape.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, RelayResult> {
    body.map(|Json(body)| body)
        .map_err(|rejection| fail(rejection.status(), rejection.body_text()))
}

/// Missing and empty strings are both absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn default_message_type() -> String {
    "text".to_string()
}

fn default_reply_to_original() -> bool {
    true
}

pub fn router(bot_help: Arc<BotHelp>) -> Router {
    Router::new()
        .route("/send-message", post(send_message))
        .route("/send-status", post(send_status))
        .route("/clear-context", post(clear_context))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(bot_help)
}

pub async fn serve(config: &RelayConfig, bot_help: Arc<BotHelp>) -> Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Relay Listening On {}", listener.local_addr()?);
    axum::serve(listener, router(bot_help)).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Reply target for a conversation when threading was asked for.
fn threaded(bot_help: &BotHelp, conversation: &Conversation, reply_to_original: bool) -> Option<String> {
    if !reply_to_original {
        return None;
    }
    let target = bot_help.contexts.reply_target(conversation);
    if target.is_none() {
        warn!("No Message Context Found For {}", conversation);
    }
    target
}

fn message_segments(message_type: &str, message: &Value) -> Result<Vec<MessageSegment>, String> {
    match (message_type, message) {
        ("text", Value::String(text)) if !text.is_empty() => Ok(vec![MessageSegment::text(text.clone())]),
        ("text", _) => Err("message must be a non-empty string".to_string()),
        ("image", Value::Object(image)) => {
            let url = image
                .get("url")
                .and_then(Value::as_str)
                .ok_or_else(|| "image message needs a url".to_string())?;
            let mut segments = vec![MessageSegment::image(
                url.to_string(),
                None::<String>,
                None::<String>,
                None,
                None,
                None,
            )];
            if let Some(caption) = image.get("caption").and_then(Value::as_str).filter(|c| !c.is_empty()) {
                segments.push(MessageSegment::text(caption.to_string()));
            }
            Ok(segments)
        }
        ("image", _) => Err("image message must be an object".to_string()),
        (other, _) => Err(format!("unsupported message_type `{}`", other)),
    }
}

async fn send_message(
    State(bot_help): State<Arc<BotHelp>>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> RelayResult {
    let request = match json_body(body) {
        Ok(request) => request,
        Err(rejected) => return rejected,
    };
    let (Some(chat_id), Some(message)) = (non_empty(request.chat_id), request.message) else {
        return fail(StatusCode::BAD_REQUEST, "chat_id and message are required");
    };
    let conversation = match chat_id.parse::<Conversation>() {
        Ok(conversation) => conversation,
        Err(err) => return fail(StatusCode::BAD_REQUEST, err),
    };
    let mut segments = match message_segments(&request.message_type, &message) {
        Ok(segments) => segments,
        Err(err) => return fail(StatusCode::BAD_REQUEST, err),
    };
    if let Some(target) = threaded(&bot_help, &conversation, request.reply_to_original) {
        segments.insert(0, MessageSegment::reply(target));
    }
    match bot_help.sender.send(conversation, segments).await {
        Ok(()) => {
            info!("Relayed Message To {}", conversation);
            ok("Message sent successfully")
        }
        Err(err) => {
            error!("Relay Message To {} Error: {:?}", conversation, err);
            fail(StatusCode::INTERNAL_SERVER_ERROR, err)
        }
    }
}

async fn send_status(
    State(bot_help): State<Arc<BotHelp>>,
    body: Result<Json<SendStatusRequest>, JsonRejection>,
) -> RelayResult {
    let request = match json_body(body) {
        Ok(request) => request,
        Err(rejected) => return rejected,
    };
    let (Some(chat_id), Some(status)) = (non_empty(request.chat_id), non_empty(request.status)) else {
        return fail(StatusCode::BAD_REQUEST, "chat_id and status are required");
    };
    let conversation = match chat_id.parse::<Conversation>() {
        Ok(conversation) => conversation,
        Err(err) => return fail(StatusCode::BAD_REQUEST, err),
    };
    let text = status_text(&status, request.data.as_ref());
    let target = threaded(&bot_help, &conversation, request.reply_to_original);
    if let Err(err) = bot_help
        .sender
        .send(conversation, outgoing(text, target.as_deref()))
        .await
    {
        error!("Relay Status To {} Error: {:?}", conversation, err);
        return fail(StatusCode::INTERNAL_SERVER_ERROR, err);
    }
    info!("Relayed Status {} To {}", status, conversation);
    let swept = bot_help.contexts.sweep();
    if swept > 0 {
        info!(
            "Swept {} Expired Message Contexts, {} Remaining",
            swept,
            bot_help.contexts.len()
        );
    }
    ok("Status sent successfully")
}

async fn clear_context(
    State(bot_help): State<Arc<BotHelp>>,
    request: Option<Json<ClearContextRequest>>,
) -> RelayResult {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    match request.chat_id {
        Some(chat_id) => match chat_id.parse::<Conversation>() {
            Ok(conversation) => {
                bot_help.contexts.forget(&conversation);
                info!("Cleared Message Context For {}", conversation);
            }
            Err(err) => return fail(StatusCode::BAD_REQUEST, err),
        },
        None => {
            let cleared = bot_help.contexts.clear();
            info!("Cleared All {} Message Contexts", cleared);
        }
    }
    ok("Context cleared successfully")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::testing::RecordingSender;
    use crate::config::CoreConfig;
    use crate::context::ConversationContext;
    use crate::processor::{DispatchError, ProcessRequest, ProcessResponse, Processor};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::{Duration, Local};
    use tower::ServiceExt;

    struct Unused;

    #[async_trait]
    impl Processor for Unused {
        async fn dispatch(&self, _: &ProcessRequest) -> Result<ProcessResponse, DispatchError> {
            Err(DispatchError::Transport("not used".to_string()))
        }
    }

    fn bot(sender: Arc<RecordingSender>) -> Arc<BotHelp> {
        Arc::new(BotHelp::new(&CoreConfig::default(), sender, Arc::new(Unused)))
    }

    async fn call(bot_help: Arc<BotHelp>, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(bot_help).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_raw(bot_help: Arc<BotHelp>, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        call(bot_help, request).await
    }

    async fn post_json(bot_help: Arc<BotHelp>, uri: &str, body: Value) -> (StatusCode, Value) {
        post_raw(bot_help, uri, &body.to_string()).await
    }

    #[tokio::test]
    async fn status_push_is_threaded_under_stored_context() {
        let sender = Arc::new(RecordingSender::default());
        let bot_help = bot(sender.clone());
        bot_help.contexts.remember(Conversation::Group(9), "321".to_string());

        let (status, body) = post_json(
            bot_help,
            "/send-status",
            serde_json::json!({"chat_id": "group:9", "status": "completed", "data": {"result": "Gate pass 17"}}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let texts = sender.texts();
        assert_eq!(texts[0].0, Conversation::Group(9));
        assert_eq!(texts[0].1.as_deref(), Some("321"));
        assert!(texts[0].2.ends_with("Gate pass 17"));
    }

    #[tokio::test]
    async fn status_push_sweeps_expired_contexts() {
        let sender = Arc::new(RecordingSender::default());
        let bot_help = bot(sender.clone());
        bot_help.contexts.insert(
            Conversation::Private(3),
            ConversationContext {
                message_id: "1".to_string(),
                stored_at: Local::now() - Duration::hours(2),
            },
        );

        let (status, _) = post_json(
            bot_help.clone(),
            "/send-status",
            serde_json::json!({"chat_id": "group:9", "status": "processing", "reply_to_original": false}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(bot_help.contexts.len(), 0);
        assert!(sender.texts()[0].1.is_none());
    }

    #[tokio::test]
    async fn send_message_requires_chat_id_and_message() {
        let sender = Arc::new(RecordingSender::default());
        let (status, body) = post_json(
            bot(sender.clone()),
            "/send-message",
            serde_json::json!({"message": "hello"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "chat_id and message are required");
        assert!(sender.texts().is_empty());
    }

    #[tokio::test]
    async fn send_message_relays_plain_text() {
        let sender = Arc::new(RecordingSender::default());
        let (status, body) = post_json(
            bot(sender.clone()),
            "/send-message",
            serde_json::json!({"chat_id": "private:55", "message": "Truck left the gate"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Message sent successfully");
        assert_eq!(
            sender.texts(),
            vec![(Conversation::Private(55), None, "Truck left the gate".to_string())]
        );
    }

    #[tokio::test]
    async fn unknown_message_type_is_rejected() {
        let sender = Arc::new(RecordingSender::default());
        let (status, _) = post_json(
            bot(sender),
            "/send-message",
            serde_json::json!({"chat_id": "group:1", "message": "x", "message_type": "video"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn clear_context_by_key_or_entirely() {
        let bot_help = bot(Arc::new(RecordingSender::default()));
        bot_help.contexts.remember(Conversation::Group(1), "1".to_string());
        bot_help.contexts.remember(Conversation::Group(2), "2".to_string());

        let (status, _) =
            post_json(bot_help.clone(), "/clear-context", serde_json::json!({"chat_id": "group:1"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bot_help.contexts.len(), 1);

        let (status, body) = post_json(bot_help.clone(), "/clear-context", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Context cleared successfully");
        assert_eq!(bot_help.contexts.len(), 0);
    }

    #[tokio::test]
    async fn image_message_carries_the_caption() {
        let sender = Arc::new(RecordingSender::default());
        let (status, _) = post_json(
            bot(sender.clone()),
            "/send-message",
            serde_json::json!({
                "chat_id": "group:1",
                "message_type": "image",
                "message": {"url": "http://x/a.png", "caption": "c"}
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let sent = sender.sent.lock();
        assert!(matches!(sent[0].1[0], MessageSegment::Image { .. }));
        assert_eq!(crate::chat::segments_text(&sent[0].1), "c");
    }

    #[tokio::test]
    async fn send_message_threads_under_stored_context_when_asked() {
        let sender = Arc::new(RecordingSender::default());
        let bot_help = bot(sender.clone());
        bot_help.contexts.remember(Conversation::Group(4), "77".to_string());

        let (status, _) = post_json(
            bot_help,
            "/send-message",
            serde_json::json!({"chat_id": "group:4", "message": "Loaded", "reply_to_original": true}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            sender.texts(),
            vec![(Conversation::Group(4), Some("77".to_string()), "Loaded".to_string())]
        );
    }

    #[tokio::test]
    async fn failed_delivery_is_a_server_error() {
        let bot_help = bot(Arc::new(RecordingSender::failing()));
        let (status, body) = post_json(
            bot_help.clone(),
            "/send-message",
            serde_json::json!({"chat_id": "group:2", "message": "hello"}),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("group:2"));

        let (status, _) = post_json(
            bot_help,
            "/send-status",
            serde_json::json!({"chat_id": "group:2", "status": "processing"}),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn empty_status_is_treated_as_missing() {
        let sender = Arc::new(RecordingSender::default());
        let (status, body) = post_json(
            bot(sender.clone()),
            "/send-status",
            serde_json::json!({"chat_id": "group:9", "status": ""}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "chat_id and status are required");
        assert!(sender.texts().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_gets_the_relay_error_shape() {
        let sender = Arc::new(RecordingSender::default());
        let (status, body) = post_raw(bot(sender.clone()), "/send-status", "{\"chat_id\": ").await;
        assert!(status.is_client_error());
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());

        let (status, body) = post_raw(bot(sender.clone()), "/send-message", "[1, 2]").await;
        assert!(status.is_client_error());
        assert_eq!(body["success"], false);
        assert!(sender.texts().is_empty());
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = call(bot(Arc::new(RecordingSender::default())), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"status": "ok"}));
    }
}
