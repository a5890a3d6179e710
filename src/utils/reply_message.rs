use anyhow::{anyhow, Result};
use onebot_v11::api::payload::{ApiPayload, GetMsg};
use onebot_v11::api::resp::{ApiRespData, GetMsgResponse};
use onebot_v11::connect::ws::WsConnect;
use std::sync::Arc;
use tracing::debug;

/// Looks up the message a reply points at.
pub async fn get_reply_original_message(
    message_id: String,
    ws_connect: Arc<WsConnect>,
) -> Result<GetMsgResponse> {
    debug!("Get Original Message: {}", message_id);
    let search_result = ws_connect
        .call_api(ApiPayload::GetMsg(GetMsg {
            message_id: message_id.parse()?,
        }))
        .await?;
    if let ApiRespData::GetMsgResponse(resp) = search_result.data {
        return Ok(resp);
    }
    Err(anyhow!("Get Original Message {} Failed", message_id))
}
