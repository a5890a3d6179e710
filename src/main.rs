use crate::bot_help::BotHelp;
use crate::chat::OneBotSender;
use crate::config::CoreConfig;
use crate::log::Log;
use crate::processor::HttpProcessor;
use anyhow::Result;
use onebot_v11::connect::ws::WsConnect;
use onebot_v11::Event::*;
use std::sync::Arc;
use tracing::{debug, error, info};

mod bot_help;
mod chat;
mod config;
mod context;
mod extract;
mod log;
mod message_handle;
mod processor;
mod relay;
mod status;
pub(crate) mod utils;

#[tokio::main]
pub async fn main() -> Result<()> {
    let config = CoreConfig::init()?;
    Log::init(&config.log)?;
    let ws_connect = WsConnect::new(config.bot_ws.clone()).await?;
    let mut receiver = ws_connect.subscribe().await;

    let processor = HttpProcessor::new(&config.processor)?;
    let bot_help = Arc::new(BotHelp::new(
        &config,
        Arc::new(OneBotSender::new(ws_connect.clone())),
        Arc::new(processor),
    ));
    info!("Listening For `{}` Commands", bot_help.trigger);

    let relay_config = config.relay.clone();
    let relay_help = bot_help.clone();
    tokio::spawn(async move {
        if let Err(error) = relay::serve(&relay_config, relay_help).await {
            error!("Relay Server Stopped: {:?}", error);
        }
    });

    loop {
        match receiver.recv().await? {
            Message(message) => {
                message_handle::handle_message(message, bot_help.clone());
            }
            Meta(meta) => {
                debug!("meta: {:?}", meta);
            }
            Notice(notice) => {
                debug!("notice: {:?}", notice);
            }
            Request(request) => {
                debug!("request: {:?}", request);
            }
            ApiRespBuilder(resp) => {
                debug!("resp: {:?}", resp);
            }
        }
    }
}
