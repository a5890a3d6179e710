use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub enum LogOutType {
    #[default]
    Console,
    File(String),
}

#[derive(Deserialize, Serialize, Default, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// One log sink. Several can be active at once, each with its own level.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LogConfig {
    pub enable: bool,
    pub out_type: LogOutType,
    pub level: LogLevel,
    pub ansi: bool,
    pub file_name: String,
    pub with_file: bool,
    pub with_line_number: bool,
    pub with_thread_ids: bool,
    pub with_target: bool,
}

pub struct Log;

// every sink's worker guard has to outlive the process or buffered lines are lost
static WORK_GUARDS: Mutex<Vec<WorkerGuard>> = Mutex::new(Vec::new());

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            enable: true,
            out_type: LogOutType::default(),
            level: LogLevel::default(),
            ansi: false,
            file_name: "ap-kara-bot.log".to_string(),
            with_file: false,
            with_line_number: false,
            with_thread_ids: true,
            with_target: true,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl LogConfig {
    fn writer(&self) -> NonBlocking {
        let (writer, guard) = match &self.out_type {
            LogOutType::Console => non_blocking(std::io::stdout()),
            LogOutType::File(out_path) => {
                non_blocking(rolling::daily(out_path, &self.file_name))
            }
        };
        if let Ok(mut guards) = WORK_GUARDS.lock() {
            guards.push(guard);
        }
        writer
    }

    fn uses_ansi(&self) -> bool {
        self.ansi && matches!(self.out_type, LogOutType::Console)
    }
}

impl Log {
    pub fn init(configs: &[LogConfig]) -> Result<()> {
        let layers = configs
            .iter()
            .filter(|config| config.enable)
            .map(|config| {
                fmt::layer()
                    .with_ansi(config.uses_ansi())
                    .with_file(config.with_file)
                    .with_line_number(config.with_line_number)
                    .with_thread_ids(config.with_thread_ids)
                    .with_target(config.with_target)
                    .with_timer(LocalTime::rfc_3339())
                    .with_writer(config.writer())
                    .with_filter(LevelFilter::from(config.level))
                    .boxed()
            })
            .collect::<Vec<_>>();
        tracing_subscriber::registry().with(layers).try_init()?;
        debug!("Log Subscriber Init Success");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi_only_applies_to_console() {
        let mut config = LogConfig {
            ansi: true,
            ..Default::default()
        };
        assert!(config.uses_ansi());
        config.out_type = LogOutType::File("logs".to_string());
        assert!(!config.uses_ansi());
    }

    #[test]
    fn level_names_are_camel_case() {
        let level: LogLevel = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(LevelFilter::from(level), LevelFilter::WARN);
    }
}
