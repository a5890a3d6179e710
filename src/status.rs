use std::fmt::Display;

/// How a triggering event ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Summary sent and the processing service answered.
    Responded,
    /// Usage error sent back, nothing dispatched.
    Rejected,
    /// Dispatch or internal failure, reported to the chat.
    Failed,
}

impl Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            CommandStatus::Responded => "Responded",
            CommandStatus::Rejected => "Rejected",
            CommandStatus::Failed => "Failed",
        };
        write!(f, "{}", str)
    }
}
