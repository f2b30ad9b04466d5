use thiserror::Error;

pub type Result<T> = std::result::Result<T, CanvasFlowError>;

#[derive(Debug, Error)]
pub enum CanvasFlowError {
    #[error("flow `{0}` not found")]
    FlowNotFound(String),
    #[error("tool `{tool}` failed: {message}")]
    ToolFailed { tool: String, message: String },
    #[error("invalid payload for tool `{tool}`: {message}")]
    InvalidPayload { tool: String, message: String },
    #[error("storage error: {0}")]
    Storage(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("flow execution cancelled")]
    Cancelled,
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CanvasFlowError {
    pub fn tool_failed(tool: impl Into<String>, message: impl ToString) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.to_string(),
        }
    }
}
