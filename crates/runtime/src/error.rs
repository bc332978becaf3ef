use thiserror::Error;

use crate::tools::ToolError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("invalid model response: {0}")]
    InvalidResponse(String),

    #[error("tool discovery failed: {0}")]
    Discovery(String),

    #[error("invalid tool descriptor: {0}")]
    InvalidDescriptor(String),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
