//! Error types for the agent.

use std::process::ExitStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("failed to start {tool}: {source}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} {args} exited with {status}: {stderr}")]
    ToolExit {
        tool: String,
        args: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("line {line}: expected at least {expected} fields, found {found}: {row:?}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
        row: String,
    },

    #[error("invalid {parameter}: {message}")]
    Config { parameter: String, message: String },

    #[error("unknown topic: {0}")]
    UnknownTopic(String),
}

impl AgentError {
    pub fn config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        AgentError::Config {
            parameter: parameter.into(),
            message: message.into(),
        }
    }
}
