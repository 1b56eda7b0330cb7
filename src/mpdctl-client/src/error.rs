use crate::transport::TransportError;
use thiserror::Error;

/// Failures surfaced by partition operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The connection broke; reconnecting is up to the owner of the partition.
    #[error("connection to MPD failed during {command}: {message}")]
    Transport { command: String, message: String },
    /// The daemon rejected the request. The connection remains usable.
    #[error("MPD error in {command}: {message}")]
    Protocol {
        command: String,
        code: u32,
        message: String,
    },
    /// A command could not be added to a command list; later items were not
    /// attempted.
    #[error("error adding command to command list {command} (item {index}): {message}")]
    Enqueue {
        command: &'static str,
        index: usize,
        message: String,
    },
    #[error("{feature} is not supported by this MPD")]
    Unsupported { feature: &'static str },
    #[error("{0}")]
    Precondition(String),
}

impl ClientError {
    pub(crate) fn from_transport(context: &str, err: TransportError) -> Self {
        match err {
            TransportError::Connection { message } => ClientError::Transport {
                command: context.to_string(),
                message,
            },
            TransportError::Server { code, message, .. } => ClientError::Protocol {
                command: context.to_string(),
                code,
                message,
            },
        }
    }

    /// Message suitable for a response envelope.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Protocol { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
