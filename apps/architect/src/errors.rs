use thiserror::Error;

use crate::wizard::stage::Stage;

/// Failures raised by the generation gateway and its transport.
///
/// The `Display` output of each variant is what the wizard stores in
/// `last_error`, so messages are written for the end user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Empty response from AI")]
    EmptyResponse,

    #[error("AI returned malformed output: {0}")]
    MalformedOutput(String),

    #[error("AI output did not match the expected shape: {0}")]
    SchemaViolation(String),

    /// Network, quota or server failure. Displayed verbatim.
    #[error("{0}")]
    TransportFailure(String),
}

impl GatewayError {
    /// Only a missing or unusable configuration is fatal to the host process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GatewayError::Configuration(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::TransportFailure(e.to_string())
    }
}

/// Misuse of the wizard by its caller. Returned directly, never stored as `last_error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("A generation request is already in flight")]
    Busy,

    #[error("Illegal transition from {from} to {to}")]
    IllegalTransition { from: Stage, to: Stage },

    #[error("The profile can only be edited on the input stage while idle")]
    ProfileLocked,

    #[error("Operation requires the {expected} stage, wizard is on {actual}")]
    NotOnStage { expected: Stage, actual: Stage },

    #[error("Topic index {index} out of range ({len} topics available)")]
    TopicOutOfRange { index: usize, len: usize },

    #[error("Generation output does not belong to the in-flight transition")]
    UnexpectedOutput,

    #[error("No generation request is in flight")]
    Idle,
}

/// Problems turning a picked file into a resume attachment.
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Unsupported media type '{0}': only application/pdf is accepted")]
    UnsupportedMediaType(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Failed to read attachment: {0}")]
    Io(#[from] std::io::Error),
}
