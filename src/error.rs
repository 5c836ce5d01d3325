//! Crate-wide error taxonomy.
//!
//! Every failure aborts the current session; nothing here is retried.
//! Recovery is "re-run the whole session" and relies on the idempotent
//! render check to skip work already done.

/// Malformed or truncated wire data. Not recoverable within a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("unexpected end of stream")]
    Truncated,
    #[error("unknown value tag: 0x{0:02X}")]
    InvalidTag(u8),
    #[error("invalid UTF-8 in string value")]
    InvalidString,
    #[error("expected {expected}, got {got}")]
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    /// A value in opcode position that is neither the sentinel nor a known
    /// opcode of the active grammar.
    #[error("unknown instruction: {0}")]
    UnknownInstruction(String),
    #[error("backend error: {0:#}")]
    Backend(anyhow::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A child process (stream consumer or build tool) exited non-zero.
    #[error("exit status: {0}")]
    ExitStatus(std::process::ExitStatus),
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Backend(e)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
