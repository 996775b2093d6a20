use thiserror::Error;

/// Primary error type for Vitrine operations.
///
/// Structured variants for the common failure cases, plus an `Internal`
/// catch-all for defects that should never surface to callers.
///
/// Planning infeasibility is deliberately NOT an error: `best_index`
/// communicates "no usable plan" through its return value, because it is a
/// normal negotiation outcome the engine is expected to handle.
#[derive(Error, Debug)]
pub enum VitrineError {
    /// Write attempted on a read-only virtual table.
    #[error("virtual table is read-only")]
    ReadOnly,

    /// The table does not implement the requested operation.
    #[error("operation is not supported by this virtual table")]
    Unsupported,

    /// No module with this name has been registered.
    #[error("no such module: {name}")]
    NoSuchModule { name: String },

    /// A table handle that was never attached, or was already detached.
    #[error("stale table handle: {handle}")]
    StaleHandle { handle: usize },

    /// The CREATE VIRTUAL TABLE argument vector is structurally malformed.
    ///
    /// Only the three leading names (module, database, table) are validated;
    /// table-specific parameters that fail to parse fall back to their
    /// documented defaults instead of erroring.
    #[error("malformed virtual table arguments: {detail}")]
    BadCreateArgs { detail: String },

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VitrineError {
    /// Construct an [`VitrineError::Internal`] from any displayable message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, VitrineError>;
