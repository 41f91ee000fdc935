use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("track has no URI")]
    NoUri,

    #[error("failed to look up track '{uri}': {reason}")]
    Lookup { uri: String, reason: String },

    #[error("track '{uri}' is not playable: {reason}")]
    Unplayable { uri: String, reason: String },

    #[error("maximum track skip limit ({limit}) exceeded")]
    MaxSkipLimitExceeded { limit: u32 },
}

impl TransitionError {
    /// Terminal errors mean the caller must stop auto-advancing.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::MaxSkipLimitExceeded { .. })
    }
}
