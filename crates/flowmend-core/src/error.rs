pub type Result<T> = std::result::Result<T, EditError>;

/// A rejected edit. The document text is never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Node `{id}` not found")]
    NodeNotFound { id: String },

    #[error("Connection `{id}` not found")]
    EdgeNotFound { id: String },

    #[error("Node id `{id}` is already in use")]
    DuplicateId { id: String },

    #[error("`{id}` is not a valid node id")]
    InvalidId { id: String },

    #[error("Cannot apply color to invisible connection")]
    InvisibleEdgeStyle { edge_id: String },
}

impl EditError {
    /// Text for a transient status-line message.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Warnings leave the document as it was without indicating a broken request.
    pub fn is_warning(&self) -> bool {
        matches!(self, EditError::InvisibleEdgeStyle { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {message}")]
    InvalidJson { message: String },

    #[error("Invalid config value: {message}")]
    InvalidValue { message: String },
}
