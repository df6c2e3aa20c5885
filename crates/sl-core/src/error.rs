/// Alias for `Result<T, StoryError>`.
pub type StoryResult<T> = Result<T, StoryError>;

/// Errors that can occur when importing or exporting a story.
#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    /// The input is not well-formed JSON.
    #[error("invalid JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// The snapshot failed structural validation. Holds every violation found.
    #[error("invalid story: {}", .0.join(" "))]
    Invalid(Vec<String>),

    /// The snapshot passed validation but could not be decoded into typed scenes.
    #[error("cannot decode story: {0}")]
    Decode(#[source] serde_json::Error),

    /// The story could not be serialized.
    #[error("cannot serialize story: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StoryError {
    /// The user-visible error lines for this failure.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Invalid(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}
