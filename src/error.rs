pub type LhResult<T> = Result<T, LetterhuntError>;

#[derive(thiserror::Error, Debug)]
pub enum LetterhuntError {
    #[error("degenerate vector: cannot normalize a vector of zero magnitude")]
    DegenerateVector,

    #[error("invalid boundary: {0}")]
    InvalidBoundary(String),

    #[error("unregistered type: {0}")]
    UnregisteredType(String),

    #[error("image load error: {0}")]
    ImageLoad(String),

    #[error("document load error: {0}")]
    DocumentLoad(#[source] anyhow::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LetterhuntError {
    pub fn invalid_boundary(msg: impl Into<String>) -> Self {
        Self::InvalidBoundary(msg.into())
    }

    pub fn unregistered_type(msg: impl Into<String>) -> Self {
        Self::UnregisteredType(msg.into())
    }

    pub fn image_load(msg: impl Into<String>) -> Self {
        Self::ImageLoad(msg.into())
    }

    pub fn document_load(cause: impl Into<anyhow::Error>) -> Self {
        Self::DocumentLoad(cause.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            LetterhuntError::invalid_boundary("x")
                .to_string()
                .contains("invalid boundary:")
        );
        assert!(
            LetterhuntError::unregistered_type("x")
                .to_string()
                .contains("unregistered type:")
        );
        assert!(
            LetterhuntError::image_load("x")
                .to_string()
                .contains("image load error:")
        );
        assert!(
            LetterhuntError::validation("x")
                .to_string()
                .contains("validation error:")
        );
    }

    #[test]
    fn document_load_preserves_source() {
        let base = std::io::Error::other("truncated stream");
        let err = LetterhuntError::document_load(base);
        assert!(err.to_string().contains("document load error:"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
