pub type VidsmithResult<T> = Result<T, VidsmithError>;

#[derive(thiserror::Error, Debug)]
pub enum VidsmithError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("source error: {0}")]
    Source(String),

    #[error("synthesis error: {0}")]
    Synthesis(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VidsmithError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            VidsmithError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            VidsmithError::source("x")
                .to_string()
                .contains("source error:")
        );
        assert!(
            VidsmithError::synthesis("x")
                .to_string()
                .contains("synthesis error:")
        );
        assert!(
            VidsmithError::encode("x")
                .to_string()
                .contains("encode error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = VidsmithError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
