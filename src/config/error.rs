use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{field} is required but was not set")]
    Missing { field: &'static str },

    #[error("{field} is invalid (value: {value:?}): {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read dotenv file")]
    DotEnv(#[from] dotenvy::Error),
}

impl ConfigurationError {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }
}
