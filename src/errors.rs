use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, BudgetError>;

/// Error type shared by the store, services and auth flow.
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("{0} already exists")]
    Conflict(String),
    #[error("Remote operation failed: {0}")]
    Remote(String),
    #[error("{0}")]
    Validation(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Failed to create user profile: {0}")]
    ProfileProvisioning(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl BudgetError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        BudgetError::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        BudgetError::Validation(message.into())
    }

    /// Whether the failure came from input checks that never reached the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, BudgetError::Validation(_))
    }
}
