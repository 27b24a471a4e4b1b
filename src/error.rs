use crate::store::StoreError;

/// Errors returned by the diary services.
#[derive(Debug, thiserror::Error)]
pub enum DiaryError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type DiaryResult<T> = Result<T, DiaryError>;

impl DiaryError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        DiaryError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
