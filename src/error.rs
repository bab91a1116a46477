use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("scholarship {scholarship_id} is already saved for {user_id}")]
    AlreadySaved {
        user_id: String,
        scholarship_id: String,
    },

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound { kind, id: id.into() }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
