use std::fmt;

use sqlx::error::ErrorKind;

/// Error raised by a resource factory or handle.
///
/// This is the store-side error; DAO callers never see it directly, only as
/// the `source` of a [`DaoError`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Resource handle used after release")]
    Released,

    #[error("Cannot decode column `{column}`: {message}")]
    Decode { column: String, message: String },

    #[error("Store error: {0}")]
    Backend(String),
}

/// Result type for resource factories and handles
pub type StoreResult<T> = Result<T, StoreError>;

/// The point of the transaction lifecycle at which a store error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStage {
    Begin,
    Statement,
    Commit,
    Rollback,
}

impl fmt::Display for TxStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Begin => write!(f, "begin"),
            Self::Statement => write!(f, "statement"),
            Self::Commit => write!(f, "commit"),
            Self::Rollback => write!(f, "rollback"),
        }
    }
}

/// Error taxonomy returned by every unit of work and DAO operation.
#[derive(Debug, thiserror::Error)]
pub enum DaoError {
    /// A caller-supplied precondition was not met; no transaction was opened.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No resource handle could be acquired.
    #[error("Cannot acquire a store connection: {0}")]
    Resource(#[source] StoreError),

    /// The transaction was rolled back (or could not be opened/committed).
    #[error("Transaction failed at {stage}: {source}")]
    Transaction {
        stage: TxStage,
        #[source]
        source: StoreError,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("Mapping failed: {0}")]
    Mapping(String),
}

/// Result type for unit-of-work and DAO operations
pub type DaoResult<T> = Result<T, DaoError>;

impl DaoError {
    pub fn transaction(stage: TxStage, source: StoreError) -> Self {
        Self::Transaction { stage, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True when the store rejected a statement on an integrity constraint
    /// (not-null, unique, foreign key or check).
    pub fn is_constraint_violation(&self) -> bool {
        let Self::Transaction {
            source: StoreError::Sqlx(sqlx::Error::Database(db)),
            ..
        } = self
        else {
            return false;
        };
        matches!(
            db.kind(),
            ErrorKind::NotNullViolation
                | ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::CheckViolation
        )
    }
}

impl From<StoreError> for DaoError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Decode { column, message } => {
                Self::Mapping(format!("column `{column}`: {message}"))
            }
            StoreError::Sqlx(
                err @ (sqlx::Error::ColumnDecode { .. }
                | sqlx::Error::ColumnNotFound(_)
                | sqlx::Error::ColumnIndexOutOfBounds { .. }),
            ) => Self::Mapping(err.to_string()),
            other => Self::transaction(TxStage::Statement, other),
        }
    }
}
