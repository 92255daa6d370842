use rusqlite::ffi;
use thiserror::Error;

use crate::model::{BookId, BorrowingId, BorrowingStatus, CategoryId, FineId, Money};

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid {field}: {value:?}")]
    InvalidFormat { field: &'static str, value: String },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("no copies of book {book} are available")]
    Unavailable { book: BookId },

    #[error("cannot move borrowing record from {from} to {to}")]
    InvalidTransition {
        from: BorrowingStatus,
        to: BorrowingStatus,
    },

    #[error("borrowing record {borrowing} has reached the renewal limit")]
    RenewalLimit { borrowing: BorrowingId },

    #[error("fine {fine} is already settled")]
    FineSettled { fine: FineId },

    #[error("payment exceeds the {outstanding} outstanding on fine {fine}")]
    Overpayment { fine: FineId, outstanding: Money },

    #[error("category {parent} is {category} or one of its descendants")]
    CategoryCycle {
        category: CategoryId,
        parent: CategoryId,
    },
}

/// The family of integrity rule a store write violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Check,
    Unique,
    PrimaryKey,
    ForeignKey,
    NotNull,
    Other,
}

impl Error {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Classify a store error as a constraint violation, if it is one.
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        let Self::Database(rusqlite::Error::SqliteFailure(err, _)) = self else {
            return None;
        };
        if err.code != rusqlite::ErrorCode::ConstraintViolation {
            return None;
        }
        let kind = match err.extended_code {
            ffi::SQLITE_CONSTRAINT_CHECK => ConstraintKind::Check,
            ffi::SQLITE_CONSTRAINT_UNIQUE => ConstraintKind::Unique,
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY => ConstraintKind::PrimaryKey,
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
            ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintKind::NotNull,
            _ => ConstraintKind::Other,
        };
        Some(kind)
    }

    /// Whether the store rejected the write on an integrity rule.
    pub fn is_constraint_violation(&self) -> bool {
        self.constraint_kind().is_some()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
