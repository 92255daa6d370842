//! Column conversions for the domain value types.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::model::{
    AuthorId, BookId, BorrowingId, BorrowingStatus, CategoryId, Email, FineId, FineStatus,
    FineType, Isbn, MemberId, MembershipType, Money, PublisherId, ReservationId,
    ReservationStatus, StaffId,
};

macro_rules! integer_column {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToSql for $ty {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.get()))
                }
            }

            impl FromSql for $ty {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    i64::column_result(value).map(Self::new)
                }
            }
        )+
    };
}

integer_column!(
    AuthorId,
    PublisherId,
    CategoryId,
    BookId,
    MemberId,
    StaffId,
    BorrowingId,
    ReservationId,
    FineId,
);

macro_rules! text_column {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToSql for $ty {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.as_str()))
                }
            }

            impl FromSql for $ty {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    value
                        .as_str()?
                        .parse()
                        .map_err(|e: crate::Error| FromSqlError::Other(Box::new(e)))
                }
            }
        )+
    };
}

text_column!(
    BorrowingStatus,
    ReservationStatus,
    FineType,
    FineStatus,
    MembershipType,
    Isbn,
    Email,
);

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.cents()))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let cents = i64::column_result(value)?;
        Self::from_cents(cents).map_err(|_| FromSqlError::OutOfRange(cents))
    }
}
