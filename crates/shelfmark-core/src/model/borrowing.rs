use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{BookId, BorrowingId, MemberId, StaffId};
use crate::model::labels::define_label;

/// Renewals allowed on one borrowing record.
pub const MAX_RENEWALS: u32 = 5;

define_label! {
    /// Lifecycle of a loan.
    BorrowingStatus, "borrowing status" {
        Borrowed => "Borrowed",
        Returned => "Returned",
        Overdue => "Overdue",
        Lost => "Lost",
    }
}

impl BorrowingStatus {
    /// The copy is off the shelf and the loan can still change.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Borrowed | Self::Overdue)
    }

    /// No further transition is allowed out of this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Returned | Self::Lost)
    }
}

/// One loan of one copy of a book to a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowingRecord {
    pub id: BorrowingId,
    pub member_id: MemberId,
    pub book_id: BookId,

    /// Staff member who processed the loan; cleared if they are removed.
    pub staff_id: Option<StaffId>,

    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: BorrowingStatus,
    pub renewal_count: u32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BorrowingRecord {
    #[must_use]
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status.is_open() && self.due_date < today
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBorrowing {
    pub member_id: MemberId,
    pub book_id: BookId,
    pub staff_id: Option<StaffId>,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: BorrowingStatus,
    pub renewal_count: u32,
    pub notes: Option<String>,
}

impl NewBorrowing {
    /// A fresh loan in the `Borrowed` state.
    #[must_use]
    pub fn new(
        member_id: MemberId,
        book_id: BookId,
        borrow_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            member_id,
            book_id,
            staff_id: None,
            borrow_date,
            due_date,
            return_date: None,
            status: BorrowingStatus::Borrowed,
            renewal_count: 0,
            notes: None,
        }
    }

    #[must_use]
    pub fn processed_by(mut self, staff: StaffId) -> Self {
        self.staff_id = Some(staff);
        self
    }

    /// Record a loan that is already in another state, e.g. when importing
    /// history. Only `Borrowed` records take a copy off the shelf.
    #[must_use]
    pub fn with_status(mut self, status: BorrowingStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A requested status change for an existing borrowing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowingUpdate {
    pub status: BorrowingStatus,

    /// Date the copy came back; defaults to today on a return.
    pub return_date: Option<NaiveDate>,
}

impl BorrowingUpdate {
    #[must_use]
    pub const fn returned(on: NaiveDate) -> Self {
        Self {
            status: BorrowingStatus::Returned,
            return_date: Some(on),
        }
    }

    #[must_use]
    pub const fn lost() -> Self {
        Self {
            status: BorrowingStatus::Lost,
            return_date: None,
        }
    }

    #[must_use]
    pub const fn overdue() -> Self {
        Self {
            status: BorrowingStatus::Overdue,
            return_date: None,
        }
    }
}
