use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{BookId, MemberId, ReservationId};
use crate::model::labels::define_label;

define_label! {
    ReservationStatus, "reservation status" {
        Active => "Active",
        Fulfilled => "Fulfilled",
        Cancelled => "Cancelled",
        Expired => "Expired",
    }
}

/// A member's hold on a title.
///
/// The store allows at most one reservation per (member, book, status).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub member_id: MemberId,
    pub book_id: BookId,
    pub reservation_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReservation {
    pub member_id: MemberId,
    pub book_id: BookId,
    pub reservation_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: ReservationStatus,
    pub notes: Option<String>,
}

impl NewReservation {
    #[must_use]
    pub fn new(
        member_id: MemberId,
        book_id: BookId,
        reservation_date: NaiveDate,
        expiry_date: NaiveDate,
    ) -> Self {
        Self {
            member_id,
            book_id,
            reservation_date,
            expiry_date,
            status: ReservationStatus::Active,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: ReservationStatus) -> Self {
        self.status = status;
        self
    }
}
