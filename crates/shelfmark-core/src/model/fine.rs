use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{BorrowingId, FineId, MemberId};
use crate::model::labels::define_label;
use crate::model::money::Money;

define_label! {
    FineType, "fine type" {
        Overdue => "Overdue",
        LostBook => "Lost Book",
        Damage => "Damage",
        ProcessingFee => "Processing Fee",
    }
}

define_label! {
    FineStatus, "fine status" {
        Pending => "Pending",
        Paid => "Paid",
        Waived => "Waived",
        Partial => "Partial",
    }
}

impl FineStatus {
    /// Whether the fine still contributes to the member's balance.
    #[must_use]
    pub const fn is_outstanding(self) -> bool {
        matches!(self, Self::Pending | Self::Partial)
    }
}

/// A charge against a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fine {
    pub id: FineId,
    pub member_id: MemberId,

    /// Loan that caused the fine; cleared if the record is deleted.
    pub borrowing_id: Option<BorrowingId>,

    pub fine_type: FineType,
    pub amount: Money,
    pub paid_amount: Money,
    pub fine_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub status: FineStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Fine {
    /// The part of this fine still counted in the member's balance.
    #[must_use]
    pub fn outstanding(&self) -> Money {
        if self.status.is_outstanding() {
            self.amount - self.paid_amount
        } else {
            Money::ZERO
        }
    }
}

/// A new charge. Fines always start `Pending` with nothing paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFine {
    pub member_id: MemberId,
    pub borrowing_id: Option<BorrowingId>,
    pub fine_type: FineType,
    pub amount: Money,
    pub fine_date: NaiveDate,
    pub description: Option<String>,
}

impl NewFine {
    #[must_use]
    pub fn new(member_id: MemberId, fine_type: FineType, amount: Money, fine_date: NaiveDate) -> Self {
        Self {
            member_id,
            borrowing_id: None,
            fine_type,
            amount,
            fine_date,
            description: None,
        }
    }

    #[must_use]
    pub fn for_borrowing(mut self, borrowing: BorrowingId) -> Self {
        self.borrowing_id = Some(borrowing);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fine_type_labels() {
        assert_eq!(FineType::LostBook.as_str(), "Lost Book");
        assert_eq!("processing fee".parse::<FineType>().unwrap(), FineType::ProcessingFee);
    }

    #[test]
    fn test_outstanding_amount() {
        let now = Utc::now();
        let day = now.date_naive();
        let mut fine = Fine {
            id: FineId::new(1),
            member_id: MemberId::new(1),
            borrowing_id: None,
            fine_type: FineType::Overdue,
            amount: Money::parse("5.00").unwrap(),
            paid_amount: Money::parse("1.25").unwrap(),
            fine_date: day,
            paid_date: None,
            status: FineStatus::Partial,
            description: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(fine.outstanding().to_string(), "3.75");

        fine.status = FineStatus::Waived;
        assert_eq!(fine.outstanding(), Money::ZERO);
    }
}
