use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::email::Email;
use crate::model::ids::MemberId;
use crate::model::labels::define_label;
use crate::model::money::Money;

define_label! {
    /// Borrowing privileges a member holds.
    MembershipType, "membership type" {
        Student => "Student",
        Faculty => "Faculty",
        Staff => "Staff",
        Public => "Public",
    }
}

/// A registered borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub membership_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub membership_type: MembershipType,
    pub membership_start: NaiveDate,
    pub membership_end: Option<NaiveDate>,
    pub is_active: bool,

    /// Outstanding total of this member's unsettled fines.
    pub fine_balance: Money,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether the membership is active and within its window on `day`.
    #[must_use]
    pub fn is_current(&self, day: NaiveDate) -> bool {
        self.is_active
            && self.membership_start <= day
            && self.membership_end.is_none_or(|end| day <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMember {
    pub membership_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub membership_type: MembershipType,
    pub membership_start: NaiveDate,
    pub membership_end: Option<NaiveDate>,
}

impl NewMember {
    #[must_use]
    pub fn new(
        membership_number: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: Email,
        membership_type: MembershipType,
        membership_start: NaiveDate,
    ) -> Self {
        Self {
            membership_number: membership_number.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email,
            phone: None,
            address: None,
            date_of_birth: None,
            membership_type,
            membership_start,
            membership_end: None,
        }
    }

    #[must_use]
    pub fn until(mut self, end: NaiveDate) -> Self {
        self.membership_end = Some(end);
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if let Some(born) = self.date_of_birth {
            if born > today {
                return Err(Error::InvalidData(format!(
                    "date of birth {born} is in the future"
                )));
            }
        }
        Ok(())
    }
}
