use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::email::Email;
use crate::model::ids::StaffId;
use crate::model::money::Money;

/// A library employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub position: String,
    pub hire_date: NaiveDate,
    pub salary: Option<Money>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Staff {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStaff {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub position: String,
    pub hire_date: NaiveDate,
    pub salary: Option<Money>,
}

impl NewStaff {
    #[must_use]
    pub fn new(
        employee_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: Email,
        position: impl Into<String>,
        hire_date: NaiveDate,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email,
            phone: None,
            position: position.into(),
            hire_date,
            salary: None,
        }
    }

    #[must_use]
    pub fn with_salary(mut self, salary: Money) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if self.hire_date > today {
            return Err(Error::InvalidData(format!(
                "hire date {} is in the future",
                self.hire_date
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_hire_date_in_future_rejected() {
        let email = Email::parse("clerk@library.org").unwrap();
        let staff = NewStaff::new("E-1", "Ada", "Clerk", email, "Librarian", date(2030, 1, 1));
        assert!(staff.validate(date(2024, 1, 1)).is_err());
        assert!(staff.validate(date(2030, 1, 1)).is_ok());
    }
}
