use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::email::Email;
use crate::model::ids::PublisherId;

/// A publishing house.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: PublisherId,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Email>,
    pub website: Option<String>,
    pub established_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPublisher {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Email>,
    pub website: Option<String>,
    pub established_year: Option<i32>,
}

impl NewPublisher {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            phone: None,
            email: None,
            website: None,
            established_year: None,
        }
    }

    #[must_use]
    pub fn established(mut self, year: i32) -> Self {
        self.established_year = Some(year);
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: Email) -> Self {
        self.email = Some(email);
        self
    }

    #[must_use]
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        match self.established_year {
            Some(year) if year > today.year() => Err(Error::InvalidData(format!(
                "founding year {year} is in the future"
            ))),
            _ => Ok(()),
        }
    }
}
