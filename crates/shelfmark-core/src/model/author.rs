use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ids::AuthorId;

/// A person credited on one or more books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub biography: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Author {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields for cataloguing a new author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub biography: Option<String>,
}

impl NewAuthor {
    #[must_use]
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date: None,
            death_date: None,
            nationality: None,
            biography: None,
        }
    }

    #[must_use]
    pub fn born(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }

    #[must_use]
    pub fn died(mut self, date: NaiveDate) -> Self {
        self.death_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_nationality(mut self, nationality: impl Into<String>) -> Self {
        self.nationality = Some(nationality.into());
        self
    }

    #[must_use]
    pub fn with_biography(mut self, biography: impl Into<String>) -> Self {
        self.biography = Some(biography.into());
        self
    }

    /// Checks that depend on the current date and so cannot live in the
    /// schema.
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if let Some(born) = self.birth_date {
            if born > today {
                return Err(Error::InvalidData(format!(
                    "birth date {born} is in the future"
                )));
            }
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
    fn test_new_author_builder() {
        let author = NewAuthor::new("George", "Orwell")
            .born(date(1903, 6, 25))
            .died(date(1950, 1, 21))
            .with_nationality("British");

        assert_eq!(author.last_name, "Orwell");
        assert_eq!(author.nationality.as_deref(), Some("British"));
        assert!(author.validate(date(2024, 1, 1)).is_ok());
    }

    #[test]
    fn test_future_birth_date_rejected() {
        let author = NewAuthor::new("Not", "Yet").born(date(2100, 1, 1));
        assert!(matches!(
            author.validate(date(2024, 1, 1)),
            Err(Error::InvalidData(_))
        ));
    }
}
