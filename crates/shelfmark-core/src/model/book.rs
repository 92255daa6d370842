use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{AuthorId, BookId, CategoryId, PublisherId};
use crate::model::isbn::Isbn;
use crate::model::money::Money;

/// A catalogued title and its copy counters.
///
/// `available_copies` counts copies on the shelf; `total_copies` counts
/// copies the library owns. The schema keeps
/// `0 <= available_copies <= total_copies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub isbn: Isbn,
    pub title: String,
    pub subtitle: Option<String>,
    pub publisher_id: Option<PublisherId>,
    pub category_id: CategoryId,
    pub publication_year: Option<i32>,
    pub edition: Option<String>,
    pub pages: Option<u32>,
    pub language: String,
    pub description: Option<String>,

    /// Shelf mark or room where copies are kept.
    pub location: Option<String>,

    pub acquisition_date: Option<NaiveDate>,
    pub price: Option<Money>,
    pub total_copies: u32,
    pub available_copies: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Copies currently out on loan.
    #[must_use]
    pub const fn on_loan(&self) -> u32 {
        self.total_copies.saturating_sub(self.available_copies)
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub isbn: Isbn,
    pub title: String,
    pub subtitle: Option<String>,
    pub publisher_id: Option<PublisherId>,
    pub category_id: CategoryId,
    pub publication_year: Option<i32>,
    pub edition: Option<String>,
    pub pages: Option<u32>,
    pub language: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub price: Option<Money>,

    /// Copies acquired; all of them start on the shelf.
    pub copies: u32,
}

impl NewBook {
    #[must_use]
    pub fn new(isbn: Isbn, title: impl Into<String>, category_id: CategoryId) -> Self {
        Self {
            isbn,
            title: title.into(),
            subtitle: None,
            publisher_id: None,
            category_id,
            publication_year: None,
            edition: None,
            pages: None,
            language: String::from("English"),
            description: None,
            location: None,
            acquisition_date: None,
            price: None,
            copies: 1,
        }
    }

    #[must_use]
    pub fn with_copies(mut self, copies: u32) -> Self {
        self.copies = copies;
        self
    }

    #[must_use]
    pub fn with_publisher(mut self, publisher: PublisherId) -> Self {
        self.publisher_id = Some(publisher);
        self
    }

    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn published(mut self, year: i32) -> Self {
        self.publication_year = Some(year);
        self
    }

    #[must_use]
    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = Some(pages);
        self
    }

    #[must_use]
    pub fn shelved_at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }
}

/// A credit linking a book to one of its authors.
///
/// `author_order` starts at 1 for the first-named author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAuthor {
    pub book_id: BookId,
    pub author_id: AuthorId,
    pub author_order: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_book_defaults() {
        let isbn = Isbn::parse("9780451524935").unwrap();
        let book = NewBook::new(isbn, "1984", CategoryId::new(1)).with_copies(3);
        assert_eq!(book.copies, 3);
        assert_eq!(book.language, "English");
        assert!(book.publisher_id.is_none());
    }
}
