//! Demonstration data for a fresh catalog.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::{
    AuthorId, BookAuthor, CategoryId, Email, Isbn, MembershipType, Money, NewAuthor, NewBook,
    NewCategory, NewMember, NewPublisher, NewStaff, PublisherId,
};
use crate::schema::Database;

/// Rows written by [`load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub categories: usize,
    pub publishers: usize,
    pub authors: usize,
    pub books: usize,
    pub book_authors: usize,
    pub members: usize,
    pub staff: usize,
}

impl SeedSummary {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.categories == 0 && self.books == 0 && self.members == 0
    }
}

/// (name, parent, description)
const CATEGORIES: &[(&str, Option<&str>, &str)] = &[
    ("Fiction", None, "Novels and short stories"),
    ("Classics", Some("Fiction"), "Enduring literary fiction"),
    ("Mystery", Some("Fiction"), "Detective and crime fiction"),
    ("Science Fiction", Some("Fiction"), "Speculative and futuristic fiction"),
    ("Non-Fiction", None, "Factual works"),
    ("History", Some("Non-Fiction"), "World and regional history"),
    ("Science", Some("Non-Fiction"), "Popular science"),
];

/// (name, founded, website)
const PUBLISHERS: &[(&str, i32, &str)] = &[
    ("HarperCollins", 1989, "https://www.harpercollins.com"),
    ("Penguin Random House", 2013, "https://www.penguinrandomhouse.com"),
    ("Bantam Books", 1945, "https://www.randomhousebooks.com/imprint/bantam"),
];

/// (key, first, last, born, died, nationality)
const AUTHORS: &[(&str, &str, &str, (i32, u32, u32), Option<(i32, u32, u32)>, &str)] = &[
    ("lee", "Harper", "Lee", (1926, 4, 28), Some((2016, 2, 19)), "American"),
    ("orwell", "George", "Orwell", (1903, 6, 25), Some((1950, 1, 21)), "British"),
    ("christie", "Agatha", "Christie", (1890, 9, 15), Some((1976, 1, 12)), "British"),
    ("asimov", "Isaac", "Asimov", (1920, 1, 2), Some((1992, 4, 6)), "American"),
    ("austen", "Jane", "Austen", (1775, 12, 16), Some((1817, 7, 18)), "British"),
    ("harari", "Yuval Noah", "Harari", (1976, 2, 24), None, "Israeli"),
    ("hawking", "Stephen", "Hawking", (1942, 1, 8), Some((2018, 3, 14)), "British"),
    ("pratchett", "Terry", "Pratchett", (1948, 4, 28), Some((2015, 3, 12)), "British"),
    ("gaiman", "Neil", "Gaiman", (1960, 11, 10), None, "British"),
];

struct SeedBook {
    isbn: &'static str,
    title: &'static str,
    category: &'static str,
    publisher: &'static str,
    year: i32,
    pages: u32,
    copies: u32,
    shelf: &'static str,
    authors: &'static [&'static str],
    description: &'static str,
}

const BOOKS: &[SeedBook] = &[
    SeedBook {
        isbn: "978-0-06-112008-4",
        title: "To Kill a Mockingbird",
        category: "Classics",
        publisher: "HarperCollins",
        year: 1960,
        pages: 336,
        copies: 3,
        shelf: "FIC LEE",
        authors: &["lee"],
        description: "A lawyer in the Depression-era South defends a Black man accused of rape, seen through the eyes of his young daughter.",
    },
    SeedBook {
        isbn: "9780451524935",
        title: "1984",
        category: "Science Fiction",
        publisher: "Penguin Random House",
        year: 1949,
        pages: 328,
        copies: 4,
        shelf: "FIC ORW",
        authors: &["orwell"],
        description: "A dystopian novel of surveillance, propaganda and totalitarian rule.",
    },
    SeedBook {
        isbn: "9780062693662",
        title: "Murder on the Orient Express",
        category: "Mystery",
        publisher: "HarperCollins",
        year: 1934,
        pages: 274,
        copies: 2,
        shelf: "MYS CHR",
        authors: &["christie"],
        description: "Hercule Poirot investigates a murder aboard a snowbound luxury train.",
    },
    SeedBook {
        isbn: "9780553293357",
        title: "Foundation",
        category: "Science Fiction",
        publisher: "Bantam Books",
        year: 1951,
        pages: 296,
        copies: 2,
        shelf: "SF ASI",
        authors: &["asimov"],
        description: "A mathematician foresees the fall of a galactic empire and plans to shorten the dark age that follows.",
    },
    SeedBook {
        isbn: "9780141439518",
        title: "Pride and Prejudice",
        category: "Classics",
        publisher: "Penguin Random House",
        year: 1813,
        pages: 480,
        copies: 3,
        shelf: "FIC AUS",
        authors: &["austen"],
        description: "Elizabeth Bennet and Mr Darcy navigate manners, marriage and misjudgement in Regency England.",
    },
    SeedBook {
        isbn: "9780062316097",
        title: "Sapiens",
        category: "History",
        publisher: "HarperCollins",
        year: 2014,
        pages: 464,
        copies: 2,
        shelf: "909 HAR",
        authors: &["harari"],
        description: "A brief history of humankind from the cognitive revolution to the present.",
    },
    SeedBook {
        isbn: "9780553380163",
        title: "A Brief History of Time",
        category: "Science",
        publisher: "Bantam Books",
        year: 1988,
        pages: 212,
        copies: 2,
        shelf: "523.1 HAW",
        authors: &["hawking"],
        description: "Black holes, the big bang and the nature of time for the general reader.",
    },
    SeedBook {
        isbn: "9780060853983",
        title: "Good Omens",
        category: "Fiction",
        publisher: "HarperCollins",
        year: 1990,
        pages: 432,
        copies: 1,
        shelf: "FIC PRA",
        authors: &["pratchett", "gaiman"],
        description: "An angel and a demon team up to avert the apocalypse they have grown rather fond of preventing.",
    },
];

/// (number, first, last, email, type, start)
const MEMBERS: &[(&str, &str, &str, &str, MembershipType, (i32, u32, u32))] = &[
    ("M-2024-0001", "Alice", "Johnson", "alice.johnson@example.edu", MembershipType::Student, (2024, 1, 15)),
    ("M-2024-0002", "Robert", "Chen", "robert.chen@example.edu", MembershipType::Faculty, (2024, 1, 20)),
    ("M-2024-0003", "Maria", "Garcia", "maria.garcia@example.com", MembershipType::Public, (2024, 2, 3)),
    ("M-2024-0004", "David", "Okafor", "david.okafor@example.edu", MembershipType::Staff, (2024, 2, 10)),
];

/// (employee id, first, last, email, position, hired, salary)
const STAFF: &[(&str, &str, &str, &str, &str, (i32, u32, u32), &str)] = &[
    ("EMP-001", "Eleanor", "Vance", "eleanor.vance@library.example.org", "Head Librarian", (2015, 8, 1), "62000.00"),
    ("EMP-002", "Marcus", "Reid", "marcus.reid@library.example.org", "Circulation Clerk", (2021, 3, 15), "38500.00"),
    ("EMP-003", "Priya", "Natarajan", "priya.natarajan@library.example.org", "Cataloguer", (2019, 6, 1), "45000.00"),
];

fn ymd((y, m, d): (i32, u32, u32)) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| Error::InvalidData(format!("invalid seed date {y}-{m}-{d}")))
}

fn lookup<T: Copy>(map: &HashMap<&str, T>, key: &str, kind: &str) -> Result<T> {
    map.get(key)
        .copied()
        .ok_or_else(|| Error::InvalidData(format!("seed refers to unknown {kind} {key:?}")))
}

/// Populate an empty catalog with demonstration rows.
///
/// Does nothing (and returns an empty summary) if any book already exists.
pub fn load(db: &mut Database) -> Result<SeedSummary> {
    if db.catalog_stats()?.titles > 0 {
        log::info!("Catalog already has books; skipping seed data");
        return Ok(SeedSummary::default());
    }

    let mut summary = SeedSummary::default();

    let mut categories: HashMap<&str, CategoryId> = HashMap::new();
    for (name, parent, description) in CATEGORIES {
        let mut category = NewCategory::new(*name).with_description(*description);
        if let Some(parent) = parent {
            category = category.under(lookup(&categories, parent, "category")?);
        }
        categories.insert(name, db.insert_category(&category)?);
        summary.categories += 1;
    }

    let mut publishers: HashMap<&str, PublisherId> = HashMap::new();
    for (name, founded, website) in PUBLISHERS {
        let publisher = NewPublisher::new(*name)
            .established(*founded)
            .with_website(*website);
        publishers.insert(name, db.insert_publisher(&publisher)?);
        summary.publishers += 1;
    }

    let mut authors: HashMap<&str, AuthorId> = HashMap::new();
    for (key, first, last, born, died, nationality) in AUTHORS {
        let mut author = NewAuthor::new(*first, *last)
            .born(ymd(*born)?)
            .with_nationality(*nationality);
        if let Some(died) = died {
            author = author.died(ymd(*died)?);
        }
        authors.insert(key, db.insert_author(&author)?);
        summary.authors += 1;
    }

    for seed in BOOKS {
        let book = NewBook::new(
            Isbn::parse(seed.isbn)?,
            seed.title,
            lookup(&categories, seed.category, "category")?,
        )
        .with_publisher(lookup(&publishers, seed.publisher, "publisher")?)
        .published(seed.year)
        .with_pages(seed.pages)
        .with_copies(seed.copies)
        .shelved_at(seed.shelf)
        .with_description(seed.description);
        let book_id = db.insert_book(&book)?;
        summary.books += 1;

        for (order, key) in (1u32..).zip(seed.authors.iter()) {
            db.add_book_author(BookAuthor {
                book_id,
                author_id: lookup(&authors, key, "author")?,
                author_order: order,
            })?;
            summary.book_authors += 1;
        }
    }

    for (number, first, last, email, kind, start) in MEMBERS {
        let member = NewMember::new(
            *number,
            *first,
            *last,
            Email::parse(email)?,
            *kind,
            ymd(*start)?,
        );
        db.insert_member(&member)?;
        summary.members += 1;
    }

    for (employee_id, first, last, email, position, hired, salary) in STAFF {
        let staff = NewStaff::new(
            *employee_id,
            *first,
            *last,
            Email::parse(email)?,
            *position,
            ymd(*hired)?,
        )
        .with_salary(Money::parse(salary)?);
        db.insert_staff(&staff)?;
        summary.staff += 1;
    }

    log::info!(
        "Seeded {} books, {} authors, {} members and {} staff",
        summary.books,
        summary.authors,
        summary.members,
        summary.staff
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_loads_once() {
        let mut db = Database::open_in_memory().unwrap();
        let summary = load(&mut db).unwrap();
        assert_eq!(summary.books, BOOKS.len());
        assert_eq!(summary.book_authors, 9);
        assert_eq!(summary.staff, STAFF.len());

        let again = load(&mut db).unwrap();
        assert!(again.is_empty());
        assert_eq!(db.catalog_stats().unwrap().titles, BOOKS.len() as i64);
    }

    #[test]
    fn test_seed_category_tree() {
        let mut db = Database::open_in_memory().unwrap();
        load(&mut db).unwrap();
        let roots: Vec<String> = db
            .category_children(None)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(roots, ["Fiction", "Non-Fiction"]);
    }

    #[test]
    fn test_seed_isbns_are_valid() {
        for book in BOOKS {
            assert!(Isbn::parse(book.isbn).is_ok(), "{}", book.isbn);
        }
    }
}
