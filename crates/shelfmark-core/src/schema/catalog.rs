//! Authors, publishers, categories, books and their credits.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::model::{
    Author, AuthorId, Book, BookAuthor, BookId, Category, CategoryId, Isbn, NewAuthor, NewBook,
    NewCategory, NewPublisher, Publisher, PublisherId,
};

use super::db::{today, Database};

const AUTHOR_COLUMNS: &str = "author_id, first_name, last_name, birth_date, death_date,
     nationality, biography, created_at, updated_at";

const PUBLISHER_COLUMNS: &str = "publisher_id, name, address, phone, email, website,
     established_year, created_at, updated_at";

const CATEGORY_COLUMNS: &str =
    "category_id, name, description, parent_category_id, created_at, updated_at";

pub(crate) const BOOK_COLUMNS: &str = "book_id, isbn, title, subtitle, publisher_id, category_id,
     publication_year, edition, pages, language, description, location, acquisition_date,
     price_cents, total_copies, available_copies, created_at, updated_at";

// Authors
impl Database {
    pub fn insert_author(&self, author: &NewAuthor) -> Result<AuthorId> {
        author.validate(today())?;
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO authors (first_name, last_name, birth_date, death_date,
                                  nationality, biography, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                author.first_name,
                author.last_name,
                author.birth_date,
                author.death_date,
                author.nationality,
                author.biography,
                now,
            ],
        )?;
        Ok(AuthorId::new(self.conn.last_insert_rowid()))
    }

    pub fn get_author(&self, id: AuthorId) -> Result<Author> {
        self.conn
            .query_row(
                &format!("SELECT {AUTHOR_COLUMNS} FROM authors WHERE author_id = ?1"),
                [id],
                author_from_row,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("author", id))
    }

    /// Authors whose last name starts with `prefix`, in name order.
    pub fn find_authors_by_last_name(&self, prefix: &str) -> Result<Vec<Author>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors
             WHERE last_name LIKE ?1 || '%' ESCAPE '\\'
             ORDER BY last_name, first_name"
        ))?;
        let authors = stmt
            .query_map([escape_like(prefix)], author_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(authors)
    }

    /// Remove an author and every credit naming them.
    pub fn delete_author(&self, id: AuthorId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM authors WHERE author_id = ?1", [id])?;
        if deleted == 0 {
            return Err(Error::not_found("author", id));
        }
        Ok(())
    }
}

// Publishers
impl Database {
    pub fn insert_publisher(&self, publisher: &NewPublisher) -> Result<PublisherId> {
        publisher.validate(today())?;
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO publishers (name, address, phone, email, website,
                                     established_year, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                publisher.name,
                publisher.address,
                publisher.phone,
                publisher.email,
                publisher.website,
                publisher.established_year,
                now,
            ],
        )?;
        Ok(PublisherId::new(self.conn.last_insert_rowid()))
    }

    pub fn get_publisher(&self, id: PublisherId) -> Result<Publisher> {
        self.conn
            .query_row(
                &format!("SELECT {PUBLISHER_COLUMNS} FROM publishers WHERE publisher_id = ?1"),
                [id],
                publisher_from_row,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("publisher", id))
    }

    /// Remove a publisher. Its books stay catalogued with no publisher.
    pub fn delete_publisher(&self, id: PublisherId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM publishers WHERE publisher_id = ?1", [id])?;
        if deleted == 0 {
            return Err(Error::not_found("publisher", id));
        }
        Ok(())
    }
}

// Categories
impl Database {
    pub fn insert_category(&self, category: &NewCategory) -> Result<CategoryId> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO categories (name, description, parent_category_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![
                category.name,
                category.description,
                category.parent_id,
                now
            ],
        )?;
        Ok(CategoryId::new(self.conn.last_insert_rowid()))
    }

    pub fn get_category(&self, id: CategoryId) -> Result<Category> {
        self.conn
            .query_row(
                &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE category_id = ?1"),
                [id],
                category_from_row,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("category", id))
    }

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name"
        ))?;
        let categories = stmt
            .query_map([], category_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    /// Direct children of a category, or the roots when `parent` is `None`.
    pub fn category_children(&self, parent: Option<CategoryId>) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE parent_category_id IS ?1
             ORDER BY name"
        ))?;
        let categories = stmt
            .query_map([parent], category_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    /// Ancestors of a category from its parent up to the root.
    pub fn category_ancestors(&self, id: CategoryId) -> Result<Vec<Category>> {
        let mut ancestors = Vec::new();
        let mut next = self.get_category(id)?.parent_id;
        while let Some(parent) = next {
            if parent == id || ancestors.iter().any(|c: &Category| c.id == parent) {
                // A cycle written behind our back; stop rather than loop.
                break;
            }
            let category = self.get_category(parent)?;
            next = category.parent_id;
            ancestors.push(category);
        }
        Ok(ancestors)
    }

    /// Re-parent a category, refusing moves that would create a cycle.
    pub fn set_category_parent(
        &mut self,
        id: CategoryId,
        parent: Option<CategoryId>,
    ) -> Result<()> {
        let tx = self.write_tx()?;
        if let Some(parent) = parent {
            let mut cursor = Some(parent);
            while let Some(current) = cursor {
                if current == id {
                    return Err(Error::CategoryCycle {
                        category: id,
                        parent,
                    });
                }
                cursor = tx
                    .query_row(
                        "SELECT parent_category_id FROM categories WHERE category_id = ?1",
                        [current],
                        |row| row.get::<_, Option<CategoryId>>(0),
                    )
                    .optional()?
                    .ok_or_else(|| Error::not_found("category", current))?;
            }
        }
        let updated = tx.execute(
            "UPDATE categories SET parent_category_id = ?2, updated_at = ?3
             WHERE category_id = ?1",
            params![id, parent, Utc::now()],
        )?;
        if updated == 0 {
            return Err(Error::not_found("category", id));
        }
        tx.commit()?;
        Ok(())
    }

    /// Delete a category.
    ///
    /// Fails with a foreign-key violation while books still belong to it.
    /// Child categories are detached and become roots.
    pub fn delete_category(&self, id: CategoryId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM categories WHERE category_id = ?1", [id])?;
        if deleted == 0 {
            return Err(Error::not_found("category", id));
        }
        Ok(())
    }
}

// Books
impl Database {
    /// Catalogue a title with all its copies on the shelf.
    pub fn insert_book(&mut self, book: &NewBook) -> Result<BookId> {
        let now = Utc::now();
        let tx = self.write_tx()?;
        tx.execute(
            "INSERT INTO books (isbn, title, subtitle, publisher_id, category_id,
                                publication_year, edition, pages, language, description,
                                location, acquisition_date, price_cents,
                                total_copies, available_copies, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14, ?15, ?15)",
            params![
                book.isbn,
                book.title,
                book.subtitle,
                book.publisher_id,
                book.category_id,
                book.publication_year,
                book.edition,
                book.pages,
                book.language,
                book.description,
                book.location,
                book.acquisition_date,
                book.price,
                book.copies,
                now,
            ],
        )?;
        let id = BookId::new(tx.last_insert_rowid());
        tx.execute(
            "INSERT INTO books_fts (rowid, title, subtitle, description) VALUES (?1, ?2, ?3, ?4)",
            params![id, book.title, book.subtitle, book.description],
        )?;
        tx.commit()?;
        log::debug!("Catalogued book {} ({})", id, book.isbn);
        Ok(id)
    }

    pub fn get_book(&self, id: BookId) -> Result<Book> {
        self.conn
            .query_row(
                &format!("SELECT {BOOK_COLUMNS} FROM books WHERE book_id = ?1"),
                [id],
                book_from_row,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("book", id))
    }

    pub fn find_book_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn = ?1"),
                [isbn],
                book_from_row,
            )
            .optional()?)
    }

    pub fn list_books_in_category(&self, category: CategoryId) -> Result<Vec<Book>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE category_id = ?1 ORDER BY title"
        ))?;
        let books = stmt
            .query_map([category], book_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    /// Full-text search over title, subtitle and description, best match
    /// first.
    ///
    /// Every word of `text` must appear; FTS query syntax in `text` is
    /// treated literally.
    pub fn search_books(&self, text: &str) -> Result<Vec<Book>> {
        let query = fts_query(text);
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let columns = qualified(BOOK_COLUMNS, "b");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {columns} FROM books_fts
             JOIN books b ON b.book_id = books_fts.rowid
             WHERE books_fts MATCH ?1
             ORDER BY rank"
        ))?;
        let books = stmt
            .query_map([query], book_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    /// Acquire more copies; they go straight onto the shelf.
    pub fn add_copies(&mut self, id: BookId, copies: u32) -> Result<Book> {
        let tx = self.write_tx()?;
        let updated = tx.execute(
            "UPDATE books SET total_copies = total_copies + ?2,
                              available_copies = available_copies + ?2,
                              updated_at = ?3
             WHERE book_id = ?1",
            params![id, copies, Utc::now()],
        )?;
        if updated == 0 {
            return Err(Error::not_found("book", id));
        }
        tx.commit()?;
        log::debug!("Added {} copies of book {}", copies, id);
        self.get_book(id)
    }

    /// Remove a title together with its credits, loans and reservations.
    pub fn delete_book(&mut self, id: BookId) -> Result<()> {
        let tx = self.write_tx()?;
        let deleted = tx.execute("DELETE FROM books WHERE book_id = ?1", [id])?;
        if deleted == 0 {
            return Err(Error::not_found("book", id));
        }
        tx.execute("DELETE FROM books_fts WHERE rowid = ?1", [id])?;
        tx.commit()?;
        Ok(())
    }
}

// Credits
impl Database {
    pub fn add_book_author(&self, credit: BookAuthor) -> Result<()> {
        self.conn.execute(
            "INSERT INTO book_authors (book_id, author_id, author_order) VALUES (?1, ?2, ?3)",
            params![credit.book_id, credit.author_id, credit.author_order],
        )?;
        Ok(())
    }

    /// Authors of a book in credit order.
    pub fn book_authors(&self, book: BookId) -> Result<Vec<Author>> {
        let columns = qualified(AUTHOR_COLUMNS, "a");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {columns} FROM book_authors ba
             JOIN authors a ON a.author_id = ba.author_id
             WHERE ba.book_id = ?1
             ORDER BY ba.author_order, a.last_name"
        ))?;
        let authors = stmt
            .query_map([book], author_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(authors)
    }

    pub fn books_by_author(&self, author: AuthorId) -> Result<Vec<Book>> {
        let columns = qualified(BOOK_COLUMNS, "b");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {columns} FROM book_authors ba
             JOIN books b ON b.book_id = ba.book_id
             WHERE ba.author_id = ?1
             ORDER BY b.publication_year, b.title"
        ))?;
        let books = stmt
            .query_map([author], book_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }
}

/// Turn free text into an FTS5 query that ANDs each word as a literal
/// phrase.
fn fts_query(text: &str) -> String {
    text.split_whitespace()
        .map(|word| format!("\"{}\"", word.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prefix each column in a column list with a table alias, keeping the bare
/// names as result names.
pub(crate) fn qualified(columns: &str, alias: &str) -> String {
    columns
        .split(',')
        .map(|c| {
            let c = c.trim();
            format!("{alias}.{c} AS {c}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn author_from_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get("author_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        birth_date: row.get("birth_date")?,
        death_date: row.get("death_date")?,
        nationality: row.get("nationality")?,
        biography: row.get("biography")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn publisher_from_row(row: &Row<'_>) -> rusqlite::Result<Publisher> {
    Ok(Publisher {
        id: row.get("publisher_id")?,
        name: row.get("name")?,
        address: row.get("address")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
        website: row.get("website")?,
        established_year: row.get("established_year")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("category_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        parent_id: row.get("parent_category_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get("book_id")?,
        isbn: row.get("isbn")?,
        title: row.get("title")?,
        subtitle: row.get("subtitle")?,
        publisher_id: row.get("publisher_id")?,
        category_id: row.get("category_id")?,
        publication_year: row.get("publication_year")?,
        edition: row.get("edition")?,
        pages: row.get("pages")?,
        language: row.get("language")?,
        description: row.get("description")?,
        location: row.get("location")?,
        acquisition_date: row.get("acquisition_date")?,
        price: row.get("price_cents")?,
        total_copies: row.get("total_copies")?,
        available_copies: row.get("available_copies")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewBook;

    fn isbn(raw: &str) -> Isbn {
        Isbn::parse(raw).unwrap()
    }

    #[test]
    fn test_fts_query_quotes_words() {
        assert_eq!(fts_query("  dark  tower "), "\"dark\" \"tower\"");
        assert_eq!(fts_query("say \"hi\""), "\"say\" \"\"\"hi\"\"\"");
        assert_eq!(fts_query("   "), "");
    }

    #[test]
    fn test_book_round_trip() {
        let mut db = Database::open_in_memory().unwrap();
        let fiction = db.insert_category(&NewCategory::new("Fiction")).unwrap();
        let id = db
            .insert_book(
                &NewBook::new(isbn("978-0-06-112008-4"), "To Kill a Mockingbird", fiction)
                    .with_copies(4)
                    .published(1960),
            )
            .unwrap();

        let book = db.get_book(id).unwrap();
        assert_eq!(book.title, "To Kill a Mockingbird");
        assert_eq!(book.total_copies, 4);
        assert_eq!(book.available_copies, 4);
        assert_eq!(book.publication_year, Some(1960));

        let found = db.find_book_by_isbn(&book.isbn).unwrap().unwrap();
        assert_eq!(found.id, id);
    }

    #[test]
    fn test_duplicate_isbn_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        let fiction = db.insert_category(&NewCategory::new("Fiction")).unwrap();
        db.insert_book(&NewBook::new(isbn("0123456789"), "One", fiction))
            .unwrap();
        let err = db
            .insert_book(&NewBook::new(isbn("0123456789"), "Two", fiction))
            .unwrap_err();
        assert_eq!(err.constraint_kind(), Some(crate::ConstraintKind::Unique));
    }

    #[test]
    fn test_schema_rejects_malformed_isbn() {
        let db = Database::open_in_memory().unwrap();
        let fiction = db.insert_category(&NewCategory::new("Fiction")).unwrap();
        let now = Utc::now();
        let result = db.conn().execute(
            "INSERT INTO books (isbn, title, category_id, created_at, updated_at)
             VALUES ('abc123', 'Bad', ?1, ?2, ?2)",
            params![fiction, now],
        );
        let err = Error::from(result.unwrap_err());
        assert_eq!(err.constraint_kind(), Some(crate::ConstraintKind::Check));
    }

    #[test]
    fn test_book_requires_existing_category() {
        let mut db = Database::open_in_memory().unwrap();
        let err = db
            .insert_book(&NewBook::new(isbn("0123456789"), "Orphan", CategoryId::new(99)))
            .unwrap_err();
        assert_eq!(err.constraint_kind(), Some(crate::ConstraintKind::ForeignKey));
    }

    #[test]
    fn test_book_authors_in_credit_order() {
        let mut db = Database::open_in_memory().unwrap();
        let cat = db.insert_category(&NewCategory::new("Fiction")).unwrap();
        let book = db
            .insert_book(&NewBook::new(isbn("9780060853983"), "Good Omens", cat))
            .unwrap();
        let gaiman = db.insert_author(&NewAuthor::new("Neil", "Gaiman")).unwrap();
        let pratchett = db
            .insert_author(&NewAuthor::new("Terry", "Pratchett"))
            .unwrap();
        db.add_book_author(BookAuthor {
            book_id: book,
            author_id: gaiman,
            author_order: 2,
        })
        .unwrap();
        db.add_book_author(BookAuthor {
            book_id: book,
            author_id: pratchett,
            author_order: 1,
        })
        .unwrap();

        let names: Vec<String> = db
            .book_authors(book)
            .unwrap()
            .iter()
            .map(Author::full_name)
            .collect();
        assert_eq!(names, ["Terry Pratchett", "Neil Gaiman"]);
        assert_eq!(db.books_by_author(gaiman).unwrap().len(), 1);
    }

    #[test]
    fn test_author_order_must_be_positive() {
        let mut db = Database::open_in_memory().unwrap();
        let cat = db.insert_category(&NewCategory::new("Fiction")).unwrap();
        let book = db
            .insert_book(&NewBook::new(isbn("0123456789"), "Solo", cat))
            .unwrap();
        let author = db.insert_author(&NewAuthor::new("A", "Writer")).unwrap();
        let err = db
            .add_book_author(BookAuthor {
                book_id: book,
                author_id: author,
                author_order: 0,
            })
            .unwrap_err();
        assert_eq!(err.constraint_kind(), Some(crate::ConstraintKind::Check));
    }

    #[test]
    fn test_death_before_birth_rejected() {
        let db = Database::open_in_memory().unwrap();
        let born = chrono::NaiveDate::from_ymd_opt(1950, 1, 1).unwrap();
        let died = chrono::NaiveDate::from_ymd_opt(1940, 1, 1).unwrap();
        let err = db
            .insert_author(&NewAuthor::new("Time", "Traveller").born(born).died(died))
            .unwrap_err();
        assert_eq!(err.constraint_kind(), Some(crate::ConstraintKind::Check));
    }

    #[test]
    fn test_find_authors_by_last_name_prefix() {
        let db = Database::open_in_memory().unwrap();
        db.insert_author(&NewAuthor::new("Agatha", "Christie")).unwrap();
        db.insert_author(&NewAuthor::new("Arthur", "Clarke")).unwrap();
        db.insert_author(&NewAuthor::new("Isaac", "Asimov")).unwrap();

        let found = db.find_authors_by_last_name("C").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].last_name, "Christie");
        assert!(db.find_authors_by_last_name("%").unwrap().is_empty());
    }

    #[test]
    fn test_publisher_email_validated_by_schema() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        let result = db.conn().execute(
            "INSERT INTO publishers (name, email, created_at, updated_at)
             VALUES ('Bad Press', 'not-an-email', ?1, ?1)",
            [now],
        );
        assert!(result.is_err());
        assert!(db
            .insert_publisher(&NewPublisher::new("Good Press"))
            .is_ok());
    }
}
