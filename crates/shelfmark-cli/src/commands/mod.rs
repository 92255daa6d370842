pub mod book;
pub mod category;
pub mod circulation;
pub mod config;
pub mod fine;
pub mod member;
pub mod setup;
pub mod status;

use anyhow::{Context, Result};
use shelfmark_core::model::{Book, Isbn, Member};
use shelfmark_core::schema::OpenOptions;
use shelfmark_core::Database;

use crate::config::Config;

/// Open the configured catalog, creating its directory on first use.
pub fn open_db(config: &Config) -> Result<Database> {
    let path = &config.database_path;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let options = OpenOptions {
        busy_timeout: config.busy_timeout(),
    };
    Database::open_with(path, options)
        .with_context(|| format!("Failed to open database {}", path.display()))
}

pub(crate) fn find_book(db: &Database, isbn: &Isbn) -> Result<Book> {
    db.find_book_by_isbn(isbn)?
        .ok_or_else(|| anyhow::anyhow!("No book with ISBN {isbn}"))
}

pub(crate) fn find_member(db: &Database, number: &str) -> Result<Member> {
    db.find_member_by_number(number)?
        .ok_or_else(|| anyhow::anyhow!("No member with number {number}"))
}
