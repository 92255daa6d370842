use anyhow::{Context, Result};
use shelfmark_core::seed;

use super::open_db;
use crate::config::Config;

/// Create the catalog (or bring an existing one up to date).
pub fn run_init(config: &Config) -> Result<()> {
    let db = open_db(config)?;
    println!("✓ Catalog ready: {}", config.database_path.display());
    for (version, name) in db.applied_migrations()? {
        println!("  migration {version:03} {name}");
    }
    Ok(())
}

/// Load the demonstration data set into an empty catalog.
pub fn run_seed(config: &Config) -> Result<()> {
    let mut db = open_db(config)?;
    let summary = seed::load(&mut db).context("Failed to load seed data")?;

    if summary.is_empty() {
        println!("Catalog already has books; nothing seeded.");
        return Ok(());
    }

    println!("✓ Seeded {}", config.database_path.display());
    println!("  categories:   {}", summary.categories);
    println!("  publishers:   {}", summary.publishers);
    println!("  authors:      {}", summary.authors);
    println!("  books:        {}", summary.books);
    println!("  author links: {}", summary.book_authors);
    println!("  members:      {}", summary.members);
    println!("  staff:        {}", summary.staff);
    Ok(())
}
