use anyhow::Result;
use shelfmark_core::model::Category;
use shelfmark_core::Database;

use super::open_db;
use crate::config::Config;

/// Print the category tree with book counts.
pub fn show_tree(config: &Config) -> Result<()> {
    let db = open_db(config)?;
    let roots = db.category_children(None)?;

    if roots.is_empty() {
        println!("No categories yet.");
        return Ok(());
    }

    for root in &roots {
        print_subtree(&db, root, 0)?;
    }
    Ok(())
}

fn print_subtree(db: &Database, category: &Category, depth: usize) -> Result<()> {
    let books = db.list_books_in_category(category.id)?.len();
    println!(
        "{}{} [{}] ({} books)",
        "  ".repeat(depth),
        category.name,
        category.id,
        books
    );
    for child in db.category_children(Some(category.id))? {
        print_subtree(db, &child, depth + 1)?;
    }
    Ok(())
}
