use anyhow::{Context, Result};
use shelfmark_core::model::{Book, CategoryId, Isbn, Money, NewBook, PublisherId};
use shelfmark_core::Database;

use super::{find_book, open_db};
use crate::config::Config;

/// Fields accepted by `shelfmark book add`.
#[derive(Debug)]
pub struct AddBook {
    pub isbn: Isbn,
    pub title: String,
    pub category: i64,
    pub copies: u32,
    pub subtitle: Option<String>,
    pub publisher: Option<i64>,
    pub year: Option<i32>,
    pub pages: Option<u32>,
    pub location: Option<String>,
    pub price: Option<Money>,
    pub description: Option<String>,
}

pub fn add_book(config: &Config, args: AddBook) -> Result<()> {
    let mut db = open_db(config)?;

    let mut book = NewBook::new(args.isbn, args.title, CategoryId::new(args.category))
        .with_copies(args.copies);
    if let Some(subtitle) = args.subtitle {
        book = book.with_subtitle(subtitle);
    }
    if let Some(publisher) = args.publisher {
        book = book.with_publisher(PublisherId::new(publisher));
    }
    if let Some(year) = args.year {
        book = book.published(year);
    }
    if let Some(pages) = args.pages {
        book = book.with_pages(pages);
    }
    if let Some(location) = args.location {
        book = book.shelved_at(location);
    }
    if let Some(price) = args.price {
        book = book.with_price(price);
    }
    if let Some(description) = args.description {
        book = book.with_description(description);
    }

    let id = db.insert_book(&book).context("Failed to add book")?;
    println!("✓ Added book {id}: {} ({})", book.title, book.isbn);
    Ok(())
}

pub fn show_book(config: &Config, isbn: &Isbn, json: bool) -> Result<()> {
    let db = open_db(config)?;
    let book = find_book(&db, isbn)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&book)?);
        return Ok(());
    }

    println!("{}", book.title);
    if let Some(subtitle) = &book.subtitle {
        println!("  {subtitle}");
    }
    let authors = db.book_authors(book.id)?;
    if !authors.is_empty() {
        let names: Vec<String> = authors.iter().map(|a| a.full_name()).collect();
        println!("  by {}", names.join(", "));
    }
    println!();
    println!("  ISBN:      {}", book.isbn);
    println!("  Category:  {}", category_path(&db, book.category_id)?);
    if let Some(publisher) = book.publisher_id {
        println!("  Publisher: {}", db.get_publisher(publisher)?.name);
    }
    if let Some(year) = book.publication_year {
        println!("  Published: {year}");
    }
    if let Some(location) = &book.location {
        println!("  Location:  {location}");
    }
    println!(
        "  Copies:    {} of {} available",
        book.available_copies, book.total_copies
    );
    if let Some(description) = &book.description {
        println!("\n  {description}");
    }

    let holds = db
        .list_reservations_for_book(book.id)?
        .into_iter()
        .filter(|r| r.status == shelfmark_core::model::ReservationStatus::Active)
        .count();
    if holds > 0 {
        println!("\n  {holds} active reservation(s)");
    }
    Ok(())
}

pub fn search_books(config: &Config, text: &str) -> Result<()> {
    let db = open_db(config)?;
    let books = db.search_books(text)?;

    if books.is_empty() {
        println!("No books match {text:?}");
        return Ok(());
    }

    for book in &books {
        print_line(book);
    }
    println!("\n{} result(s)", books.len());
    Ok(())
}

pub fn add_copies(config: &Config, isbn: &Isbn, copies: u32) -> Result<()> {
    let mut db = open_db(config)?;
    let book = find_book(&db, isbn)?;
    let book = db.add_copies(book.id, copies)?;
    println!(
        "✓ {}: {} of {} copies available",
        book.title, book.available_copies, book.total_copies
    );
    Ok(())
}

fn print_line(book: &Book) {
    println!(
        "  {:<17} {:<40} {}/{}",
        book.isbn.as_str(),
        book.title,
        book.available_copies,
        book.total_copies
    );
}

/// "Fiction / Mystery" style path from the root down.
fn category_path(db: &Database, id: CategoryId) -> Result<String> {
    let category = db.get_category(id)?;
    let mut names: Vec<String> = db
        .category_ancestors(id)?
        .into_iter()
        .rev()
        .map(|c| c.name)
        .collect();
    names.push(category.name);
    Ok(names.join(" / "))
}
