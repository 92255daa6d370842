use anyhow::Result;

use super::open_db;
use crate::config::Config;

pub fn show_status(config: &Config, json: bool) -> Result<()> {
    let db = open_db(config)?;
    let stats = db.catalog_stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("\n📚 Shelfmark Status\n");
    println!("  Database: {}", config.database_path.display());
    println!("  Titles:              {}", stats.titles);
    println!(
        "  Copies:              {} ({} on the shelf)",
        stats.total_copies, stats.available_copies
    );
    println!(
        "  Open loans:          {} ({} overdue)",
        stats.open_loans, stats.overdue_loans
    );
    println!("  Active members:      {}", stats.active_members);
    println!("  Active reservations: {}", stats.active_reservations);
    println!("  Outstanding fines:   {}", stats.outstanding_fines);

    if stats.titles == 0 {
        println!("\n  Run `shelfmark seed` to load demonstration data");
    }

    Ok(())
}
