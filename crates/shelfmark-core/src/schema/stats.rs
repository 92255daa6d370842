use serde::Serialize;

use crate::error::Result;
use crate::model::Money;

use super::db::Database;

/// Headline numbers for the whole catalog. Counts are SQLite integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub titles: i64,
    pub total_copies: i64,
    pub available_copies: i64,
    pub open_loans: i64,
    pub overdue_loans: i64,
    pub active_members: i64,
    pub active_reservations: i64,
    pub outstanding_fines: Money,
}

impl Database {
    pub fn catalog_stats(&self) -> Result<CatalogStats> {
        let stats = self.conn.query_row(
            "SELECT
                 (SELECT COUNT(*) FROM books),
                 (SELECT COALESCE(SUM(total_copies), 0) FROM books),
                 (SELECT COALESCE(SUM(available_copies), 0) FROM books),
                 (SELECT COUNT(*) FROM borrowing_records WHERE status IN ('Borrowed', 'Overdue')),
                 (SELECT COUNT(*) FROM borrowing_records WHERE status = 'Overdue'),
                 (SELECT COUNT(*) FROM members WHERE is_active = 1),
                 (SELECT COUNT(*) FROM reservations WHERE status = 'Active'),
                 (SELECT COALESCE(SUM(fine_balance_cents), 0) FROM members)",
            [],
            |row| {
                Ok(CatalogStats {
                    titles: row.get(0)?,
                    total_copies: row.get(1)?,
                    available_copies: row.get(2)?,
                    open_loans: row.get(3)?,
                    overdue_loans: row.get(4)?,
                    active_members: row.get(5)?,
                    active_reservations: row.get(6)?,
                    outstanding_fines: row.get(7)?,
                })
            },
        )?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_catalog_stats() {
        let db = Database::open_in_memory().unwrap();
        let stats = db.catalog_stats().unwrap();
        assert_eq!(stats.titles, 0);
        assert_eq!(stats.outstanding_fines, Money::ZERO);
    }

    #[test]
    fn test_stats_count_loans_and_fines() {
        use crate::model::{
            BorrowingStatus, Email, FineType, Isbn, MembershipType, NewBook, NewBorrowing,
            NewCategory, NewFine, NewMember,
        };
        use chrono::NaiveDate;

        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        let mut db = Database::open_in_memory().unwrap();
        let cat = db.insert_category(&NewCategory::new("History")).unwrap();
        let book = db
            .insert_book(
                &NewBook::new(Isbn::parse("9780062316097").unwrap(), "Sapiens", cat)
                    .with_copies(3),
            )
            .unwrap();
        let member = db
            .insert_member(&NewMember::new(
                "M-7",
                "Ada",
                "Byron",
                Email::parse("ada@example.org").unwrap(),
                MembershipType::Faculty,
                day(1),
            ))
            .unwrap();
        db.borrow_book(&NewBorrowing::new(member, book, day(1), day(15)))
            .unwrap();
        db.borrow_book(
            &NewBorrowing::new(member, book, day(2), day(16)).with_status(BorrowingStatus::Overdue),
        )
        .unwrap();
        db.add_fine(&NewFine::new(
            member,
            FineType::Overdue,
            Money::parse("2.25").unwrap(),
            day(20),
        ))
        .unwrap();

        let stats = db.catalog_stats().unwrap();
        assert_eq!(stats.titles, 1);
        assert_eq!(stats.total_copies, 3);
        assert_eq!(stats.available_copies, 1);
        assert_eq!(stats.open_loans, 2);
        assert_eq!(stats.overdue_loans, 1);
        assert_eq!(stats.active_members, 1);
        assert_eq!(stats.outstanding_fines, Money::parse("2.25").unwrap());
    }
}
