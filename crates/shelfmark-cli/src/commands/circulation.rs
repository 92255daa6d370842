use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};
use shelfmark_core::model::{
    BorrowingId, FineType, Isbn, Money, NewBorrowing, NewFine, NewReservation,
};
use shelfmark_core::Error;

use super::{find_book, find_member, open_db};
use crate::config::Config;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn days_after(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| anyhow::anyhow!("Date out of range: {date} + {days} days"))
}

pub fn borrow(
    config: &Config,
    isbn: &Isbn,
    member_number: &str,
    due: Option<NaiveDate>,
    staff: Option<&str>,
) -> Result<()> {
    let mut db = open_db(config)?;
    let book = find_book(&db, isbn)?;
    let member = find_member(&db, member_number)?;

    let today = today();
    if !member.is_current(today) {
        anyhow::bail!(
            "Membership {} is not current; renew it before lending",
            member.membership_number
        );
    }

    let due = match due {
        Some(due) => due,
        None => days_after(today, config.loan_days)?,
    };
    let mut loan = NewBorrowing::new(member.id, book.id, today, due);
    if let Some(employee_id) = staff {
        let staff = db
            .find_staff_by_employee_id(employee_id)?
            .ok_or_else(|| anyhow::anyhow!("No staff member with id {employee_id}"))?;
        loan = loan.processed_by(staff.id);
    }

    match db.borrow_book(&loan) {
        Ok(id) => {
            println!(
                "✓ Loan {id}: {} to {} (due {due})",
                book.title,
                member.full_name()
            );
            Ok(())
        }
        Err(Error::Unavailable { .. }) => {
            anyhow::bail!(
                "No copies of {} on the shelf. Try `shelfmark reserve {} {}`",
                book.title,
                book.isbn,
                member.membership_number
            )
        }
        Err(err) => Err(err).context("Failed to record loan"),
    }
}

pub fn return_book(config: &Config, loan: i64, on: Option<NaiveDate>) -> Result<()> {
    let mut db = open_db(config)?;
    let on = on.unwrap_or_else(today);
    let record = db.return_book(BorrowingId::new(loan), on)?;
    let book = db.get_book(record.book_id)?;

    println!("✓ Returned {} on {on}", book.title);
    if on > record.due_date {
        let late = (on - record.due_date).num_days();
        println!("  {late} day(s) late. Use `shelfmark fine add` to charge an overdue fine.");
    }
    Ok(())
}

pub fn mark_lost(config: &Config, loan: i64, charge: Option<Money>) -> Result<()> {
    let mut db = open_db(config)?;
    let record = db.mark_lost(BorrowingId::new(loan))?;
    let book = db.get_book(record.book_id)?;
    println!(
        "✓ {} written off ({} copies left)",
        book.title, book.total_copies
    );

    if let Some(amount) = charge {
        let fine = NewFine::new(record.member_id, FineType::LostBook, amount, today())
            .for_borrowing(record.id)
            .with_description(format!("Replacement for {}", book.title));
        let id = db.add_fine(&fine)?;
        println!("  Fine {id}: {amount} charged");
    }
    Ok(())
}

pub fn renew(config: &Config, loan: i64, due: Option<NaiveDate>) -> Result<()> {
    let mut db = open_db(config)?;
    let id = BorrowingId::new(loan);
    let current = db.get_borrowing(id)?;

    let due = match due {
        Some(due) => due,
        None => days_after(current.due_date.max(today()), config.loan_days)?,
    };
    let record = db.renew_borrowing(id, due)?;
    println!(
        "✓ Loan {} renewed until {} (renewal {} of {})",
        record.id,
        record.due_date,
        record.renewal_count,
        shelfmark_core::model::MAX_RENEWALS
    );
    Ok(())
}

/// Flag late loans, expire stale holds, and list what is overdue.
pub fn sweep_overdue(config: &Config) -> Result<()> {
    let mut db = open_db(config)?;
    let today = today();

    let flagged = db.mark_overdue(today)?;
    let expired = db.expire_reservations(today)?;
    println!("✓ {flagged} loan(s) newly overdue, {expired} reservation(s) expired");

    let Some(yesterday) = today.pred_opt() else {
        return Ok(());
    };
    let late = db.loans_due_between(NaiveDate::MIN, yesterday)?;
    if late.is_empty() {
        return Ok(());
    }

    println!();
    for loan in &late {
        let book = db.get_book(loan.book_id)?;
        let member = db.get_member(loan.member_id)?;
        println!(
            "  [{}] {:<40} {:<12} due {} ({} days)",
            loan.id,
            book.title,
            member.membership_number,
            loan.due_date,
            (today - loan.due_date).num_days()
        );
    }
    Ok(())
}

pub fn reserve(
    config: &Config,
    isbn: &Isbn,
    member_number: &str,
    days: Option<u64>,
) -> Result<()> {
    let db = open_db(config)?;
    let book = find_book(&db, isbn)?;
    let member = find_member(&db, member_number)?;

    let today = today();
    let expiry = days_after(today, days.unwrap_or(config.reservation_days))?;
    let reservation = NewReservation::new(member.id, book.id, today, expiry);

    match db.reserve_book(&reservation) {
        Ok(id) => {
            println!(
                "✓ Reservation {id}: {} for {} (held until {expiry})",
                book.title,
                member.full_name()
            );
            Ok(())
        }
        Err(err) if err.constraint_kind() == Some(shelfmark_core::ConstraintKind::Unique) => {
            anyhow::bail!(
                "{} already has an active reservation for {}",
                member.membership_number,
                book.title
            )
        }
        Err(err) => Err(err).context("Failed to place reservation"),
    }
}
