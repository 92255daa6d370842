//! Loans and reservations, with the copy-counter bookkeeping they imply.
//!
//! Each operation pairs its row change with the matching counter change
//! inside one transaction:
//!
//! | change                        | `available_copies` | `total_copies` |
//! |-------------------------------|--------------------|----------------|
//! | new `Borrowed` record         | -1                 |                |
//! | open -> `Returned`            | +1                 |                |
//! | open -> `Lost`                |                    | -1             |
//! | delete an open record         | +1                 |                |
//!
//! "Open" means `Borrowed` or `Overdue`.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row, Transaction};

use crate::error::{Error, Result};
use crate::model::{
    BookId, BorrowingId, BorrowingRecord, BorrowingStatus, BorrowingUpdate, MemberId,
    NewBorrowing, NewReservation, Reservation, ReservationId, ReservationStatus, MAX_RENEWALS,
};

use super::db::{today, Database};

const BORROWING_COLUMNS: &str = "borrowing_id, member_id, book_id, staff_id, borrow_date,
     due_date, return_date, status, renewal_count, notes, created_at, updated_at";

const RESERVATION_COLUMNS: &str = "reservation_id, member_id, book_id, reservation_date,
     expiry_date, status, notes, created_at, updated_at";

// Borrowing
impl Database {
    /// Record a loan. An open record (`Borrowed` or `Overdue`) takes one
    /// copy off the shelf and fails with [`Error::Unavailable`] when none
    /// is left. Closed history records leave the counters alone.
    pub fn borrow_book(&mut self, loan: &NewBorrowing) -> Result<BorrowingId> {
        let now = Utc::now();
        let tx = self.write_tx()?;

        if loan.status.is_open() {
            let available: u32 = tx
                .query_row(
                    "SELECT available_copies FROM books WHERE book_id = ?1",
                    [loan.book_id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| Error::not_found("book", loan.book_id))?;
            if available == 0 {
                log::warn!("Refused loan of book {}: no copies available", loan.book_id);
                return Err(Error::Unavailable { book: loan.book_id });
            }
        }

        tx.execute(
            "INSERT INTO borrowing_records (member_id, book_id, staff_id, borrow_date, due_date,
                                            return_date, status, renewal_count, notes,
                                            created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                loan.member_id,
                loan.book_id,
                loan.staff_id,
                loan.borrow_date,
                loan.due_date,
                loan.return_date,
                loan.status,
                loan.renewal_count,
                loan.notes,
                now,
            ],
        )?;
        let id = BorrowingId::new(tx.last_insert_rowid());

        if loan.status.is_open() {
            adjust_copies(&tx, loan.book_id, -1, 0)?;
        }

        tx.commit()?;
        log::debug!(
            "Book {} lent to member {} as record {} (due {})",
            loan.book_id,
            loan.member_id,
            id,
            loan.due_date
        );
        Ok(id)
    }

    pub fn get_borrowing(&self, id: BorrowingId) -> Result<BorrowingRecord> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {BORROWING_COLUMNS} FROM borrowing_records WHERE borrowing_id = ?1"
                ),
                [id],
                borrowing_from_row,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("borrowing record", id))
    }

    /// Move a loan to a new status and apply the counter change it implies.
    ///
    /// Re-applying the current status changes nothing, not even the
    /// return date. `Returned` and `Lost` are final.
    pub fn update_borrowing_status(
        &mut self,
        id: BorrowingId,
        update: BorrowingUpdate,
    ) -> Result<BorrowingRecord> {
        let tx = self.write_tx()?;
        let (book, from) = tx
            .query_row(
                "SELECT book_id, status FROM borrowing_records WHERE borrowing_id = ?1",
                [id],
                |row| Ok((row.get::<_, BookId>(0)?, row.get::<_, BorrowingStatus>(1)?)),
            )
            .optional()?
            .ok_or_else(|| Error::not_found("borrowing record", id))?;
        let to = update.status;

        if from == to {
            drop(tx);
            return self.get_borrowing(id);
        }
        if from.is_terminal() {
            log::warn!("Refused transition {} -> {} on record {}", from, to, id);
            return Err(Error::InvalidTransition { from, to });
        }

        let return_date = match to {
            BorrowingStatus::Returned => Some(update.return_date.unwrap_or_else(today)),
            _ => update.return_date,
        };

        tx.execute(
            "UPDATE borrowing_records
             SET status = ?2, return_date = COALESCE(?3, return_date), updated_at = ?4
             WHERE borrowing_id = ?1",
            params![id, to, return_date, Utc::now()],
        )?;

        match to {
            BorrowingStatus::Returned => adjust_copies(&tx, book, 1, 0)?,
            BorrowingStatus::Lost => adjust_copies(&tx, book, 0, -1)?,
            BorrowingStatus::Borrowed | BorrowingStatus::Overdue => {}
        }

        tx.commit()?;
        log::debug!("Borrowing record {} moved {} -> {}", id, from, to);
        self.get_borrowing(id)
    }

    /// Check a copy back in.
    pub fn return_book(&mut self, id: BorrowingId, on: NaiveDate) -> Result<BorrowingRecord> {
        self.update_borrowing_status(id, BorrowingUpdate::returned(on))
    }

    /// Write off a copy as lost.
    pub fn mark_lost(&mut self, id: BorrowingId) -> Result<BorrowingRecord> {
        self.update_borrowing_status(id, BorrowingUpdate::lost())
    }

    /// Extend an open loan to `new_due_date`.
    pub fn renew_borrowing(
        &mut self,
        id: BorrowingId,
        new_due_date: NaiveDate,
    ) -> Result<BorrowingRecord> {
        let tx = self.write_tx()?;
        let (status, renewals): (BorrowingStatus, u32) = tx
            .query_row(
                "SELECT status, renewal_count FROM borrowing_records WHERE borrowing_id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or_else(|| Error::not_found("borrowing record", id))?;

        if !status.is_open() {
            return Err(Error::InvalidTransition {
                from: status,
                to: BorrowingStatus::Borrowed,
            });
        }
        if renewals >= MAX_RENEWALS {
            log::warn!("Refused renewal of record {}: limit reached", id);
            return Err(Error::RenewalLimit { borrowing: id });
        }

        tx.execute(
            "UPDATE borrowing_records
             SET due_date = ?2, renewal_count = renewal_count + 1,
                 status = 'Borrowed', updated_at = ?3
             WHERE borrowing_id = ?1",
            params![id, new_due_date, Utc::now()],
        )?;
        tx.commit()?;
        self.get_borrowing(id)
    }

    /// Flag every `Borrowed` loan due before `today` as `Overdue`.
    pub fn mark_overdue(&mut self, today: NaiveDate) -> Result<usize> {
        let tx = self.write_tx()?;
        let changed = tx.execute(
            "UPDATE borrowing_records SET status = 'Overdue', updated_at = ?2
             WHERE status = 'Borrowed' AND due_date < ?1",
            params![today, Utc::now()],
        )?;
        tx.commit()?;
        if changed > 0 {
            log::info!("Marked {} loans overdue", changed);
        }
        Ok(changed)
    }

    /// Delete a loan record, returning its copy to the shelf if it was
    /// still out.
    pub fn delete_borrowing(&mut self, id: BorrowingId) -> Result<()> {
        let tx = self.write_tx()?;
        let (book, status) = tx
            .query_row(
                "SELECT book_id, status FROM borrowing_records WHERE borrowing_id = ?1",
                [id],
                |row| Ok((row.get::<_, BookId>(0)?, row.get::<_, BorrowingStatus>(1)?)),
            )
            .optional()?
            .ok_or_else(|| Error::not_found("borrowing record", id))?;
        tx.execute("DELETE FROM borrowing_records WHERE borrowing_id = ?1", [id])?;
        if status.is_open() {
            adjust_copies(&tx, book, 1, 0)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn list_member_loans(&self, member: MemberId) -> Result<Vec<BorrowingRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BORROWING_COLUMNS} FROM borrowing_records
             WHERE member_id = ?1
             ORDER BY borrow_date DESC, borrowing_id DESC"
        ))?;
        let loans = stmt
            .query_map([member], borrowing_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(loans)
    }

    /// Open loans whose due date falls within `[from, to]`.
    pub fn loans_due_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<BorrowingRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BORROWING_COLUMNS} FROM borrowing_records
             WHERE status IN ('Borrowed', 'Overdue') AND due_date BETWEEN ?1 AND ?2
             ORDER BY due_date, borrowing_id"
        ))?;
        let loans = stmt
            .query_map(params![from, to], borrowing_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(loans)
    }
}

// Reservations
impl Database {
    /// Place a hold. A second reservation with the same member, book and
    /// status is rejected by the store.
    pub fn reserve_book(&self, reservation: &NewReservation) -> Result<ReservationId> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO reservations (member_id, book_id, reservation_date, expiry_date,
                                       status, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                reservation.member_id,
                reservation.book_id,
                reservation.reservation_date,
                reservation.expiry_date,
                reservation.status,
                reservation.notes,
                now,
            ],
        )?;
        Ok(ReservationId::new(self.conn.last_insert_rowid()))
    }

    pub fn get_reservation(&self, id: ReservationId) -> Result<Reservation> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE reservation_id = ?1"
                ),
                [id],
                reservation_from_row,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("reservation", id))
    }

    pub fn set_reservation_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE reservations SET status = ?2, updated_at = ?3 WHERE reservation_id = ?1",
            params![id, status, Utc::now()],
        )?;
        if updated == 0 {
            return Err(Error::not_found("reservation", id));
        }
        Ok(())
    }

    /// Expire active holds whose expiry date is before `today`.
    pub fn expire_reservations(&mut self, today: NaiveDate) -> Result<usize> {
        let tx = self.write_tx()?;
        let changed = tx.execute(
            "UPDATE reservations SET status = 'Expired', updated_at = ?2
             WHERE status = 'Active' AND expiry_date < ?1",
            params![today, Utc::now()],
        )?;
        tx.commit()?;
        if changed > 0 {
            log::info!("Expired {} reservations", changed);
        }
        Ok(changed)
    }

    /// Reservations for a book, oldest first.
    pub fn list_reservations_for_book(&self, book: BookId) -> Result<Vec<Reservation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations
             WHERE book_id = ?1
             ORDER BY reservation_date, reservation_id"
        ))?;
        let reservations = stmt
            .query_map([book], reservation_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(reservations)
    }
}

/// Shift a book's counters. The books CHECK constraint rejects any result
/// outside `0 <= available <= total`.
fn adjust_copies(tx: &Transaction<'_>, book: BookId, available: i64, total: i64) -> Result<()> {
    let updated = tx.execute(
        "UPDATE books SET available_copies = available_copies + ?2,
                          total_copies = total_copies + ?3,
                          updated_at = ?4
         WHERE book_id = ?1",
        params![book, available, total, Utc::now()],
    )?;
    if updated == 0 {
        return Err(Error::not_found("book", book));
    }
    Ok(())
}

fn borrowing_from_row(row: &Row<'_>) -> rusqlite::Result<BorrowingRecord> {
    Ok(BorrowingRecord {
        id: row.get("borrowing_id")?,
        member_id: row.get("member_id")?,
        book_id: row.get("book_id")?,
        staff_id: row.get("staff_id")?,
        borrow_date: row.get("borrow_date")?,
        due_date: row.get("due_date")?,
        return_date: row.get("return_date")?,
        status: row.get("status")?,
        renewal_count: row.get("renewal_count")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn reservation_from_row(row: &Row<'_>) -> rusqlite::Result<Reservation> {
    Ok(Reservation {
        id: row.get("reservation_id")?,
        member_id: row.get("member_id")?,
        book_id: row.get("book_id")?,
        reservation_date: row.get("reservation_date")?,
        expiry_date: row.get("expiry_date")?,
        status: row.get("status")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
