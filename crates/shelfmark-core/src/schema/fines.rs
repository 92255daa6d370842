//! Fines and the member balance they feed.
//!
//! A member's `fine_balance` equals the sum of `amount - paid_amount` over
//! their `Pending` and `Partial` fines. Every operation here moves the
//! balance in the same transaction as the fine row.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row, Transaction};

use crate::error::{Error, Result};
use crate::model::{Fine, FineId, FineStatus, MemberId, Money, NewFine};

use super::db::Database;

const FINE_COLUMNS: &str = "fine_id, member_id, borrowing_id, fine_type, amount_cents,
     paid_amount_cents, fine_date, paid_date, status, description, created_at, updated_at";

impl Database {
    /// Charge a member. The fine starts `Pending` and its full amount is
    /// added to the member's balance.
    pub fn add_fine(&mut self, fine: &NewFine) -> Result<FineId> {
        let now = Utc::now();
        let tx = self.write_tx()?;
        tx.execute(
            "INSERT INTO fines (member_id, borrowing_id, fine_type, amount_cents,
                                paid_amount_cents, fine_date, status, description,
                                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?8, ?8)",
            params![
                fine.member_id,
                fine.borrowing_id,
                fine.fine_type,
                fine.amount,
                fine.fine_date,
                FineStatus::Pending,
                fine.description,
                now,
            ],
        )?;
        let id = FineId::new(tx.last_insert_rowid());
        adjust_balance(&tx, fine.member_id, fine.amount.cents())?;
        tx.commit()?;
        log::debug!(
            "Fined member {} {} ({})",
            fine.member_id,
            fine.amount,
            fine.fine_type
        );
        Ok(id)
    }

    pub fn get_fine(&self, id: FineId) -> Result<Fine> {
        self.conn
            .query_row(
                &format!("SELECT {FINE_COLUMNS} FROM fines WHERE fine_id = ?1"),
                [id],
                fine_from_row,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("fine", id))
    }

    pub fn list_member_fines(&self, member: MemberId) -> Result<Vec<Fine>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FINE_COLUMNS} FROM fines WHERE member_id = ?1 ORDER BY fine_date, fine_id"
        ))?;
        let fines = stmt
            .query_map([member], fine_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(fines)
    }

    /// Record a payment against a fine.
    ///
    /// The fine becomes `Paid` once fully covered and `Partial` before that.
    /// The member's balance drops by `amount`.
    pub fn pay_fine(&mut self, id: FineId, amount: Money, on: NaiveDate) -> Result<Fine> {
        if amount.is_zero() {
            return Err(Error::InvalidData("payment amount must be positive".into()));
        }
        let tx = self.write_tx()?;
        let fine = load_fine(&tx, id)?;
        if !fine.status.is_outstanding() {
            return Err(Error::FineSettled { fine: id });
        }
        let outstanding = fine.outstanding();
        let Some(remaining) = outstanding.checked_sub(amount) else {
            log::warn!("Refused overpayment of {} on fine {}", amount, id);
            return Err(Error::Overpayment {
                fine: id,
                outstanding,
            });
        };

        let (status, paid_date) = if remaining.is_zero() {
            (FineStatus::Paid, Some(on))
        } else {
            (FineStatus::Partial, None)
        };
        tx.execute(
            "UPDATE fines
             SET paid_amount_cents = paid_amount_cents + ?2, status = ?3,
                 paid_date = ?4, updated_at = ?5
             WHERE fine_id = ?1",
            params![id, amount, status, paid_date, Utc::now()],
        )?;
        adjust_balance(&tx, fine.member_id, -amount.cents())?;
        tx.commit()?;
        log::debug!("Fine {} paid {} ({} left)", id, amount, remaining);
        self.get_fine(id)
    }

    /// Forgive whatever is still owed on a fine.
    pub fn waive_fine(&mut self, id: FineId) -> Result<Fine> {
        let tx = self.write_tx()?;
        let fine = load_fine(&tx, id)?;
        if !fine.status.is_outstanding() {
            return Err(Error::FineSettled { fine: id });
        }
        tx.execute(
            "UPDATE fines SET status = ?2, updated_at = ?3 WHERE fine_id = ?1",
            params![id, FineStatus::Waived, Utc::now()],
        )?;
        adjust_balance(&tx, fine.member_id, -fine.outstanding().cents())?;
        tx.commit()?;
        log::debug!("Fine {} waived ({} forgiven)", id, fine.outstanding());
        self.get_fine(id)
    }

    /// Delete a fine, removing any unpaid part from the member's balance.
    pub fn delete_fine(&mut self, id: FineId) -> Result<()> {
        let tx = self.write_tx()?;
        let fine = load_fine(&tx, id)?;
        tx.execute("DELETE FROM fines WHERE fine_id = ?1", [id])?;
        adjust_balance(&tx, fine.member_id, -fine.outstanding().cents())?;
        tx.commit()?;
        Ok(())
    }
}

fn load_fine(tx: &Transaction<'_>, id: FineId) -> Result<Fine> {
    tx.query_row(
        &format!("SELECT {FINE_COLUMNS} FROM fines WHERE fine_id = ?1"),
        [id],
        fine_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("fine", id))
}

/// Shift a member's balance. The members CHECK constraint keeps it
/// non-negative.
fn adjust_balance(tx: &Transaction<'_>, member: MemberId, delta_cents: i64) -> Result<()> {
    let updated = tx.execute(
        "UPDATE members SET fine_balance_cents = fine_balance_cents + ?2, updated_at = ?3
         WHERE member_id = ?1",
        params![member, delta_cents, Utc::now()],
    )?;
    if updated == 0 {
        return Err(Error::not_found("member", member));
    }
    Ok(())
}

fn fine_from_row(row: &Row<'_>) -> rusqlite::Result<Fine> {
    Ok(Fine {
        id: row.get("fine_id")?,
        member_id: row.get("member_id")?,
        borrowing_id: row.get("borrowing_id")?,
        fine_type: row.get("fine_type")?,
        amount: row.get("amount_cents")?,
        paid_amount: row.get("paid_amount_cents")?,
        fine_date: row.get("fine_date")?,
        paid_date: row.get("paid_date")?,
        status: row.get("status")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
