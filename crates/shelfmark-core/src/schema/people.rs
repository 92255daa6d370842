//! Members and staff.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::model::{Member, MemberId, NewMember, NewStaff, Staff, StaffId};

use super::db::{today, Database};

const MEMBER_COLUMNS: &str = "member_id, membership_number, first_name, last_name, email, phone,
     address, date_of_birth, membership_type, membership_start, membership_end, is_active,
     fine_balance_cents, created_at, updated_at";

const STAFF_COLUMNS: &str = "staff_id, employee_id, first_name, last_name, email, phone,
     position, hire_date, salary_cents, is_active, created_at, updated_at";

// Members
impl Database {
    pub fn insert_member(&self, member: &NewMember) -> Result<MemberId> {
        member.validate(today())?;
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO members (membership_number, first_name, last_name, email, phone,
                                  address, date_of_birth, membership_type, membership_start,
                                  membership_end, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                member.membership_number,
                member.first_name,
                member.last_name,
                member.email,
                member.phone,
                member.address,
                member.date_of_birth,
                member.membership_type,
                member.membership_start,
                member.membership_end,
                now,
            ],
        )?;
        Ok(MemberId::new(self.conn.last_insert_rowid()))
    }

    pub fn get_member(&self, id: MemberId) -> Result<Member> {
        self.conn
            .query_row(
                &format!("SELECT {MEMBER_COLUMNS} FROM members WHERE member_id = ?1"),
                [id],
                member_from_row,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("member", id))
    }

    pub fn find_member_by_number(&self, membership_number: &str) -> Result<Option<Member>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {MEMBER_COLUMNS} FROM members WHERE membership_number = ?1"),
                [membership_number],
                member_from_row,
            )
            .optional()?)
    }

    /// Case-insensitive lookup by email.
    pub fn find_member_by_email(&self, email: &str) -> Result<Option<Member>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {MEMBER_COLUMNS} FROM members WHERE lower(email) = lower(?1)"),
                [email.trim()],
                member_from_row,
            )
            .optional()?)
    }

    pub fn list_members(&self) -> Result<Vec<Member>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members ORDER BY last_name, first_name"
        ))?;
        let members = stmt
            .query_map([], member_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(members)
    }

    pub fn deactivate_member(&self, id: MemberId) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE members SET is_active = 0, updated_at = ?2 WHERE member_id = ?1",
            params![id, Utc::now()],
        )?;
        if updated == 0 {
            return Err(Error::not_found("member", id));
        }
        Ok(())
    }

    /// Remove a member with their loans, reservations and fines.
    ///
    /// Copies the member still has out are put back on the shelf first so
    /// the book counters stay in step with the remaining loans.
    pub fn delete_member(&mut self, id: MemberId) -> Result<()> {
        let tx = self.write_tx()?;
        let restored = tx.execute(
            "UPDATE books SET available_copies = available_copies + (
                 SELECT COUNT(*) FROM borrowing_records r
                 WHERE r.book_id = books.book_id AND r.member_id = ?1
                   AND r.status IN ('Borrowed', 'Overdue')
             )
             WHERE book_id IN (
                 SELECT book_id FROM borrowing_records
                 WHERE member_id = ?1 AND status IN ('Borrowed', 'Overdue')
             )",
            [id],
        )?;
        let deleted = tx.execute("DELETE FROM members WHERE member_id = ?1", [id])?;
        if deleted == 0 {
            return Err(Error::not_found("member", id));
        }
        tx.commit()?;
        log::info!(
            "Deleted member {} (restored copies of {} titles)",
            id,
            restored
        );
        Ok(())
    }
}

// Staff
impl Database {
    pub fn insert_staff(&self, staff: &NewStaff) -> Result<StaffId> {
        staff.validate(today())?;
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO staff (employee_id, first_name, last_name, email, phone, position,
                                hire_date, salary_cents, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                staff.employee_id,
                staff.first_name,
                staff.last_name,
                staff.email,
                staff.phone,
                staff.position,
                staff.hire_date,
                staff.salary,
                now,
            ],
        )?;
        Ok(StaffId::new(self.conn.last_insert_rowid()))
    }

    pub fn get_staff(&self, id: StaffId) -> Result<Staff> {
        self.conn
            .query_row(
                &format!("SELECT {STAFF_COLUMNS} FROM staff WHERE staff_id = ?1"),
                [id],
                staff_from_row,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("staff", id))
    }

    pub fn find_staff_by_employee_id(&self, employee_id: &str) -> Result<Option<Staff>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {STAFF_COLUMNS} FROM staff WHERE employee_id = ?1"),
                [employee_id],
                staff_from_row,
            )
            .optional()?)
    }

    pub fn deactivate_staff(&self, id: StaffId) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE staff SET is_active = 0, updated_at = ?2 WHERE staff_id = ?1",
            params![id, Utc::now()],
        )?;
        if updated == 0 {
            return Err(Error::not_found("staff", id));
        }
        Ok(())
    }

    /// Remove a staff record; loans they processed keep no attribution.
    pub fn delete_staff(&self, id: StaffId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM staff WHERE staff_id = ?1", [id])?;
        if deleted == 0 {
            return Err(Error::not_found("staff", id));
        }
        Ok(())
    }
}

pub(crate) fn member_from_row(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get("member_id")?,
        membership_number: row.get("membership_number")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        address: row.get("address")?,
        date_of_birth: row.get("date_of_birth")?,
        membership_type: row.get("membership_type")?,
        membership_start: row.get("membership_start")?,
        membership_end: row.get("membership_end")?,
        is_active: row.get("is_active")?,
        fine_balance: row.get("fine_balance_cents")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn staff_from_row(row: &Row<'_>) -> rusqlite::Result<Staff> {
    Ok(Staff {
        id: row.get("staff_id")?,
        employee_id: row.get("employee_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        position: row.get("position")?,
        hire_date: row.get("hire_date")?,
        salary: row.get("salary_cents")?,
        is_active: row.get("is_active")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
