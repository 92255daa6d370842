use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use shelfmark_core::model::{Email, MembershipType, NewMember};

use super::{find_member, open_db};
use crate::config::Config;

#[derive(Debug)]
pub struct AddMember {
    pub number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub membership_type: MembershipType,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub phone: Option<String>,
}

pub fn add_member(config: &Config, args: AddMember) -> Result<()> {
    let db = open_db(config)?;
    let start = args.start.unwrap_or_else(|| Local::now().date_naive());

    let mut member = NewMember::new(
        args.number,
        args.first_name,
        args.last_name,
        args.email,
        args.membership_type,
        start,
    );
    if let Some(end) = args.end {
        member = member.until(end);
    }
    if let Some(phone) = args.phone {
        member = member.with_phone(phone);
    }

    let id = db.insert_member(&member).context("Failed to add member")?;
    println!(
        "✓ Added member {id}: {} {} ({})",
        member.first_name, member.last_name, member.membership_number
    );
    Ok(())
}

pub fn show_member(config: &Config, number: &str, json: bool) -> Result<()> {
    let db = open_db(config)?;
    let member = find_member(&db, number)?;
    let loans = db.list_member_loans(member.id)?;
    let fines = db.list_member_fines(member.id)?;

    if json {
        let value = serde_json::json!({
            "member": member,
            "loans": loans,
            "fines": fines,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let today = Local::now().date_naive();
    println!("{} ({})", member.full_name(), member.membership_number);
    println!("  Email:   {}", member.email);
    println!("  Type:    {}", member.membership_type);
    println!(
        "  Status:  {}",
        if member.is_current(today) { "current" } else { "inactive" }
    );
    println!("  Balance: {}", member.fine_balance);

    let open: Vec<_> = loans.iter().filter(|l| l.status.is_open()).collect();
    if !open.is_empty() {
        println!("\n  Loans:");
        for loan in open {
            let title = db.get_book(loan.book_id)?.title;
            let flag = if loan.is_past_due(today) { "  OVERDUE" } else { "" };
            println!(
                "    [{}] {:<40} due {}{}",
                loan.id, title, loan.due_date, flag
            );
        }
    }

    let unpaid: Vec<_> = fines.iter().filter(|f| f.status.is_outstanding()).collect();
    if !unpaid.is_empty() {
        println!("\n  Fines:");
        for fine in unpaid {
            println!(
                "    [{}] {:<15} {} owed ({})",
                fine.id,
                fine.fine_type,
                fine.outstanding(),
                fine.status
            );
        }
    }
    Ok(())
}
