use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use shelfmark_core::model::{BorrowingId, FineId, FineType, Money, NewFine};
use shelfmark_core::Error;

use super::{find_member, open_db};
use crate::config::Config;

pub fn add_fine(
    config: &Config,
    member_number: &str,
    amount: Money,
    fine_type: FineType,
    loan: Option<i64>,
    description: Option<String>,
) -> Result<()> {
    let mut db = open_db(config)?;
    let member = find_member(&db, member_number)?;

    let mut fine = NewFine::new(member.id, fine_type, amount, Local::now().date_naive());
    if let Some(loan) = loan {
        fine = fine.for_borrowing(BorrowingId::new(loan));
    }
    if let Some(description) = description {
        fine = fine.with_description(description);
    }

    let id = db.add_fine(&fine).context("Failed to add fine")?;
    let balance = db.get_member(member.id)?.fine_balance;
    println!("✓ Fine {id}: {amount} ({fine_type}) for {}", member.full_name());
    println!("  Balance now {balance}");
    Ok(())
}

pub fn pay_fine(config: &Config, fine: i64, amount: Money, on: Option<NaiveDate>) -> Result<()> {
    let mut db = open_db(config)?;
    let on = on.unwrap_or_else(|| Local::now().date_naive());

    match db.pay_fine(FineId::new(fine), amount, on) {
        Ok(fine) => {
            println!("✓ Fine {} {} ({} paid)", fine.id, fine.status, fine.paid_amount);
            let left = fine.outstanding();
            if !left.is_zero() {
                println!("  {left} still owed");
            }
            Ok(())
        }
        Err(Error::Overpayment { outstanding, .. }) => {
            anyhow::bail!("Payment of {amount} exceeds the {outstanding} owed")
        }
        Err(err) => Err(err.into()),
    }
}

pub fn waive_fine(config: &Config, fine: i64) -> Result<()> {
    let mut db = open_db(config)?;
    let fine = db.waive_fine(FineId::new(fine))?;
    println!("✓ Fine {} waived", fine.id);
    Ok(())
}
