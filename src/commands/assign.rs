use anyhow::{bail, Context, Result};

use crate::api::GrievanceApi;
use crate::board::LOAD_FAILED;
use crate::commands::print_notices;
use crate::desk::Desk;
use crate::workflow::Outcome;

pub async fn officers<A: GrievanceApi>(desk: &Desk<A>) -> Result<()> {
    let roster = desk.roster().await.context("Failed to load officers")?;
    if roster.is_empty() {
        println!("No officers found.");
        return Ok(());
    }
    for officer in roster {
        println!("{:<26} {}", officer.id, officer.full_name);
    }
    Ok(())
}

pub async fn assign<A: GrievanceApi>(desk: &Desk<A>, id: &str, officer_id: &str) -> Result<()> {
    desk.refresh().await.context(LOAD_FAILED)?;
    let roster = desk.roster().await.context("Failed to load officers")?;
    let officer = match roster.iter().find(|o| o.id == officer_id) {
        Some(o) => o,
        None => bail!("Officer {} not found", officer_id),
    };

    let result = desk.assign(id, officer).await;
    print_notices(desk);
    if result? == Outcome::Superseded {
        println!("Complaint {} changed while assigning; run 'grievance show {}'", id, id);
    }
    Ok(())
}

pub async fn unassign<A: GrievanceApi>(desk: &Desk<A>, id: &str) -> Result<()> {
    desk.refresh().await.context(LOAD_FAILED)?;
    let result = desk.unassign(id).await;
    print_notices(desk);
    result?;
    Ok(())
}
