use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};

use crate::models::{Role, UserProfile};
use crate::session::Session;
use crate::store::Database;

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Officer => "officer",
        Role::Admin => "admin",
        Role::Citizen => "citizen",
        Role::Other => "other",
    }
}

pub fn login(db: &Database, token: &str, user: Option<&str>) -> Result<()> {
    if token.trim().is_empty() {
        bail!("Token cannot be empty");
    }
    let profile = user
        .map(|blob| {
            serde_json::from_str::<UserProfile>(blob)
                .context("User must be a JSON object such as {\"role\":\"officer\",\"name\":\"...\"}")
        })
        .transpose()?;

    db.save_session(token.trim(), user)?;
    tracing::info!("session stored");

    match profile {
        Some(p) => println!(
            "Logged in as {} ({})",
            p.name.as_deref().unwrap_or("unnamed user"),
            role_label(p.role)
        ),
        None => println!("Logged in"),
    }
    Ok(())
}

pub fn logout(db: &Database) -> Result<()> {
    let mut session = Session::load(db)?;
    if !session.is_authenticated() && session.profile().is_none() {
        println!("Not logged in");
        return Ok(());
    }
    session.invalidate(db)?;
    println!("Logged out");
    Ok(())
}

pub fn whoami(db: &Database) -> Result<()> {
    let session = Session::load(db)?;
    let saved_at = db.load_session()?.map(|stored| stored.saved_at);
    for line in describe(&session, saved_at) {
        println!("{}", line);
    }
    Ok(())
}

fn describe(session: &Session, saved_at: Option<DateTime<Utc>>) -> Vec<String> {
    if !session.is_authenticated() {
        return vec!["Not logged in".to_string()];
    }
    let mut lines = Vec::new();
    match session.profile() {
        Some(p) => {
            lines.push(format!("User: {}", session.author()));
            lines.push(format!("Role: {}", role_label(p.role)));
            if session.is_officer() {
                lines.push("Listing: assigned complaints".to_string());
            } else {
                lines.push("Listing: all complaints".to_string());
            }
        }
        None => lines.push("Logged in without a user profile".to_string()),
    }
    if let Some(saved_at) = saved_at {
        lines.push(format!("Since: {}", saved_at.format("%Y-%m-%d %H:%M UTC")));
    }
    lines
}
