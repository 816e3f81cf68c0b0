use anyhow::{Context, Result};

use crate::api::GrievanceApi;
use crate::board::LOAD_FAILED;
use crate::commands::paint;
use crate::desk::Desk;
use crate::detail::Draft;
use crate::models::Complaint;
use crate::store::Database;

pub async fn run<A: GrievanceApi>(desk: &Desk<A>, db: &Database, id: &str, color: bool) -> Result<()> {
    desk.refresh().await.context(LOAD_FAILED)?;
    let complaint = desk.board().select(id)?.clone();
    let draft = db.get_draft(id)?;

    for line in render(&complaint, draft.as_ref(), color) {
        println!("{}", line);
    }
    Ok(())
}

pub fn render(complaint: &Complaint, draft: Option<&Draft>, color: bool) -> Vec<String> {
    let mut lines = vec![
        format!("Complaint {}: {}", complaint.id, complaint.title),
        format!(
            "Status: {}",
            paint(complaint.status.as_str(), complaint.status.tone(), color)
        ),
        format!(
            "Priority: {}",
            paint(complaint.priority.as_str(), complaint.priority.tone(), color)
        ),
        format!("Category: {}", complaint.category),
        format!("Ministry: {}", complaint.ministry),
        format!("Public authority: {}", complaint.authority),
        format!("Location: {}", complaint.location),
        format!("Date of incident: {}", complaint.date_display()),
    ];

    match &complaint.assignee {
        Some(officer) => lines.push(format!(
            "Assigned to: {}",
            officer.name.as_deref().unwrap_or(&officer.id)
        )),
        None => lines.push("Assigned to: (none)".to_string()),
    }
    if complaint.escalated_to_lead_officer {
        lines.push("Escalated to lead officer".to_string());
    }

    lines.push(String::new());
    lines.push(format!("Citizen: {}", complaint.citizen));
    lines.push(format!("Email: {}", complaint.email));
    lines.push(format!("Phone: {}", complaint.phone));

    lines.push(String::new());
    lines.push("Description:".to_string());
    lines.extend(complaint.description.lines().map(|l| format!("  {}", l)));

    if !complaint.attachments.is_empty() {
        lines.push(String::new());
        lines.push("Attachments:".to_string());
        lines.extend(
            complaint
                .attachments
                .iter()
                .map(|a| format!("  {} <{}>", a.name, a.url)),
        );
    }

    if let Some(feedback) = &complaint.feedback {
        lines.push(String::new());
        lines.push(format!("Feedback: {}", feedback));
    }

    if !complaint.updates.is_empty() {
        lines.push(String::new());
        lines.push("Updates:".to_string());
        for update in &complaint.updates {
            let when = update
                .timestamp
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "----------------".to_string());
            lines.push(format!("  [{}] {} ({})", when, update.message, update.author));
        }
    }

    if let Some(draft) = draft.filter(|d| !d.is_empty()) {
        let after = draft.preview(complaint);
        lines.push(String::new());
        lines.push(format!(
            "Uncommitted draft: {} entr{} (run 'grievance commit {}')",
            draft.entries.len(),
            if draft.entries.len() == 1 { "y" } else { "ies" },
            complaint.id
        ));
        lines.push(format!(
            "  after commit: status {}, {} update(s)",
            paint(after.status.as_str(), after.status.tone(), color),
            after.updates.len()
        ));
    }

    lines
}
