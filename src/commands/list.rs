use anyhow::{Context, Result};

use crate::api::GrievanceApi;
use crate::board::{PageView, LOAD_FAILED};
use crate::commands::{paint, truncate};
use crate::desk::Desk;
use crate::filter::Choice;
use crate::models::{Complaint, Priority, Status};

const TITLE_WIDTH: usize = 40;

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub search: Option<String>,
    pub status: Choice<Status>,
    pub priority: Choice<Priority>,
    pub page: usize,
}

pub async fn run<A: GrievanceApi>(desk: &Desk<A>, options: &ListOptions, color: bool) -> Result<()> {
    desk.refresh().await.context(LOAD_FAILED)?;

    let mut board = desk.board();
    board.set_search(options.search.clone().unwrap_or_default());
    board.set_status_filter(options.status);
    board.set_priority_filter(options.priority);
    board.set_page(options.page);

    if board.skipped() > 0 {
        eprintln!("Skipped {} record(s) that could not be read", board.skipped());
    }

    let page = board.page();
    for line in render(&page, color) {
        println!("{}", line);
    }
    Ok(())
}

pub fn render(page: &PageView<'_>, color: bool) -> Vec<String> {
    if page.items.is_empty() {
        let message = if page.filtered {
            "No complaints match the filters."
        } else {
            "No complaints found."
        };
        return vec![message.to_string()];
    }

    let mut lines = Vec::with_capacity(page.items.len() + 3);
    lines.push(format!(
        "{:<12} {:<40} {:<12} {:<8} {:<20} {}",
        "ID", "TITLE", "STATUS", "PRIORITY", "ASSIGNED TO", "DATE"
    ));
    lines.extend(page.items.iter().map(|c| format_row(c, color)));
    lines.push(format!(
        "Page {} of {} ({} complaints)",
        page.number, page.total_pages, page.matched
    ));
    let mut hints = Vec::new();
    if page.has_previous {
        hints.push(format!("previous: --page {}", page.number - 1));
    }
    if page.has_next {
        hints.push(format!("next: --page {}", page.number + 1));
    }
    if !hints.is_empty() {
        lines.push(hints.join("  "));
    }
    lines
}

pub fn format_row(complaint: &Complaint, color: bool) -> String {
    // pad before painting so escape codes do not skew the columns
    let status = paint(
        &format!("{:<12}", complaint.status),
        complaint.status.tone(),
        color,
    );
    let priority = paint(
        &format!("{:<8}", complaint.priority),
        complaint.priority.tone(),
        color,
    );
    let assignee = match &complaint.assignee {
        Some(officer) => officer.name.clone().unwrap_or_else(|| officer.id.clone()),
        None if complaint.is_assigned() => "Assigned".to_string(),
        None => "Unassigned".to_string(),
    };
    format!(
        "{:<12} {:<40} {} {} {:<20} {}",
        complaint.id,
        truncate(&complaint.title, TITLE_WIDTH),
        status,
        priority,
        truncate(&assignee, 20),
        complaint.date_display()
    )
}
