//! Mapping of raw grievance records into board `Complaint`s.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::collections::HashSet;

use crate::models::{Attachment, Complaint, OfficerRef, Priority, Status, UpdateEntry};
use crate::wire::{RawGrievance, RawLogEntry};

const NOT_AVAILABLE: &str = "N/A";

/// Why a readable record was left off the board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejected {
    #[error("record has neither a ticket code nor a key")]
    MissingId,
    #[error("unknown status '{status}' on {id}")]
    UnknownStatus { id: String, status: String },
}

/// Result of normalizing one fetched batch.
#[derive(Debug, Default)]
pub struct Batch {
    pub complaints: Vec<Complaint>,
    /// Records dropped because they could not be read or keyed.
    pub skipped: usize,
}

pub fn normalize_batch(records: Vec<Value>) -> Batch {
    let mut batch = Batch::default();
    let mut seen = HashSet::new();

    for (index, value) in records.into_iter().enumerate() {
        let raw: RawGrievance = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping unreadable grievance record");
                batch.skipped += 1;
                continue;
            }
        };

        let complaint = match normalize(raw) {
            Ok(complaint) => complaint,
            Err(reason @ Rejected::MissingId) => {
                tracing::warn!(index, %reason, "skipping grievance record");
                batch.skipped += 1;
                continue;
            }
            Err(reason @ Rejected::UnknownStatus { .. }) => {
                tracing::error!(index, %reason, "skipping grievance record");
                batch.skipped += 1;
                continue;
            }
        };

        if !seen.insert(complaint.id.clone()) {
            tracing::warn!(index, id = %complaint.id, "skipping duplicate grievance id");
            batch.skipped += 1;
            continue;
        }

        batch.complaints.push(complaint);
    }

    batch
}

/// A missing status means pending. A status outside the known set rejects
/// the record rather than guessing.
pub fn normalize(raw: RawGrievance) -> Result<Complaint, Rejected> {
    let key = non_empty(raw.key);
    let id = non_empty(raw.unique_id)
        .or_else(|| key.clone())
        .ok_or(Rejected::MissingId)?;
    let key = key.unwrap_or_else(|| id.clone());

    let user = raw.user.unwrap_or_default();
    let citizen = first_of(raw.full_name, user.full_name, NOT_AVAILABLE);
    let email = first_of(raw.email, user.email, NOT_AVAILABLE);
    let phone = first_of(raw.phone_number, user.phone_number, NOT_AVAILABLE);

    let attachments = raw
        .attachments
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| a.url)
        .map(|url| Attachment {
            name: attachment_name(&url),
            url,
        })
        .collect();

    let status = match raw.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().map_err(|_| Rejected::UnknownStatus {
            id: id.clone(),
            status: s.to_string(),
        })?,
        None => Status::Pending,
    };

    let assignee = raw.assigned_to.and_then(|r| {
        r.id().map(|officer_id| OfficerRef {
            id: officer_id.to_string(),
            name: r.name().map(str::to_string),
        })
    });

    let mut updates: Vec<UpdateEntry> = Vec::new();
    updates.extend(raw.activity_log.unwrap_or_default().into_iter().map(log_entry));
    updates.extend(
        raw.progress_updates
            .unwrap_or_default()
            .into_iter()
            .map(|mut entry| {
                // progress updates never fall back to the comment field
                entry.comment = None;
                log_entry(entry)
            }),
    );

    Ok(Complaint {
        id,
        key,
        title: raw.title.unwrap_or_default(),
        citizen,
        email,
        phone,
        location: or_default(raw.location_of_issue, "Not specified"),
        description: or_default(raw.grievance_description, "No description"),
        attachments,
        category: or_default(raw.department_name, "General"),
        ministry: or_default(raw.ministry_name, NOT_AVAILABLE),
        authority: or_default(raw.public_authority, NOT_AVAILABLE),
        status,
        assignee,
        priority: derive_priority(raw.category.as_deref()),
        date: raw.date_of_incident.as_deref().and_then(parse_timestamp),
        feedback: non_empty(raw.feedback),
        feedback_given: raw.feedback_given.unwrap_or(false),
        is_closed: raw.is_closed.unwrap_or(false),
        escalated_to_lead_officer: raw.escalated_to_lead_officer.unwrap_or(false),
        updates,
    })
}

/// Priority is derived from the backend's `category` field; anything that
/// is not a known level falls back to medium.
pub fn derive_priority(category: Option<&str>) -> Priority {
    category
        .and_then(|c| c.parse().ok())
        .unwrap_or(Priority::Medium)
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn log_entry(entry: RawLogEntry) -> UpdateEntry {
    UpdateEntry {
        message: entry.message.or(entry.comment).unwrap_or_default(),
        timestamp: entry.timestamp.as_deref().and_then(parse_timestamp),
        author: entry
            .updated_by
            .as_ref()
            .and_then(|r| r.name())
            .unwrap_or("Unknown")
            .to_string(),
    }
}

fn attachment_name(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn or_default(value: Option<String>, default: &str) -> String {
    non_empty(value).unwrap_or_else(|| default.to_string())
}

fn first_of(primary: Option<String>, fallback: Option<String>, default: &str) -> String {
    non_empty(primary)
        .or_else(|| non_empty(fallback))
        .unwrap_or_else(|| default.to_string())
}
