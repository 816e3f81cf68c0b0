use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const VALID_STATUSES: [&str; 4] = ["pending", "in progress", "resolved", "closed"];
pub const VALID_PRIORITIES: [&str; 3] = ["low", "medium", "high"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    #[serde(rename = "in progress")]
    InProgress,
    Resolved,
    Closed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in progress",
            Status::Resolved => "resolved",
            Status::Closed => "closed",
        }
    }

    /// Display tone used when painting a status badge.
    pub fn tone(&self) -> Tone {
        match self {
            Status::Pending => Tone::Warning,
            Status::InProgress => Tone::Info,
            Status::Resolved => Tone::Success,
            Status::Closed => Tone::Muted,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    /// Case-insensitive; the backend writes "In Progress", "in_progress" and
    /// "in progress" interchangeably.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "pending" => Ok(Status::Pending),
            "in progress" => Ok(Status::InProgress),
            "resolved" => Ok(Status::Resolved),
            "closed" => Ok(Status::Closed),
            _ => Err(format!(
                "Invalid status '{}'. Must be one of: {}",
                s,
                VALID_STATUSES.join(", ")
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Priority::High => Tone::Danger,
            Priority::Medium => Tone::Warning,
            Priority::Low => Tone::Success,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!(
                "Invalid priority '{}'. Must be one of: {}",
                s,
                VALID_PRIORITIES.join(", ")
            )),
        }
    }
}

/// Color family for a rendered badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Warning,
    Info,
    Success,
    Muted,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerRef {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
    pub id: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEntry {
    pub message: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    /// Human-facing ticket code, unique within a batch.
    pub id: String,
    /// Backend record key.
    pub key: String,
    pub title: String,
    pub citizen: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub description: String,
    pub attachments: Vec<Attachment>,
    pub category: String,
    pub ministry: String,
    pub authority: String,
    pub status: Status,
    pub assignee: Option<OfficerRef>,
    pub priority: Priority,
    pub date: Option<DateTime<Utc>>,
    pub feedback: Option<String>,
    pub feedback_given: bool,
    pub is_closed: bool,
    pub escalated_to_lead_officer: bool,
    pub updates: Vec<UpdateEntry>,
}

impl Complaint {
    pub fn is_assigned(&self) -> bool {
        self.assignee.is_some() || self.status == Status::InProgress
    }

    pub fn can_unassign(&self) -> bool {
        self.assignee.is_some()
    }

    pub fn date_display(&self) -> String {
        match self.date {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Officer,
    Admin,
    Citizen,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub role: Role,
    #[serde(default, alias = "fullName")]
    pub name: Option<String>,
}
