//! Shapes of the grievance API's JSON payloads.
//!
//! Every field is optional: the backend omits and nulls fields freely, and
//! defaults are decided in `normalize`, not here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGrievance {
    #[serde(rename = "_id", default)]
    pub key: Option<String>,
    #[serde(rename = "uniqueID", default)]
    pub unique_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(rename = "locationOfIssue", default)]
    pub location_of_issue: Option<String>,
    #[serde(rename = "grievanceDescription", default)]
    pub grievance_description: Option<String>,
    #[serde(default)]
    pub attachments: Option<Vec<RawAttachment>>,
    #[serde(rename = "departmentName", default)]
    pub department_name: Option<String>,
    #[serde(rename = "ministryName", default)]
    pub ministry_name: Option<String>,
    #[serde(rename = "publicAuthority", default)]
    pub public_authority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "assignedTo", default)]
    pub assigned_to: Option<RawOfficerRef>,
    /// Drives the derived priority.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "dateOfIncident", default)]
    pub date_of_incident: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(rename = "feedbackGiven", default)]
    pub feedback_given: Option<bool>,
    #[serde(rename = "isClosed", default)]
    pub is_closed: Option<bool>,
    #[serde(rename = "escalatedToLeadOfficer", default)]
    pub escalated_to_lead_officer: Option<bool>,
    #[serde(rename = "activityLog", default)]
    pub activity_log: Option<Vec<RawLogEntry>>,
    #[serde(rename = "progressUpdates", default)]
    pub progress_updates: Option<Vec<RawLogEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUser {
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAttachment {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLogEntry {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "updatedBy", default)]
    pub updated_by: Option<RawOfficerRef>,
}

/// An officer reference: either a bare id or a populated document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawOfficerRef {
    Id(String),
    Populated {
        #[serde(rename = "_id", default)]
        id: Option<String>,
        #[serde(rename = "fullName", default)]
        full_name: Option<String>,
    },
}

impl RawOfficerRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            RawOfficerRef::Id(id) => Some(id.as_str()),
            RawOfficerRef::Populated { id, .. } => id.as_deref(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            RawOfficerRef::Id(_) => None,
            RawOfficerRef::Populated { full_name, .. } => full_name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOfficer {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAssignment {
    #[serde(rename = "assignedTo", default)]
    pub assigned_to: Option<RawOfficerRef>,
    #[serde(rename = "assignedOfficer", default)]
    pub assigned_officer: Option<RawOfficerRef>,
}

impl RawAssignment {
    /// Display name of the assigned officer; `assignedOfficer` may be the
    /// name itself or a populated officer document.
    pub fn officer_name(&self) -> Option<&str> {
        match &self.assigned_officer {
            Some(RawOfficerRef::Id(name)) => Some(name.as_str()),
            Some(other) => other.name(),
            None => self.assigned_to.as_ref().and_then(|r| r.name()),
        }
    }
}

// Envelopes

#[derive(Debug, Deserialize)]
pub struct GrievanceList {
    #[serde(default)]
    pub grievances: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
pub struct OfficerList {
    #[serde(default)]
    pub officers: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentEnvelope {
    #[serde(default)]
    pub grievance: Option<RawAssignment>,
}

/// The assign endpoint answers with the updated grievance, either bare or
/// wrapped in `{ "grievance": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GrievanceEnvelope {
    Wrapped { grievance: RawGrievance },
    Bare(RawGrievance),
}

impl GrievanceEnvelope {
    pub fn into_inner(self) -> RawGrievance {
        match self {
            GrievanceEnvelope::Wrapped { grievance } => grievance,
            GrievanceEnvelope::Bare(g) => g,
        }
    }
}

/// Error body the backend sends alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// Request bodies

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest<'a> {
    pub grievance_id: &'a str,
    pub officer_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignRequest<'a> {
    pub grievance_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressRequest {
    pub status: Option<String>,
    pub feedback: Option<String>,
    pub updates: Vec<ProgressEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressEntry {
    pub message: String,
    pub timestamp: Option<String>,
    #[serde(rename = "updatedBy")]
    pub updated_by: String,
}
