//! Staged edits for the selected complaint.
//!
//! Status changes, progress notes and closure are collected in a [`Draft`]
//! and only reach the board once the server has accepted them.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::{cancellable, GrievanceApi};
use crate::board::{Action, NoticeKind};
use crate::desk::Desk;
use crate::error::{WorkflowError, WorkflowResult};
use crate::models::{Complaint, Status, UpdateEntry};
use crate::wire::{ProgressEntry, ProgressRequest};
use crate::workflow::Outcome;

pub const COMMIT_OK: &str = "Updates saved.";
pub const COMMIT_FAILED: &str = "Failed to save updates.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub complaint_id: String,
    /// Backend key the commit is addressed to.
    pub key: String,
    pub status: Option<Status>,
    pub feedback: Option<String>,
    pub entries: Vec<UpdateEntry>,
}

impl Draft {
    pub fn new(complaint_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            complaint_id: complaint_id.into(),
            key: key.into(),
            status: None,
            feedback: None,
            entries: Vec::new(),
        }
    }

    pub fn for_complaint(complaint: &Complaint) -> Self {
        Self::new(&complaint.id, &complaint.key)
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.feedback.is_none() && self.entries.is_empty()
    }

    fn push(&mut self, message: String, author: &str) {
        self.entries.push(UpdateEntry {
            message,
            timestamp: Some(Utc::now()),
            author: author.to_string(),
        });
    }

    pub fn change_status(&mut self, status: Status, final_message: Option<&str>, author: &str) {
        let message = match (status, final_message.map(str::trim).filter(|m| !m.is_empty())) {
            (Status::Resolved, Some(note)) => format!("Marked as resolved: {}", note),
            (Status::Resolved, None) => "Marked as resolved".to_string(),
            (other, _) => format!("Status changed to {}", other),
        };
        self.status = Some(status);
        self.push(message, author);
    }

    /// Append a free-text progress note.
    pub fn add_update(&mut self, text: &str, author: &str) -> WorkflowResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(WorkflowError::EmptyUpdate);
        }
        self.push(text.to_string(), author);
        Ok(())
    }

    pub fn close(&mut self, feedback: Option<&str>, author: &str) {
        let feedback = feedback.map(str::trim).filter(|f| !f.is_empty());
        self.status = Some(Status::Closed);
        self.feedback = feedback.map(str::to_string);
        self.push(
            format!(
                "Complaint closed with feedback: {}",
                feedback.unwrap_or("No feedback provided")
            ),
            author,
        );
    }

    pub fn apply_to(&self, complaint: &mut Complaint) {
        if let Some(status) = self.status {
            complaint.status = status;
            if status == Status::Closed {
                complaint.is_closed = true;
            }
        }
        if let Some(feedback) = &self.feedback {
            complaint.feedback = Some(feedback.clone());
            complaint.feedback_given = true;
        }
        complaint.updates.extend(self.entries.iter().cloned());
    }

    /// The complaint as it would look after a successful commit.
    pub fn preview(&self, complaint: &Complaint) -> Complaint {
        let mut preview = complaint.clone();
        self.apply_to(&mut preview);
        preview
    }

    pub fn to_request(&self) -> ProgressRequest {
        ProgressRequest {
            status: self.status.map(|s| s.as_str().to_string()),
            feedback: self.feedback.clone(),
            updates: self
                .entries
                .iter()
                .map(|e| ProgressEntry {
                    message: e.message.clone(),
                    timestamp: e.timestamp.map(|t| t.to_rfc3339()),
                    updated_by: e.author.clone(),
                })
                .collect(),
        }
    }
}

impl<A: GrievanceApi> Desk<A> {
    /// Send `draft` to the server and, once accepted, apply it to the board.
    /// Only the selected complaint can be committed. On failure the board is
    /// left as it was so the caller can keep the draft and retry.
    pub async fn commit(&self, draft: &Draft) -> WorkflowResult<Outcome> {
        if draft.is_empty() {
            return Err(WorkflowError::EmptyDraft(draft.complaint_id.clone()));
        }
        let ticket = {
            let mut board = self.board();
            if board.selected().map(|c| c.id.as_str()) != Some(draft.complaint_id.as_str()) {
                return Err(WorkflowError::NotSelected(draft.complaint_id.clone()));
            }
            board.begin(&draft.complaint_id, Action::Commit)?
        };

        let request = draft.to_request();
        let result = cancellable(&self.cancel, self.api.submit_progress(&draft.key, &request)).await;

        let mut board = self.board();
        let current = board.finish(&ticket);
        if let Err(e) = result {
            tracing::warn!(complaint_id = %draft.complaint_id, error = %e, "commit failed");
            board.notify(NoticeKind::Failure, COMMIT_FAILED);
            return Err(WorkflowError::Mutation(e));
        }
        if !current {
            tracing::warn!(complaint_id = %draft.complaint_id, "dropping stale commit response");
            return Ok(Outcome::Superseded);
        }

        board.patch(&draft.complaint_id, |c| draft.apply_to(c));
        board.notify(NoticeKind::Success, COMMIT_OK);
        tracing::info!(
            complaint_id = %draft.complaint_id,
            entries = draft.entries.len(),
            "draft committed"
        );
        Ok(Outcome::Applied)
    }
}
