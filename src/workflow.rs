//! Assign / unassign state machine.
//!
//! A complaint is Unassigned or Assigned (see `Complaint::is_assigned`).
//! Local state changes only after the server confirms, so a failed request
//! needs no rollback.

use crate::api::{cancellable, GrievanceApi};
use crate::board::{Action, NoticeKind};
use crate::desk::Desk;
use crate::error::{WorkflowError, WorkflowResult};
use crate::models::{Officer, OfficerRef, Status};

pub const ASSIGN_OK: &str = "Officer assigned successfully.";
pub const ASSIGN_FAILED: &str = "Failed to assign officer.";
pub const UNASSIGN_OK: &str = "Officer unassigned successfully.";
pub const UNASSIGN_FAILED: &str = "Failed to unassign officer.";

/// How a confirmed mutation landed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The server accepted the request but a newer mutation or reload of the
    /// same complaint had started, so the response was dropped.
    Superseded,
}

impl<A: GrievanceApi> Desk<A> {
    /// Officers available for assignment. Fetched fresh on every call.
    pub async fn roster(&self) -> WorkflowResult<Vec<Officer>> {
        cancellable(&self.cancel, self.api.list_officers())
            .await
            .map_err(WorkflowError::Fetch)
    }

    pub async fn assign(&self, complaint_id: &str, officer: &Officer) -> WorkflowResult<Outcome> {
        let ticket = {
            let mut board = self.board();
            let complaint = board
                .get(complaint_id)
                .ok_or_else(|| WorkflowError::UnknownComplaint(complaint_id.to_string()))?;
            if complaint.is_assigned() {
                return Err(WorkflowError::AlreadyAssigned(complaint_id.to_string()));
            }
            board.begin(complaint_id, Action::Assign)?
        };

        let result = cancellable(&self.cancel, self.api.assign(complaint_id, &officer.id)).await;

        let mut board = self.board();
        let current = board.finish(&ticket);
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(complaint_id, officer_id = %officer.id, error = %e, "assignment failed");
                board.notify(NoticeKind::Failure, ASSIGN_FAILED);
                return Err(WorkflowError::Mutation(e));
            }
        };

        if !current {
            tracing::warn!(complaint_id, "dropping stale assignment response");
            return Ok(Outcome::Superseded);
        }

        let status = raw
            .status
            .as_deref()
            .and_then(|s| s.parse::<Status>().ok())
            .unwrap_or(Status::InProgress);
        let assignee = match raw.assigned_to.as_ref().and_then(|r| r.id().map(|id| (id, r.name()))) {
            Some((id, name)) => OfficerRef {
                id: id.to_string(),
                name: name
                    .map(str::to_string)
                    .or_else(|| (id == officer.id).then(|| officer.full_name.clone())),
            },
            None => OfficerRef {
                id: officer.id.clone(),
                name: Some(officer.full_name.clone()),
            },
        };

        board.patch(complaint_id, |c| {
            c.status = status;
            c.assignee = Some(assignee);
        });
        board.notify(NoticeKind::Success, ASSIGN_OK);
        tracing::info!(complaint_id, officer_id = %officer.id, %status, "officer assigned");
        Ok(Outcome::Applied)
    }

    /// Remove the assignee, then reload the whole list so officer names and
    /// statuses come from the server. A failed reload does not undo the
    /// confirmed unassignment; it is left on the board's error message.
    pub async fn unassign(&self, complaint_id: &str) -> WorkflowResult<Outcome> {
        let ticket = {
            let mut board = self.board();
            let complaint = board
                .get(complaint_id)
                .ok_or_else(|| WorkflowError::UnknownComplaint(complaint_id.to_string()))?;
            if !complaint.can_unassign() {
                return Err(WorkflowError::NotAssigned(complaint_id.to_string()));
            }
            board.begin(complaint_id, Action::Unassign)?
        };

        let result = cancellable(&self.cancel, self.api.unassign(complaint_id)).await;

        {
            let mut board = self.board();
            board.finish(&ticket);
            match &result {
                Ok(()) => board.notify(NoticeKind::Success, UNASSIGN_OK),
                Err(e) => {
                    tracing::warn!(complaint_id, error = %e, "unassignment failed");
                    board.notify(NoticeKind::Failure, UNASSIGN_FAILED);
                }
            }
        }
        result.map_err(WorkflowError::Mutation)?;

        tracing::info!(complaint_id, "officer unassigned");
        if let Err(e) = self.refresh().await {
            tracing::warn!(complaint_id, error = %e, "reload after unassignment failed");
        }
        Ok(Outcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Notice, LOAD_FAILED};
    use crate::detail::Draft;
    use crate::session::Session;
    use crate::testing::{desk, FakeApi};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn officer(id: &str, name: &str) -> Officer {
        Officer {
            id: id.to_string(),
            full_name: name.to_string(),
        }
    }

    fn notice(kind: NoticeKind, message: &str) -> Notice {
        Notice {
            kind,
            message: message.to_string(),
        }
    }

    async fn loaded(api: FakeApi) -> Desk<FakeApi> {
        let desk = desk(api, Session::anonymous());
        desk.refresh().await.unwrap();
        desk
    }

    // ==================== Assign ====================

    #[tokio::test]
    async fn test_assign_success_patches_from_response() {
        let api = FakeApi::with_listing(vec![json!({"uniqueID": "GRV-9", "status": "pending"})]);
        api.set_assign_reply(json!({"uniqueID": "GRV-9", "status": "In Progress", "assignedTo": "O-1"}));
        let desk = loaded(api).await;

        let outcome = desk.assign("GRV-9", &officer("O-1", "Priya Nair")).await.unwrap();
        assert_eq!(outcome, Outcome::Applied);

        let mut board = desk.board();
        let c = board.get("GRV-9").unwrap().clone();
        assert_eq!(c.status, Status::InProgress);
        assert_eq!(
            c.assignee,
            Some(OfficerRef {
                id: "O-1".to_string(),
                name: Some("Priya Nair".to_string())
            })
        );
        assert!(c.is_assigned());
        assert!(!board.is_busy("GRV-9", Action::Assign));
        assert_eq!(board.drain_notices(), vec![notice(NoticeKind::Success, ASSIGN_OK)]);
    }

    #[tokio::test]
    async fn test_assign_uses_server_status() {
        let api = FakeApi::with_listing(vec![json!({"uniqueID": "GRV-9"})]);
        api.set_assign_reply(json!({"grievance": {"status": "resolved", "assignedTo": {"_id": "O-7", "fullName": "Lead"}}}));
        let desk = loaded(api).await;

        desk.assign("GRV-9", &officer("O-1", "Priya Nair")).await.unwrap();
        let board = desk.board();
        let c = board.get("GRV-9").unwrap();
        assert_eq!(c.status, Status::Resolved);
        assert_eq!(c.assignee.as_ref().unwrap().id, "O-7");
        assert_eq!(c.assignee.as_ref().unwrap().name.as_deref(), Some("Lead"));
    }

    #[tokio::test]
    async fn test_assign_failure_leaves_state() {
        let api = FakeApi::with_listing(vec![json!({"uniqueID": "GRV-9", "status": "pending"})]);
        let desk = loaded(api).await;
        let before = desk.board().get("GRV-9").unwrap().clone();

        let result = desk.assign("GRV-9", &officer("O-1", "Priya Nair")).await;
        assert!(matches!(result, Err(WorkflowError::Mutation(_))));

        let mut board = desk.board();
        assert_eq!(board.get("GRV-9").unwrap(), &before);
        assert!(!board.is_busy("GRV-9", Action::Assign));
        assert_eq!(board.drain_notices(), vec![notice(NoticeKind::Failure, ASSIGN_FAILED)]);
    }

    #[tokio::test]
    async fn test_assign_rejected_when_already_assigned() {
        let api = FakeApi::with_listing(vec![
            json!({"uniqueID": "GRV-1", "assignedTo": {"_id": "O-1", "fullName": "A"}}),
            json!({"uniqueID": "GRV-2", "status": "In Progress"}),
        ]);
        let desk = loaded(api).await;

        for id in ["GRV-1", "GRV-2"] {
            let result = desk.assign(id, &officer("O-2", "B")).await;
            assert!(matches!(result, Err(WorkflowError::AlreadyAssigned(_))));
        }
        assert_eq!(desk.api().assign_calls(), 0);
        assert!(desk.board().notices().is_empty());
    }

    #[tokio::test]
    async fn test_assign_unknown_complaint() {
        let desk = loaded(FakeApi::with_listing(vec![])).await;
        let result = desk.assign("GRV-404", &officer("O-1", "A")).await;
        assert!(matches!(result, Err(WorkflowError::UnknownComplaint(_))));
        assert_eq!(desk.api().assign_calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_assign_response_is_dropped() {
        let gate = Arc::new(Notify::new());
        let api = FakeApi::with_listing(vec![json!({"uniqueID": "GRV-9", "status": "pending"})]);
        api.set_assign_reply(json!({"uniqueID": "GRV-9", "status": "In Progress", "assignedTo": "O-1"}));
        api.gate_assign(gate.clone());
        let desk = loaded(api).await;
        let o1 = officer("O-1", "A");

        let (outcome, reload) = tokio::join!(desk.assign("GRV-9", &o1), async {
            // the reload lands while the assignment is still in flight
            let count = desk.refresh().await;
            gate.notify_one();
            count
        });

        assert_eq!(outcome.unwrap(), Outcome::Superseded);
        assert_eq!(reload.unwrap(), 1);
        let board = desk.board();
        let c = board.get("GRV-9").unwrap();
        assert_eq!(c.status, Status::Pending);
        assert!(c.assignee.is_none());
        assert!(!board.is_busy("GRV-9", Action::Assign));
    }

    #[tokio::test]
    async fn test_duplicate_assign_is_busy() {
        let gate = Arc::new(Notify::new());
        let api = FakeApi::with_listing(vec![json!({"uniqueID": "GRV-9", "status": "pending"})]);
        api.set_assign_reply(json!({"status": "in progress", "assignedTo": "O-1"}));
        api.gate_assign(gate.clone());
        let desk = loaded(api).await;
        let o1 = officer("O-1", "A");
        let o2 = officer("O-2", "B");

        let (first, second) = tokio::join!(desk.assign("GRV-9", &o1), async {
            let second = desk.assign("GRV-9", &o2).await;
            gate.notify_one();
            second
        });

        assert_eq!(first.unwrap(), Outcome::Applied);
        assert!(matches!(second, Err(WorkflowError::Busy(_))));
        assert_eq!(desk.api().assign_calls(), 1);
        assert_eq!(desk.board().get("GRV-9").unwrap().assignee.as_ref().unwrap().id, "O-1");
    }

    #[tokio::test]
    async fn test_newer_mutation_supersedes_assign() {
        let gate = Arc::new(Notify::new());
        let api = FakeApi::with_listing(vec![json!({"_id": "k9", "uniqueID": "GRV-9", "status": "pending"})]);
        api.set_assign_reply(json!({"status": "in progress", "assignedTo": "O-1"}));
        api.gate_assign(gate.clone());
        let desk = loaded(api).await;
        desk.board().select("GRV-9").unwrap();
        let o1 = officer("O-1", "A");
        let mut draft = Draft::new("GRV-9", "k9");
        draft.close(Some("duplicate"), "Officer");

        let (assigned, committed) = tokio::join!(desk.assign("GRV-9", &o1), async {
            // the commit starts after the assignment and lands first
            let committed = desk.commit(&draft).await;
            gate.notify_one();
            committed
        });

        assert_eq!(committed.unwrap(), Outcome::Applied);
        assert_eq!(assigned.unwrap(), Outcome::Superseded);
        let board = desk.board();
        let c = board.get("GRV-9").unwrap();
        assert_eq!(c.status, Status::Closed);
        assert!(c.assignee.is_none());
    }

    #[tokio::test]
    async fn test_roster_is_not_cached() {
        let api = FakeApi::with_listing(vec![]);
        api.set_officers(vec![officer("O-1", "Priya Nair")]);
        let desk = loaded(api).await;

        assert_eq!(desk.roster().await.unwrap().len(), 1);
        assert_eq!(desk.roster().await.unwrap().len(), 1);
        assert_eq!(desk.api().roster_calls(), 2);
    }

    // ==================== Unassign ====================

    #[tokio::test]
    async fn test_unassign_refetches_list() {
        let api = FakeApi::with_listing(vec![json!({
            "uniqueID": "GRV-9",
            "status": "In Progress",
            "assignedTo": {"_id": "O-1", "fullName": "Priya Nair"}
        })]);
        let desk = loaded(api).await;
        desk.api()
            .set_listing(vec![json!({"uniqueID": "GRV-9", "status": "pending"})]);

        let outcome = desk.unassign("GRV-9").await.unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(desk.api().unassign_calls(), vec!["GRV-9"]);
        assert_eq!(desk.api().scopes().len(), 2);

        let mut board = desk.board();
        let c = board.get("GRV-9").unwrap();
        assert!(c.assignee.is_none());
        assert!(!c.is_assigned());
        assert_eq!(board.drain_notices(), vec![notice(NoticeKind::Success, UNASSIGN_OK)]);
    }

    #[tokio::test]
    async fn test_unassign_survives_failed_reload() {
        let api = FakeApi::with_listing(vec![json!({
            "uniqueID": "GRV-9",
            "assignedTo": {"_id": "O-1", "fullName": "Priya Nair"}
        })]);
        let desk = loaded(api).await;
        desk.api().fail_listing();

        let outcome = desk.unassign("GRV-9").await.unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(desk.api().unassign_calls(), vec!["GRV-9"]);

        let mut board = desk.board();
        assert_eq!(board.error(), Some(LOAD_FAILED));
        assert_eq!(board.drain_notices(), vec![notice(NoticeKind::Success, UNASSIGN_OK)]);
    }

    #[tokio::test]
    async fn test_unassign_rejected_without_assignee() {
        let api = FakeApi::with_listing(vec![json!({"uniqueID": "GRV-9", "status": "In Progress"})]);
        let desk = loaded(api).await;

        let result = desk.unassign("GRV-9").await;
        assert!(matches!(result, Err(WorkflowError::NotAssigned(_))));
        assert!(desk.api().unassign_calls().is_empty());
    }

    #[tokio::test]
    async fn test_unassign_failure_keeps_assignee() {
        let api = FakeApi::with_listing(vec![json!({"uniqueID": "GRV-9", "assignedTo": {"_id": "O-1"}})]);
        api.fail_unassign();
        let desk = loaded(api).await;

        let result = desk.unassign("GRV-9").await;
        assert!(matches!(result, Err(WorkflowError::Mutation(_))));
        assert_eq!(desk.api().scopes().len(), 1);

        let mut board = desk.board();
        assert!(board.get("GRV-9").unwrap().assignee.is_some());
        assert_eq!(board.drain_notices(), vec![notice(NoticeKind::Failure, UNASSIGN_FAILED)]);
    }
}
