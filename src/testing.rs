//! Shared fixtures for unit tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::api::{GrievanceApi, ListScope};
use crate::desk::Desk;
use crate::error::{ClientError, ClientResult};
use crate::models::{Complaint, Officer, Priority, Status};
use crate::session::Session;
use crate::wire::{GrievanceEnvelope, ProgressRequest, RawAssignment, RawGrievance};

pub(crate) fn complaint(id: &str, title: &str) -> Complaint {
    Complaint {
        id: id.to_string(),
        key: format!("key-{}", id),
        title: title.to_string(),
        citizen: "N/A".to_string(),
        email: "N/A".to_string(),
        phone: "N/A".to_string(),
        location: "Not specified".to_string(),
        description: "No description".to_string(),
        attachments: Vec::new(),
        category: "General".to_string(),
        ministry: "N/A".to_string(),
        authority: "N/A".to_string(),
        status: Status::Pending,
        assignee: None,
        priority: Priority::Medium,
        date: None,
        feedback: None,
        feedback_given: false,
        is_closed: false,
        escalated_to_lead_officer: false,
        updates: Vec::new(),
    }
}

pub(crate) fn desk(api: FakeApi, session: Session) -> Desk<FakeApi> {
    Desk::new(api, session, NonZeroUsize::new(10).unwrap())
}

fn refused() -> ClientError {
    ClientError::Server {
        status: 500,
        message: "refused".to_string(),
    }
}

#[derive(Default)]
struct FakeState {
    listing: Vec<Value>,
    fail_listing: bool,
    officers: Vec<Officer>,
    assign_reply: Option<Value>,
    fail_unassign: bool,
    fail_progress: bool,
    assignments: HashMap<String, Value>,
    scopes: Vec<ListScope>,
    lookups: Vec<String>,
    roster_calls: usize,
    assign_calls: usize,
    unassign_calls: Vec<String>,
    progress: Vec<(String, ProgressRequest)>,
}

/// In-memory backend. Mutations fail unless a reply has been configured.
#[derive(Default)]
pub(crate) struct FakeApi {
    state: Mutex<FakeState>,
    assign_gate: Mutex<Option<Arc<Notify>>>,
    listing_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeApi {
    pub fn with_listing(listing: Vec<Value>) -> Self {
        let api = Self::default();
        api.set_listing(listing);
        api
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn set_listing(&self, listing: Vec<Value>) {
        self.state().listing = listing;
    }

    pub fn fail_listing(&self) {
        self.state().fail_listing = true;
    }

    pub fn set_officers(&self, officers: Vec<Officer>) {
        self.state().officers = officers;
    }

    pub fn set_assign_reply(&self, reply: Value) {
        self.state().assign_reply = Some(reply);
    }

    /// Hold every assign call until `gate` is notified.
    pub fn gate_assign(&self, gate: Arc<Notify>) {
        *self.assign_gate.lock().unwrap() = Some(gate);
    }

    /// Hold the next listing call until `gate` is notified. The listing is
    /// read when the call is made, not when it is released.
    pub fn gate_next_listing(&self, gate: Arc<Notify>) {
        *self.listing_gate.lock().unwrap() = Some(gate);
    }

    pub fn fail_unassign(&self) {
        self.state().fail_unassign = true;
    }

    pub fn fail_progress(&self) {
        self.state().fail_progress = true;
    }

    pub fn set_assignment(&self, key: &str, reply: Value) {
        self.state().assignments.insert(key.to_string(), reply);
    }

    pub fn scopes(&self) -> Vec<ListScope> {
        self.state().scopes.clone()
    }

    pub fn assignment_lookups(&self) -> Vec<String> {
        self.state().lookups.clone()
    }

    pub fn roster_calls(&self) -> usize {
        self.state().roster_calls
    }

    pub fn assign_calls(&self) -> usize {
        self.state().assign_calls
    }

    pub fn unassign_calls(&self) -> Vec<String> {
        self.state().unassign_calls.clone()
    }

    pub fn progress(&self) -> Vec<(String, ProgressRequest)> {
        self.state().progress.clone()
    }
}

#[async_trait]
impl GrievanceApi for FakeApi {
    async fn list_grievances(&self, scope: ListScope) -> ClientResult<Vec<Value>> {
        let reply = {
            let mut state = self.state();
            state.scopes.push(scope);
            if state.fail_listing {
                Err(refused())
            } else {
                Ok(state.listing.clone())
            }
        };
        let gate = self.listing_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        reply
    }

    async fn list_officers(&self) -> ClientResult<Vec<Officer>> {
        let mut state = self.state();
        state.roster_calls += 1;
        Ok(state.officers.clone())
    }

    async fn assign(&self, _grievance_id: &str, _officer_id: &str) -> ClientResult<RawGrievance> {
        let reply = {
            let mut state = self.state();
            state.assign_calls += 1;
            state.assign_reply.clone()
        };
        let gate = self.assign_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let reply = reply.ok_or_else(refused)?;
        Ok(serde_json::from_value::<GrievanceEnvelope>(reply)?.into_inner())
    }

    async fn unassign(&self, grievance_id: &str) -> ClientResult<()> {
        let mut state = self.state();
        if state.fail_unassign {
            return Err(refused());
        }
        state.unassign_calls.push(grievance_id.to_string());
        Ok(())
    }

    async fn assignment(&self, key: &str) -> ClientResult<RawAssignment> {
        let reply = {
            let mut state = self.state();
            state.lookups.push(key.to_string());
            state.assignments.get(key).cloned()
        };
        match reply {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Err(ClientError::NotFound(key.to_string())),
        }
    }

    async fn submit_progress(&self, key: &str, progress: &ProgressRequest) -> ClientResult<()> {
        let mut state = self.state();
        if state.fail_progress {
            return Err(refused());
        }
        state.progress.push((key.to_string(), progress.clone()));
        Ok(())
    }
}
