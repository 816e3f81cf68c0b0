use crate::api::{cancellable, GrievanceApi, ListScope};
use crate::board::{LoadOutcome, LOAD_FAILED};
use crate::desk::Desk;
use crate::error::{ClientError, WorkflowError, WorkflowResult};
use crate::models::Complaint;
use crate::normalize::normalize_batch;

/// Listings fetched again when confirmed mutations keep landing mid-flight.
const MAX_OUTDATED_RELOADS: usize = 3;

impl<A: GrievanceApi> Desk<A> {
    /// Reload the board from the listing endpoint matching the session role.
    /// Returns the number of complaints on the board afterwards.
    ///
    /// A listing that started before a newer one is dropped. A listing that
    /// was in flight while a mutation was applied is fetched again.
    pub async fn refresh(&self) -> WorkflowResult<usize> {
        let scope = ListScope::for_session(&self.session);
        let mut reloads = 0;

        loop {
            let ticket = self.board().begin_loading();

            let records = match cancellable(&self.cancel, self.api.list_grievances(scope)).await {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(?scope, error = %e, "complaint listing failed");
                    self.board().fail_loading(ticket, LOAD_FAILED);
                    return Err(WorkflowError::Fetch(e));
                }
            };

            let mut batch = normalize_batch(records);
            self.backfill_officer_names(&mut batch.complaints).await;

            let count = batch.complaints.len();
            let skipped = batch.skipped;
            let mut board = self.board();
            match board.load(ticket, batch) {
                LoadOutcome::Loaded => {
                    tracing::debug!(count, skipped, "complaints loaded");
                    return Ok(count);
                }
                LoadOutcome::Superseded => {
                    tracing::debug!("dropping listing superseded by a newer one");
                    return Ok(board.complaints().len());
                }
                LoadOutcome::Outdated if reloads < MAX_OUTDATED_RELOADS => {
                    tracing::debug!("listing predates an applied mutation, fetching again");
                    reloads += 1;
                }
                LoadOutcome::Outdated => {
                    tracing::warn!("keeping patched complaints, listing kept going stale");
                    return Ok(board.complaints().len());
                }
            }
        }
    }

    /// Fill in display names for assignees the listing returned as bare ids.
    async fn backfill_officer_names(&self, complaints: &mut [Complaint]) {
        for complaint in complaints
            .iter_mut()
            .filter(|c| matches!(&c.assignee, Some(a) if a.name.is_none()))
        {
            match cancellable(&self.cancel, self.api.assignment(&complaint.key)).await {
                Ok(assignment) => {
                    if let (Some(assignee), Some(name)) =
                        (complaint.assignee.as_mut(), assignment.officer_name())
                    {
                        assignee.name = Some(name.to_string());
                    }
                }
                Err(ClientError::Cancelled) => break,
                Err(e) => {
                    tracing::warn!(id = %complaint.id, error = %e, "officer name backfill failed");
                }
            }
        }
    }
}
