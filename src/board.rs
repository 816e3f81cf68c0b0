//! In-memory state of one complaint listing view.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;

use crate::error::{WorkflowError, WorkflowResult};
use crate::filter::{filter, Choice, Criteria};
use crate::models::{Complaint, Priority, Status};
use crate::normalize::Batch;
use crate::paginate::paginate;

pub const LOAD_FAILED: &str = "Failed to load complaints.";

/// A button that can be in a loading state for one complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Assign,
    Unassign,
    Commit,
}

/// Handed out when a mutation starts; the response is applied only while
/// the ticket is still current for its complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub complaint_id: String,
    pub action: Action,
    epoch: u64,
    seq: u64,
}

/// Handed out when a listing request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    patches: u64,
}

/// What happened to a fetched batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// A newer listing request started; the batch was dropped.
    Superseded,
    /// A confirmed mutation was applied while the listing was in flight, so
    /// the batch predates it and was dropped. Fetch again.
    Outdated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// The visible slice of the filtered list.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
    pub items: Vec<&'a Complaint>,
    pub number: usize,
    pub total_pages: usize,
    /// Complaints matching the filters across all pages.
    pub matched: usize,
    pub has_previous: bool,
    pub has_next: bool,
    /// Any search or filter narrowed the list.
    pub filtered: bool,
}

#[derive(Debug)]
pub struct ComplaintBoard {
    complaints: Vec<Complaint>,
    criteria: Criteria,
    page: usize,
    page_size: NonZeroUsize,
    loading: bool,
    error: Option<String>,
    skipped: usize,
    selected: Option<String>,
    busy: HashSet<(String, Action)>,
    sequence: HashMap<String, u64>,
    /// Bumped on every reload so responses to mutations started against an
    /// older list are discarded.
    epoch: u64,
    /// Listing requests started so far.
    load_generation: u64,
    /// Confirmed mutations applied so far.
    patches: u64,
    notices: Vec<Notice>,
}

impl ComplaintBoard {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            complaints: Vec::new(),
            criteria: Criteria::default(),
            page: 1,
            page_size,
            loading: false,
            error: None,
            skipped: 0,
            selected: None,
            busy: HashSet::new(),
            sequence: HashMap::new(),
            epoch: 0,
            load_generation: 0,
            patches: 0,
            notices: Vec::new(),
        }
    }

    // Loading

    pub fn begin_loading(&mut self) -> LoadTicket {
        self.loading = true;
        self.load_generation += 1;
        LoadTicket {
            generation: self.load_generation,
            patches: self.patches,
        }
    }

    /// Replace the list with `batch` unless it is stale. A batch is stale
    /// when a newer listing request has started or when a mutation was
    /// applied after `ticket` was taken.
    pub fn load(&mut self, ticket: LoadTicket, batch: Batch) -> LoadOutcome {
        if ticket.generation != self.load_generation {
            return LoadOutcome::Superseded;
        }
        if ticket.patches != self.patches {
            self.loading = false;
            return LoadOutcome::Outdated;
        }
        self.complaints = batch.complaints;
        self.skipped = batch.skipped;
        self.loading = false;
        self.error = None;
        self.epoch += 1;
        self.sequence.clear();
        if let Some(id) = &self.selected {
            if !self.complaints.iter().any(|c| &c.id == id) {
                self.selected = None;
            }
        }
        LoadOutcome::Loaded
    }

    /// Record a failed listing request. Ignored when a newer one has started.
    pub fn fail_loading(&mut self, ticket: LoadTicket, message: impl Into<String>) -> bool {
        if ticket.generation != self.load_generation {
            return false;
        }
        self.loading = false;
        self.error = Some(message.into());
        true
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn complaints(&self) -> &[Complaint] {
        &self.complaints
    }

    pub fn get(&self, id: &str) -> Option<&Complaint> {
        self.complaints.iter().find(|c| c.id == id)
    }

    /// Apply a confirmed mutation to one complaint; false when it is not on
    /// the board. Listings already in flight become outdated.
    pub(crate) fn patch(&mut self, id: &str, f: impl FnOnce(&mut Complaint)) -> bool {
        match self.complaints.iter_mut().find(|c| c.id == id) {
            Some(complaint) => {
                f(complaint);
                self.patches += 1;
                true
            }
            None => false,
        }
    }

    // Filters and paging

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Changing any filter returns to the first page.
    pub fn set_criteria(&mut self, criteria: Criteria) {
        if criteria != self.criteria {
            self.criteria = criteria;
            self.page = 1;
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let criteria = Criteria {
            search: search.into(),
            ..self.criteria.clone()
        };
        self.set_criteria(criteria);
    }

    pub fn set_status_filter(&mut self, status: Choice<Status>) {
        let criteria = Criteria {
            status,
            ..self.criteria.clone()
        };
        self.set_criteria(criteria);
    }

    pub fn set_priority_filter(&mut self, priority: Choice<Priority>) {
        let criteria = Criteria {
            priority,
            ..self.criteria.clone()
        };
        self.set_criteria(criteria);
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    pub fn visible(&self) -> Vec<&Complaint> {
        filter(&self.complaints, &self.criteria)
    }

    pub fn page(&self) -> PageView<'_> {
        let visible = self.visible();
        let page = paginate(&visible, self.page, self.page_size);
        PageView {
            items: page.items.to_vec(),
            number: page.number,
            total_pages: page.total_pages,
            matched: visible.len(),
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            filtered: !self.criteria.is_unfiltered(),
        }
    }

    // Selection

    pub fn select(&mut self, id: &str) -> WorkflowResult<&Complaint> {
        let index = self
            .complaints
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| WorkflowError::UnknownComplaint(id.to_string()))?;
        self.selected = Some(id.to_string());
        Ok(&self.complaints[index])
    }

    pub fn selected(&self) -> Option<&Complaint> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    // Mutation tracking

    pub fn is_busy(&self, id: &str, action: Action) -> bool {
        self.busy.contains(&(id.to_string(), action))
    }

    /// Mark `action` as loading for `id` and take a fresh ticket. Any ticket
    /// previously issued for the same complaint stops being current.
    pub fn begin(&mut self, id: &str, action: Action) -> WorkflowResult<Ticket> {
        if !self.busy.insert((id.to_string(), action)) {
            return Err(WorkflowError::Busy(id.to_string()));
        }
        let seq = self.sequence.entry(id.to_string()).or_insert(0);
        *seq += 1;
        Ok(Ticket {
            complaint_id: id.to_string(),
            action,
            epoch: self.epoch,
            seq: *seq,
        })
    }

    /// Clear the loading flag and report whether the ticket is still current.
    pub fn finish(&mut self, ticket: &Ticket) -> bool {
        self.busy
            .remove(&(ticket.complaint_id.clone(), ticket.action));
        ticket.epoch == self.epoch
            && self.sequence.get(&ticket.complaint_id) == Some(&ticket.seq)
    }

    // Notifications

    pub fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notices.push(Notice {
            kind,
            message: message.into(),
        });
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
