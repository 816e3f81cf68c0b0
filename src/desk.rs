use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

use crate::board::ComplaintBoard;
use crate::session::Session;

/// One listing view: the board plus everything its workflows talk to.
///
/// Requests issued through a desk are cancelled when it is dropped. The
/// board lock is only ever held between awaits, never across one.
pub struct Desk<A> {
    pub(crate) api: A,
    pub(crate) session: Session,
    pub(crate) board: Mutex<ComplaintBoard>,
    pub(crate) cancel: CancellationToken,
}

impl<A> Desk<A> {
    pub fn new(api: A, session: Session, page_size: NonZeroUsize) -> Self {
        Self {
            api,
            session,
            board: Mutex::new(ComplaintBoard::new(page_size)),
            cancel: CancellationToken::new(),
        }
    }

    /// Tie this desk's requests to an outer token as well (e.g. Ctrl-C).
    pub fn with_parent(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    pub fn board(&self) -> MutexGuard<'_, ComplaintBoard> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<A> Drop for Desk<A> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
