//! Process-wide session context.
//!
//! Loaded once at startup from the local store and handed to the API client;
//! nothing else reads credentials from storage.

use anyhow::Result;

use crate::models::{Role, UserProfile};
use crate::store::Database;

/// Author recorded on locally staged updates when the profile has no name.
pub const DEFAULT_AUTHOR: &str = "Officer";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    profile: Option<UserProfile>,
}

impl Session {
    /// An unauthenticated, non-officer session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build a session from raw stored blobs. A malformed user blob degrades
    /// to a session without a profile rather than failing.
    pub fn from_raw(token: Option<String>, user: Option<&str>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        let profile = user.and_then(|blob| match serde_json::from_str::<UserProfile>(blob) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed stored user profile");
                None
            }
        });
        Self { token, profile }
    }

    pub fn load(db: &Database) -> Result<Self> {
        Ok(match db.load_session()? {
            Some(stored) => Self::from_raw(stored.token, stored.user.as_deref()),
            None => Self::anonymous(),
        })
    }

    /// Forget the credentials both here and in the store.
    pub fn invalidate(&mut self, db: &Database) -> Result<()> {
        db.clear_session()?;
        self.token = None;
        self.profile = None;
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_officer(&self) -> bool {
        matches!(self.profile, Some(UserProfile { role: Role::Officer, .. }))
    }

    pub fn author(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_AUTHOR)
    }
}
