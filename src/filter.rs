use std::fmt;
use std::str::FromStr;

use crate::models::{Complaint, Priority, Status};

/// A filter dropdown value: the `all` sentinel or one concrete choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T: PartialEq> Choice<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }
}

impl<T: FromStr<Err = String>> FromStr for Choice<T> {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Choice::All)
        } else {
            s.parse().map(Choice::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => f.write_str("all"),
            Choice::Only(value) => value.fmt(f),
        }
    }
}

/// Inputs of the list filter bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    pub search: String,
    pub status: Choice<Status>,
    pub priority: Choice<Priority>,
}

impl Criteria {
    pub fn is_unfiltered(&self) -> bool {
        self.search.is_empty() && self.status == Choice::All && self.priority == Choice::All
    }

    pub fn matches(&self, complaint: &Complaint) -> bool {
        self.matches_search(complaint)
            && self.status.admits(&complaint.status)
            && self.priority.admits(&complaint.priority)
    }

    fn matches_search(&self, complaint: &Complaint) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        [&complaint.title, &complaint.id, &complaint.citizen]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Keep the complaints matching `criteria`, in their original order.
pub fn filter<'a, I>(complaints: I, criteria: &Criteria) -> Vec<&'a Complaint>
where
    I: IntoIterator<Item = &'a Complaint>,
{
    complaints
        .into_iter()
        .filter(|c| criteria.matches(c))
        .collect()
}
