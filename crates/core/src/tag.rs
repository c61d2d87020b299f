#![forbid(unsafe_code)]

use crate::CandidateEntry;
use std::fmt;

/// First character of every comment written by the sync process.
///
/// Stores that predate an explicit ownership column rely on this sentinel, so it must
/// stay in lockstep with the format produced by [`tag`].
pub const MANAGED_PREFIX: char = '[';

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the provenance tag `[tick_type][category] description`.
///
/// No trimming or case folding: the text is compared byte-for-byte against what a
/// previous run persisted.
pub fn tag(entry: &CandidateEntry) -> Tag {
    Tag(format!(
        "{MANAGED_PREFIX}{}][{}] {}",
        entry.tick_type, entry.category, entry.description
    ))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    Managed,
    UserOwned,
}

impl Ownership {
    pub fn of(comment: Option<&str>) -> Self {
        match comment {
            Some(comment) if comment.starts_with(MANAGED_PREFIX) => Self::Managed,
            _ => Self::UserOwned,
        }
    }

    pub fn is_managed(self) -> bool {
        matches!(self, Self::Managed)
    }
}
