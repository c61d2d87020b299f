#![forbid(unsafe_code)]

use serde::Deserialize;

/// One row of the upstream adlist feed.
///
/// Field order matches the feed's column order, which lets a headerless CSV record
/// deserialize straight into this struct.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CandidateEntry {
    pub category: String,
    pub tick_type: String,
    pub source_repo: String,
    pub description: String,
    pub source_url: String,
}

impl CandidateEntry {
    pub fn new(
        category: impl Into<String>,
        tick_type: impl Into<String>,
        source_repo: impl Into<String>,
        description: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            tick_type: tick_type.into(),
            source_repo: source_repo.into(),
            description: description.into(),
            source_url: source_url.into(),
        }
    }

    pub fn tag(&self) -> crate::Tag {
        crate::tag(self)
    }
}
