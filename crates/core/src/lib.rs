#![forbid(unsafe_code)]

pub mod entry;
pub mod groups;
pub mod tag;

pub use entry::CandidateEntry;
pub use groups::{GroupCatalog, GroupCatalogError, GroupSpec};
pub use tag::{MANAGED_PREFIX, Ownership, Tag, tag};
