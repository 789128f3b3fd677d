//! Approval sheet
//!
//! One row per discovered work: `Article ID, Title, Publication Date, DOI, Abstract, Status,
//! Comments`, with row 1 as the header. Reviewers edit the status column by hand; the sync only
//! ever appends rows.

/// Reading decisions and appending rows
pub mod store;
/// Row, status and index types
pub mod types;

pub use store::ApprovalStore;
pub use types::*;
