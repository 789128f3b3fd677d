//! Incremental sync of newly published research articles into a review spreadsheet.
//!
//! Works are discovered through the OpenAlex works API, filtered against the ids reviewers have
//! already approved, and appended to a Google Sheets approval sheet as `Pending` rows.

pub mod approval;
pub mod config;
pub mod openalex;
pub mod sheets;
pub mod sync;

mod retry;
#[cfg(test)]
mod test_support;

pub use approval::ApprovalStore;
pub use config::Config;
pub use openalex::OpenAlexClient;
pub use sheets::{MemorySheet, SheetsClient};
pub use sync::{ResearchSyncOrchestrator, SyncError, SyncReport};
