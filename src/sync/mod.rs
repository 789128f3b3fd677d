//! Research Synchronization Module
//!
//! This module holds the logic that moves newly published works from the search service into the
//! approval sheet. It is composed of several submodules:
//!
//! - `orchestrator`: The entry point for a sync run. It wires the search port, the approval store
//!   and the paging strategy together.
//! - `repositories`: The port traits the orchestrator depends on.
//! - `strategies`: Pluggable paging strategies.
//! - `dedup`: Removes works that are already approved.
//! - `window`: The trailing publication-date window.
//! - `progress_tracker`: Per-journal reports and the run summary.
//! - `types`: The error taxonomy of a run.

/// Duplicate removal against the approval index
pub mod dedup;
/// Main coordinator for the sync process
pub mod orchestrator;
/// Tracks per-journal outcomes and builds the run report
pub mod progress_tracker;
/// Port traits for the search service and the spreadsheet
pub mod repositories;
/// Pluggable paging strategies
pub mod strategies;
/// Error types and journal ids
pub mod types;
/// Publication-date window
pub mod window;

pub use orchestrator::*;
pub use progress_tracker::{JournalReport, SyncReport};
pub use repositories::{ValueRangeStore, WorkSearch};
pub use types::*;
pub use window::SyncWindow;
