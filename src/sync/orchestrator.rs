//! Research sync orchestrator.
//!
//! This module defines the `ResearchSyncOrchestrator`, which drives one sync run:
//! - computes the publication-date window once per run
//! - loads the approval index once per run, before any journal is processed
//! - walks the journals in the order given, one at a time, and for each one searches, drops
//!   already-approved works and appends the rest to the approval sheet
//!
//! Runs on one orchestrator are single-flight: a second `sync` while one is in progress fails with
//! `SyncError::SyncInProgress` instead of racing on the sheet.

use crate::approval::{ApprovalIndex, ApprovalStore};
use crate::config::{JournalErrorPolicy, SyncConfig};
use crate::openalex::{Work, WorkFilter};
use crate::sync::{
	dedup::filter_unapproved,
	progress_tracker::{JournalReport, SyncProgressTracker, SyncReport},
	repositories::WorkSearch,
	strategies::PageStrategy,
	types::{JournalId, SyncError},
	window::SyncWindow,
};

use chrono::{Local, NaiveDate};
use tokio::sync::Mutex;
use tracing::{Instrument, info, info_span, warn};

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Outcome of resolving one approved id back to a work.
#[derive(Debug)]
pub struct Resolution {
	pub id: String,
	pub result: Result<Work, SyncError>,
}

/// Coordinates the search service and the approval sheet.
pub struct ResearchSyncOrchestrator {
	search: Box<dyn WorkSearch>,
	approvals: ApprovalStore,
	page_strategy: Box<dyn PageStrategy>,
	config: SyncConfig,
	clock: Clock,
	run_guard: Mutex<()>,
}

impl ResearchSyncOrchestrator {
	/// Create a new orchestrator.
	///
	/// # Arguments
	/// * `search` - Source of works.
	/// * `approvals` - The approval sheet.
	/// * `config` - Window length, page size, paging and error policy.
	pub fn new(search: Box<dyn WorkSearch>, approvals: ApprovalStore, config: SyncConfig) -> Self {
		let page_strategy = config.pages.strategy();
		Self {
			search,
			approvals,
			page_strategy,
			config,
			clock: Box::new(|| Local::now().date_naive()),
			run_guard: Mutex::new(()),
		}
	}

	/// Replace the source of "today".
	pub fn with_clock<F>(mut self, clock: F) -> Self
	where
		F: Fn() -> NaiveDate + Send + Sync + 'static,
	{
		self.clock = Box::new(clock);
		self
	}

	/// Sync new articles for the given journals.
	///
	/// # Returns
	/// A report with the number of works appended per journal and in total. With the default
	/// `abort` policy the first failing journal ends the run and its error is returned.
	pub async fn sync(&self, journal_ids: &[String]) -> Result<SyncReport, SyncError> {
		if journal_ids.is_empty() {
			return Err(SyncError::InvalidInput(
				"at least one journal id is required".to_string(),
			));
		}
		let journals = journal_ids
			.iter()
			.map(JournalId::new)
			.collect::<Result<Vec<_>, _>>()?;

		let _guard = self
			.run_guard
			.try_lock()
			.map_err(|_| SyncError::SyncInProgress)?;

		let span = info_span!("sync", journals = journals.len());
		self.run(&journals).instrument(span).await
	}

	async fn run(&self, journals: &[JournalId]) -> Result<SyncReport, SyncError> {
		let window = SyncWindow::trailing((self.clock)(), self.config.window_days);
		info!(
			"Starting sync of {} journals for window {} using {}",
			journals.len(),
			window,
			self.page_strategy.name()
		);

		let approved = self.approvals.load_approved_ids().await?;
		let mut tracker = SyncProgressTracker::new(window, journals.len());

		for journal in journals {
			let span = info_span!("journal", id = %journal);
			match self
				.sync_journal(journal, &window, &approved)
				.instrument(span)
				.await
			{
				Ok(report) => tracker.record(report),
				Err(err) => match self.config.on_journal_error {
					JournalErrorPolicy::Abort => {
						warn!("Aborting sync at journal {}: {}", journal, err);
						return Err(err);
					}
					JournalErrorPolicy::Continue => {
						tracker.record(JournalReport::failed(journal, &err));
					}
				},
			}
		}

		let report = tracker.finish();
		info!("{}", report.summary());
		Ok(report)
	}

	async fn sync_journal(
		&self,
		journal: &JournalId,
		window: &SyncWindow,
		approved: &ApprovalIndex,
	) -> Result<JournalReport, SyncError> {
		let filter = WorkFilter::new()
			.source(journal.as_str())
			.from_publication_date(window.start)
			.to_string();

		let candidates = self
			.page_strategy
			.fetch(self.search.as_ref(), &filter, self.config.per_page)
			.await?;
		let fetched = candidates.len();

		let fresh = filter_unapproved(candidates, approved);
		let already_approved = fetched - fresh.len();

		let appended = if fresh.is_empty() {
			0
		} else {
			self.approvals.append(&fresh).await?.appended
		};

		Ok(JournalReport {
			journal_id: journal.to_string(),
			fetched,
			already_approved,
			appended,
			failure: None,
		})
	}

	/// Resolve every approved id to its work, one result per id.
	pub async fn resolve_approved(&self) -> Result<Vec<Resolution>, SyncError> {
		let ids = self.approvals.approved_ids_in_order().await?;
		info!("Resolving {} approved articles", ids.len());

		let mut resolutions = Vec::with_capacity(ids.len());
		for id in ids {
			let result = self.search.get_work(&id).await.map_err(SyncError::from);
			resolutions.push(Resolution { id, result });
		}
		Ok(resolutions)
	}

	/// Approved works. Ids that cannot be resolved are logged and left out.
	pub async fn approved_articles(&self) -> Result<Vec<Work>, SyncError> {
		let works = self
			.resolve_approved()
			.await?
			.into_iter()
			.filter_map(|resolution| match resolution.result {
				Ok(work) => Some(work),
				Err(err) => {
					warn!("Skipping approved article {}: {}", resolution.id, err);
					None
				}
			})
			.collect();
		Ok(works)
	}
}
