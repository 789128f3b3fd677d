use chrono::NaiveDate;
use research_sync::approval::{ApprovalStore, HEADER};
use research_sync::config::{JournalErrorPolicy, SyncConfig};
use research_sync::openalex::{Meta, OpenAlexError, Work, WorksResponse};
use research_sync::sheets::{A1Range, MemorySheet, SheetsError, UpdateSummary};
use research_sync::sync::{ResearchSyncOrchestrator, SyncError, ValueRangeStore, WorkSearch};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

enum Outcome {
	Works(Vec<&'static str>),
	Fails(u16),
}

/// Search fake keyed by journal id, recording every filter it is asked for.
#[derive(Default)]
struct ScriptedSearch {
	journals: HashMap<&'static str, Outcome>,
	works: HashMap<&'static str, Work>,
	filters: Arc<Mutex<Vec<String>>>,
	/// When set, `search` signals `entered` and then waits on `release`.
	gate: Option<(Arc<Notify>, Arc<Notify>)>,
	/// Reviewer acting mid-run: searching this journal approves the given sheet row.
	reviewer: Option<(&'static str, MemorySheet, u32)>,
}

impl ScriptedSearch {
	fn journal(mut self, id: &'static str, outcome: Outcome) -> Self {
		self.journals.insert(id, outcome);
		self
	}

	fn resolvable(mut self, id: &'static str) -> Self {
		self.works.insert(id, work(id));
		self
	}
}

fn work(id: &str) -> Work {
	Work {
		id: id.to_string(),
		title: format!("Title {}", id),
		publication_date: NaiveDate::from_ymd_opt(2026, 10, 14),
		..Work::default()
	}
}

fn status_error(status: u16) -> OpenAlexError {
	OpenAlexError::Status {
		endpoint: "/works".to_string(),
		status,
		body: String::new(),
	}
}

#[async_trait::async_trait]
impl WorkSearch for ScriptedSearch {
	async fn search(
		&self,
		_query: &str,
		filter: Option<&str>,
		page: u32,
		per_page: u32,
	) -> Result<WorksResponse, OpenAlexError> {
		let filter = filter.unwrap_or_default().to_string();
		self.filters.lock().unwrap().push(filter.clone());

		if let Some((entered, release)) = &self.gate {
			entered.notify_one();
			release.notified().await;
		}

		let journal = filter
			.split(',')
			.find_map(|clause| clause.strip_prefix("primary_location.source.id:"))
			.unwrap_or_default();
		if let Some((trigger, sheet, row)) = &self.reviewer {
			if *trigger == journal {
				sheet
					.update_values(
						&A1Range::block(6, *row, 6, *row),
						&[vec!["Approved".to_string()]],
					)
					.await
					.unwrap();
			}
		}
		match self.journals.get(journal) {
			Some(Outcome::Works(ids)) => Ok(WorksResponse {
				meta: Meta {
					count: ids.len() as u64,
					page: Some(page),
					per_page,
				},
				results: ids.iter().map(|id| work(id)).collect(),
			}),
			Some(Outcome::Fails(status)) => Err(status_error(*status)),
			None => Ok(WorksResponse::default()),
		}
	}

	async fn get_work(&self, id: &str) -> Result<Work, OpenAlexError> {
		self.works.get(id).cloned().ok_or_else(|| status_error(404))
	}
}

/// Counts full-sheet reads, i.e. approval index loads.
#[derive(Clone)]
struct CountingSheet {
	inner: MemorySheet,
	full_reads: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl ValueRangeStore for CountingSheet {
	async fn get_values(&self, range: &A1Range) -> Result<Vec<Vec<String>>, SheetsError> {
		if range.column_span() == (1, HEADER.len() as u32) && range.start.row.is_none() {
			self.full_reads.fetch_add(1, Ordering::SeqCst);
		}
		self.inner.get_values(range).await
	}

	async fn update_values(
		&self,
		range: &A1Range,
		rows: &[Vec<String>],
	) -> Result<UpdateSummary, SheetsError> {
		self.inner.update_values(range, rows).await
	}
}

fn row(cells: &[&str]) -> Vec<String> {
	cells.iter().map(|c| c.to_string()).collect()
}

fn header() -> Vec<String> {
	HEADER.iter().map(|h| h.to_string()).collect()
}

fn approved(id: &str) -> Vec<String> {
	row(&[id, "t", "", "", "", "Approved", ""])
}

fn today() -> NaiveDate {
	NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

fn orchestrator(
	search: ScriptedSearch,
	sheet: &MemorySheet,
	config: SyncConfig,
) -> ResearchSyncOrchestrator {
	ResearchSyncOrchestrator::new(
		Box::new(search),
		ApprovalStore::new(Box::new(sheet.clone()), None),
		config,
	)
	.with_clock(today)
}

fn journals(ids: &[&str]) -> Vec<String> {
	ids.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn appends_only_unapproved_works_as_pending() {
	let sheet = MemorySheet::with_rows(vec![header(), approved("B")]);
	let search = ScriptedSearch::default().journal("J1", Outcome::Works(vec!["A", "B", "C"]));
	let orchestrator = orchestrator(search, &sheet, SyncConfig::default());

	let report = orchestrator.sync(&journals(&["J1"])).await.unwrap();

	assert_eq!(report.total_appended, 2);
	assert_eq!(report.journals[0].fetched, 3);
	assert_eq!(report.journals[0].already_approved, 1);
	let rows = sheet.rows().await;
	assert_eq!(rows.len(), 4);
	assert_eq!(
		rows[2],
		row(&["A", "Title A", "2026-10-14", "", "", "Pending", ""])
	);
	assert_eq!(rows[3][0], "C");
	assert_eq!(rows[3][5], "Pending");
}

#[tokio::test]
async fn rerun_with_everything_approved_appends_nothing() {
	let sheet = MemorySheet::with_rows(vec![
		header(),
		approved("A"),
		approved("B"),
		approved("C"),
	]);
	let search = ScriptedSearch::default().journal("J1", Outcome::Works(vec!["A", "B", "C"]));
	let orchestrator = orchestrator(search, &sheet, SyncConfig::default());

	let first = orchestrator.sync(&journals(&["J1"])).await.unwrap();
	let second = orchestrator.sync(&journals(&["J1"])).await.unwrap();

	assert_eq!(first.total_appended, 0);
	assert_eq!(second.total_appended, 0);
	assert_eq!(sheet.update_count(), 0);
	assert_eq!(sheet.rows().await.len(), 4);
}

#[tokio::test]
async fn pending_rows_do_not_suppress_refetch() {
	let sheet = MemorySheet::with_rows(vec![
		header(),
		row(&["A", "t", "", "", "", "Pending", ""]),
	]);
	let search = ScriptedSearch::default().journal("J1", Outcome::Works(vec!["A"]));
	let orchestrator = orchestrator(search, &sheet, SyncConfig::default());

	let report = orchestrator.sync(&journals(&["J1"])).await.unwrap();

	assert_eq!(report.total_appended, 1);
	let rows = sheet.rows().await;
	assert_eq!(rows.len(), 3);
	assert_eq!(rows[2][0], "A");
}

#[tokio::test]
async fn empty_append_on_header_only_sheet_writes_nothing() {
	let sheet = MemorySheet::with_rows(vec![header()]);
	let store = ApprovalStore::new(Box::new(sheet.clone()), None);

	let result = store.append(&[]).await.unwrap();

	assert_eq!(result.appended, 0);
	assert_eq!(sheet.update_count(), 0);
	assert_eq!(sheet.rows().await, vec![header()]);
}

#[tokio::test]
async fn empty_append_on_blank_sheet_writes_headers_only() {
	let sheet = MemorySheet::new();
	let store = ApprovalStore::new(Box::new(sheet.clone()), None);

	store.append(&[]).await.unwrap();

	assert_eq!(sheet.rows().await, vec![header()]);
}

#[tokio::test]
async fn first_upstream_failure_aborts_remaining_journals() {
	let sheet = MemorySheet::with_rows(vec![header()]);
	let search = ScriptedSearch::default()
		.journal("J1", Outcome::Fails(500))
		.journal("J2", Outcome::Works(vec!["A"]));
	let filters = search.filters.clone();
	let orchestrator = orchestrator(search, &sheet, SyncConfig::default());

	let err = orchestrator.sync(&journals(&["J1", "J2"])).await.unwrap_err();

	assert!(matches!(err, SyncError::UpstreamResponseError(_)), "{err:?}");
	assert_eq!(filters.lock().unwrap().len(), 1);
	assert_eq!(sheet.update_count(), 0);
	assert_eq!(sheet.rows().await, vec![header()]);
}

#[tokio::test]
async fn continue_policy_records_failure_and_keeps_going() {
	let sheet = MemorySheet::with_rows(vec![header()]);
	let search = ScriptedSearch::default()
		.journal("J1", Outcome::Fails(503))
		.journal("J2", Outcome::Works(vec!["A"]));
	let config = SyncConfig {
		on_journal_error: JournalErrorPolicy::Continue,
		..SyncConfig::default()
	};
	let orchestrator = orchestrator(search, &sheet, config);

	let report = orchestrator.sync(&journals(&["J1", "J2"])).await.unwrap();

	assert_eq!(report.total_appended, 1);
	assert_eq!(report.journals.len(), 2);
	assert!(report.journals[0].failure.is_some());
	assert_eq!(report.journals[1].appended, 1);
	assert_eq!(report.failed_journals(), 1);
}

#[tokio::test]
async fn journals_share_one_window_and_are_queried_in_order() {
	let sheet = MemorySheet::with_rows(vec![header()]);
	let search = ScriptedSearch::default();
	let filters = search.filters.clone();
	let orchestrator = orchestrator(search, &sheet, SyncConfig::default());

	let report = orchestrator
		.sync(&journals(&["S2", "S1"]))
		.await
		.unwrap();

	assert_eq!(report.window.start, NaiveDate::from_ymd_opt(2026, 10, 10).unwrap());
	assert_eq!(report.window.end, today());
	assert_eq!(
		*filters.lock().unwrap(),
		vec![
			"primary_location.source.id:S2,from_publication_date:2026-10-10".to_string(),
			"primary_location.source.id:S1,from_publication_date:2026-10-10".to_string(),
		]
	);
}

#[tokio::test]
async fn approved_articles_skip_unresolvable_ids() {
	let sheet = MemorySheet::with_rows(vec![header(), approved("X"), approved("Y")]);
	let search = ScriptedSearch::default().resolvable("X");
	let orchestrator = orchestrator(search, &sheet, SyncConfig::default());

	let works = orchestrator.approved_articles().await.unwrap();
	assert_eq!(works.len(), 1);
	assert_eq!(works[0].id, "X");

	let resolutions = orchestrator.resolve_approved().await.unwrap();
	assert_eq!(resolutions.len(), 2);
	assert_eq!(resolutions[1].id, "Y");
	assert!(matches!(
		resolutions[1].result,
		Err(SyncError::UpstreamResponseError(_))
	));
}

#[tokio::test]
async fn empty_or_blank_journal_lists_are_rejected() {
	let sheet = MemorySheet::new();
	let orchestrator = orchestrator(ScriptedSearch::default(), &sheet, SyncConfig::default());

	assert!(matches!(
		orchestrator.sync(&[]).await,
		Err(SyncError::InvalidInput(_))
	));
	assert!(matches!(
		orchestrator.sync(&journals(&["S1", " "])).await,
		Err(SyncError::InvalidInput(_))
	));
	assert_eq!(sheet.update_count(), 0);
}

#[tokio::test]
async fn overlapping_sync_is_refused() {
	let sheet = MemorySheet::with_rows(vec![header()]);
	let entered = Arc::new(Notify::new());
	let release = Arc::new(Notify::new());
	let search = ScriptedSearch {
		gate: Some((entered.clone(), release.clone())),
		..ScriptedSearch::default()
	}
	.journal("J1", Outcome::Works(vec!["A"]));
	let orchestrator = orchestrator(search, &sheet, SyncConfig::default());

	let ids = journals(&["J1"]);
	let (first, second) = tokio::join!(orchestrator.sync(&ids), async {
		entered.notified().await;
		let result = orchestrator.sync(&ids).await;
		release.notify_one();
		result
	});

	assert_eq!(first.unwrap().total_appended, 1);
	assert!(matches!(second, Err(SyncError::SyncInProgress)));
	assert_eq!(sheet.rows().await.len(), 2);
}

#[tokio::test]
async fn approval_index_is_loaded_once_and_shared_across_journals() {
	let sheet = MemorySheet::with_rows(vec![
		header(),
		row(&["B", "t", "", "", "", "Pending", ""]),
	]);
	let counting = CountingSheet {
		inner: sheet.clone(),
		full_reads: Arc::new(AtomicUsize::new(0)),
	};
	let full_reads = counting.full_reads.clone();
	let search = ScriptedSearch {
		reviewer: Some(("J1", sheet.clone(), 2)),
		..ScriptedSearch::default()
	}
	.journal("J1", Outcome::Works(vec!["A"]))
	.journal("J2", Outcome::Works(vec!["B"]));
	let orchestrator = ResearchSyncOrchestrator::new(
		Box::new(search),
		ApprovalStore::new(Box::new(counting), None),
		SyncConfig::default(),
	)
	.with_clock(today);

	let report = orchestrator.sync(&journals(&["J1", "J2"])).await.unwrap();

	assert_eq!(full_reads.load(Ordering::SeqCst), 1);
	// B was approved after the index was loaded, so it is still appended for J2.
	assert_eq!(report.total_appended, 2);
	assert_eq!(report.journals[1].already_approved, 0);
	let rows = sheet.rows().await;
	assert_eq!(rows[1][5], "Approved");
	assert_eq!(rows[2][0], "A");
	assert_eq!(rows[3][0], "B");
}
