// src/pipeline/process.rs

//! File processing: decode, detect columns, classify each row, resolve its
//! stakeholder, and aggregate the run into a [`ProcessingResult`].
//!
//! Rows are processed one after another so output order always follows the
//! sheet and the mapping store sees at most one lookup at a time.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{AppError, Result};
use crate::models::{
    Cell, ColumnRole, Config, DateRange, PageRecord, ProcessingResult, Sheet, SiteConfig,
    UploadedFile, round1,
};
use crate::pipeline::columns::ColumnMap;
use crate::pipeline::reader::read_sheet;
use crate::services::{Classifier, StakeholderResolver};
use crate::storage::{SiteConfigStore, StakeholderMappingStore};
use crate::utils::{date, parse_count, split_url};

const TWO_YEARS: f64 = 2.0;

/// Drives one processing run per uploaded file.
pub struct FileProcessor<'a> {
    sites: &'a dyn SiteConfigStore,
    mappings: &'a dyn StakeholderMappingStore,
    config: &'a Config,
    classifier: Classifier,
}

impl<'a> FileProcessor<'a> {
    pub fn new(
        sites: &'a dyn SiteConfigStore,
        mappings: &'a dyn StakeholderMappingStore,
        config: &'a Config,
    ) -> Self {
        Self {
            sites,
            mappings,
            config,
            classifier: Classifier::new(&config.processing),
        }
    }

    /// Process an uploaded file as of the current instant.
    pub async fn process_file(&self, file: &UploadedFile) -> Result<ProcessingResult> {
        self.process_file_at(file, Utc::now()).await
    }

    /// Process an uploaded file as of `now`.
    pub async fn process_file_at(
        &self,
        file: &UploadedFile,
        now: DateTime<Utc>,
    ) -> Result<ProcessingResult> {
        let sheet = read_sheet(file).map_err(|e| AppError::processing(&file.name, e))?;
        self.process_sheet_at(&file.name, &sheet, now).await
    }

    /// Process an already-decoded grid as of the current instant.
    pub async fn process_sheet(&self, file_name: &str, sheet: &Sheet) -> Result<ProcessingResult> {
        self.process_sheet_at(file_name, sheet, Utc::now()).await
    }

    /// Process an already-decoded grid as of `now`.
    pub async fn process_sheet_at(
        &self,
        file_name: &str,
        sheet: &Sheet,
        now: DateTime<Utc>,
    ) -> Result<ProcessingResult> {
        self.run(file_name, sheet, now)
            .await
            .map_err(|e| AppError::processing(file_name, e))
    }

    async fn run(
        &self,
        file_name: &str,
        sheet: &Sheet,
        now: DateTime<Utc>,
    ) -> Result<ProcessingResult> {
        let rules = &self.config.columns;
        let columns = ColumnMap::detect(sheet.header().unwrap_or_default(), rules);
        let url_column = columns.require(ColumnRole::Url, rules)?;

        log::info!(
            "Processing {file_name}: {} data rows",
            sheet.row_count().saturating_sub(1)
        );

        // One snapshot per run; every row classifies against the same sites.
        let sites = self.sites.list_site_configurations().await?;
        let resolver =
            StakeholderResolver::new(self.sites, self.mappings, &self.config.processing);
        let today = now.date_naive();

        let mut pages = Vec::new();
        for (index, row) in sheet.data_rows().enumerate() {
            let url_cell = Sheet::cell(row, url_column);
            if url_cell.is_blank() {
                log::debug!("Skipping row {} of {file_name}: no URL", index + 2);
                continue;
            }

            let page = self
                .build_page(row, url_cell, &columns, &sites, &resolver, now)
                .await;
            pages.push(page);
        }

        let result = summarize(file_name, pages, today);
        log::info!(
            "Processed {file_name}: {} pages, {} expired, {} low engagement",
            result.total_pages,
            result.expired_pages,
            result.low_engagement_pages
        );
        Ok(result)
    }

    async fn build_page(
        &self,
        row: &[Cell],
        url_cell: &Cell,
        columns: &ColumnMap,
        sites: &[SiteConfig],
        resolver: &StakeholderResolver<'_>,
        now: DateTime<Utc>,
    ) -> PageRecord {
        let today = now.date_naive();
        let column = |role| columns.get(role).map(|i| Sheet::cell(row, i));

        let url = url_cell.to_string().trim().to_string();
        let parts = split_url(&url);

        let created_date = column(ColumnRole::Created)
            .map(|cell| date::parse_date(cell, today))
            .unwrap_or(today);
        let updated_date = column(ColumnRole::Updated).and_then(date::parse_cell);
        let page_views = column(ColumnRole::Views).map(parse_count).unwrap_or(0);
        let title = column(ColumnRole::Title).and_then(title_text);

        let site = SiteConfig::find(sites, &parts.domain);
        let thresholds = self.classifier.thresholds_for(site);
        let classification = self
            .classifier
            .classify(created_date, page_views, thresholds, now);

        let stakeholder = resolver
            .resolve_with_sites(sites, &parts.domain, &parts.path)
            .await;

        PageRecord {
            url,
            title,
            created_date,
            updated_date,
            page_views,
            domain: parts.domain,
            path: parts.path,
            age_in_days: classification.age_in_days,
            age_in_years: classification.age_in_years,
            is_expired: classification.is_expired,
            is_low_engagement: classification.is_low_engagement,
            stakeholder: Some(stakeholder),
        }
    }
}

fn title_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Empty => None,
        Cell::Text(s) if s.is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// Aggregate classified pages into a run result.
///
/// Expired pages never also appear in the low-engagement list. Averages are
/// `0.0` and the date range collapses to `today` when there are no pages.
pub fn summarize(file_name: &str, pages: Vec<PageRecord>, today: NaiveDate) -> ProcessingResult {
    let expired: Vec<PageRecord> = pages.iter().filter(|p| p.is_expired).cloned().collect();
    let low_engagement: Vec<PageRecord> = pages
        .iter()
        .filter(|p| p.is_low_engagement && !p.is_expired)
        .cloned()
        .collect();

    let total_pages = pages.len();
    // Oversized cells read as u64::MAX; the total clamps instead of overflowing.
    let total_page_views = pages
        .iter()
        .fold(0u64, |total, p| total.saturating_add(p.page_views));
    let total_age: i64 = pages.iter().map(|p| p.age_in_days).sum();

    let (average_page_age, average_page_views) = if total_pages == 0 {
        (0.0, 0.0)
    } else {
        (
            round1(total_age as f64 / total_pages as f64),
            round1(total_page_views as f64 / total_pages as f64),
        )
    };

    let date_range = DateRange {
        start: pages.iter().map(|p| p.created_date).min().unwrap_or(today),
        end: pages.iter().map(|p| p.created_date).max().unwrap_or(today),
    };

    ProcessingResult {
        file_name: file_name.to_string(),
        upload_date: today,
        total_pages,
        expired_pages: expired.len(),
        low_engagement_pages: low_engagement.len(),
        total_page_views,
        date_range,
        average_page_age,
        average_page_views,
        pages_over_2_years: pages.iter().filter(|p| p.age_in_years >= TWO_YEARS).count(),
        expired_pages_data: expired,
        low_engagement_data: low_engagement,
        all_pages_data: pages,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::models::{MappingType, StakeholderMapping};
    use crate::sheet;
    use crate::storage::MemoryStore;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn example_site() -> SiteConfig {
        SiteConfig {
            id: "1".into(),
            domain: "www.example.com".into(),
            name: "Example".into(),
            enabled: true,
            expiry_days: 730,
            engagement_threshold: 5,
            new_page_days: 30,
            default_stakeholder: "web@example.com".into(),
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new(
            vec![example_site()],
            vec![StakeholderMapping {
                id: "m1".into(),
                site_id: "1".into(),
                pattern: "/about".into(),
                email: "about@example.com".into(),
                kind: MappingType::Exact,
                priority: 10,
                is_active: true,
            }],
        )
    }

    fn three_page_sheet() -> Sheet {
        sheet![
            ["Page URL", "Created Date", "Page Views"],
            ["https://www.example.com/about", "2020-01-01", 10],
            ["https://www.example.com/new", "2025-01-01", 2],
            ["https://www.example.com/ok", "2024-06-01", 50],
        ]
    }

    /// Counts site snapshot fetches.
    struct CountingStore {
        inner: MemoryStore,
        site_fetches: AtomicUsize,
    }

    #[async_trait]
    impl SiteConfigStore for CountingStore {
        async fn list_site_configurations(&self) -> Result<Vec<SiteConfig>> {
            self.site_fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.list_site_configurations().await
        }
    }

    struct DownStore;

    #[async_trait]
    impl SiteConfigStore for DownStore {
        async fn list_site_configurations(&self) -> Result<Vec<SiteConfig>> {
            Err(AppError::store("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_three_page_run() {
        let store = store();
        let config = Config::default();
        let processor = FileProcessor::new(&store, &store, &config);

        let result = processor
            .process_sheet_at("pages.xlsx", &three_page_sheet(), now())
            .await
            .unwrap();

        assert_eq!(result.total_pages, 3);
        assert_eq!(result.expired_pages, 1);
        assert_eq!(result.low_engagement_pages, 1);
        assert_eq!(result.total_page_views, 62);
        assert_eq!(result.upload_date, ymd(2025, 6, 1));

        let about = &result.all_pages_data[0];
        assert!(about.is_expired);
        assert_eq!(about.age_in_days, 1978);
        assert_eq!(about.stakeholder.as_deref(), Some("about@example.com"));

        let new = &result.all_pages_data[1];
        assert!(new.is_low_engagement);
        assert!(!new.is_expired);
        assert_eq!(new.age_in_days, 151);
        assert_eq!(new.stakeholder.as_deref(), Some("web@example.com"));

        let ok = &result.all_pages_data[2];
        assert!(!ok.is_expired && !ok.is_low_engagement);
        assert_eq!(ok.age_in_days, 365);

        assert_eq!(result.expired_pages_data[0].path, "/about");
        assert_eq!(result.low_engagement_data[0].path, "/new");
        assert_eq!(
            result.date_range,
            DateRange {
                start: ymd(2020, 1, 1),
                end: ymd(2025, 1, 1)
            }
        );
        assert_eq!(result.pages_over_2_years, 1);
        assert_eq!(result.average_page_age, 831.3);
        assert_eq!(result.average_page_views, 20.7);
    }

    #[tokio::test]
    async fn test_relative_urls_use_default_thresholds() {
        let store = store();
        let config = Config::default();
        let processor = FileProcessor::new(&store, &store, &config);
        let grid = sheet![
            ["Page URL", "Created Date", "Page Views"],
            ["/about", "2020-01-01", 10],
            ["/new", "2025-01-01", 2],
            ["/ok", "2024-06-01", 50],
        ];

        let result = processor.process_sheet_at("pages.csv", &grid, now()).await.unwrap();

        let flags: Vec<_> = result
            .all_pages_data
            .iter()
            .map(|p| (p.is_expired, p.is_low_engagement))
            .collect();
        assert_eq!(flags, [(true, false), (false, true), (false, false)]);
        assert_eq!(
            result.all_pages_data[0].stakeholder.as_deref(),
            Some(config.processing.unmatched_site_stakeholder.as_str())
        );
    }

    #[tokio::test]
    async fn test_header_only_file() {
        let store = store();
        let config = Config::default();
        let processor = FileProcessor::new(&store, &store, &config);
        let grid = sheet![["URL", "Views"]];

        let result = processor.process_sheet_at("empty.xlsx", &grid, now()).await.unwrap();

        assert_eq!(result.total_pages, 0);
        assert_eq!(result.average_page_age, 0.0);
        assert_eq!(result.average_page_views, 0.0);
        assert_eq!(result.date_range.start, ymd(2025, 6, 1));
        assert_eq!(result.date_range.end, ymd(2025, 6, 1));
    }

    #[tokio::test]
    async fn test_missing_url_column_fails_the_run() {
        let store = store();
        let config = Config::default();
        let processor = FileProcessor::new(&store, &store, &config);
        let grid = sheet![["Address", "Views"], ["example.com", 5]];

        let err = processor.process_sheet_at("bad.xlsx", &grid, now()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Failed to process file: Could not find URL column"));
        assert!(matches!(err, AppError::Processing { ref file, .. } if file == "bad.xlsx"));
    }

    #[tokio::test]
    async fn test_empty_grid_reports_missing_column() {
        let store = store();
        let config = Config::default();
        let processor = FileProcessor::new(&store, &store, &config);

        let err = processor
            .process_sheet_at("blank.xlsx", &Sheet::default(), now())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Could not find URL column"));
    }

    #[tokio::test]
    async fn test_site_store_failure_fails_the_run() {
        let store = store();
        let config = Config::default();
        let processor = FileProcessor::new(&DownStore, &store, &config);

        let err = processor
            .process_sheet_at("pages.xlsx", &three_page_sheet(), now())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to process file: Store error: connection refused"
        );
    }

    #[tokio::test]
    async fn test_sites_fetched_once_per_run() {
        let counting = CountingStore {
            inner: store(),
            site_fetches: AtomicUsize::new(0),
        };
        let config = Config::default();
        let processor = FileProcessor::new(&counting, &counting.inner, &config);

        processor
            .process_sheet_at("pages.xlsx", &three_page_sheet(), now())
            .await
            .unwrap();
        assert_eq!(counting.site_fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_urls_are_skipped_and_order_kept() {
        let store = store();
        let config = Config::default();
        let processor = FileProcessor::new(&store, &store, &config);
        let grid = sheet![
            ["URL", "Title", "Views"],
            ["www.example.com/c", "C", 1],
            ["", "ghost", 100],
            ["   ", "ghost", 100],
            ["www.example.com/a", "", 1],
            ["www.example.com/b", "B", 1],
        ];

        let result = processor.process_sheet_at("pages.xlsx", &grid, now()).await.unwrap();

        let paths: Vec<_> = result.all_pages_data.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, ["/c", "/a", "/b"]);
        assert_eq!(result.all_pages_data[0].title.as_deref(), Some("C"));
        assert_eq!(result.all_pages_data[1].title, None);
    }

    #[tokio::test]
    async fn test_missing_dates_and_views() {
        let store = store();
        let config = Config::default();
        let processor = FileProcessor::new(&store, &store, &config);
        let grid = sheet![
            ["URL", "Created", "Modified", "Visits"],
            ["www.example.com/a", "not a date", 45000, "1,234 visits"],
        ];

        let result = processor.process_sheet_at("pages.xlsx", &grid, now()).await.unwrap();
        let page = &result.all_pages_data[0];

        assert_eq!(page.created_date, ymd(2025, 6, 1));
        assert_eq!(page.age_in_days, 0);
        assert_eq!(page.updated_date, Some(ymd(2023, 3, 15)));
        assert_eq!(page.page_views, 1234);
    }

    #[tokio::test]
    async fn test_huge_view_counts_saturate() {
        let store = store();
        let config = Config::default();
        let processor = FileProcessor::new(&store, &store, &config);
        let grid = sheet![
            ["URL", "Views"],
            ["www.example.com/a", 1e20],
            ["www.example.com/b", 1e20],
        ];

        let result = processor.process_sheet_at("pages.xlsx", &grid, now()).await.unwrap();
        assert_eq!(result.all_pages_data[0].page_views, u64::MAX);
        assert_eq!(result.total_page_views, u64::MAX);
        assert!(result.average_page_views > 0.0);
    }

    #[tokio::test]
    async fn test_native_dates_in_grid() {
        let store = store();
        let config = Config::default();
        let processor = FileProcessor::new(&store, &store, &config);
        let grid = sheet![["URL", "Created"], ["www.example.com/a", ymd(2024, 6, 1)]];

        let result = processor.process_sheet_at("pages.xlsx", &grid, now()).await.unwrap();
        assert_eq!(result.all_pages_data[0].age_in_days, 365);
        assert_eq!(result.all_pages_data[0].page_views, 0);
    }

    #[tokio::test]
    async fn test_csv_upload_end_to_end() {
        let store = store();
        let config = Config::default();
        let processor = FileProcessor::new(&store, &store, &config);
        let file = UploadedFile::new(
            "export.csv",
            "Page URL,Created Date,Page Views\n\
             https://www.example.com/about,2020-01-01,10\n\
             ,2020-01-01,10\n\
             https://www.example.com/ok,2024-06-01,50\n",
        );

        let result = processor.process_file_at(&file, now()).await.unwrap();
        assert_eq!(result.file_name, "export.csv");
        assert_eq!(result.total_pages, 2);
        assert_eq!(result.expired_pages, 1);
    }

    #[tokio::test]
    async fn test_undecodable_upload() {
        let store = store();
        let config = Config::default();
        let processor = FileProcessor::new(&store, &store, &config);
        let file = UploadedFile::new("export.xlsx", b"PK not really".to_vec());

        let err = processor.process_file_at(&file, now()).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to process file:"));
    }

    fn record(path: &str, expired: bool, low: bool, age: i64) -> PageRecord {
        PageRecord {
            url: format!("https://www.example.com{path}"),
            title: None,
            created_date: ymd(2025, 6, 1) - chrono::Duration::days(age),
            updated_date: None,
            page_views: 1,
            domain: "www.example.com".into(),
            path: path.into(),
            age_in_days: age,
            age_in_years: round1(age as f64 / 365.25),
            is_expired: expired,
            is_low_engagement: low,
            stakeholder: None,
        }
    }

    #[test]
    fn test_summary_partitions_are_disjoint() {
        let pages = vec![
            record("/both", true, true, 1000),
            record("/expired", true, false, 800),
            record("/low", false, true, 100),
            record("/fine", false, false, 10),
        ];

        let result = summarize("pages.xlsx", pages, ymd(2025, 6, 1));

        let expired: Vec<_> = result.expired_pages_data.iter().map(|p| p.path.as_str()).collect();
        let low: Vec<_> = result.low_engagement_data.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(expired, ["/both", "/expired"]);
        assert_eq!(low, ["/low"]);
        assert!(result.expired_pages + result.low_engagement_pages <= result.total_pages);
        assert_eq!(result.pages_over_2_years, 2);
        assert_eq!(result.flagged_pages().count(), 3);
    }

    #[test]
    fn test_two_year_boundary_uses_rounded_years() {
        // 727 days rounds to 2.0 years.
        let result = summarize("p.xlsx", vec![record("/a", false, false, 727)], ymd(2025, 6, 1));
        assert_eq!(result.pages_over_2_years, 1);
        let result = summarize("p.xlsx", vec![record("/a", false, false, 712)], ymd(2025, 6, 1));
        assert_eq!(result.pages_over_2_years, 0);
    }
}
