use chrono::{DateTime, Utc};
use diesel::SqliteConnection;
use tracing::{error, info, warn};

use crate::{
    common::prelude::{
        count_articles, count_scraped_before, delete_scraped_before, establish_connection,
        insert_article, load_recent, ArticleRecord, SourceTag, StorageError,
    },
    schemas::prelude::run_migrations,
};

/// Outcome of persisting one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub inserted: usize,
    /// Already stored under the same URL
    pub duplicates: usize,
    /// Insert failed for another reason; logged with the URL
    pub failed: usize,
}

impl ReconcileReport {
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.duplicates + self.failed
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.inserted + self.skipped()
    }
}

/// The article store. URL uniqueness is enforced by the database itself, so
/// overlapping runs cannot store the same article twice.
pub struct Storage {
    conn: SqliteConnection,
}

impl Storage {
    /// Open (or create) the database and bring its schema up to date
    pub fn open(database_url: &str) -> Result<Self, StorageError> {
        let mut conn = establish_connection(database_url)?;
        run_migrations(&mut conn).map_err(|e| StorageError::Migration(e.to_string()))?;
        info!(path = database_url, "Database initialized");

        Ok(Self { conn })
    }

    /// Insert the new articles of the batch; known URLs and failing rows are
    /// skipped without affecting the rest. The batch is committed once.
    pub fn reconcile(&mut self, batch: &[ArticleRecord]) -> Result<ReconcileReport, StorageError> {
        let report = self
            .conn
            .immediate_transaction::<_, diesel::result::Error, _>(|conn| {
                let mut report = ReconcileReport::default();

                for record in batch {
                    match insert_article(record, conn) {
                        Ok(0) => report.duplicates += 1,
                        Ok(_) => report.inserted += 1,
                        Err(e) => {
                            error!(url = %record.url, error = %e, "Error inserting article");
                            report.failed += 1;
                        }
                    }
                }

                Ok(report)
            })?;
        debug_assert_eq!(report.total(), batch.len());

        info!(
            inserted = report.inserted,
            duplicates = report.duplicates,
            failed = report.failed,
            "Stored batch"
        );
        Ok(report)
    }

    /// Most recently scraped articles, newest first
    pub fn recent(
        &mut self,
        limit: usize,
        source: Option<SourceTag>,
    ) -> Result<Vec<ArticleRecord>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        load_recent(limit, source, &mut self.conn)?
            .into_iter()
            .map(ArticleRecord::try_from)
            .collect()
    }

    pub fn count(&mut self, source: Option<SourceTag>) -> Result<i64, StorageError> {
        Ok(count_articles(source, &mut self.conn)?)
    }

    /// Delete every article scraped strictly before `cutoff`, returning how many
    /// there were. Counting and deleting share one transaction.
    pub fn delete_scraped_before(&mut self, cutoff: DateTime<Utc>) -> Result<usize, StorageError> {
        let (expected, deleted) = self
            .conn
            .immediate_transaction::<_, diesel::result::Error, _>(|conn| {
                let expected = count_scraped_before(cutoff, conn)?;
                let deleted = delete_scraped_before(cutoff, conn)?;
                Ok((expected, deleted))
            })?;

        if usize::try_from(expected).ok() != Some(deleted) {
            warn!(expected, deleted, "Deleted count differs from counted");
        }
        Ok(deleted)
    }

    #[cfg(test)]
    fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Duration, SubsecRound, TimeZone};
    use diesel::RunQueryDsl;

    fn article(source: SourceTag, url: &str, title: &str) -> ArticleRecord {
        ArticleRecord {
            source,
            url: url.to_string(),
            title: title.to_string(),
            published_at: None,
            scraped_at: Utc::now().trunc_subsecs(6),
        }
    }

    fn batch() -> Vec<ArticleRecord> {
        vec![
            article(SourceTag::Bbc, "https://www.bbc.com/news/articles/a", "Storm hits coast"),
            article(SourceTag::Ap, "https://apnews.com/article/b", "Election results are in"),
            article(
                SourceTag::GoogleNews,
                "https://news.google.com/rss/articles/c",
                "Central bank holds rates - Reuters",
            ),
        ]
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut storage = Storage::open(":memory:").unwrap();
        let batch = batch();

        let first = storage.reconcile(&batch).unwrap();
        assert_eq!(first.inserted, batch.len());
        assert_eq!(first.skipped(), 0);

        let second = storage.reconcile(&batch).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.duplicates, batch.len());
        assert_eq!(second.skipped(), batch.len());
        assert_eq!(storage.count(None).unwrap(), 3);
    }

    #[test]
    fn test_reconcile_counts_duplicates_within_batch() {
        let mut storage = Storage::open(":memory:").unwrap();
        let mut batch = batch();
        batch.push(article(
            SourceTag::Ap,
            "https://www.bbc.com/news/articles/a",
            "Same URL from another source",
        ));

        let report = storage.reconcile(&batch).unwrap();
        assert_eq!(report.inserted, 3);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.total(), batch.len());
    }

    #[test]
    fn test_reconcile_isolates_failing_records() {
        let mut storage = Storage::open(":memory:").unwrap();
        diesel::sql_query(
            "CREATE TRIGGER reject_poison BEFORE INSERT ON articles \
             WHEN NEW.title LIKE '%poison%' \
             BEGIN SELECT RAISE(ABORT, 'poisoned title'); END;",
        )
        .execute(storage.connection())
        .unwrap();

        let mut batch = batch();
        batch.insert(
            1,
            article(SourceTag::Bbc, "https://www.bbc.com/news/articles/p", "A poison headline"),
        );

        let report = storage.reconcile(&batch).unwrap();
        assert_eq!(report.inserted, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.total(), batch.len());
        assert_eq!(storage.count(None).unwrap(), 3);
    }

    #[test]
    fn test_round_trip() {
        let mut storage = Storage::open(":memory:").unwrap();
        let mut record = article(
            SourceTag::GoogleNews,
            "https://news.google.com/rss/articles/storm",
            "Storm hits coast - Reuters",
        );
        record.published_at = Some(Utc.with_ymd_and_hms(2025, 1, 13, 14, 30, 0).unwrap());

        storage.reconcile(std::slice::from_ref(&record)).unwrap();
        let recent = storage.recent(10, None).unwrap();

        assert_eq!(recent, vec![record]);
    }

    #[test]
    fn test_recent_order_limit_and_filter() {
        let mut storage = Storage::open(":memory:").unwrap();
        let now = Utc::now().trunc_subsecs(6);
        let mut batch = batch();
        for (i, record) in batch.iter_mut().enumerate() {
            record.scraped_at = now - Duration::minutes(i64::try_from(i).unwrap());
        }
        storage.reconcile(&batch).unwrap();

        let recent = storage.recent(2, None).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].url, batch[0].url);
        assert_eq!(recent[1].url, batch[1].url);

        let ap_only = storage.recent(20, Some(SourceTag::Ap)).unwrap();
        assert_eq!(ap_only.len(), 1);
        assert_eq!(ap_only[0].source, SourceTag::Ap);

        assert_eq!(storage.count(Some(SourceTag::Bbc)).unwrap(), 1);
        assert_eq!(storage.count(Some(SourceTag::GoogleNews)).unwrap(), 1);
    }

    #[test]
    fn test_persistence_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let db_file = dir.path().join("articles.db");
        let db_file = db_file.to_str().unwrap();

        let report = Storage::open(db_file).unwrap().reconcile(&batch()).unwrap();
        assert_eq!(report.inserted, 3);

        let mut reopened = Storage::open(db_file).unwrap();
        assert_eq!(reopened.count(None).unwrap(), 3);
        assert_eq!(reopened.reconcile(&batch()).unwrap().duplicates, 3);
    }

    #[test]
    fn test_delete_scraped_before_is_strict() {
        let mut storage = Storage::open(":memory:").unwrap();
        let cutoff = Utc::now().trunc_subsecs(6) - Duration::days(3);
        let mut batch = batch();
        batch[0].scraped_at = cutoff - Duration::seconds(1);
        batch[1].scraped_at = cutoff;
        storage.reconcile(&batch).unwrap();

        assert_eq!(storage.delete_scraped_before(cutoff).unwrap(), 1);
        assert_eq!(storage.count(None).unwrap(), 2);
    }
}
