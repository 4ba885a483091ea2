use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::{ArticleRecord, SourceTag, StorageError};
use crate::schemas::prelude::articles;

/// DB Model: a persisted article
#[derive(Debug, Clone, Queryable, Selectable, PartialEq)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ArticleRow {
    pub id: i32,
    pub source: String,
    pub url: String,
    pub title: String,
    pub published_at: Option<i64>,
    pub scraped_at: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = articles)]
pub struct NewArticle<'a> {
    pub source: &'a str,
    pub url: &'a str,
    pub title: &'a str,
    pub published_at: Option<i64>,
    pub scraped_at: i64,
}

impl<'a> From<&'a ArticleRecord> for NewArticle<'a> {
    fn from(record: &'a ArticleRecord) -> Self {
        Self {
            source: record.source.as_str(),
            url: &record.url,
            title: &record.title,
            published_at: record.published_at.map(|dt| dt.timestamp_micros()),
            scraped_at: record.scraped_at.timestamp_micros(),
        }
    }
}

impl TryFrom<ArticleRow> for ArticleRecord {
    type Error = StorageError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StorageError::Corrupt { id: row.id, reason };

        let source = row.source.parse::<SourceTag>().map_err(corrupt)?;
        let scraped_at = DateTime::<Utc>::from_timestamp_micros(row.scraped_at)
            .ok_or_else(|| corrupt(format!("scraped_at out of range: {}", row.scraped_at)))?;
        let published_at = match row.published_at {
            Some(micros) => Some(
                DateTime::<Utc>::from_timestamp_micros(micros)
                    .ok_or_else(|| corrupt(format!("published_at out of range: {micros}")))?,
            ),
            None => None,
        };

        Ok(ArticleRecord {
            source,
            url: row.url,
            title: row.title,
            published_at,
            scraped_at,
        })
    }
}

pub fn establish_connection(database_url: &str) -> Result<SqliteConnection, StorageError> {
    Ok(SqliteConnection::establish(database_url)?)
}

/// Insert the article unless its URL is already stored. Returns the number of
/// rows written: 1 for a new article, 0 for a known one.
pub fn insert_article(
    record: &ArticleRecord,
    conn: &mut SqliteConnection,
) -> Result<usize, diesel::result::Error> {
    use crate::schemas::prelude::articles::dsl::articles;

    diesel::insert_or_ignore_into(articles)
        .values(NewArticle::from(record))
        .execute(conn)
}

/// Most recently scraped articles, optionally of one source only
pub fn load_recent(
    limit: i64,
    news_source: Option<SourceTag>,
    conn: &mut SqliteConnection,
) -> Result<Vec<ArticleRow>, diesel::result::Error> {
    use crate::schemas::prelude::articles::dsl::{articles, id, scraped_at, source};

    match news_source {
        Some(tag) => articles
            .filter(source.eq(tag.as_str()))
            .order((scraped_at.desc(), id.desc()))
            .limit(limit)
            .select(ArticleRow::as_select())
            .load(conn),
        None => articles
            .order((scraped_at.desc(), id.desc()))
            .limit(limit)
            .select(ArticleRow::as_select())
            .load(conn),
    }
}

pub fn count_articles(
    news_source: Option<SourceTag>,
    conn: &mut SqliteConnection,
) -> Result<i64, diesel::result::Error> {
    use crate::schemas::prelude::articles::dsl::{articles, source};

    match news_source {
        Some(tag) => articles
            .filter(source.eq(tag.as_str()))
            .count()
            .get_result(conn),
        None => articles.count().get_result(conn),
    }
}

pub fn count_scraped_before(
    cutoff: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<i64, diesel::result::Error> {
    use crate::schemas::prelude::articles::dsl::{articles, scraped_at};

    articles
        .filter(scraped_at.lt(cutoff.timestamp_micros()))
        .count()
        .get_result(conn)
}

/// Remove articles whose `scraped_at` is strictly earlier than `cutoff`
pub fn delete_scraped_before(
    cutoff: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<usize, diesel::result::Error> {
    use crate::schemas::prelude::articles::dsl::{articles, scraped_at};

    diesel::delete(articles.filter(scraped_at.lt(cutoff.timestamp_micros()))).execute(conn)
}
