use crate::{common::prelude::ArticleRecord, runner::RunSummary};

const RULE_WIDTH: usize = 50;
const TITLE_WIDTH: usize = 70;
const INDENT: &str = "         ";

/// Convert a run summary to plain text
#[must_use]
pub fn summary_to_text(summary: &RunSummary) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut body = format!("\n{rule}\nSCRAPE SUMMARY\n{rule}\n");
    body.push_str(&format!("Total collected: {}\n", summary.collected));

    if let Some(report) = &summary.report {
        body.push_str(&format!("New articles:    {}\n", report.inserted));
        body.push_str(&format!("Duplicates:      {}\n", report.duplicates));
        if report.failed > 0 {
            body.push_str(&format!("Failed:          {}\n", report.failed));
        }
    }

    body.push_str("\nDatabase totals:\n");
    for (source, count) in &summary.per_source {
        let label = format!("{}:", source.display_name());
        body.push_str(&format!("  {label:<13}{count} articles\n"));
    }
    body.push_str(&format!("  {:<13}{} articles\n", "Total:", summary.total));
    body.push_str(&rule);
    body
}

/// Convert the recent articles list to plain text
#[must_use]
pub fn recent_to_text(articles: &[ArticleRecord]) -> String {
    if articles.is_empty() {
        return String::from("No articles in database. Run the scraper first.");
    }

    let mut body = format!(
        "\nMost Recent {} Articles:\n{}\n",
        articles.len(),
        "-".repeat(80)
    );
    for article in articles {
        let title: String = article.title.chars().take(TITLE_WIDTH).collect();
        body.push_str(&format!(
            "[{}] {title}\n",
            article.source.as_str().to_uppercase()
        ));
        body.push_str(&format!("{INDENT}{}\n", article.url));
        body.push_str(&format!(
            "{INDENT}Scraped: {}\n",
            article.scraped_at.to_rfc3339()
        ));
        if let Some(published_at) = article.published_at {
            body.push_str(&format!("{INDENT}Published: {}\n", published_at.to_rfc3339()));
        }
        body.push('\n');
    }
    body
}

/// Convert the cleanup result to plain text
#[must_use]
pub fn cleanup_to_text(deleted: usize, days: u32, remaining: i64) -> String {
    format!("Deleted {deleted} articles older than {days} days\nRemaining: {remaining} articles")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{common::prelude::SourceTag, storage::ReconcileReport};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_summary_to_text() {
        let summary = RunSummary {
            collected: 12,
            report: Some(ReconcileReport {
                inserted: 9,
                duplicates: 3,
                failed: 0,
            }),
            per_source: vec![(SourceTag::Bbc, 40), (SourceTag::GoogleNews, 7)],
            total: 47,
        };

        let text = summary_to_text(&summary);
        assert!(text.contains("Total collected: 12\n"));
        assert!(text.contains("New articles:    9\n"));
        assert!(text.contains("Duplicates:      3\n"));
        assert!(!text.contains("Failed"));
        assert!(text.contains("  BBC:         40 articles\n"));
        assert!(text.contains("  Google News: 7 articles\n"));
        assert!(text.contains("  Total:       47 articles\n"));
    }

    #[test]
    fn test_summary_without_batch() {
        let summary = RunSummary {
            collected: 0,
            report: None,
            per_source: vec![],
            total: 0,
        };
        let text = summary_to_text(&summary);
        assert!(text.contains("Total collected: 0\n"));
        assert!(!text.contains("New articles"));
    }

    #[test]
    fn test_recent_to_text() {
        assert_eq!(
            recent_to_text(&[]),
            "No articles in database. Run the scraper first."
        );

        let article = ArticleRecord {
            source: SourceTag::Ap,
            url: "https://apnews.com/article/abc".to_string(),
            title: "x".repeat(100),
            published_at: None,
            scraped_at: Utc.with_ymd_and_hms(2025, 1, 13, 14, 30, 0).unwrap(),
        };
        let text = recent_to_text(&[article]);
        assert!(text.contains(&format!("[AP] {}\n", "x".repeat(70))));
        assert!(text.contains("         https://apnews.com/article/abc\n"));
        assert!(text.contains("Scraped: 2025-01-13T14:30:00+00:00"));
        assert!(!text.contains("Published"));
    }

    #[test]
    fn test_recent_to_text_with_publish_date() {
        let at = Utc.with_ymd_and_hms(2025, 1, 13, 14, 30, 0).unwrap();
        let article = ArticleRecord {
            source: SourceTag::GoogleNews,
            url: "https://news.google.com/rss/articles/storm".to_string(),
            title: "Storm hits coast - Reuters".to_string(),
            published_at: Some(at),
            scraped_at: at,
        };
        let text = recent_to_text(&[article]);
        assert!(text.contains("[GOOGLE_NEWS] Storm hits coast - Reuters\n"));
        assert!(text.contains("         Published: 2025-01-13T14:30:00+00:00\n"));
    }

    #[test]
    fn test_cleanup_to_text() {
        assert_eq!(
            cleanup_to_text(4, 3, 10),
            "Deleted 4 articles older than 3 days\nRemaining: 10 articles"
        );
    }
}
