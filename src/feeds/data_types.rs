use crate::common::prelude::clean_title;

/// The parts of an RSS item the feed scraper cares about
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub pub_date: Option<String>,
    /// Publisher named in the item's `<source>` element
    pub source_label: Option<String>,
}

impl FeedEntry {
    pub fn from(item: &rss::Item) -> FeedEntry {
        Self {
            title: item.title().map(ToString::to_string),
            link: item.link().map(ToString::to_string),
            pub_date: item.pub_date().map(ToString::to_string),
            source_label: item
                .source()
                .and_then(rss::Source::title)
                .map(ToString::to_string),
        }
    }

    /// Title with the publisher appended, see [`attribute`]
    #[must_use]
    pub fn display_title(&self) -> Option<String> {
        self.title
            .as_deref()
            .map(|title| attribute(title, self.source_label.as_deref()))
    }
}

/// Append `" - <label>"` to the title unless the label is missing or the title
/// already ends with it.
#[must_use]
pub fn attribute(title: &str, label: Option<&str>) -> String {
    let title = clean_title(title);
    match label.map(clean_title).filter(|l| !l.is_empty()) {
        Some(label) if !title.ends_with(&format!("- {label}")) => format!("{title} - {label}"),
        _ => title,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_attribution() {
        assert_eq!(
            attribute("Storm hits coast", Some("Reuters")),
            "Storm hits coast - Reuters"
        );
        assert_eq!(
            attribute("Storm hits coast - Reuters", Some("Reuters")),
            "Storm hits coast - Reuters"
        );
        assert_eq!(attribute("  Storm hits coast ", None), "Storm hits coast");
        assert_eq!(attribute("Storm hits coast", Some("  ")), "Storm hits coast");
        // a different publisher at the end still gets attributed
        assert_eq!(
            attribute("Storm hits coast - AP", Some("Reuters")),
            "Storm hits coast - AP - Reuters"
        );
    }

    #[test]
    fn test_from_rss_item() {
        let mut source = rss::Source::default();
        source.set_url("https://www.reuters.com".to_string());
        source.set_title(Some("Reuters".to_string()));

        let mut item = rss::Item::default();
        item.set_title(Some("Storm hits coast".to_string()));
        item.set_link(Some("https://news.google.com/rss/articles/abc".to_string()));
        item.set_pub_date(Some("Mon, 13 Jan 2025 14:30:00 GMT".to_string()));
        item.set_source(Some(source));

        let entry = FeedEntry::from(&item);
        assert_eq!(entry.link.as_deref(), Some("https://news.google.com/rss/articles/abc"));
        assert_eq!(entry.pub_date.as_deref(), Some("Mon, 13 Jan 2025 14:30:00 GMT"));
        assert_eq!(entry.display_title().as_deref(), Some("Storm hits coast - Reuters"));

        assert_eq!(FeedEntry::from(&rss::Item::default()), FeedEntry::default());
    }
}
