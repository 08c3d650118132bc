use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use tracing::warn;

use crate::domain::RemoteFileEntry;

pub const EMPTY_PLACEHOLDER: &str = "No files uploaded yet";
const PARENT_MARKER: &str = "Parent Directory";

static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b([^>]*)>(.*?)</a\s*>"#).expect("anchor pattern")
});
static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).expect("href pattern")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern"));

/// An anchor found in a directory-listing page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexLink {
    /// `href` resolved against the listing URL.
    pub url: String,
    /// Visible text, tags stripped, entities decoded and trimmed.
    pub text: String,
}

impl IndexLink {
    /// Sort-control links carry a query string; the parent link is labelled.
    pub fn is_file(&self) -> bool {
        !self.url.contains('?') && !self.text.contains(PARENT_MARKER)
    }
}

/// Every anchor with an `href` in document order.
pub fn parse_index(html: &str, base: &Url) -> Vec<IndexLink> {
    let mut out = Vec::new();
    for cap in ANCHOR.captures_iter(html) {
        let attrs = &cap[1];
        let Some(href) = HREF.captures(attrs).and_then(|h| {
            h.get(1)
                .or_else(|| h.get(2))
                .or_else(|| h.get(3))
                .map(|m| html_escape::decode_html_entities(m.as_str()).into_owned())
        }) else {
            continue;
        };
        let url = match base.join(&href) {
            Ok(u) => u.to_string(),
            Err(e) => {
                warn!(href = %href, "skipping listing link: {e}");
                continue;
            }
        };
        let inner = TAG.replace_all(&cap[2], "");
        let text = html_escape::decode_html_entities(&inner).trim().to_string();
        out.push(IndexLink { url, text });
    }
    out
}

/// The anchors of a listing page that name stored files.
pub fn file_links(html: &str, base: &Url) -> Vec<IndexLink> {
    parse_index(html, base)
        .into_iter()
        .filter(IndexLink::is_file)
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListingRow {
    File(RemoteFileEntry),
    Placeholder,
}

impl ListingRow {
    pub fn label(&self) -> String {
        match self {
            ListingRow::File(e) => format!("{}  {}", e.name, e.size),
            ListingRow::Placeholder => EMPTY_PLACEHOLDER.to_string(),
        }
    }
}

/// What the file list currently shows. Rebuilt wholesale on refresh.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileListing {
    rows: Vec<ListingRow>,
}

impl FileListing {
    /// Rows for `entries`, or the single placeholder row when there are none.
    pub fn from_entries(entries: Vec<RemoteFileEntry>) -> Self {
        if entries.is_empty() {
            return Self {
                rows: vec![ListingRow::Placeholder],
            };
        }
        Self {
            rows: entries.into_iter().map(ListingRow::File).collect(),
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Drops the row for `name`. Returns whether a row was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.rows.len();
        self.rows
            .retain(|r| !matches!(r, ListingRow::File(e) if e.name == name));
        let removed = self.rows.len() != before;
        if self.rows.is_empty() {
            self.rows.push(ListingRow::Placeholder);
        }
        removed
    }

    pub fn rows(&self) -> &[ListingRow] {
        &self.rows
    }

    pub fn entries(&self) -> impl Iterator<Item = &RemoteFileEntry> {
        self.rows.iter().filter_map(|r| match r {
            ListingRow::File(e) => Some(e),
            ListingRow::Placeholder => None,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries().any(|e| e.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
