use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a Notion page URL in free text: scheme, optional "www", the
/// notion.so/notion.site/notion.com hosts, an optional workspace segment,
/// an optional slug-plus-dash prefix, then the page identifier either as a
/// bare 32-character hex run or in its hyphenated UUID form.
static NOTION_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"https?://(?:www\.)?notion\.(?:so|site|com)/(?:[^/\s?#]+/)?(?:[^/\s?#]+-)?([a-f0-9]{32}|[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12})",
    )
    .expect("Notion URL pattern is valid")
});

/// Canonical identifier of one page in the external document store:
/// exactly 32 lowercase hexadecimal characters, hyphens stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageReference(String);

impl PageReference {
    /// Accept an identifier already in canonical form.
    #[cfg(test)]
    pub fn new(id: &str) -> Option<Self> {
        let canonical =
            id.len() == 32 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        canonical.then(|| Self(id.to_string()))
    }

    /// Normalize a captured URL identifier (bare or hyphenated UUID form).
    fn from_url_capture(raw: &str) -> Self {
        Self(raw.replace('-', ""))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the distinct Notion pages referenced by links in `text`.
///
/// The same page linked twice (even once hyphenated and once bare) counts
/// once; first-appearance order is kept. Never fails: text without links
/// yields an empty vec.
pub fn extract_page_refs(text: &str) -> Vec<PageReference> {
    let mut seen = HashSet::new();
    let mut refs = Vec::new();
    for caps in NOTION_URL.captures_iter(text) {
        let page = PageReference::from_url_capture(&caps[1]);
        if seen.insert(page.clone()) {
            refs.push(page);
        }
    }
    refs
}
