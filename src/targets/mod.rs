//! Target set construction
//!
//! Turns the raw lines handed over by a target source into the deduplicated
//! set of URLs that will be probed.

pub mod source;

use std::collections::BTreeSet;
use tracing::{debug, info};
use url::Url;

/// Static suffix exclusions applied while building the target set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixFilter {
    pub ignore_css: bool,
    pub ignore_js: bool,
}

impl Default for SuffixFilter {
    fn default() -> Self {
        Self {
            ignore_css: true,
            ignore_js: true,
        }
    }
}

impl SuffixFilter {
    /// Returns true if the raw URL or its path ends with an excluded suffix
    pub fn excludes(&self, url: &str) -> bool {
        let path = url_path(url);
        let ends_with = |suffix: &str| url.ends_with(suffix) || path.ends_with(suffix);
        (self.ignore_css && ends_with(".css")) || (self.ignore_js && ends_with(".js"))
    }
}

/// Deduplicated set of URLs under test
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSet {
    urls: BTreeSet<String>,
}

impl TargetSet {
    /// Builds the target set from raw lines.
    ///
    /// Lines are trimmed, empty lines are dropped and exact duplicates
    /// collapse into one entry. No validation happens here: a line that is
    /// not a URL simply fails later when probed.
    pub fn from_lines<I, S>(lines: I, filter: SuffixFilter) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut urls = BTreeSet::new();
        let mut read = 0usize;
        let mut excluded = 0usize;

        for line in lines {
            let url = line.as_ref().trim();
            if url.is_empty() {
                continue;
            }
            read += 1;

            if filter.excludes(url) {
                debug!("Skipping excluded target {url}");
                excluded += 1;
                continue;
            }

            urls.insert(url.to_string());
        }

        info!(
            "Read {read} targets: {} unique, {} duplicates, {excluded} excluded by suffix",
            urls.len(),
            read - excluded - urls.len()
        );

        Self { urls }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}

/// Path component of a target, falling back to the text before any query or
/// fragment when the target is not an absolute URL
pub(crate) fn url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or(url)
            .to_string(),
    }
}
