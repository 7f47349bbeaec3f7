//! Response classification
//!
//! Everything is reported unless it is excluded. A body length listed in the
//! excluded set always wins; otherwise a body matching the filter regex is
//! dropped.

use crate::error::Result;
use regex::bytes::Regex;
use std::collections::HashSet;

/// Response filters shared read-only by every probe of a run
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    regex: Option<Regex>,
    excluded_lengths: HashSet<usize>,
}

impl FilterConfig {
    /// Compiles the filter regex; an invalid pattern is a configuration error
    pub fn new(pattern: Option<&str>, excluded_lengths: impl IntoIterator<Item = usize>) -> Result<Self> {
        let regex = match pattern.filter(|p| !p.is_empty()) {
            Some(p) => Some(Regex::new(p)?),
            None => None,
        };

        Ok(Self {
            regex,
            excluded_lengths: excluded_lengths.into_iter().collect(),
        })
    }

    pub fn regex(&self) -> Option<&Regex> {
        self.regex.as_ref()
    }
}

/// Verdict for one response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub status: u16,
    pub length: usize,
    pub included: bool,
}

/// Decides whether a response belongs in the report
pub fn classify(status: u16, body: &[u8], filter: &FilterConfig) -> Classification {
    let length = body.len();

    let included = if filter.excluded_lengths.contains(&length) {
        false
    } else {
        match &filter.regex {
            None => true,
            Some(re) => !re.is_match(body),
        }
    };

    Classification {
        status,
        length,
        included,
    }
}
