//! Report assembly and export
//!
//! A [`Report`] is the frozen, fully sorted form of a run's results. Both
//! writers consume it, so their output never depends on the order in which
//! probes completed.

pub mod json;
pub mod text;

use crate::error::Result;
use crate::models::{OutputFormat, ProbeOutcome};
use crate::targets::url_path;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Included outcomes by ascending status code, each group in URL path order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    groups: BTreeMap<u16, Vec<ProbeOutcome>>,
    show_method: bool,
}

impl Report {
    /// Sorts raw groups into report order.
    ///
    /// `show_method` is set when more than one method was probed.
    pub fn from_groups(groups: HashMap<u16, Vec<ProbeOutcome>>, show_method: bool) -> Self {
        let groups = groups
            .into_iter()
            .map(|(status, mut outcomes)| {
                outcomes.sort_by(compare_outcomes);
                (status, outcomes)
            })
            .collect();

        Self {
            groups,
            show_method,
        }
    }

    pub fn show_method(&self) -> bool {
        self.show_method
    }

    pub fn status_codes(&self) -> Vec<u16> {
        self.groups.keys().copied().collect()
    }

    pub fn group(&self, status: u16) -> Option<&[ProbeOutcome]> {
        self.groups.get(&status).map(Vec::as_slice)
    }

    /// Groups in ascending status code order
    pub fn groups(&self) -> impl Iterator<Item = (u16, &[ProbeOutcome])> {
        self.groups
            .iter()
            .map(|(status, outcomes)| (*status, outcomes.as_slice()))
    }

    /// Total number of reported outcomes
    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// URL path first, then full URL and method so the order is total
fn compare_outcomes(a: &ProbeOutcome, b: &ProbeOutcome) -> Ordering {
    url_path(&a.url)
        .cmp(&url_path(&b.url))
        .then_with(|| a.url.cmp(&b.url))
        .then_with(|| a.method.cmp(&b.method))
}

/// Writes the report in the requested format
pub fn export(report: &Report, output_path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => text::export(report, output_path),
        OutputFormat::Json => json::export(report, output_path),
    }
}
