//! Bulk suggestion of structured report summaries for line items that still carry
//! legacy free text. Output is a CSV for a human to review before any data change.

mod remap;
mod report;

use std::io::{Read, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::workflows::assessment::filters::is_unpopulated_controlled;
use crate::workflows::assessment::{CaseId, CatalogStore, LineItemId, RepositoryError};
use crate::workflows::report_summary::{
    Classification, SummaryMatch, SummaryMatcher, SummaryRemap,
};

pub use report::{SuggestionRow, SUGGESTION_HEADERS};

#[derive(Debug)]
pub enum SuggestionError {
    Io(std::io::Error),
    Csv(csv::Error),
    Repository(RepositoryError),
}

impl std::fmt::Display for SuggestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestionError::Io(err) => write!(f, "failed to access suggestion file: {}", err),
            SuggestionError::Csv(err) => write!(f, "invalid suggestion CSV data: {}", err),
            SuggestionError::Repository(err) => {
                write!(f, "could not read line items for suggestions: {}", err)
            }
        }
    }
}

impl std::error::Error for SuggestionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SuggestionError::Io(err) => Some(err),
            SuggestionError::Csv(err) => Some(err),
            SuggestionError::Repository(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SuggestionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SuggestionError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<RepositoryError> for SuggestionError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}

/// Loads an `original,corrected` remap file.
pub fn load_remap<P: AsRef<Path>>(path: P) -> Result<SummaryRemap, SuggestionError> {
    let file = std::fs::File::open(path)?;
    read_remap(file)
}

pub fn read_remap<R: Read>(reader: R) -> Result<SummaryRemap, SuggestionError> {
    Ok(remap::parse_remap(reader)?)
}

/// Controlled line item still classified by legacy text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionCandidate {
    pub line_item_id: LineItemId,
    pub case_id: CaseId,
    pub report_summary: String,
    pub product_name: String,
}

/// Unpopulated controlled line items backed by a catalog good, ordered by their report summary text.
///
/// Goods type lines have no product page and are left out.
pub fn candidates<S: CatalogStore>(store: &S) -> Result<Vec<SuggestionCandidate>, RepositoryError> {
    let mut found = Vec::new();

    for item in store.line_items()? {
        let Some(good_id) = item.good_id() else {
            continue;
        };
        let good = store.good(good_id)?;
        if !is_unpopulated_controlled(&item, good.as_ref()) {
            continue;
        }
        let Some(Classification::Legacy { text }) = &item.classification else {
            continue;
        };

        found.push(SuggestionCandidate {
            line_item_id: item.id.clone(),
            case_id: item.case_id.clone(),
            report_summary: text.clone(),
            product_name: good.map(|good| good.name).unwrap_or_default(),
        });
    }

    found.sort_by(|a, b| a.report_summary.cmp(&b.report_summary));
    Ok(found)
}

/// Matched and unmatched rows produced by one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionReport {
    pub matched: Vec<SuggestionRow>,
    pub unmatched: Vec<SuggestionRow>,
}

impl SuggestionReport {
    pub fn write_matched<W: Write>(&self, writer: W) -> Result<(), SuggestionError> {
        Ok(report::write_rows(writer, &self.matched)?)
    }

    pub fn write_unmatched<W: Write>(&self, writer: W) -> Result<(), SuggestionError> {
        Ok(report::write_rows(writer, &self.unmatched)?)
    }
}

/// Maps legacy summaries onto the prefix/subject taxonomy.
pub struct SummarySuggester {
    matcher: SummaryMatcher,
    base_url: Option<String>,
}

impl SummarySuggester {
    pub fn new(matcher: SummaryMatcher, base_url: Option<String>) -> Self {
        Self { matcher, base_url }
    }

    /// Loads the taxonomy from `store` once for the whole run.
    pub fn from_store<S: CatalogStore>(
        store: &S,
        remap: SummaryRemap,
        base_url: Option<String>,
    ) -> Result<Self, RepositoryError> {
        let matcher = SummaryMatcher::with_remap(remap, store.prefixes()?, store.subjects()?);
        Ok(Self::new(matcher, base_url))
    }

    pub fn suggest(&self, candidates: &[SuggestionCandidate]) -> SuggestionReport {
        let mut report = SuggestionReport::default();

        for candidate in candidates {
            let mut row = SuggestionRow {
                id: candidate.line_item_id.to_string(),
                report_summary: candidate.report_summary.clone(),
                suggested_prefix: String::new(),
                suggested_prefix_id: None,
                suggested_subject: String::new(),
                suggested_subject_id: None,
                product_name: candidate.product_name.clone(),
                url: self.url(candidate),
            };

            match self.matcher.match_summary(&candidate.report_summary) {
                SummaryMatch::Matched {
                    prefix, subject, ..
                } => {
                    if let Some(prefix) = prefix {
                        row.suggested_prefix = prefix.name;
                        row.suggested_prefix_id = Some(prefix.id);
                    }
                    row.suggested_subject = subject.name;
                    row.suggested_subject_id = Some(subject.id);
                    report.matched.push(row);
                }
                SummaryMatch::Unmappable { normalized, .. } => {
                    warn!(
                        line_item_id = %candidate.line_item_id,
                        normalized = %normalized,
                        "skipped: no suggested subject"
                    );
                    report.unmatched.push(row);
                }
            }
        }

        info!(
            matched = report.matched.len(),
            unmatched = report.unmatched.len(),
            "report summary suggestions complete"
        );
        report
    }

    fn url(&self, candidate: &SuggestionCandidate) -> String {
        match &self.base_url {
            Some(base) => format!(
                "{}/cases/{}/products/{}",
                base.trim_end_matches('/'),
                candidate.case_id,
                candidate.line_item_id
            ),
            None => String::new(),
        }
    }
}
