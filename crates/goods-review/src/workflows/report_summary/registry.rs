use serde::{Deserialize, Serialize};

use super::taxonomy::{
    PrefixId, ReportSummary, ReportSummaryId, ReportSummaryPrefix, ReportSummarySubject, SubjectId,
};
use crate::workflows::assessment::repository::RepositoryError;

/// Get-or-create access to linked report summaries.
///
/// Implemented by catalog transactions so that links created while processing a
/// batch are discarded if the batch is rolled back.
pub trait ReportSummaryRegistry {
    fn link_report_summary(
        &mut self,
        prefix: Option<&ReportSummaryPrefix>,
        subject: &ReportSummarySubject,
    ) -> Result<ReportSummary, RepositoryError>;
}

/// Report summary rows, unique per (prefix?, subject) pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportSummaryTable {
    rows: Vec<ReportSummary>,
}

impl ReportSummaryTable {
    pub fn find(&self, prefix: Option<PrefixId>, subject: SubjectId) -> Option<&ReportSummary> {
        self.rows.iter().find(|row| {
            row.subject.id == subject && row.prefix.as_ref().map(|prefix| prefix.id) == prefix
        })
    }

    /// Returns the existing row for the pair, linking a new one when absent.
    /// The flag reports whether a row was created.
    pub fn get_or_link(
        &mut self,
        prefix: Option<&ReportSummaryPrefix>,
        subject: &ReportSummarySubject,
    ) -> (ReportSummary, bool) {
        if let Some(existing) = self.find(prefix.map(|prefix| prefix.id), subject.id) {
            return (existing.clone(), false);
        }

        let next_id = self
            .rows
            .iter()
            .map(|row| row.id.0)
            .max()
            .unwrap_or(0)
            + 1;
        let row = ReportSummary {
            id: ReportSummaryId(next_id),
            prefix: prefix.cloned(),
            subject: subject.clone(),
        };
        self.rows.push(row.clone());
        (row, true)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReportSummary> {
        self.rows.iter()
    }
}
