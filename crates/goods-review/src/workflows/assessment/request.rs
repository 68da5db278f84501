use serde::{Deserialize, Serialize};

use super::domain::{LineItemId, RegimeEntryId};
use crate::workflows::report_summary::{PrefixId, SubjectId};

/// One reviewer decision inside an assessment batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentLine {
    pub id: LineItemId,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_good_controlled: Option<bool>,
    #[serde(default)]
    pub control_list_entries: Vec<String>,
    #[serde(default)]
    pub regime_entries: Vec<RegimeEntryId>,
    /// Legacy free text. Ignored whenever a subject or report summary list is supplied.
    #[serde(default)]
    pub report_summary: Option<String>,
    #[serde(default)]
    pub report_summary_prefix: Option<PrefixId>,
    #[serde(default)]
    pub report_summary_subject: Option<SubjectId>,
    #[serde(default)]
    pub report_summaries: Vec<ReportSummaryEntry>,
    #[serde(default)]
    pub is_precedent: bool,
    #[serde(default)]
    pub is_wassenaar: bool,
    #[serde(default)]
    pub is_ncsc_military_information_security: Option<bool>,
}

impl AssessmentLine {
    /// Minimal line with every optional field left empty.
    pub fn new(id: LineItemId) -> Self {
        Self {
            id,
            comment: None,
            is_good_controlled: None,
            control_list_entries: Vec::new(),
            regime_entries: Vec::new(),
            report_summary: None,
            report_summary_prefix: None,
            report_summary_subject: None,
            report_summaries: Vec::new(),
            is_precedent: false,
            is_wassenaar: false,
            is_ncsc_military_information_security: None,
        }
    }

    pub fn is_controlled(&self) -> bool {
        self.is_good_controlled == Some(true)
    }
}

/// Entry of a multi-summary classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummaryEntry {
    #[serde(default)]
    pub prefix: Option<PrefixId>,
    pub subject: SubjectId,
}
