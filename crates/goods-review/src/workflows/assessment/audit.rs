use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CaseId, LineItemId, ReviewerId};

pub const NO_CONTROL_CODE: &str = "No control code";
pub const NO_REGIMES: &str = "No regimes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AuditId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditVerb {
    ProductReviewed,
}

/// Audit entry prior to being appended; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub actor: ReviewerId,
    pub verb: AuditVerb,
    pub target: LineItemId,
    pub case_id: CaseId,
    pub payload: ProductReviewedPayload,
    pub created_at: DateTime<Utc>,
}

/// Immutable, append-only audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: AuditId,
    pub actor: ReviewerId,
    pub verb: AuditVerb,
    pub target: LineItemId,
    pub case_id: CaseId,
    pub payload: ProductReviewedPayload,
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn from_entry(id: AuditId, entry: AuditEntry) -> Self {
        Self {
            id,
            actor: entry.actor,
            verb: entry.verb,
            target: entry.target,
            case_id: entry.case_id,
            payload: entry.payload,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductReviewedPayload {
    pub line_no: usize,
    pub good_name: String,
    pub old_control_list_entry: Vec<String>,
    pub new_control_list_entry: Vec<String>,
    pub old_is_good_controlled: String,
    pub new_is_good_controlled: String,
    pub old_regime_entries: Vec<String>,
    pub new_regime_entries: Vec<String>,
    pub old_report_summary: Option<String>,
    pub report_summary: Option<String>,
    pub additional_text: Option<String>,
    pub is_precedent: bool,
}

/// Values of a line item captured before and after an assessment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSnapshot {
    pub control_list_entries: Vec<String>,
    pub is_good_controlled: Option<bool>,
    pub report_summary: Option<String>,
    pub regime_entries: Vec<String>,
}

impl ReviewSnapshot {
    /// Whether the reviewed values differ enough to warrant an audit record.
    ///
    /// Control list entries compare as sets; regime entries never trigger a record on their own.
    pub fn differs_from(&self, other: &ReviewSnapshot) -> bool {
        let mut ours = self.control_list_entries.clone();
        let mut theirs = other.control_list_entries.clone();
        ours.sort();
        ours.dedup();
        theirs.sort();
        theirs.dedup();

        ours != theirs
            || self.is_good_controlled != other.is_good_controlled
            || self.report_summary != other.report_summary
    }
}

/// Context for a PRODUCT_REVIEWED payload that the snapshots do not carry.
#[derive(Debug, Clone)]
pub struct ReviewContext<'a> {
    pub line_no: usize,
    pub good_name: &'a str,
    pub comment: Option<&'a str>,
    pub is_precedent: bool,
}

pub fn product_reviewed_payload(
    context: ReviewContext<'_>,
    old: &ReviewSnapshot,
    new: &ReviewSnapshot,
) -> ProductReviewedPayload {
    ProductReviewedPayload {
        line_no: context.line_no,
        good_name: context.good_name.to_string(),
        old_control_list_entry: or_placeholder(&old.control_list_entries, NO_CONTROL_CODE),
        new_control_list_entry: or_placeholder(&new.control_list_entries, NO_CONTROL_CODE),
        old_is_good_controlled: yes_no(old.is_good_controlled).to_string(),
        new_is_good_controlled: yes_no(new.is_good_controlled).to_string(),
        old_regime_entries: or_placeholder(&old.regime_entries, NO_REGIMES),
        new_regime_entries: or_placeholder(&new.regime_entries, NO_REGIMES),
        old_report_summary: old.report_summary.clone(),
        report_summary: new.report_summary.clone(),
        additional_text: context.comment.map(str::to_string),
        is_precedent: context.is_precedent,
    }
}

fn or_placeholder(values: &[String], placeholder: &str) -> Vec<String> {
    if values.is_empty() {
        vec![placeholder.to_string()]
    } else {
        values.to_vec()
    }
}

fn yes_no(value: Option<bool>) -> &'static str {
    if value == Some(true) {
        "Yes"
    } else {
        "No"
    }
}
