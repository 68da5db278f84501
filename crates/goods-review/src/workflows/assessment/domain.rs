use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::report_summary::Classification;

/// Identifier wrapper for catalog goods.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GoodId(pub String);

/// Identifier of a line item (a GoodOnApplication, or a GoodsType on open/HMRC cases).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineItemId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaseId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReviewerId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegimeEntryId(pub String);

macro_rules! display_inner {
    ($($name:ident),+) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )+
    };
}

display_inner!(GoodId, LineItemId, CaseId, ReviewerId, RegimeEntryId);

/// Lifecycle of a catalog good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoodStatus {
    Draft,
    Submitted,
    Query,
    Verified,
}

impl GoodStatus {
    pub const fn label(self) -> &'static str {
        match self {
            GoodStatus::Draft => "draft",
            GoodStatus::Submitted => "submitted",
            GoodStatus::Query => "query",
            GoodStatus::Verified => "verified",
        }
    }
}

/// System tags this engine adds to or removes from goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemFlag {
    GoodNotYetVerified,
    Wassenaar,
}

/// Catalog product, shared by every application that lists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Good {
    pub id: GoodId,
    pub name: String,
    #[serde(default)]
    pub organisation: String,
    pub status: GoodStatus,
    #[serde(default)]
    pub control_list_entries: Vec<String>,
    #[serde(default)]
    pub is_good_controlled: Option<bool>,
    #[serde(default)]
    pub classification: Option<Classification>,
    #[serde(default)]
    pub flags: BTreeSet<SystemFlag>,
}

impl Good {
    pub fn report_summary(&self) -> Option<String> {
        self.classification.as_ref().map(Classification::report_summary)
    }

    pub fn is_verified(&self) -> bool {
        self.status == GoodStatus::Verified
    }

    /// Folds a reviewed line's control list entries into the catalog record.
    ///
    /// Unverified goods take the line's entries wholesale and become verified.
    /// Verified goods only ever gain entries.
    pub fn merge_control_list_entries(&mut self, entries: &[String]) {
        if self.is_verified() {
            for entry in entries {
                if !self.control_list_entries.contains(entry) {
                    self.control_list_entries.push(entry.clone());
                }
            }
        } else {
            self.control_list_entries = entries.to_vec();
            self.status = GoodStatus::Verified;
        }
    }
}

/// What a line item points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineItemKind {
    GoodOnApplication { good_id: GoodId },
    /// Open and HMRC cases list goods types that have no catalog good behind them.
    GoodsType { description: String },
}

/// Per-application classification snapshot of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub case_id: CaseId,
    #[serde(flatten)]
    pub kind: LineItemKind,
    #[serde(default)]
    pub control_list_entries: Vec<String>,
    #[serde(default)]
    pub is_good_controlled: Option<bool>,
    #[serde(default)]
    pub classification: Option<Classification>,
    #[serde(default)]
    pub regime_entries: Vec<RegimeEntryId>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_precedent: bool,
    #[serde(default)]
    pub is_wassenaar: bool,
    #[serde(default)]
    pub is_ncsc_military_information_security: Option<bool>,
    #[serde(default)]
    pub assessed_by: Option<ReviewerId>,
    #[serde(default)]
    pub assessment_date: Option<DateTime<Utc>>,
}

impl LineItem {
    pub fn good_id(&self) -> Option<&GoodId> {
        match &self.kind {
            LineItemKind::GoodOnApplication { good_id } => Some(good_id),
            LineItemKind::GoodsType { .. } => None,
        }
    }

    pub fn report_summary(&self) -> Option<String> {
        self.classification.as_ref().map(Classification::report_summary)
    }
}

/// Known control list entry codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlListEntry {
    pub rating: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeEntry {
    pub id: RegimeEntryId,
    pub name: String,
}

/// Case states relevant to goods review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Submitted,
    ApplicantEditing,
    InitialChecks,
    Resubmitted,
    ReopenedForChanges,
    UnderReview,
    OgdAdvice,
    UnderFinalReview,
    FinalReviewCountersign,
    FinalReviewSecondCountersign,
    UnderAppeal,
    Suspended,
    Finalised,
    Closed,
    Deregistered,
    Registered,
    Revoked,
    Surrendered,
    Withdrawn,
}

impl CaseStatus {
    /// Statuses after which a case's goods can no longer be assessed.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            CaseStatus::Closed
                | CaseStatus::Deregistered
                | CaseStatus::Finalised
                | CaseStatus::Registered
                | CaseStatus::Revoked
                | CaseStatus::Surrendered
                | CaseStatus::Withdrawn
        )
    }

    /// Statuses whose reviewed goods are shown to other reviewers as precedents.
    pub const fn is_precedent_source(self) -> bool {
        matches!(
            self,
            CaseStatus::UnderReview
                | CaseStatus::OgdAdvice
                | CaseStatus::UnderFinalReview
                | CaseStatus::FinalReviewCountersign
                | CaseStatus::FinalReviewSecondCountersign
                | CaseStatus::Finalised
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            CaseStatus::Submitted => "submitted",
            CaseStatus::ApplicantEditing => "applicant_editing",
            CaseStatus::InitialChecks => "initial_checks",
            CaseStatus::Resubmitted => "resubmitted",
            CaseStatus::ReopenedForChanges => "reopened_for_changes",
            CaseStatus::UnderReview => "under_review",
            CaseStatus::OgdAdvice => "ogd_advice",
            CaseStatus::UnderFinalReview => "under_final_review",
            CaseStatus::FinalReviewCountersign => "final_review_countersign",
            CaseStatus::FinalReviewSecondCountersign => "final_review_second_countersign",
            CaseStatus::UnderAppeal => "under_appeal",
            CaseStatus::Suspended => "suspended",
            CaseStatus::Finalised => "finalised",
            CaseStatus::Closed => "closed",
            CaseStatus::Deregistered => "deregistered",
            CaseStatus::Registered => "registered",
            CaseStatus::Revoked => "revoked",
            CaseStatus::Surrendered => "surrendered",
            CaseStatus::Withdrawn => "withdrawn",
        }
    }
}

/// Case view supplied by the case collaborator: status plus line ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseSummary {
    pub id: CaseId,
    pub status: CaseStatus,
    pub line_items: Vec<LineItemId>,
}

impl CaseSummary {
    /// 1-based position of the line within its application.
    pub fn line_number(&self, id: &LineItemId) -> Option<usize> {
        self.line_items
            .iter()
            .position(|candidate| candidate == id)
            .map(|index| index + 1)
    }

    pub fn contains(&self, id: &LineItemId) -> bool {
        self.line_items.contains(id)
    }
}
