use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::audit::{
    product_reviewed_payload, AuditEntry, AuditVerb, ReviewContext, ReviewSnapshot,
};
use super::domain::{
    CaseId, CaseStatus, CaseSummary, GoodId, LineItem, LineItemId, LineItemKind, RegimeEntryId,
    ReviewerId, SystemFlag,
};
use super::precedent::{CasePrecedents, PrecedentFinder};
use super::repository::{
    CaseDirectory, CatalogStore, CatalogTransaction, RepositoryError, ReviewPermissions,
};
use super::request::AssessmentLine;
use super::validation::{
    validate_line, LineErrors, LineValidation, PlannedClassification, ValidatedLine,
};
use crate::workflows::report_summary::Classification;

/// Applies reviewer assessments to the line items of a case, one batch per transaction.
pub struct AssessmentService<S, C, P> {
    store: Arc<S>,
    cases: Arc<C>,
    permissions: Arc<P>,
}

/// Outcome of a committed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentReceipt {
    pub case_id: CaseId,
    pub updated: usize,
    pub audited: usize,
}

impl<S, C, P> AssessmentService<S, C, P>
where
    S: CatalogStore + 'static,
    C: CaseDirectory + 'static,
    P: ReviewPermissions + 'static,
{
    pub fn new(store: Arc<S>, cases: Arc<C>, permissions: Arc<P>) -> Self {
        Self {
            store,
            cases,
            permissions,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Validate and apply a batch, stamping line items with the current time.
    pub fn assess(
        &self,
        case_id: &CaseId,
        reviewer: &ReviewerId,
        lines: Vec<AssessmentLine>,
    ) -> Result<AssessmentReceipt, AssessmentError> {
        self.assess_at(case_id, reviewer, lines, Utc::now())
    }

    pub fn assess_at(
        &self,
        case_id: &CaseId,
        reviewer: &ReviewerId,
        lines: Vec<AssessmentLine>,
        now: DateTime<Utc>,
    ) -> Result<AssessmentReceipt, AssessmentError> {
        if !self.permissions.can_review_goods(reviewer)? {
            return Err(AssessmentError::Forbidden(reviewer.clone()));
        }

        // Case gate reads the transaction's view; the status is fixed until commit.
        let mut tx = self.store.begin()?;
        let case = tx
            .case(case_id)?
            .ok_or_else(|| AssessmentError::CaseNotFound(case_id.clone()))?;
        if case.status.is_terminal() {
            return Err(AssessmentError::TerminalCase {
                case_id: case.id.clone(),
                status: case.status,
            });
        }

        let duplicates = duplicate_ids(&lines);
        if !duplicates.is_empty() {
            return Err(AssessmentError::DuplicateIds(duplicates));
        }

        let mut validated = Vec::with_capacity(lines.len());
        let mut errors = Vec::with_capacity(lines.len());
        for line in &lines {
            match validate_line(&tx, &case, line)? {
                LineValidation::Valid(line) => {
                    validated.push(*line);
                    errors.push(LineErrors::default());
                }
                LineValidation::Invalid(line_errors) => errors.push(line_errors),
            }
        }
        if errors.iter().any(|line_errors| !line_errors.is_empty()) {
            debug!(case_id = %case.id, lines = lines.len(), "assessment batch rejected");
            return Err(AssessmentError::InvalidLines(errors));
        }

        let mut audited = 0;
        for line in validated {
            if apply_line(&mut tx, &case, reviewer, line, now)? {
                audited += 1;
            }
        }
        tx.commit()?;

        info!(
            case_id = %case.id,
            reviewer = %reviewer,
            updated = lines.len(),
            audited,
            "assessment batch committed"
        );

        Ok(AssessmentReceipt {
            case_id: case.id,
            updated: lines.len(),
            audited,
        })
    }

    /// Prior reviews of the same good; empty until the good is verified.
    pub fn good_precedents(&self, good_id: &GoodId) -> Result<Vec<LineItem>, AssessmentError> {
        let finder = PrecedentFinder::new(self.store.as_ref(), self.cases.as_ref());
        Ok(finder.for_good(good_id)?)
    }

    /// Precedents for every good-backed line of a case, drawn from other cases.
    pub fn case_precedents(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<CasePrecedents>, AssessmentError> {
        let case = self
            .cases
            .case(case_id)?
            .ok_or_else(|| AssessmentError::CaseNotFound(case_id.clone()))?;
        let finder = PrecedentFinder::new(self.store.as_ref(), self.cases.as_ref());
        Ok(finder.for_case(&case)?)
    }
}

/// Ids that appear more than once, in first-seen order.
fn duplicate_ids(lines: &[AssessmentLine]) -> Vec<LineItemId> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for line in lines {
        if !seen.insert(&line.id) && !duplicates.contains(&line.id) {
            duplicates.push(line.id.clone());
        }
    }
    duplicates
}

fn apply_line<T: CatalogTransaction>(
    tx: &mut T,
    case: &CaseSummary,
    reviewer: &ReviewerId,
    validated: ValidatedLine,
    now: DateTime<Utc>,
) -> Result<bool, RepositoryError> {
    let ValidatedLine {
        line,
        mut item,
        regime_entries,
        classification,
    } = validated;

    let old = ReviewSnapshot {
        control_list_entries: item.control_list_entries.clone(),
        is_good_controlled: item.is_good_controlled,
        report_summary: item.report_summary(),
        regime_entries: regime_names(tx, &item.regime_entries)?,
    };

    let classification = if line.is_controlled() {
        link_classification(tx, classification)?
    } else {
        None
    };

    let mut control_list_entries: Vec<String> = Vec::with_capacity(line.control_list_entries.len());
    for rating in &line.control_list_entries {
        if !control_list_entries.contains(rating) {
            control_list_entries.push(rating.clone());
        }
    }

    item.control_list_entries = control_list_entries;
    item.is_good_controlled = line.is_good_controlled;
    item.classification = classification.clone();
    item.regime_entries = regime_entries.iter().map(|entry| entry.id.clone()).collect();
    item.comment = line.comment.clone();
    item.is_precedent = line.is_precedent;
    item.is_wassenaar = line.is_wassenaar;
    item.is_ncsc_military_information_security = line.is_ncsc_military_information_security;
    item.assessed_by = Some(reviewer.clone());
    item.assessment_date = Some(now);

    let product_name = match &item.kind {
        LineItemKind::GoodOnApplication { good_id } => {
            let mut good = tx.good(good_id)?.ok_or_else(|| RepositoryError::NotFound {
                entity: "good",
                id: good_id.to_string(),
            })?;
            let was_verified = good.is_verified();

            good.merge_control_list_entries(&item.control_list_entries);
            good.is_good_controlled = item.is_good_controlled;
            good.classification = classification;
            let name = good.name.clone();
            tx.save_good(good)?;

            if !was_verified {
                tx.remove_flag(good_id, SystemFlag::GoodNotYetVerified)?;
            }
            tx.set_flag(good_id, SystemFlag::Wassenaar, line.is_wassenaar)?;
            name
        }
        LineItemKind::GoodsType { description } => description.clone(),
    };

    let new = ReviewSnapshot {
        control_list_entries: item.control_list_entries.clone(),
        is_good_controlled: item.is_good_controlled,
        report_summary: item.report_summary(),
        regime_entries: regime_entries.into_iter().map(|entry| entry.name).collect(),
    };

    let audited = old.differs_from(&new);
    if audited {
        let payload = product_reviewed_payload(
            ReviewContext {
                line_no: case.line_number(&item.id).unwrap_or_default(),
                good_name: &product_name,
                comment: item.comment.as_deref(),
                is_precedent: item.is_precedent,
            },
            &old,
            &new,
        );
        tx.append_audit(AuditEntry {
            actor: reviewer.clone(),
            verb: AuditVerb::ProductReviewed,
            target: item.id.clone(),
            case_id: case.id.clone(),
            payload,
            created_at: now,
        })?;
    }

    tx.save_line_item(item)?;
    Ok(audited)
}

fn link_classification<T: CatalogTransaction>(
    tx: &mut T,
    planned: PlannedClassification,
) -> Result<Option<Classification>, RepositoryError> {
    let classification = match planned {
        PlannedClassification::Unclassified => return Ok(None),
        PlannedClassification::Legacy(text) => Classification::Legacy { text },
        PlannedClassification::Single { prefix, subject } => Classification::Single {
            summary: tx.link_report_summary(prefix.as_ref(), &subject)?,
        },
        PlannedClassification::Multiple(entries) => {
            let mut summaries = Vec::with_capacity(entries.len());
            for (prefix, subject) in &entries {
                summaries.push(tx.link_report_summary(prefix.as_ref(), subject)?);
            }
            Classification::Multiple { summaries }
        }
    };
    Ok(Some(classification))
}

fn regime_names<T: CatalogTransaction>(
    tx: &T,
    ids: &[RegimeEntryId],
) -> Result<Vec<String>, RepositoryError> {
    let mut names = Vec::with_capacity(ids.len());
    for id in ids {
        // Entries removed from the catalog since the last review fall back to their id.
        let name = match tx.regime_entry(id)? {
            Some(entry) => entry.name,
            None => id.to_string(),
        };
        names.push(name);
    }
    Ok(names)
}

fn join_ids(ids: &[LineItemId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("reviewer {0} may not review goods")]
    Forbidden(ReviewerId),
    #[error("case {0} not found")]
    CaseNotFound(CaseId),
    #[error("case {case_id} is {} so its products can no longer be assessed", .status.label())]
    TerminalCase { case_id: CaseId, status: CaseStatus },
    #[error(
        "Multiple updates to a single GoodOnApplication id found. Duplicated ids; {}",
        join_ids(.0)
    )]
    DuplicateIds(Vec<LineItemId>),
    #[error("assessment batch failed validation")]
    InvalidLines(Vec<LineErrors>),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
