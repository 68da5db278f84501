use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;

use super::domain::{CaseSummary, LineItem, RegimeEntry};
use super::repository::{CatalogTransaction, RepositoryError};
use super::request::AssessmentLine;
use crate::workflows::report_summary::{
    PrefixId, ReportSummaryPrefix, ReportSummarySubject, SubjectId,
};

pub const REQUIRED_REPORT_SUMMARY: &str =
    "You must include a report summary if this item is controlled.";
pub const REPORT_SUMMARIES_EXCLUSIVE: &str =
    "Report summaries cannot be combined with a report summary prefix or subject.";

/// Field-keyed validation messages for one line of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LineErrors(BTreeMap<String, Vec<String>>);

impl LineErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn invalid_pk(id: impl Display) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

/// Classification a line will receive once its report summaries are linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PlannedClassification {
    Unclassified,
    Legacy(String),
    Single {
        prefix: Option<ReportSummaryPrefix>,
        subject: ReportSummarySubject,
    },
    Multiple(Vec<(Option<ReportSummaryPrefix>, ReportSummarySubject)>),
}

/// A line that passed validation, with its referenced rows already loaded.
#[derive(Debug, Clone)]
pub(crate) struct ValidatedLine {
    pub(crate) line: AssessmentLine,
    pub(crate) item: LineItem,
    pub(crate) regime_entries: Vec<RegimeEntry>,
    pub(crate) classification: PlannedClassification,
}

#[derive(Debug)]
pub(crate) enum LineValidation {
    Valid(Box<ValidatedLine>),
    Invalid(LineErrors),
}

pub(crate) fn validate_line<T: CatalogTransaction>(
    tx: &T,
    case: &CaseSummary,
    line: &AssessmentLine,
) -> Result<LineValidation, RepositoryError> {
    let mut errors = LineErrors::default();

    let item = if case.contains(&line.id) {
        tx.line_item(&line.id)?
    } else {
        None
    };
    if item.is_none() {
        errors.push("id", invalid_pk(&line.id));
    }

    for rating in &line.control_list_entries {
        if !tx.control_list_entry_exists(rating)? {
            errors.push(
                "control_list_entries",
                format!("Object with rating={rating} does not exist."),
            );
        }
    }

    let mut regime_entries = Vec::with_capacity(line.regime_entries.len());
    for id in &line.regime_entries {
        match tx.regime_entry(id)? {
            Some(entry) => regime_entries.push(entry),
            None => errors.push("regime_entries", invalid_pk(id)),
        }
    }

    let classification = plan_classification(tx, line, &mut errors)?;

    let summary_errors = ["report_summary_subject", "report_summary_prefix", "report_summaries"]
        .iter()
        .any(|field| errors.contains(field));
    if line.is_controlled()
        && classification == PlannedClassification::Unclassified
        && !summary_errors
    {
        errors.push("report_summary_subject", REQUIRED_REPORT_SUMMARY);
    }

    match item {
        Some(item) if errors.is_empty() => Ok(LineValidation::Valid(Box::new(ValidatedLine {
            line: line.clone(),
            item,
            regime_entries,
            classification,
        }))),
        _ => Ok(LineValidation::Invalid(errors)),
    }
}

fn plan_classification<T: CatalogTransaction>(
    tx: &T,
    line: &AssessmentLine,
    errors: &mut LineErrors,
) -> Result<PlannedClassification, RepositoryError> {
    let has_single = line.report_summary_prefix.is_some() || line.report_summary_subject.is_some();

    if !line.report_summaries.is_empty() {
        if has_single {
            errors.push("report_summaries", REPORT_SUMMARIES_EXCLUSIVE);
            return Ok(PlannedClassification::Unclassified);
        }

        let mut entries = Vec::with_capacity(line.report_summaries.len());
        for entry in &line.report_summaries {
            match resolve_pair(tx, entry.prefix, entry.subject)? {
                Ok(pair) => entries.push(pair),
                Err(message) => errors.push("report_summaries", message),
            }
        }

        if entries.len() == line.report_summaries.len() {
            return Ok(PlannedClassification::Multiple(entries));
        }
        return Ok(PlannedClassification::Unclassified);
    }

    if has_single {
        let subject = match line.report_summary_subject {
            Some(id) => match tx.subject(id)? {
                Some(subject) => Some(subject),
                None => {
                    errors.push("report_summary_subject", invalid_pk(id));
                    return Ok(PlannedClassification::Unclassified);
                }
            },
            None => None,
        };

        let prefix = match line.report_summary_prefix {
            Some(id) => match tx.prefix(id)? {
                Some(prefix) => Some(prefix),
                None => {
                    errors.push("report_summary_prefix", invalid_pk(id));
                    return Ok(PlannedClassification::Unclassified);
                }
            },
            None => None,
        };

        // A prefix on its own never classifies anything.
        return Ok(match subject {
            Some(subject) => PlannedClassification::Single { prefix, subject },
            None => PlannedClassification::Unclassified,
        });
    }

    match line.report_summary.as_deref() {
        Some(text) if !text.trim().is_empty() => Ok(PlannedClassification::Legacy(text.to_string())),
        _ => Ok(PlannedClassification::Unclassified),
    }
}

/// Loads a (prefix?, subject) pair. A missing subject is reported ahead of a missing prefix.
fn resolve_pair<T: CatalogTransaction>(
    tx: &T,
    prefix_id: Option<PrefixId>,
    subject_id: SubjectId,
) -> Result<Result<(Option<ReportSummaryPrefix>, ReportSummarySubject), String>, RepositoryError> {
    let Some(subject) = tx.subject(subject_id)? else {
        return Ok(Err(invalid_pk(subject_id)));
    };

    let prefix = match prefix_id {
        Some(id) => match tx.prefix(id)? {
            Some(prefix) => Some(prefix),
            None => return Ok(Err(invalid_pk(id))),
        },
        None => None,
    };

    Ok(Ok((prefix, subject)))
}
