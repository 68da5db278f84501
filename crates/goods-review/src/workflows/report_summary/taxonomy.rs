use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a report summary prefix ("training for", "components for", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrefixId(pub u32);

/// Identifier of a report summary subject ("arts and crafts", "sniper rifles", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub u32);

/// Identifier of a linked (prefix?, subject) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReportSummaryId(pub u32);

impl fmt::Display for PrefixId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummaryPrefix {
    pub id: PrefixId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummarySubject {
    pub id: SubjectId,
    pub name: String,
    #[serde(default)]
    pub code_level: Option<u8>,
}

/// Canonical record for a (prefix?, subject) combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: ReportSummaryId,
    pub prefix: Option<ReportSummaryPrefix>,
    pub subject: ReportSummarySubject,
}

impl ReportSummary {
    pub fn display_name(&self) -> String {
        display_name(self.prefix.as_ref(), &self.subject)
    }
}

/// `"prefix subject"` when a prefix is present, otherwise just the subject name.
pub fn display_name(prefix: Option<&ReportSummaryPrefix>, subject: &ReportSummarySubject) -> String {
    match prefix {
        Some(prefix) => format!("{} {}", prefix.name, subject.name),
        None => subject.name.clone(),
    }
}

/// The three mutually exclusive shapes a controlled item's classification can take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Classification {
    /// Free text recorded before the structured taxonomy existed. Never linked.
    Legacy { text: String },
    /// One prefix (optional) and subject, linked to a single report summary.
    Single { summary: ReportSummary },
    /// Several linked report summaries, displayed in the order supplied.
    Multiple { summaries: Vec<ReportSummary> },
}

impl Classification {
    pub fn report_summary(&self) -> String {
        match self {
            Classification::Legacy { text } => text.clone(),
            Classification::Single { summary } => summary.display_name(),
            Classification::Multiple { summaries } => summaries
                .iter()
                .map(ReportSummary::display_name)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    pub fn prefix(&self) -> Option<&ReportSummaryPrefix> {
        match self {
            Classification::Single { summary } => summary.prefix.as_ref(),
            _ => None,
        }
    }

    pub fn subject(&self) -> Option<&ReportSummarySubject> {
        match self {
            Classification::Single { summary } => Some(&summary.subject),
            _ => None,
        }
    }

    /// Linked report summaries; empty for legacy text.
    pub fn report_summaries(&self) -> &[ReportSummary] {
        match self {
            Classification::Legacy { .. } => &[],
            Classification::Single { summary } => std::slice::from_ref(summary),
            Classification::Multiple { summaries } => summaries,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Classification::Legacy { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(id: u32, name: &str) -> ReportSummaryPrefix {
        ReportSummaryPrefix {
            id: PrefixId(id),
            name: name.to_string(),
        }
    }

    fn subject(id: u32, name: &str) -> ReportSummarySubject {
        ReportSummarySubject {
            id: SubjectId(id),
            name: name.to_string(),
            code_level: None,
        }
    }

    #[test]
    fn display_name_includes_prefix_when_present() {
        let subject = subject(1, "sniper rifles");
        assert_eq!(display_name(None, &subject), "sniper rifles");
        assert_eq!(
            display_name(Some(&prefix(3, "components for")), &subject),
            "components for sniper rifles"
        );
    }

    #[test]
    fn multiple_classification_joins_names_in_supplied_order() {
        let classification = Classification::Multiple {
            summaries: vec![
                ReportSummary {
                    id: ReportSummaryId(2),
                    prefix: Some(prefix(1, "training for")),
                    subject: subject(7, "arts and crafts"),
                },
                ReportSummary {
                    id: ReportSummaryId(1),
                    prefix: None,
                    subject: subject(4, "body armour"),
                },
            ],
        };

        assert_eq!(
            classification.report_summary(),
            "training for arts and crafts, body armour"
        );
        assert!(classification.prefix().is_none());
        assert!(classification.subject().is_none());
        assert_eq!(classification.report_summaries().len(), 2);
    }

    #[test]
    fn legacy_classification_has_no_links() {
        let classification = Classification::Legacy {
            text: "some legacy summary".to_string(),
        };
        assert!(classification.is_legacy());
        assert!(classification.report_summaries().is_empty());
        assert_eq!(classification.report_summary(), "some legacy summary");
    }
}
