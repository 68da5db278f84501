use std::collections::HashMap;

use super::normalizer::SummaryRemap;
use super::taxonomy::{ReportSummaryPrefix, ReportSummarySubject};

/// Longest left-anchored prefix lookup over a fixed prefix catalog.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    // Longest name first, so the first hit is the longest match.
    prefixes: Vec<ReportSummaryPrefix>,
}

impl PrefixMatcher {
    pub fn new(prefixes: impl IntoIterator<Item = ReportSummaryPrefix>) -> Self {
        let mut prefixes: Vec<_> = prefixes
            .into_iter()
            .filter(|prefix| !prefix.name.is_empty())
            .collect();
        prefixes.sort_by(|a, b| {
            b.name
                .chars()
                .count()
                .cmp(&a.name.chars().count())
                .then_with(|| a.name.cmp(&b.name))
        });
        Self { prefixes }
    }

    pub fn longest_match(&self, normalized: &str) -> Option<&ReportSummaryPrefix> {
        self.prefixes
            .iter()
            .find(|prefix| normalized.starts_with(prefix.name.as_str()))
    }
}

/// Exact-name subject lookup, built once per run.
#[derive(Debug, Clone)]
pub struct SubjectResolver {
    by_name: HashMap<String, ReportSummarySubject>,
}

impl SubjectResolver {
    pub fn new(subjects: impl IntoIterator<Item = ReportSummarySubject>) -> Self {
        let by_name = subjects
            .into_iter()
            .map(|subject| (subject.name.clone(), subject))
            .collect();
        Self { by_name }
    }

    /// Text left once the matched prefix is removed.
    ///
    /// Splits on the last `"<prefix> "` so a subject that repeats the prefix text keeps it.
    /// `None` when the prefix matched but is not followed by a separating space.
    pub fn candidate_subject<'a>(
        normalized: &'a str,
        prefix: Option<&ReportSummaryPrefix>,
    ) -> Option<&'a str> {
        match prefix {
            Some(prefix) => {
                let separator = format!("{} ", prefix.name);
                normalized
                    .rsplit_once(separator.as_str())
                    .map(|(_, subject)| subject)
            }
            None => Some(normalized),
        }
    }

    pub fn resolve(
        &self,
        normalized: &str,
        prefix: Option<&ReportSummaryPrefix>,
    ) -> Option<&ReportSummarySubject> {
        let candidate = Self::candidate_subject(normalized, prefix)?;
        self.by_name.get(candidate)
    }
}

/// Outcome of mapping one free-text summary onto the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryMatch {
    Matched {
        normalized: String,
        prefix: Option<ReportSummaryPrefix>,
        subject: ReportSummarySubject,
    },
    Unmappable {
        normalized: String,
        prefix: Option<ReportSummaryPrefix>,
    },
}

impl SummaryMatch {
    pub fn normalized(&self) -> &str {
        match self {
            SummaryMatch::Matched { normalized, .. } | SummaryMatch::Unmappable { normalized, .. } => {
                normalized
            }
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, SummaryMatch::Matched { .. })
    }
}

/// Normalize, match the prefix, then resolve the subject.
#[derive(Debug, Clone)]
pub struct SummaryMatcher {
    remap: SummaryRemap,
    prefixes: PrefixMatcher,
    subjects: SubjectResolver,
}

impl SummaryMatcher {
    pub fn new(
        prefixes: impl IntoIterator<Item = ReportSummaryPrefix>,
        subjects: impl IntoIterator<Item = ReportSummarySubject>,
    ) -> Self {
        Self::with_remap(SummaryRemap::default(), prefixes, subjects)
    }

    pub fn with_remap(
        remap: SummaryRemap,
        prefixes: impl IntoIterator<Item = ReportSummaryPrefix>,
        subjects: impl IntoIterator<Item = ReportSummarySubject>,
    ) -> Self {
        Self {
            remap,
            prefixes: PrefixMatcher::new(prefixes),
            subjects: SubjectResolver::new(subjects),
        }
    }

    pub fn match_summary(&self, raw: &str) -> SummaryMatch {
        let normalized = self.remap.normalize(raw);
        let prefix = self.prefixes.longest_match(&normalized).cloned();

        match self.subjects.resolve(&normalized, prefix.as_ref()).cloned() {
            Some(subject) => SummaryMatch::Matched {
                normalized,
                prefix,
                subject,
            },
            None => SummaryMatch::Unmappable { normalized, prefix },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::report_summary::taxonomy::{display_name, PrefixId, SubjectId};

    fn prefixes() -> Vec<ReportSummaryPrefix> {
        ["training for", "equipment for", "components for", "components for use in"]
            .iter()
            .enumerate()
            .map(|(index, name)| ReportSummaryPrefix {
                id: PrefixId(index as u32 + 1),
                name: name.to_string(),
            })
            .collect()
    }

    fn subjects() -> Vec<ReportSummarySubject> {
        ["arts and crafts", "sniper rifles", "body armour", "aircraft"]
            .iter()
            .enumerate()
            .map(|(index, name)| ReportSummarySubject {
                id: SubjectId(index as u32 + 10),
                name: name.to_string(),
                code_level: Some(1),
            })
            .collect()
    }

    #[test]
    fn prefix_and_subject_are_split() {
        let matcher = SummaryMatcher::new(prefixes(), subjects());
        match matcher.match_summary("training for arts and crafts") {
            SummaryMatch::Matched {
                prefix, subject, ..
            } => {
                assert_eq!(prefix.expect("prefix").name, "training for");
                assert_eq!(subject.name, "arts and crafts");
            }
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn longest_prefix_wins() {
        let matcher = PrefixMatcher::new(prefixes());
        let prefix = matcher
            .longest_match("components for use in aircraft")
            .expect("prefix matches");
        assert_eq!(prefix.name, "components for use in");
    }

    #[test]
    fn prefix_must_be_left_anchored() {
        let matcher = PrefixMatcher::new(prefixes());
        assert!(matcher.longest_match("rifles training for dogs").is_none());
    }

    #[test]
    fn subject_split_uses_last_prefix_occurrence() {
        let prefix = ReportSummaryPrefix {
            id: PrefixId(1),
            name: "training for".to_string(),
        };
        assert_eq!(
            SubjectResolver::candidate_subject("training for training for dogs", Some(&prefix)),
            Some("dogs")
        );
        assert_eq!(
            SubjectResolver::candidate_subject("training forms", Some(&prefix)),
            None
        );
    }

    #[test]
    fn unprefixed_text_resolves_to_subject() {
        let matcher = SummaryMatcher::new(prefixes(), subjects());
        match matcher.match_summary("Sniper Rifles (3)") {
            SummaryMatch::Matched {
                prefix,
                subject,
                normalized,
            } => {
                assert!(prefix.is_none());
                assert_eq!(subject.name, "sniper rifles");
                assert_eq!(normalized, "sniper rifles");
            }
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn abbreviations_are_unmappable_without_a_remap() {
        let matcher = SummaryMatcher::new(prefixes(), subjects());
        let outcome = matcher.match_summary("tf arts and crafts");
        assert_eq!(
            outcome,
            SummaryMatch::Unmappable {
                normalized: "tf arts and crafts".to_string(),
                prefix: None,
            }
        );
    }

    #[test]
    fn remap_rescues_abbreviations() {
        let remap: SummaryRemap = [("tf arts and crafts", "training for arts and crafts")]
            .into_iter()
            .collect();
        let matcher = SummaryMatcher::with_remap(remap, prefixes(), subjects());

        match matcher.match_summary("tf arts and crafts") {
            SummaryMatch::Matched {
                prefix, subject, ..
            } => {
                assert_eq!(prefix.expect("prefix").name, "training for");
                assert_eq!(subject.name, "arts and crafts");
            }
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn display_text_round_trips_through_the_matcher() {
        let matcher = SummaryMatcher::new(prefixes(), subjects());
        for prefix in prefixes() {
            for subject in subjects() {
                let text = display_name(Some(&prefix), &subject);
                match matcher.match_summary(&text) {
                    SummaryMatch::Matched {
                        prefix: matched_prefix,
                        subject: matched_subject,
                        ..
                    } => {
                        assert_eq!(matched_prefix.as_ref(), Some(&prefix), "{text}");
                        assert_eq!(matched_subject, subject, "{text}");
                    }
                    other => panic!("{text} did not round trip: {other:?}"),
                }
            }
        }
    }
}
