//! Report summary taxonomy: normalization of legacy free text, prefix/subject
//! matching, and the registry of linked (prefix?, subject) pairs.

pub mod matching;
pub mod normalizer;
pub mod registry;
pub mod taxonomy;

pub use matching::{PrefixMatcher, SubjectResolver, SummaryMatch, SummaryMatcher};
pub use normalizer::{normalize_summary, SummaryRemap};
pub use registry::{ReportSummaryRegistry, ReportSummaryTable};
pub use taxonomy::{
    display_name, Classification, PrefixId, ReportSummary, ReportSummaryId, ReportSummaryPrefix,
    ReportSummarySubject, SubjectId,
};
