//! Caseworker assessment of application line items: batch validation, the
//! transactional apply step that merges into catalog goods, audit payloads, and
//! precedent lookups.

pub mod audit;
pub mod domain;
pub mod filters;
pub mod memory;
pub(crate) mod precedent;
pub mod repository;
pub mod request;
pub mod router;
pub mod service;
pub(crate) mod validation;

#[cfg(test)]
mod tests;

pub use audit::{
    AuditEntry, AuditId, AuditRecord, AuditVerb, ProductReviewedPayload, ReviewSnapshot,
    NO_CONTROL_CODE, NO_REGIMES,
};
pub use domain::{
    CaseId, CaseStatus, CaseSummary, ControlListEntry, Good, GoodId, GoodStatus, LineItem,
    LineItemId, LineItemKind, RegimeEntry, RegimeEntryId, ReviewerId, SystemFlag,
};
pub use memory::{CatalogSeed, InMemoryCatalog, MemoryTransaction, SeedCase};
pub use precedent::{CasePrecedents, PrecedentFinder};
pub use repository::{
    CaseDirectory, CatalogStore, CatalogTransaction, GoodFlagging, RepositoryError,
    ReviewPermissions,
};
pub use request::{AssessmentLine, ReportSummaryEntry};
pub use router::{assessment_router, REVIEWER_HEADER};
pub use service::{AssessmentError, AssessmentReceipt, AssessmentService};
pub use validation::{LineErrors, REPORT_SUMMARIES_EXCLUSIVE, REQUIRED_REPORT_SUMMARY};
