use std::collections::BTreeSet;
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::assessment::domain::{
    CaseId, CaseStatus, CaseSummary, ControlListEntry, Good, GoodId, GoodStatus, LineItem,
    LineItemId, LineItemKind, RegimeEntry, RegimeEntryId, ReviewerId, SystemFlag,
};
use crate::workflows::assessment::memory::{CatalogSeed, InMemoryCatalog, MemoryTransaction, SeedCase};
use crate::workflows::assessment::repository::{
    CaseDirectory, CatalogStore, RepositoryError, ReviewPermissions,
};
use crate::workflows::assessment::{assessment_router, AssessmentLine, AssessmentService};
use crate::workflows::assessment::audit::AuditRecord;
use crate::workflows::report_summary::{
    Classification, PrefixId, ReportSummaryPrefix, ReportSummarySubject, SubjectId,
};

pub(super) type MemoryService = AssessmentService<InMemoryCatalog, InMemoryCatalog, InMemoryCatalog>;

pub(super) fn case_id() -> CaseId {
    CaseId("case-1".to_string())
}

pub(super) fn reviewer() -> ReviewerId {
    ReviewerId("caseworker-1".to_string())
}

pub(super) fn line_id(id: &str) -> LineItemId {
    LineItemId(id.to_string())
}

pub(super) fn good_id(id: &str) -> GoodId {
    GoodId(id.to_string())
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 11, 3, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn good(id: &str, name: &str, status: GoodStatus, entries: &[&str]) -> Good {
    let mut flags = BTreeSet::new();
    if status != GoodStatus::Verified {
        flags.insert(SystemFlag::GoodNotYetVerified);
    }
    Good {
        id: good_id(id),
        name: name.to_string(),
        organisation: "Acme Defence".to_string(),
        status,
        control_list_entries: entries.iter().map(|entry| entry.to_string()).collect(),
        is_good_controlled: Some(true),
        classification: None,
        flags,
    }
}

pub(super) fn line_item(id: &str, case: &str, kind: LineItemKind, entries: &[&str]) -> LineItem {
    LineItem {
        id: line_id(id),
        case_id: CaseId(case.to_string()),
        kind,
        control_list_entries: entries.iter().map(|entry| entry.to_string()).collect(),
        is_good_controlled: None,
        classification: None,
        regime_entries: Vec::new(),
        comment: None,
        is_precedent: false,
        is_wassenaar: false,
        is_ncsc_military_information_security: None,
        assessed_by: None,
        assessment_date: None,
    }
}

fn on_good(id: &str) -> LineItemKind {
    LineItemKind::GoodOnApplication {
        good_id: good_id(id),
    }
}

/// Catalog shared by the assessment tests.
///
/// case-1 (submitted): line-1 on unverified good-1, line-2 on verified good-2,
/// line-3 a goods type. case-2 (under review) and case-3 (withdrawn) each hold an
/// earlier review of good-2.
pub(super) fn seed() -> CatalogSeed {
    let mut line_2 = line_item("line-2", "case-1", on_good("good-2"), &["ML1"]);
    line_2.is_good_controlled = Some(true);
    line_2.classification = Some(Classification::Legacy {
        text: "Sniper Rifles (2)".to_string(),
    });

    let mut line_4 = line_item("line-4", "case-2", on_good("good-2"), &["ML1"]);
    line_4.is_good_controlled = Some(true);

    CatalogSeed {
        prefixes: vec![
            ReportSummaryPrefix {
                id: PrefixId(1),
                name: "training for".to_string(),
            },
            ReportSummaryPrefix {
                id: PrefixId(2),
                name: "components for".to_string(),
            },
        ],
        subjects: vec![
            subject(1, "arts and crafts"),
            subject(2, "sniper rifles"),
            subject(3, "body armour"),
        ],
        control_list_entries: ["ML1", "ML1a", "ML3", "ML3a"]
            .into_iter()
            .map(|rating| ControlListEntry {
                rating: rating.to_string(),
                text: String::new(),
            })
            .collect(),
        regime_entries: vec![
            RegimeEntry {
                id: RegimeEntryId("regime-1".to_string()),
                name: "Wassenaar Arrangement".to_string(),
            },
            RegimeEntry {
                id: RegimeEntryId("regime-2".to_string()),
                name: "MTCR".to_string(),
            },
        ],
        goods: vec![
            good("good-1", "Rifle scope", GoodStatus::Submitted, &["ML3"]),
            good("good-2", "Sniper rifle", GoodStatus::Verified, &["ML1"]),
        ],
        cases: vec![
            SeedCase {
                id: case_id(),
                status: CaseStatus::Submitted,
            },
            SeedCase {
                id: CaseId("case-2".to_string()),
                status: CaseStatus::UnderReview,
            },
            SeedCase {
                id: CaseId("case-3".to_string()),
                status: CaseStatus::Withdrawn,
            },
        ],
        line_items: vec![
            line_item("line-1", "case-1", on_good("good-1"), &[]),
            line_2,
            line_item(
                "line-3",
                "case-1",
                LineItemKind::GoodsType {
                    description: "Night vision goggles".to_string(),
                },
                &[],
            ),
            line_4,
            line_item("line-5", "case-3", on_good("good-2"), &["ML3"]),
        ],
        reviewers: vec![reviewer()],
        ..CatalogSeed::default()
    }
}

pub(super) fn subject(id: u32, name: &str) -> ReportSummarySubject {
    ReportSummarySubject {
        id: SubjectId(id),
        name: name.to_string(),
        code_level: None,
    }
}

pub(super) fn build_service() -> (MemoryService, Arc<InMemoryCatalog>) {
    let catalog = Arc::new(InMemoryCatalog::from_seed(seed()));
    let service = AssessmentService::new(catalog.clone(), catalog.clone(), catalog.clone());
    (service, catalog)
}

pub(super) fn assessment_router_with_service(service: MemoryService) -> axum::Router {
    assessment_router(Arc::new(service))
}

/// Controlled line classified as "training for arts and crafts".
pub(super) fn controlled_line(id: &str) -> AssessmentLine {
    let mut line = AssessmentLine::new(line_id(id));
    line.is_good_controlled = Some(true);
    line.control_list_entries = vec!["ML1".to_string()];
    line.report_summary_prefix = Some(PrefixId(1));
    line.report_summary_subject = Some(SubjectId(1));
    line.comment = Some("some comment".to_string());
    line
}

pub(super) fn stored_line(catalog: &InMemoryCatalog, id: &str) -> LineItem {
    catalog
        .line_item(&line_id(id))
        .expect("read line item")
        .expect("line item present")
}

pub(super) fn stored_good(catalog: &InMemoryCatalog, id: &str) -> Good {
    catalog
        .good(&good_id(id))
        .expect("read good")
        .expect("good present")
}

pub(super) fn audits(catalog: &InMemoryCatalog) -> Vec<AuditRecord> {
    catalog.audits().expect("read audits")
}

/// Store whose transactions always fail, behind a case that passes every gate.
pub(super) struct UnavailableCatalog;

impl CatalogStore for UnavailableCatalog {
    type Transaction<'a> = MemoryTransaction<'a>;

    fn begin(&self) -> Result<Self::Transaction<'_>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn prefixes(&self) -> Result<Vec<ReportSummaryPrefix>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn subjects(&self) -> Result<Vec<ReportSummarySubject>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn good(&self, _id: &GoodId) -> Result<Option<Good>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn line_item(&self, _id: &LineItemId) -> Result<Option<LineItem>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn line_items(&self) -> Result<Vec<LineItem>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn audit_trail(&self, _target: &LineItemId) -> Result<Vec<AuditRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl CaseDirectory for UnavailableCatalog {
    fn case(&self, id: &CaseId) -> Result<Option<CaseSummary>, RepositoryError> {
        Ok(Some(CaseSummary {
            id: id.clone(),
            status: CaseStatus::Submitted,
            line_items: vec![line_id("line-1")],
        }))
    }
}

impl ReviewPermissions for UnavailableCatalog {
    fn can_review_goods(&self, _reviewer: &ReviewerId) -> Result<bool, RepositoryError> {
        Ok(true)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
