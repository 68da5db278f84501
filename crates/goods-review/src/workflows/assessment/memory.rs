use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::audit::{AuditEntry, AuditId, AuditRecord};
use super::domain::{
    CaseId, CaseStatus, CaseSummary, ControlListEntry, Good, GoodId, LineItem, LineItemId,
    RegimeEntry, RegimeEntryId, ReviewerId, SystemFlag,
};
use super::repository::{
    CaseDirectory, CatalogStore, CatalogTransaction, GoodFlagging, RepositoryError,
    ReviewPermissions,
};
use crate::workflows::report_summary::{
    PrefixId, ReportSummary, ReportSummaryPrefix, ReportSummaryRegistry, ReportSummarySubject,
    ReportSummaryTable, SubjectId,
};

/// Case row as it appears in a seed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedCase {
    pub id: CaseId,
    pub status: CaseStatus,
}

/// JSON document used to populate an [`InMemoryCatalog`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub prefixes: Vec<ReportSummaryPrefix>,
    #[serde(default)]
    pub subjects: Vec<ReportSummarySubject>,
    #[serde(default)]
    pub control_list_entries: Vec<ControlListEntry>,
    #[serde(default)]
    pub regime_entries: Vec<RegimeEntry>,
    #[serde(default)]
    pub goods: Vec<Good>,
    #[serde(default)]
    pub cases: Vec<SeedCase>,
    /// Line items in application order.
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub report_summaries: ReportSummaryTable,
    #[serde(default)]
    pub reviewers: Vec<ReviewerId>,
}

#[derive(Debug, Clone, Default)]
struct CatalogState {
    prefixes: BTreeMap<PrefixId, ReportSummaryPrefix>,
    subjects: BTreeMap<SubjectId, ReportSummarySubject>,
    control_list_entries: BTreeMap<String, ControlListEntry>,
    regime_entries: BTreeMap<RegimeEntryId, RegimeEntry>,
    goods: BTreeMap<GoodId, Good>,
    cases: BTreeMap<CaseId, CaseStatus>,
    line_items: Vec<LineItem>,
    report_summaries: ReportSummaryTable,
    audits: Vec<AuditRecord>,
    reviewers: BTreeSet<ReviewerId>,
}

impl CatalogState {
    fn line_item(&self, id: &LineItemId) -> Option<&LineItem> {
        self.line_items.iter().find(|item| &item.id == id)
    }

    fn case_summary(&self, id: &CaseId) -> Option<CaseSummary> {
        self.cases.get(id).map(|status| CaseSummary {
            id: id.clone(),
            status: *status,
            line_items: self
                .line_items
                .iter()
                .filter(|item| &item.case_id == id)
                .map(|item| item.id.clone())
                .collect(),
        })
    }

    fn good_mut(&mut self, id: &GoodId) -> Result<&mut Good, RepositoryError> {
        self.goods.get_mut(id).ok_or_else(|| RepositoryError::NotFound {
            entity: "good",
            id: id.to_string(),
        })
    }
}

impl From<CatalogSeed> for CatalogState {
    fn from(seed: CatalogSeed) -> Self {
        Self {
            prefixes: seed
                .prefixes
                .into_iter()
                .map(|prefix| (prefix.id, prefix))
                .collect(),
            subjects: seed
                .subjects
                .into_iter()
                .map(|subject| (subject.id, subject))
                .collect(),
            control_list_entries: seed
                .control_list_entries
                .into_iter()
                .map(|entry| (entry.rating.clone(), entry))
                .collect(),
            regime_entries: seed
                .regime_entries
                .into_iter()
                .map(|entry| (entry.id.clone(), entry))
                .collect(),
            goods: seed
                .goods
                .into_iter()
                .map(|good| (good.id.clone(), good))
                .collect(),
            cases: seed
                .cases
                .into_iter()
                .map(|case| (case.id, case.status))
                .collect(),
            line_items: seed.line_items,
            report_summaries: seed.report_summaries,
            audits: Vec::new(),
            reviewers: seed.reviewers.into_iter().collect(),
        }
    }
}

/// Mutex-backed catalog used by the service binary and tests.
///
/// Also answers case lookups and review permissions from the same seed.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: Mutex<CatalogState>,
}

impl InMemoryCatalog {
    pub fn from_seed(seed: CatalogSeed) -> Self {
        Self {
            state: Mutex::new(CatalogState::from(seed)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CatalogState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("catalog lock poisoned".to_string()))
    }

    pub fn set_case_status(&self, id: &CaseId, status: CaseStatus) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        match state.cases.get_mut(id) {
            Some(current) => {
                *current = status;
                Ok(())
            }
            None => Err(RepositoryError::NotFound {
                entity: "case",
                id: id.to_string(),
            }),
        }
    }

    pub fn report_summaries(&self) -> Result<Vec<ReportSummary>, RepositoryError> {
        Ok(self.lock()?.report_summaries.iter().cloned().collect())
    }

    pub fn audits(&self) -> Result<Vec<AuditRecord>, RepositoryError> {
        Ok(self.lock()?.audits.clone())
    }
}

impl CatalogStore for InMemoryCatalog {
    type Transaction<'a> = MemoryTransaction<'a>;

    fn begin(&self) -> Result<Self::Transaction<'_>, RepositoryError> {
        let guard = self.lock()?;
        let working = guard.clone();
        Ok(MemoryTransaction { guard, working })
    }

    fn prefixes(&self) -> Result<Vec<ReportSummaryPrefix>, RepositoryError> {
        Ok(self.lock()?.prefixes.values().cloned().collect())
    }

    fn subjects(&self) -> Result<Vec<ReportSummarySubject>, RepositoryError> {
        Ok(self.lock()?.subjects.values().cloned().collect())
    }

    fn good(&self, id: &GoodId) -> Result<Option<Good>, RepositoryError> {
        Ok(self.lock()?.goods.get(id).cloned())
    }

    fn line_item(&self, id: &LineItemId) -> Result<Option<LineItem>, RepositoryError> {
        Ok(self.lock()?.line_item(id).cloned())
    }

    fn line_items(&self) -> Result<Vec<LineItem>, RepositoryError> {
        Ok(self.lock()?.line_items.clone())
    }

    fn audit_trail(&self, target: &LineItemId) -> Result<Vec<AuditRecord>, RepositoryError> {
        Ok(self
            .lock()?
            .audits
            .iter()
            .filter(|record| &record.target == target)
            .cloned()
            .collect())
    }
}

impl CaseDirectory for InMemoryCatalog {
    fn case(&self, id: &CaseId) -> Result<Option<CaseSummary>, RepositoryError> {
        Ok(self.lock()?.case_summary(id))
    }
}

impl ReviewPermissions for InMemoryCatalog {
    fn can_review_goods(&self, reviewer: &ReviewerId) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.reviewers.contains(reviewer))
    }
}

/// Holds the catalog lock and a staged copy of its state until commit.
pub struct MemoryTransaction<'a> {
    guard: MutexGuard<'a, CatalogState>,
    working: CatalogState,
}

impl ReportSummaryRegistry for MemoryTransaction<'_> {
    fn link_report_summary(
        &mut self,
        prefix: Option<&ReportSummaryPrefix>,
        subject: &ReportSummarySubject,
    ) -> Result<ReportSummary, RepositoryError> {
        let (summary, _) = self.working.report_summaries.get_or_link(prefix, subject);
        Ok(summary)
    }
}

impl GoodFlagging for MemoryTransaction<'_> {
    fn add_flag(&mut self, good_id: &GoodId, flag: SystemFlag) -> Result<(), RepositoryError> {
        self.working.good_mut(good_id)?.flags.insert(flag);
        Ok(())
    }

    fn remove_flag(&mut self, good_id: &GoodId, flag: SystemFlag) -> Result<(), RepositoryError> {
        self.working.good_mut(good_id)?.flags.remove(&flag);
        Ok(())
    }
}

impl CatalogTransaction for MemoryTransaction<'_> {
    fn case(&self, id: &CaseId) -> Result<Option<CaseSummary>, RepositoryError> {
        Ok(self.working.case_summary(id))
    }

    fn prefix(&self, id: PrefixId) -> Result<Option<ReportSummaryPrefix>, RepositoryError> {
        Ok(self.working.prefixes.get(&id).cloned())
    }

    fn subject(&self, id: SubjectId) -> Result<Option<ReportSummarySubject>, RepositoryError> {
        Ok(self.working.subjects.get(&id).cloned())
    }

    fn regime_entry(&self, id: &RegimeEntryId) -> Result<Option<RegimeEntry>, RepositoryError> {
        Ok(self.working.regime_entries.get(id).cloned())
    }

    fn control_list_entry_exists(&self, rating: &str) -> Result<bool, RepositoryError> {
        Ok(self.working.control_list_entries.contains_key(rating))
    }

    fn line_item(&self, id: &LineItemId) -> Result<Option<LineItem>, RepositoryError> {
        Ok(self.working.line_item(id).cloned())
    }

    fn good(&self, id: &GoodId) -> Result<Option<Good>, RepositoryError> {
        Ok(self.working.goods.get(id).cloned())
    }

    fn save_line_item(&mut self, item: LineItem) -> Result<(), RepositoryError> {
        match self
            .working
            .line_items
            .iter_mut()
            .find(|existing| existing.id == item.id)
        {
            Some(existing) => *existing = item,
            None => self.working.line_items.push(item),
        }
        Ok(())
    }

    fn save_good(&mut self, good: Good) -> Result<(), RepositoryError> {
        self.working.goods.insert(good.id.clone(), good);
        Ok(())
    }

    fn append_audit(&mut self, entry: AuditEntry) -> Result<AuditRecord, RepositoryError> {
        let id = AuditId(self.working.audits.len() as u64 + 1);
        let record = AuditRecord::from_entry(id, entry);
        self.working.audits.push(record.clone());
        Ok(record)
    }

    fn commit(self) -> Result<(), RepositoryError> {
        let MemoryTransaction { mut guard, working } = self;
        *guard = working;
        Ok(())
    }
}
