use std::collections::HashMap;

use serde::Serialize;

use super::domain::{CaseId, CaseStatus, CaseSummary, GoodId, LineItem, LineItemId};
use super::repository::{CaseDirectory, CatalogStore, RepositoryError};

/// Precedents gathered for one good-backed line of a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CasePrecedents {
    pub line_item_id: LineItemId,
    pub good_id: GoodId,
    pub precedents: Vec<LineItem>,
}

/// Read-only lookup of earlier classifications of the same good.
pub struct PrecedentFinder<'a, S, C> {
    store: &'a S,
    cases: &'a C,
}

impl<'a, S, C> PrecedentFinder<'a, S, C>
where
    S: CatalogStore,
    C: CaseDirectory,
{
    pub fn new(store: &'a S, cases: &'a C) -> Self {
        Self { store, cases }
    }

    /// Line items referencing the good that carry at least one control list entry,
    /// in insertion order. Unverified goods have no precedents.
    pub fn for_good(&self, good_id: &GoodId) -> Result<Vec<LineItem>, RepositoryError> {
        let good = self
            .store
            .good(good_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "good",
                id: good_id.to_string(),
            })?;
        if !good.is_verified() {
            return Ok(Vec::new());
        }

        Ok(self
            .store
            .line_items()?
            .into_iter()
            .filter(|item| item.good_id() == Some(good_id))
            .filter(|item| !item.control_list_entries.is_empty())
            .collect())
    }

    /// Precedents for each good-backed line of `case`, taken from other cases whose
    /// status makes their reviews visible.
    pub fn for_case(&self, case: &CaseSummary) -> Result<Vec<CasePrecedents>, RepositoryError> {
        let mut statuses: HashMap<CaseId, Option<CaseStatus>> = HashMap::new();
        let mut grouped = Vec::new();

        for line_item_id in &case.line_items {
            let Some(item) = self.store.line_item(line_item_id)? else {
                continue;
            };
            let Some(good_id) = item.good_id() else {
                continue;
            };

            let mut precedents = Vec::new();
            for candidate in self.for_good(good_id)? {
                if candidate.case_id == case.id {
                    continue;
                }
                let status = match statuses.get(&candidate.case_id) {
                    Some(status) => *status,
                    None => {
                        let status = self.cases.case(&candidate.case_id)?.map(|case| case.status);
                        statuses.insert(candidate.case_id.clone(), status);
                        status
                    }
                };
                if status.is_some_and(CaseStatus::is_precedent_source) {
                    precedents.push(candidate);
                }
            }

            grouped.push(CasePrecedents {
                line_item_id: line_item_id.clone(),
                good_id: good_id.clone(),
                precedents,
            });
        }

        Ok(grouped)
    }
}
