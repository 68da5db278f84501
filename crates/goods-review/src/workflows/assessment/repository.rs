use super::audit::{AuditEntry, AuditRecord};
use super::domain::{
    CaseId, CaseSummary, Good, GoodId, LineItem, LineItemId, RegimeEntry, RegimeEntryId,
    ReviewerId, SystemFlag,
};
use crate::workflows::report_summary::{
    PrefixId, ReportSummaryPrefix, ReportSummaryRegistry, ReportSummarySubject, SubjectId,
};

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the goods catalog plus the ability to open a write transaction.
pub trait CatalogStore: Send + Sync {
    type Transaction<'a>: CatalogTransaction
    where
        Self: 'a;

    /// Opens a transaction. Writes become visible only after [`CatalogTransaction::commit`];
    /// dropping the transaction discards them.
    fn begin(&self) -> Result<Self::Transaction<'_>, RepositoryError>;

    fn prefixes(&self) -> Result<Vec<ReportSummaryPrefix>, RepositoryError>;
    fn subjects(&self) -> Result<Vec<ReportSummarySubject>, RepositoryError>;
    fn good(&self, id: &GoodId) -> Result<Option<Good>, RepositoryError>;
    fn line_item(&self, id: &LineItemId) -> Result<Option<LineItem>, RepositoryError>;
    /// All line items in insertion order.
    fn line_items(&self) -> Result<Vec<LineItem>, RepositoryError>;
    fn audit_trail(&self, target: &LineItemId) -> Result<Vec<AuditRecord>, RepositoryError>;
}

/// Flag-tagging operations on goods, applied inside the caller's transaction.
pub trait GoodFlagging {
    fn add_flag(&mut self, good_id: &GoodId, flag: SystemFlag) -> Result<(), RepositoryError>;
    fn remove_flag(&mut self, good_id: &GoodId, flag: SystemFlag) -> Result<(), RepositoryError>;

    fn set_flag(
        &mut self,
        good_id: &GoodId,
        flag: SystemFlag,
        enabled: bool,
    ) -> Result<(), RepositoryError> {
        if enabled {
            self.add_flag(good_id, flag)
        } else {
            self.remove_flag(good_id, flag)
        }
    }
}

/// Unit of work covering one assessment batch.
pub trait CatalogTransaction: ReportSummaryRegistry + GoodFlagging {
    /// Case status and line ordering as seen by this transaction.
    fn case(&self, id: &CaseId) -> Result<Option<CaseSummary>, RepositoryError>;
    fn prefix(&self, id: PrefixId) -> Result<Option<ReportSummaryPrefix>, RepositoryError>;
    fn subject(&self, id: SubjectId) -> Result<Option<ReportSummarySubject>, RepositoryError>;
    fn regime_entry(&self, id: &RegimeEntryId) -> Result<Option<RegimeEntry>, RepositoryError>;
    fn control_list_entry_exists(&self, rating: &str) -> Result<bool, RepositoryError>;
    fn line_item(&self, id: &LineItemId) -> Result<Option<LineItem>, RepositoryError>;
    fn good(&self, id: &GoodId) -> Result<Option<Good>, RepositoryError>;

    fn save_line_item(&mut self, item: LineItem) -> Result<(), RepositoryError>;
    fn save_good(&mut self, good: Good) -> Result<(), RepositoryError>;
    fn append_audit(&mut self, entry: AuditEntry) -> Result<AuditRecord, RepositoryError>;

    fn commit(self) -> Result<(), RepositoryError>
    where
        Self: Sized;
}

/// Case collaborator: status gate and line ordering.
pub trait CaseDirectory: Send + Sync {
    fn case(&self, id: &CaseId) -> Result<Option<CaseSummary>, RepositoryError>;
}

/// Authorization collaborator.
pub trait ReviewPermissions: Send + Sync {
    fn can_review_goods(&self, reviewer: &ReviewerId) -> Result<bool, RepositoryError>;
}
