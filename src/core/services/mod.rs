pub mod auth_service;
pub mod category_service;
pub mod expense_service;
pub mod filter_service;
pub mod scan_service;
pub mod summary_service;

pub use auth_service::{AuthSession, CredentialService, MockCredentialService};
pub use category_service::CategoryService;
pub use expense_service::ExpenseStore;
pub use filter_service::{FilterService, HistoryFilter, HistoryView, SortOrder};
pub use scan_service::{
    ImageRef, MockReceiptScanner, ReceiptExtraction, ReceiptScanner, ScanOutcome, ScanService,
    StaticScanner,
};
pub use summary_service::SummaryService;

use crate::domain::DraftError;
use crate::errors::StorageError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    Auth(String),
}

impl From<DraftError> for ServiceError {
    fn from(err: DraftError) -> Self {
        ServiceError::Invalid(err.to_string())
    }
}
