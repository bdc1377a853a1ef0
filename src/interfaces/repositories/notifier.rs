use async_trait::async_trait;

use crate::{entities::contact::SubmissionRecord, errors::AppError};

/// Tells the site owners about a stored submission. Best-effort: callers
/// log failures and carry on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, record: &SubmissionRecord) -> Result<(), AppError>;
}
