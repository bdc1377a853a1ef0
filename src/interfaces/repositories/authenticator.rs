use async_trait::async_trait;

use crate::errors::AppError;

/// External identity check for the admin login.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminAuthenticator: Send + Sync {
    /// `Ok(false)` for wrong credentials, `Err` when the check itself failed.
    async fn authenticate(&self, username: &str, password: &str) -> Result<bool, AppError>;
}
