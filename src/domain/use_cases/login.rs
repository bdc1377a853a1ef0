use std::sync::Arc;

use crate::{
    entities::{contact::ValidationErrorSet, login::LoginForm},
    errors::AppError,
    repositories::authenticator::AdminAuthenticator,
    use_cases::guards::{GuardPipeline, RequestContext},
};

/// Rate limited admin login. Every POST consumes an attempt, successful or not.
pub struct LoginHandler {
    pub guards: GuardPipeline,
    pub authenticator: Arc<dyn AdminAuthenticator>,
}

impl LoginHandler {
    pub fn new(guards: GuardPipeline, authenticator: Arc<dyn AdminAuthenticator>) -> Self {
        LoginHandler { guards, authenticator }
    }

    pub async fn login(&self, ctx: &RequestContext, form: &LoginForm) -> Result<String, AppError> {
        self.guards.run(ctx)?;

        let username = form.username.as_deref().map(str::trim).unwrap_or_default();
        let password = form.password.as_deref().unwrap_or_default();

        let mut errors = ValidationErrorSet::new();
        if username.is_empty() {
            errors.insert("username", "Please enter your username");
        }
        if password.is_empty() {
            errors.insert("password", "Please enter your password");
        }
        if !errors.is_empty() {
            return Err(AppError::ValidationFailed(errors));
        }

        match self.authenticator.authenticate(username, password).await {
            Ok(true) => {
                tracing::info!(client_ip = %ctx.client_ip, username, "admin login succeeded");
                Ok(username.to_string())
            }
            Ok(false) => {
                tracing::warn!(client_ip = %ctx.client_ip, username, "admin login failed");
                Err(AppError::InvalidCredentials)
            }
            Err(e) => {
                tracing::error!(client_ip = %ctx.client_ip, error = %e, "admin authentication errored");
                Err(e)
            }
        }
    }

    /// An undecodable login body still spends an attempt.
    pub fn reject_malformed(&self, ctx: &RequestContext, err: AppError) -> AppError {
        if let Err(rejected) = self.guards.run(ctx) {
            return rejected;
        }
        tracing::warn!(client_ip = %ctx.client_ip, error = %err, "admin login body rejected");
        err
    }
}
