use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{auth, db, limiter, notify, utils};

use auth::password::PasswordAuthenticator;
use entities::rate_limit::Action;
use errors::AppError;
use limiter::{
    counter_store::{CounterStore, MemoryCounterStore},
    rate_limiter::RateLimiter,
};
use notify::{log::LogNotifier, webhook::WebhookNotifier};
use repositories::{
    authenticator::AdminAuthenticator, notifier::Notifier, sqlx_repo::SqlxSubmissionRepo,
    submission::SubmissionRepository,
};
use use_cases::{
    contact::ContactHandler,
    guards::{GuardPipeline, OriginGuard, RateLimitGuard},
    login::LoginHandler,
};

pub struct AppState {
    pub contact_handler: ContactHandler,
    pub login_handler: LoginHandler,
    pub submission_repo: Arc<dyn SubmissionRepository>,
    pub counter_store: Arc<dyn CounterStore>,
    pub trust_forwarded_for: bool,
}

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool) -> Result<Self, AppError> {
        let submission_repo = Arc::new(SqlxSubmissionRepo::new(pool));

        let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(
                url.clone(),
                config.notify_sender.as_str(),
                config.notify_recipient.as_str(),
            )?),
            None => {
                tracing::warn!("APP_NOTIFY_WEBHOOK_URL not set, submissions will only be logged");
                Arc::new(LogNotifier::new(
                    config.notify_sender.as_str(),
                    config.notify_recipient.as_str(),
                ))
            }
        };

        if config.admin_password_hash.is_empty() {
            tracing::warn!("APP_ADMIN_PASSWORD_HASH not set, admin login will always fail");
        }
        let authenticator = Arc::new(PasswordAuthenticator::new(
            config.admin_username.as_str(),
            config.admin_password_hash.as_str(),
        ));

        Self::from_parts(
            config,
            Arc::new(MemoryCounterStore::new()),
            submission_repo,
            notifier,
            authenticator,
        )
    }

    /// Wires the handlers around the given collaborators. Both actions share
    /// one counter store; keys keep them apart.
    pub fn from_parts(
        config: &settings::AppConfig,
        counter_store: Arc<dyn CounterStore>,
        submission_repo: Arc<dyn SubmissionRepository>,
        notifier: Arc<dyn Notifier>,
        authenticator: Arc<dyn AdminAuthenticator>,
    ) -> Result<Self, AppError> {
        let policy = config
            .rate_limit_policy()
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        let limiter = RateLimiter::new(counter_store.clone());
        let origins = config.cors_origins();

        let contact_guards = GuardPipeline::new()
            .with(OriginGuard::new(origins.clone()))
            .with(RateLimitGuard::new(limiter.clone(), Action::ContactSubmit, policy.contact));

        let login_guards = GuardPipeline::new()
            .with(OriginGuard::new(origins))
            .with(RateLimitGuard::new(limiter, Action::AdminLogin, policy.login));

        Ok(AppState {
            contact_handler: ContactHandler::new(contact_guards, submission_repo.clone(), notifier),
            login_handler: LoginHandler::new(login_guards, authenticator),
            submission_repo,
            counter_store,
            trust_forwarded_for: config.trust_forwarded_for,
        })
    }
}
