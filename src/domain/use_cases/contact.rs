use std::sync::Arc;

use crate::{
    constants::SUBMISSION_SUCCESS_MESSAGE,
    entities::contact::{ContactDraft, SubmissionReceipt},
    errors::AppError,
    repositories::{notifier::Notifier, submission::SubmissionRepository},
    use_cases::{
        guards::{GuardPipeline, RequestContext},
        validation::validate_draft,
    },
};

/// Contact form gateway: guards, validation, persistence, notification.
pub struct ContactHandler {
    pub guards: GuardPipeline,
    pub submission_repo: Arc<dyn SubmissionRepository>,
    pub notifier: Arc<dyn Notifier>,
}

impl ContactHandler {
    pub fn new(
        guards: GuardPipeline,
        submission_repo: Arc<dyn SubmissionRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        ContactHandler {
            guards,
            submission_repo,
            notifier,
        }
    }

    /// Handles one contact form submission.
    ///
    /// Rejections come back as `Throttled`/`Forbidden` from the guards and
    /// `ValidationFailed` from the validator, before anything is stored.
    /// A storage failure is `PersistenceFailed`. A notification failure is
    /// logged and the submission still succeeds.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        draft: ContactDraft,
    ) -> Result<SubmissionReceipt, AppError> {
        self.guards.run(ctx)?;

        let record = validate_draft(&draft).map_err(|errors| {
            tracing::info!(client_ip = %ctx.client_ip, errors = %errors, "contact submission failed validation");
            AppError::ValidationFailed(errors)
        })?;

        let id = self.submission_repo.save(&record).await.map_err(|e| {
            tracing::error!(client_ip = %ctx.client_ip, error = %e, "failed to store contact submission");
            match e {
                AppError::PersistenceFailed(_) => e,
                other => AppError::PersistenceFailed(other.to_string()),
            }
        })?;

        tracing::info!(submission_id = %id, interest = %record.interest(), "contact submission stored");

        if let Err(e) = self.notifier.notify(&record).await {
            tracing::error!(submission_id = %id, error = %e, "contact notification failed");
        }

        Ok(SubmissionReceipt {
            id,
            message: SUBMISSION_SUCCESS_MESSAGE.to_string(),
        })
    }

    /// Answers a body that could not be decoded. The guards still run, so
    /// the attempt counts against the quota and a throttle takes precedence.
    pub fn reject_malformed(&self, ctx: &RequestContext, err: AppError) -> AppError {
        if let Err(rejected) = self.guards.run(ctx) {
            return rejected;
        }
        tracing::info!(client_ip = %ctx.client_ip, error = %err, "contact form body rejected");
        err
    }
}
