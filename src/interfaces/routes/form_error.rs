use actix_web::web;

use crate::errors::AppError;

/// Upper bound for a urlencoded body; the longest legal contact form is
/// well under this.
const FORM_LIMIT_BYTES: usize = 16 * 1024;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .limit(FORM_LIMIT_BYTES)
            .error_handler(|err, _req| AppError::from(err).into()),
    );
}
