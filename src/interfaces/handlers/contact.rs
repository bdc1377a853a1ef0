use actix_web::{post, web, HttpRequest, HttpResponse};

use crate::{
    entities::contact::ContactDraft,
    handlers::responders::{form_rejection, respond_error, respond_success},
    use_cases::guards::RequestContext,
    utils::get_client_ip::get_client_ip,
    AppState,
};

pub(crate) fn request_context(req: &HttpRequest, trust_forwarded_for: bool) -> RequestContext {
    let origin = req
        .headers()
        .get("origin")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    RequestContext::new(get_client_ip(req, trust_forwarded_for)).with_origin(origin)
}

/// A body that fails to decode still passes through the guards and is then
/// answered with a 400 carrying the decode message.
#[post("/contact")]
pub async fn submit_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: Result<web::Form<ContactDraft>, actix_web::Error>,
) -> HttpResponse {
    let ctx = request_context(&req, state.trust_forwarded_for);

    let draft = match form {
        Ok(form) => form.into_inner(),
        Err(e) => {
            let err = state.contact_handler.reject_malformed(&ctx, form_rejection(&e));
            return respond_error(&req, &err);
        }
    };

    match state.contact_handler.submit(&ctx, draft).await {
        Ok(receipt) => respond_success(&req, &receipt.message, "/"),
        Err(e) => respond_error(&req, &e),
    }
}
