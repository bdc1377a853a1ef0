use actix_web::{post, web, HttpRequest, HttpResponse};

use crate::{
    constants::LOGIN_SUCCESS_MESSAGE,
    entities::login::LoginForm,
    handlers::{
        contact::request_context,
        responders::{form_rejection, respond_error, respond_success},
    },
    AppState,
};

#[post("/login")]
pub async fn admin_login(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: Result<web::Form<LoginForm>, actix_web::Error>,
) -> HttpResponse {
    let ctx = request_context(&req, state.trust_forwarded_for);

    let form = match form {
        Ok(form) => form.into_inner(),
        Err(e) => {
            let err = state.login_handler.reject_malformed(&ctx, form_rejection(&e));
            return respond_error(&req, &err);
        }
    };

    match state.login_handler.login(&ctx, &form).await {
        Ok(_) => respond_success(&req, LOGIN_SUCCESS_MESSAGE, "/admin"),
        Err(e) => respond_error(&req, &e),
    }
}
