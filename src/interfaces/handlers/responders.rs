use actix_web::{
    http::{header, StatusCode},
    HttpRequest, HttpResponse, ResponseError,
};

use crate::{
    constants::AJAX_HEADER_VALUE,
    entities::contact::ApiResponse,
    errors::{retry_after_secs, AppError},
};

/// Programmatic callers announce themselves with `X-Requested-With`.
pub fn is_ajax(req: &HttpRequest) -> bool {
    req.headers()
        .get("x-requested-with")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case(AJAX_HEADER_VALUE))
}

/// The `AppError` behind a failed form extraction. `FormConfig`'s error
/// handler already converted it; anything else is reported as malformed.
pub fn form_rejection(err: &actix_web::Error) -> AppError {
    match err.as_error::<AppError>() {
        Some(AppError::BadRequest(message)) => AppError::BadRequest(message.clone()),
        _ => AppError::BadRequest(format!("Malformed form body: {}", err)),
    }
}

pub fn respond_success(req: &HttpRequest, message: &str, redirect_to: &str) -> HttpResponse {
    if is_ajax(req) {
        HttpResponse::Ok().json(ApiResponse::success(message))
    } else {
        HttpResponse::SeeOther()
            .insert_header((header::LOCATION, redirect_to))
            .finish()
    }
}

pub fn respond_error(req: &HttpRequest, err: &AppError) -> HttpResponse {
    if is_ajax(req) {
        return err.error_response();
    }

    let status = err.status_code();
    let mut response = HttpResponse::build(status);
    if let Some(retry_after) = err.retry_after() {
        response.insert_header((header::RETRY_AFTER, retry_after_secs(retry_after).to_string()));
    }
    response
        .content_type("text/html; charset=utf-8")
        .body(error_page(status, err))
}

fn error_page(status: StatusCode, err: &AppError) -> String {
    let mut details = String::new();
    match err {
        AppError::ValidationFailed(errors) => {
            details.push_str("<ul>");
            for (field, message) in errors.iter() {
                details.push_str(&format!("<li><strong>{}</strong>: {}</li>", field, message));
            }
            details.push_str("</ul>");
        }
        AppError::Throttled { retry_after } => {
            details.push_str(&format!(
                "<p>Please wait {} before trying again.</p>",
                humantime::format_duration(std::time::Duration::from_secs(retry_after_secs(*retry_after)))
            ));
        }
        _ => {}
    }

    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{code} {reason}</title></head>\
         <body><h1>{message}</h1>{details}<p><a href=\"/\">Back</a></p></body></html>",
        code = status.as_u16(),
        reason = status.canonical_reason().unwrap_or("Error"),
        message = err.public_message(),
        details = details,
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_web::{body::to_bytes, error::UrlencodedError, test::TestRequest};

    use super::*;
    use crate::{entities::contact::ValidationErrorSet, errors::FORM_TOO_LARGE_MESSAGE};

    fn ajax() -> HttpRequest {
        TestRequest::default()
            .insert_header(("X-Requested-With", "XMLHttpRequest"))
            .to_http_request()
    }

    #[test]
    fn form_rejection_keeps_the_decode_message() {
        let overflow: actix_web::Error =
            AppError::from(UrlencodedError::Overflow { size: 20_000, limit: 16_384 }).into();
        match form_rejection(&overflow) {
            AppError::BadRequest(message) => assert_eq!(message, FORM_TOO_LARGE_MESSAGE),
            other => panic!("expected bad request, got {other:?}"),
        }

        let other = actix_web::error::ErrorBadRequest("boom");
        assert!(matches!(form_rejection(&other), AppError::BadRequest(_)));
    }

    #[test]
    fn detects_ajax_header() {
        assert!(is_ajax(&ajax()));
        assert!(!is_ajax(&TestRequest::default().to_http_request()));
    }

    #[actix_rt::test]
    async fn ajax_success_is_json() {
        let resp = respond_success(&ajax(), "Thanks", "/");
        assert_eq!(resp.status(), StatusCode::OK);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Thanks");
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn browser_success_redirects() {
        let resp = respond_success(&TestRequest::default().to_http_request(), "Thanks", "/");

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[actix_rt::test]
    async fn browser_throttle_page_carries_retry_after() {
        let err = AppError::Throttled { retry_after: Duration::from_secs(90) };
        let resp = respond_error(&TestRequest::default().to_http_request(), &err);

        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), "90");

        let body = to_bytes(resp.into_body()).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Too many requests"));
        assert!(html.contains("1m 30s"));
    }

    #[actix_rt::test]
    async fn browser_validation_page_lists_fields() {
        let mut errors = ValidationErrorSet::new();
        errors.insert("email", "Please enter a valid email address");
        let resp = respond_error(
            &TestRequest::default().to_http_request(),
            &AppError::ValidationFailed(errors),
        );

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Please enter a valid email address"));
    }
}
