use actix_web::HttpRequest;

/// Client identity used for rate limiting.
///
/// The first `X-Forwarded-For` hop is only honoured when the service sits
/// behind a proxy that sets it (`trust_forwarded_for`); otherwise the header
/// is attacker controlled and the peer address is used.
pub fn get_client_ip(req: &HttpRequest, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn forwarded_header_ignored_unless_trusted() {
        let req = TestRequest::default()
            .peer_addr("192.0.2.10:5000".parse().unwrap())
            .insert_header(("X-Forwarded-For", "203.0.113.7, 10.0.0.1"))
            .to_http_request();

        assert_eq!(get_client_ip(&req, false), "192.0.2.10");
        assert_eq!(get_client_ip(&req, true), "203.0.113.7");
    }

    #[test]
    fn blank_forwarded_header_falls_back_to_peer() {
        let req = TestRequest::default()
            .peer_addr("192.0.2.10:5000".parse().unwrap())
            .insert_header(("X-Forwarded-For", " "))
            .to_http_request();

        assert_eq!(get_client_ip(&req, true), "192.0.2.10");
    }

    #[test]
    fn missing_peer_is_unknown() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(get_client_ip(&req, false), "unknown");
    }
}
