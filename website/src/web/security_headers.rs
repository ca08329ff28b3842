use axum::{body::Body, extract::Request, http::header, middleware::Next, response::Response};

/// Headers applied to every control panel response
pub async fn add_security_headers(req: Request, next: Next) -> Response<Body> {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();

    headers.insert(
        header::HeaderName::from_static("x-frame-options"),
        header::HeaderValue::from_static("DENY"),
    );

    headers.insert(
        header::HeaderName::from_static("x-content-type-options"),
        header::HeaderValue::from_static("nosniff"),
    );

    headers.insert(
        header::REFERRER_POLICY,
        header::HeaderValue::from_static("no-referrer"),
    );

    // Pages list full tokens, keep them out of caches
    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("no-store"),
        );
    }

    // Inline styles only, no scripts at all
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        header::HeaderValue::from_static(
            "default-src 'none'; \
             style-src 'unsafe-inline'; \
             frame-ancestors 'none'; \
             base-uri 'none'; \
             form-action 'self'",
        ),
    );

    response
}
