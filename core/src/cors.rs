use actix_cors::Cors;
use actix_web::http::header::{self, HeaderName};

/// Bearer tokens only, so no credentials or cookies cross origins.
pub fn middleware(origin: &str) -> Cors {
    Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
        .allowed_origin(origin)
        .max_age(3600)
}
