use common::env_config::JwtConfig;
use middleware::extractor::ExtractionMiddleware;

pub mod middleware {
    pub mod extractor;
}

pub fn middleware(jwt_config: JwtConfig) -> ExtractionMiddleware {
    ExtractionMiddleware::new(jwt_config)
}
