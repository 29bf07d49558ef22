use actix_web::web;
use middleware::auth::AuthMiddleware;

pub mod middleware {
    pub mod auth;
}

pub mod routes {
    pub mod profile;
}

mod services {
    pub(crate) mod profile;
}

pub fn mount_profile() -> actix_web::Scope {
    web::scope("/profile")
        .service(routes::profile::get_profile)
        .service(routes::profile::put_profile)
}

// Auth middleware
pub fn auth_middleware() -> AuthMiddleware {
    AuthMiddleware::new()
}
