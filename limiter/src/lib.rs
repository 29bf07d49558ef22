use actix_web::web;

pub mod usage;

pub mod routes {
    pub mod usage;
}

pub fn mount_usage() -> actix_web::Scope {
    web::scope("/usage").service(routes::usage::get_usage)
}
