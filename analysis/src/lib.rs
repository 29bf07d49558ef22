use actix_web::web;

pub mod routes {
    pub mod analysis;
}

pub mod services {
    pub mod client;
    pub mod upload;
}

/// Analysis submission. Mount behind auth; the daily limit is charged per accepted upload.
pub fn mount_analysis() -> actix_web::Scope {
    web::scope("/analysis").service(routes::analysis::post_analysis)
}
