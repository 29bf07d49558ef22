use actix_web::web::{self};

pub mod routes {
    pub mod pay;
    pub mod sub;
}

pub mod services {
    pub mod gateway;
    pub mod pay;
    pub mod sub;
}

pub mod dtos {
    pub mod pay;
    pub mod sub;
}

pub fn mount_subs() -> actix_web::Scope {
    web::scope("/sub").service(routes::sub::get_current)
}

pub fn mount_pay() -> actix_web::Scope {
    web::scope("/pay")
        .service(routes::pay::post_create_order)
        .service(routes::pay::post_verify)
}
