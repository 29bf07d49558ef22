mod cors;

use std::sync::Arc;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use common::env_config::Config;
use db::{
    subscription::{PgSubscriptionStore, SubscriptionStore},
    usage::{PgUsageStore, UsageStore},
};
use limiter::usage::DailyUsageLimiter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();
    let origin = config.cors_allowed_origin.clone();

    // init logger
    let level = if config.is_production() {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Debug
    };
    logger::setup(level).expect("Failed to set up logger");

    // init db connection
    let pool = db::setup(&config.database_url, config.is_production())
        .await
        .expect("Failed to set up database");

    if config.razorpay.is_none() {
        log::warn!("RAZORPAY_KEY_ID/RAZORPAY_KEY_SECRET not set, payment routes will fail");
    }
    if config.analysis_service_url.is_none() {
        log::warn!("ANALYSIS_SERVICE_URL not set, analysis submissions will fail");
    }

    // stores and shared clients
    let usage_store: Arc<dyn UsageStore> = Arc::new(PgUsageStore::new(pool.clone()));
    let subscription_store: Arc<dyn SubscriptionStore> =
        Arc::new(PgSubscriptionStore::new(pool.clone()));
    let usage_limiter = Arc::new(DailyUsageLimiter::new(usage_store, config.daily_usage_limit));
    let http = reqwest::Client::new();

    log::info!(
        "Starting server on {}:{} (daily limit {})",
        config.server_host,
        config.server_port,
        usage_limiter.limit()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .app_data(web::Data::new(subscription_store.clone()))
            .app_data(web::Data::new(usage_limiter.clone()))
            .app_data(web::Data::new(http.clone()))
            .wrap(logger::middleware(config_data.console_logging_enabled)) // 3rd
            .wrap(extractor::middleware(config_data.jwt_config.clone())) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .service(
                web::scope("/api").service(
                    web::scope("/dashboard")
                        .wrap(api_auth::auth_middleware())
                        .service(api_auth::mount_profile())
                        .service(limiter::mount_usage())
                        .service(api_subs::mount_pay())
                        .service(api_subs::mount_subs())
                        .service(analysis::mount_analysis()),
                ),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
