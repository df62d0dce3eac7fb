use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{web, App, HttpServer};
use league_admin::config::config::Config;
use league_admin::repository::database::Database;
use league_admin::util::real_ip_key_extractor::RealIpKeyExtractor;
use league_admin::{configure, not_found, AppState};
use log::info;
use std::io;

fn startup_error<E: std::fmt::Display>(context: &str) -> impl FnOnce(E) -> io::Error + '_ {
    move |e| io::Error::new(io::ErrorKind::Other, format!("{context}: {e}"))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = Config::init().map_err(startup_error("Invalid configuration"))?;
    log4rs::init_file(&config.log_config, Default::default())
        .map_err(startup_error("Could not load the log configuration"))?;

    let db = Database::new(&config).map_err(startup_error("Could not create the database pool"))?;

    let governor_conf = config
        .rate_limit_replenish_ms()
        .and_then(|replenish_ms| {
            GovernorConfigBuilder::default()
                .per_millisecond(replenish_ms)
                .burst_size(config.rate_limit_burst)
                .key_extractor(RealIpKeyExtractor)
                .finish()
        })
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "RATE_LIMIT_PER_SECOND and RATE_LIMIT_BURST must be greater than zero",
            )
        })?;

    let bind_addr = (config.server_host.clone(), config.port);
    info!("Starting league admin API on {}:{}", bind_addr.0, bind_addr.1);

    let app_data = web::Data::new(AppState { db, config });

    HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .configure(configure)
            .default_service(web::route().to(not_found))
            .wrap(actix_web::middleware::Logger::default())
            .wrap(Governor::new(&governor_conf))
    })
    .bind(bind_addr)?
    .run()
    .await
}
