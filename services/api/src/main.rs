use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use tracing_subscriber::EnvFilter;

use api::routes;
use api::state::{AppState, Settings};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let s = Settings::from_env();
    let db = db::connect(&s.database_url, 10).await.expect("db");
    db::migrate(&db).await.expect("migrations");

    let state = AppState {
        db: db.clone(),
        keys: auth::SessionKeys::from_secret(&s.jwt_secret),
        access_ttl: s.access_ttl_seconds.unwrap_or(900),
        refresh_ttl: s.refresh_ttl_seconds.unwrap_or(60 * 60 * 24 * 7),
        cookie_domain: s.cookie_domain.clone().unwrap_or_else(|| "localhost".into()),
        cookie_secure: s.cookie_secure.unwrap_or(false),
        slot_blocking: s.slot_blocking(),
    };

    let governor_conf = GovernorConfigBuilder::default()
        .burst_size(10)
        .finish()
        .unwrap();

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_header()
            .allow_any_method();
        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .wrap(Governor::new(&governor_conf))
            .app_data(web::Data::new(state.clone()))
            .service(routes::auth::register)
            .service(routes::auth::login)
            .service(routes::auth::refresh)
            .service(routes::auth::logout)
            .service(routes::auth::me)
            .service(routes::appointments::create)
            .service(routes::appointments::list)
            .service(routes::appointments::update_status)
            .service(routes::doctors::search)
            .service(routes::doctors::get_doctor)
            .service(routes::doctors::get_patient)
            .service(routes::profile::get_profile)
            .service(routes::profile::update_profile)
            .default_service(web::to(|| async { HttpResponse::NotFound().finish() }))
    })
    .bind(("0.0.0.0", 8080))?
    .run()
    .await;

    db::close(&db).await;
    server
}
