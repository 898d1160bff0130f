pub mod error;
pub mod extractors;
pub mod routes;
pub mod schemas;
pub mod state;

use actix_web::{web, App};

pub fn create_app(
    state: state::AppState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
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
}
