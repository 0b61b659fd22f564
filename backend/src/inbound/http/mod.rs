//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod error;
pub mod health;
pub mod organisationen;
pub mod paging;
pub mod personen;
pub mod personenkontexte;
pub mod request_span;
pub mod rollen;
pub mod schulconnex;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

/// Register every resource handler under `/api`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use iam_backend::inbound::http::configure_api;
///
/// let app = App::new().configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(personen::create_person)
            .service(personen::list_persons)
            .service(personen::get_person)
            .service(personen::update_person)
            .service(personen::delete_person)
            .service(personen::get_person_assignments)
            .service(personen::replace_person_assignments)
            .service(organisationen::create_organisation)
            .service(organisationen::list_organisations)
            .service(organisationen::get_organisation)
            .service(organisationen::list_administered)
            .service(organisationen::rename_organisation)
            .service(rollen::create_role)
            .service(rollen::list_roles)
            .service(rollen::get_role)
            .service(personenkontexte::create_assignment)
            .service(personenkontexte::list_assignments)
            .service(personenkontexte::delete_assignment),
    );
}
