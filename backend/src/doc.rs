//! OpenAPI documentation.
//!
//! [`ApiDoc`] collects every handler annotated with `#[utoipa::path]` and
//! the DTO schemas they reference. Swagger UI serves it in debug builds.

use utoipa::OpenApi;

use crate::inbound::http::organisationen::{
    CreateOrganisationBody, OrganisationResponse, RenameOrganisationBody,
};
use crate::inbound::http::personen::{
    CreatePersonBody, PersonAssignmentDto, PersonAssignmentsBody, PersonNameDto, PersonResponse,
    UpdatePersonBody,
};
use crate::inbound::http::personenkontexte::{AssignmentResponse, CreateAssignmentBody};
use crate::inbound::http::rollen::{CreateRoleBody, RoleResponse};
use crate::inbound::http::schulconnex::SchulConnexError;

/// OpenAPI document for the administration API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Identity administration API",
        description = "Persons, organisations, roles and role assignments. \
                       Errors use the SchulConnex error body."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::personen::create_person,
        crate::inbound::http::personen::list_persons,
        crate::inbound::http::personen::get_person,
        crate::inbound::http::personen::update_person,
        crate::inbound::http::personen::delete_person,
        crate::inbound::http::personen::get_person_assignments,
        crate::inbound::http::personen::replace_person_assignments,
        crate::inbound::http::organisationen::create_organisation,
        crate::inbound::http::organisationen::list_organisations,
        crate::inbound::http::organisationen::get_organisation,
        crate::inbound::http::organisationen::list_administered,
        crate::inbound::http::organisationen::rename_organisation,
        crate::inbound::http::rollen::create_role,
        crate::inbound::http::rollen::list_roles,
        crate::inbound::http::rollen::get_role,
        crate::inbound::http::personenkontexte::create_assignment,
        crate::inbound::http::personenkontexte::list_assignments,
        crate::inbound::http::personenkontexte::delete_assignment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        SchulConnexError,
        PersonNameDto,
        CreatePersonBody,
        UpdatePersonBody,
        PersonResponse,
        PersonAssignmentDto,
        PersonAssignmentsBody,
        CreateOrganisationBody,
        RenameOrganisationBody,
        OrganisationResponse,
        CreateRoleBody,
        RoleResponse,
        CreateAssignmentBody,
        AssignmentResponse,
    )),
    tags(
        (name = "personen", description = "Persons and their role assignments"),
        (name = "organisationen", description = "Schools, classes and other organisations"),
        (name = "rolle", description = "Roles"),
        (name = "personenkontexte", description = "Role assignments"),
        (name = "health", description = "Liveness and readiness checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    #[rstest]
    #[case("/api/personen")]
    #[case("/api/personen/{id}/personenkontexte")]
    #[case("/api/organisationen/{id}/name")]
    #[case("/api/rolle")]
    #[case("/api/personenkontexte/{id}")]
    #[case("/health/ready")]
    fn paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn error_schema_uses_schulconnex_keys() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;

        let Some(RefOr::T(Schema::Object(error))) = schemas.get("SchulConnexError") else {
            panic!("SchulConnexError schema missing");
        };
        for field in ["statusCode", "subcode", "title", "description"] {
            assert!(error.properties.contains_key(field), "missing {field}");
        }
    }
}
