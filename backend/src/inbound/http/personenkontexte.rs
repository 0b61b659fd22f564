//! Role assignment (Personenkontext) HTTP handlers.
//!
//! ```text
//! POST   /api/personenkontexte {"personId":"...","organisationId":"...","rolleId":"..."}
//! GET    /api/personenkontexte?personId=...
//! DELETE /api/personenkontexte/{id}
//! ```

use std::sync::LazyLock;

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{CreateRoleAssignmentRequest, ListRoleAssignmentsRequest};
use crate::domain::{
    AttributeRule, Constraint, EntityKind, OrganisationId, PersonId, RoleAssignment,
    RoleAssignmentCriteria, RoleAssignmentId, RoleId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::paging::{ListParams, paged_response};
use crate::inbound::http::schulconnex::SchulConnexError;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_optional_uuid, parse_uuid, validated};

static CREATE_RULES: LazyLock<Vec<AttributeRule>> = LazyLock::new(|| {
    ["personId", "organisationId", "rolleId"]
        .into_iter()
        .flat_map(|field| {
            [
                AttributeRule::new(field, Constraint::Required),
                AttributeRule::new(field, Constraint::Uuid),
            ]
        })
        .collect()
});

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentBody {
    #[schema(value_type = String)]
    pub person_id: PersonId,
    #[schema(value_type = String)]
    pub organisation_id: OrganisationId,
    #[schema(value_type = String)]
    pub rolle_id: RoleId,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub id: String,
    pub person_id: String,
    pub organisation_id: String,
    pub rolle_id: String,
    pub revision: u32,
    pub created_at: String,
}

impl From<RoleAssignment> for AssignmentResponse {
    fn from(value: RoleAssignment) -> Self {
        Self {
            id: value.id.to_string(),
            person_id: value.person_id.to_string(),
            organisation_id: value.organisation_id.to_string(),
            rolle_id: value.role_id.to_string(),
            revision: value.revision,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AssignmentFilterParams {
    pub person_id: Option<String>,
    pub organisation_id: Option<String>,
    pub rolle_id: Option<String>,
}

impl AssignmentFilterParams {
    fn into_criteria(self) -> ApiResult<RoleAssignmentCriteria> {
        let entity = EntityKind::RoleAssignment;
        Ok(RoleAssignmentCriteria {
            person_id: parse_optional_uuid(self.person_id.as_deref(), entity, "personId")?
                .map(PersonId::from_uuid),
            organisation_id: parse_optional_uuid(
                self.organisation_id.as_deref(),
                entity,
                "organisationId",
            )?
            .map(OrganisationId::from_uuid),
            role_id: parse_optional_uuid(self.rolle_id.as_deref(), entity, "rolleId")?
                .map(RoleId::from_uuid),
        })
    }
}

/// Assign a role to a person at an organisation.
#[utoipa::path(
    post,
    path = "/api/personenkontexte",
    request_body = CreateAssignmentBody,
    responses(
        (status = 201, description = "Assignment created", body = AssignmentResponse),
        (status = 400, description = "Invalid attribute, duplicate or rule violated", body = SchulConnexError),
        (status = 404, description = "Person, organisation or role unknown", body = SchulConnexError)
    ),
    tags = ["personenkontexte"],
    operation_id = "createAssignment"
)]
#[post("/personenkontexte")]
pub async fn create_assignment(
    state: web::Data<HttpState>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let body: CreateAssignmentBody = validated(
        payload.into_inner(),
        &CREATE_RULES,
        EntityKind::RoleAssignment,
    )?;
    let assignment = state
        .assignment_commands
        .create_assignment(CreateRoleAssignmentRequest {
            person_id: body.person_id,
            organisation_id: body.organisation_id,
            role_id: body.rolle_id,
        })
        .await?;
    Ok(HttpResponse::Created().json(AssignmentResponse::from(assignment)))
}

#[utoipa::path(
    get,
    path = "/api/personenkontexte",
    params(AssignmentFilterParams, ListParams),
    responses(
        (status = 200, description = "Matching assignments", body = [AssignmentResponse]),
        (status = 400, description = "Invalid filter, paging or sort parameter", body = SchulConnexError)
    ),
    tags = ["personenkontexte"],
    operation_id = "listAssignments"
)]
#[get("/personenkontexte")]
pub async fn list_assignments(
    state: web::Data<HttpState>,
    filter: web::Query<AssignmentFilterParams>,
    params: web::Query<ListParams>,
) -> ApiResult<HttpResponse> {
    let entity = EntityKind::RoleAssignment;
    let request = ListRoleAssignmentsRequest::new(filter.into_inner().into_criteria()?)
        .with_sort(params.sort(entity)?)
        .with_page(params.page(entity)?);
    let page = state.assignments.list_assignments(request).await?;
    Ok(paged_response(&page.map(AssignmentResponse::from)))
}

#[utoipa::path(
    delete,
    path = "/api/personenkontexte/{id}",
    params(("id" = String, Path, description = "Assignment id")),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 404, description = "Unknown assignment", body = SchulConnexError)
    ),
    tags = ["personenkontexte"],
    operation_id = "deleteAssignment"
)]
#[delete("/personenkontexte/{id}")]
pub async fn delete_assignment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = RoleAssignmentId::from_uuid(parse_uuid(
        &path,
        EntityKind::RoleAssignment,
        "personenkontextId",
    )?);
    state.assignment_commands.delete_assignment(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RoleKind;
    use crate::inbound::http::test_utils::{
        memory_state, seed_class, seed_person, seed_role, seed_school, test_app,
    };
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::json;

    fn body(person: PersonId, organisation: OrganisationId, role: RoleId) -> Value {
        json!({
            "personId": person.to_string(),
            "organisationId": organisation.to_string(),
            "rolleId": role.to_string(),
        })
    }

    #[actix_web::test]
    async fn class_assignment_needs_the_school_assignment_first() {
        let state = memory_state();
        let person = seed_person(&state, "Jane", "Doe").await;
        let school = seed_school(&state, "Gymnasium Nord").await;
        let class = seed_class(&state, &school, "5a").await;
        let learner = seed_role(&state, &school, "Schüler", RoleKind::Learner).await;
        let app = actix_test::init_service(test_app(state)).await;

        let post = |organisation: OrganisationId| {
            actix_test::TestRequest::post()
                .uri("/api/personenkontexte")
                .set_json(body(person.id, organisation, learner.id))
                .to_request()
        };

        let response = actix_test::call_service(&app, post(class.id)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = actix_test::call_service(&app, post(school.id)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = actix_test::call_service(&app, post(class.id)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn unknown_person_is_not_found() {
        let state = memory_state();
        let school = seed_school(&state, "Gymnasium Nord").await;
        let role = seed_role(&state, &school, "Lehrkraft", RoleKind::Teacher).await;
        let app = actix_test::init_service(test_app(state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/personenkontexte")
            .set_json(body(PersonId::random(), school.id, role.id))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn list_by_person_and_delete() {
        let state = memory_state();
        let person = seed_person(&state, "Jane", "Doe").await;
        let other = seed_person(&state, "Max", "Muster").await;
        let school = seed_school(&state, "Gymnasium Nord").await;
        let role = seed_role(&state, &school, "Lehrkraft", RoleKind::Teacher).await;
        for holder in [person.id, other.id] {
            state
                .assignment_commands
                .create_assignment(CreateRoleAssignmentRequest {
                    person_id: holder,
                    organisation_id: school.id,
                    role_id: role.id,
                })
                .await
                .expect("seed assignment");
        }
        let app = actix_test::init_service(test_app(state)).await;

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/personenkontexte?personId={}", person.id))
            .to_request();
        let listed: Vec<AssignmentResponse> =
            actix_test::read_body_json(actix_test::call_service(&app, request).await).await;
        assert_eq!(listed.len(), 1);

        let uri = format!("/api/personenkontexte/{}", listed[0].id);
        let deleted = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete().uri(&uri).to_request(),
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let again = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete().uri(&uri).to_request(),
        )
        .await;
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn missing_reference_names_the_field() {
        let app = actix_test::init_service(test_app(memory_state())).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/personenkontexte")
            .set_json(json!({ "personId": PersonId::random().to_string() }))
            .to_request();
        let body: SchulConnexError =
            actix_test::read_body_json(actix_test::call_service(&app, request).await).await;

        assert_eq!(body.subcode, "02");
        assert!(body.description.ends_with("organisationId"));
    }
}
