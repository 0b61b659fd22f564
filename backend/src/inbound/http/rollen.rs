//! Role (Rolle) HTTP handlers.

use std::sync::LazyLock;

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{CreateRoleRequest, ListRolesRequest};
use crate::domain::{
    AttributeRule, Constraint, EntityKind, OrganisationId, Role, RoleCriteria, RoleId, RoleKind,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::paging::{ListParams, paged_response};
use crate::inbound::http::schulconnex::SchulConnexError;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_optional_code, parse_optional_uuid, parse_uuid, validated,
};

static CREATE_RULES: LazyLock<Vec<AttributeRule>> = LazyLock::new(|| {
    vec![
        AttributeRule::new("name", Constraint::Required),
        AttributeRule::new("name", Constraint::Length { min: 1, max: 200 }),
        AttributeRule::new("administeredBySchulstrukturknoten", Constraint::Required),
        AttributeRule::new("administeredBySchulstrukturknoten", Constraint::Uuid),
        AttributeRule::new("rollenart", Constraint::Required),
        AttributeRule::new("rollenart", Constraint::OneOf(&RoleKind::CODES)),
    ]
});

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleBody {
    #[schema(example = "Lehrkraft")]
    pub name: String,
    #[schema(value_type = String)]
    pub administered_by_schulstrukturknoten: OrganisationId,
    #[schema(value_type = String, example = "LEHR")]
    pub rollenart: RoleKind,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub administered_by_schulstrukturknoten: String,
    pub rollenart: String,
    pub revision: u32,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            administered_by_schulstrukturknoten: value.administered_by.to_string(),
            rollenart: value.kind.to_string(),
            revision: value.revision,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RoleFilterParams {
    pub name: Option<String>,
    pub administered_by_schulstrukturknoten: Option<String>,
    pub rollenart: Option<String>,
}

/// Create a role beneath an existing organisation.
#[utoipa::path(
    post,
    path = "/api/rolle",
    request_body = CreateRoleBody,
    responses(
        (status = 201, description = "Role created", body = RoleResponse),
        (status = 400, description = "Invalid attribute", body = SchulConnexError),
        (status = 404, description = "Administering organisation unknown", body = SchulConnexError)
    ),
    tags = ["rolle"],
    operation_id = "createRole"
)]
#[post("/rolle")]
pub async fn create_role(
    state: web::Data<HttpState>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let body: CreateRoleBody = validated(payload.into_inner(), &CREATE_RULES, EntityKind::Role)?;
    let role = state
        .role_commands
        .create_role(CreateRoleRequest {
            name: body.name,
            administered_by: body.administered_by_schulstrukturknoten,
            kind: body.rollenart,
        })
        .await?;
    Ok(HttpResponse::Created().json(RoleResponse::from(role)))
}

#[utoipa::path(
    get,
    path = "/api/rolle",
    params(RoleFilterParams, ListParams),
    responses(
        (status = 200, description = "Matching roles", body = [RoleResponse]),
        (status = 400, description = "Invalid filter, paging or sort parameter", body = SchulConnexError)
    ),
    tags = ["rolle"],
    operation_id = "listRoles"
)]
#[get("/rolle")]
pub async fn list_roles(
    state: web::Data<HttpState>,
    filter: web::Query<RoleFilterParams>,
    params: web::Query<ListParams>,
) -> ApiResult<HttpResponse> {
    let filter = filter.into_inner();
    let criteria = RoleCriteria {
        name: filter.name,
        administered_by: parse_optional_uuid(
            filter.administered_by_schulstrukturknoten.as_deref(),
            EntityKind::Role,
            "administeredBySchulstrukturknoten",
        )?
        .map(OrganisationId::from_uuid),
        kind: parse_optional_code(filter.rollenart.as_deref(), EntityKind::Role, "rollenart")?,
    };
    let request = ListRolesRequest::new(criteria)
        .with_sort(params.sort(EntityKind::Role)?)
        .with_page(params.page(EntityKind::Role)?);
    let page = state.roles.list_roles(request).await?;
    Ok(paged_response(&page.map(RoleResponse::from)))
}

#[utoipa::path(
    get,
    path = "/api/rolle/{id}",
    params(("id" = String, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role", body = RoleResponse),
        (status = 404, description = "Unknown role", body = SchulConnexError)
    ),
    tags = ["rolle"],
    operation_id = "getRole"
)]
#[get("/rolle/{id}")]
pub async fn get_role(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RoleResponse>> {
    let id = RoleId::from_uuid(parse_uuid(&path, EntityKind::Role, "rolleId")?);
    let role = state.roles.get_role(&id).await?;
    Ok(web::Json(role.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{memory_state, seed_role, seed_school, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::json;

    #[actix_web::test]
    async fn create_needs_an_existing_organisation() {
        let app = actix_test::init_service(test_app(memory_state())).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/rolle")
            .set_json(json!({
                "name": "Lehrkraft",
                "administeredBySchulstrukturknoten": OrganisationId::random().to_string(),
                "rollenart": "LEHR"
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: SchulConnexError = actix_test::read_body_json(response).await;
        assert!(body.description.contains("Organisation"), "{}", body.description);
    }

    #[actix_web::test]
    async fn created_role_can_be_fetched() {
        let state = memory_state();
        let school = seed_school(&state, "Gymnasium Nord").await;
        let app = actix_test::init_service(test_app(state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/rolle")
            .set_json(json!({
                "name": "Lehrkraft",
                "administeredBySchulstrukturknoten": school.id.to_string(),
                "rollenart": "LEHR"
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: RoleResponse = actix_test::read_body_json(response).await;

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/rolle/{}", created.id))
            .to_request();
        let fetched: RoleResponse =
            actix_test::read_body_json(actix_test::call_service(&app, request).await).await;
        assert_eq!(fetched.rollenart, "LEHR");
        assert_eq!(fetched.administered_by_schulstrukturknoten, school.id.to_string());
    }

    #[actix_web::test]
    async fn unknown_role_kind_is_invalid_value() {
        let app = actix_test::init_service(test_app(memory_state())).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/rolle")
            .set_json(json!({
                "name": "Hausmeister",
                "administeredBySchulstrukturknoten": OrganisationId::random().to_string(),
                "rollenart": "HAUS"
            }))
            .to_request();
        let body: SchulConnexError =
            actix_test::read_body_json(actix_test::call_service(&app, request).await).await;

        assert_eq!(body.subcode, "03");
        assert!(body.description.ends_with("rollenart"));
    }

    #[actix_web::test]
    async fn list_filters_by_kind() {
        let state = memory_state();
        let school = seed_school(&state, "Gymnasium Nord").await;
        seed_role(&state, &school, "Lehrkraft", RoleKind::Teacher).await;
        seed_role(&state, &school, "Schüler", RoleKind::Learner).await;
        let app = actix_test::init_service(test_app(state)).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/rolle?rollenart=LERN")
            .to_request();
        let body: Vec<RoleResponse> =
            actix_test::read_body_json(actix_test::call_service(&app, request).await).await;

        assert_eq!(body.len(), 1);
        assert_eq!(body[0].name, "Schüler");
    }
}
