//! Organisation HTTP handlers.
//!
//! ```text
//! POST  /api/organisationen {"typ":"KLASSE","name":"5a","administriertVon":"..."}
//! GET   /api/organisationen?typ=SCHULE&searchString=Nord
//! GET   /api/organisationen/{id}
//! GET   /api/organisationen/{id}/administriert
//! PATCH /api/organisationen/{id}/name {"name":"5b","revision":1}
//! ```

use std::sync::LazyLock;

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    CreateOrganisationRequest, ListOrganisationsRequest, OrganisationFilter,
    RenameOrganisationRequest,
};
use crate::domain::{
    AttributeRule, Constraint, EntityKind, Organisation, OrganisationCriteria, OrganisationId,
    OrganisationKind, OrganisationSearch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::paging::{ListParams, paged_response};
use crate::inbound::http::schulconnex::SchulConnexError;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_optional_code, parse_optional_uuid, parse_uuid, validated,
};

const TEXT_LENGTH: Constraint = Constraint::Length { min: 1, max: 255 };

static CREATE_RULES: LazyLock<Vec<AttributeRule>> = LazyLock::new(|| {
    vec![
        AttributeRule::new("typ", Constraint::Required),
        AttributeRule::new("typ", Constraint::OneOf(&OrganisationKind::CODES)),
        AttributeRule::new("name", TEXT_LENGTH),
        AttributeRule::new("kennung", TEXT_LENGTH),
        AttributeRule::new("administriertVon", Constraint::Uuid),
        AttributeRule::new("zugehoerigZu", Constraint::Uuid),
    ]
});

static RENAME_RULES: LazyLock<Vec<AttributeRule>> = LazyLock::new(|| {
    vec![
        AttributeRule::new("name", Constraint::Required),
        AttributeRule::new("name", TEXT_LENGTH),
        AttributeRule::new("revision", Constraint::Required),
    ]
});

/// Body of `POST /api/organisationen`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganisationBody {
    #[schema(value_type = String, example = "SCHULE")]
    pub typ: OrganisationKind,
    pub name: Option<String>,
    pub kennung: Option<String>,
    #[schema(value_type = Option<String>)]
    pub administriert_von: Option<OrganisationId>,
    #[schema(value_type = Option<String>)]
    pub zugehoerig_zu: Option<OrganisationId>,
}

/// Body of `PATCH /api/organisationen/{id}/name`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RenameOrganisationBody {
    pub name: String,
    pub revision: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationResponse {
    pub id: String,
    pub administriert_von: Option<String>,
    pub zugehoerig_zu: Option<String>,
    pub kennung: Option<String>,
    pub name: Option<String>,
    #[schema(example = "SCHULE")]
    pub typ: String,
    pub revision: u32,
}

impl From<Organisation> for OrganisationResponse {
    fn from(value: Organisation) -> Self {
        Self {
            id: value.id.to_string(),
            administriert_von: value.administered_by.map(|id| id.to_string()),
            zugehoerig_zu: value.belongs_to.map(|id| id.to_string()),
            kennung: value.identifier,
            name: value.name,
            typ: value.kind.to_string(),
            revision: value.revision,
        }
    }
}

/// Filters accepted by `GET /api/organisationen`.
///
/// `searchString` matches either the name or the identifier.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrganisationFilterParams {
    pub typ: Option<String>,
    pub administriert_von: Option<String>,
    pub zugehoerig_zu: Option<String>,
    pub kennung: Option<String>,
    pub name: Option<String>,
    pub search_string: Option<String>,
}

impl OrganisationFilterParams {
    fn into_filter(self) -> ApiResult<OrganisationFilter> {
        let entity = EntityKind::Organisation;
        Ok(OrganisationFilter {
            criteria: OrganisationCriteria {
                administered_by: parse_optional_uuid(
                    self.administriert_von.as_deref(),
                    entity,
                    "administriertVon",
                )?
                .map(OrganisationId::from_uuid),
                belongs_to: parse_optional_uuid(
                    self.zugehoerig_zu.as_deref(),
                    entity,
                    "zugehoerigZu",
                )?
                .map(OrganisationId::from_uuid),
                identifier: self.kennung,
                name: self.name,
                kind: parse_optional_code(self.typ.as_deref(), entity, "typ")?,
            },
            search: OrganisationSearch {
                term: self.search_string,
            },
        })
    }
}

fn organisation_id(raw: &str) -> ApiResult<OrganisationId> {
    parse_uuid(raw, EntityKind::Organisation, "organisationId").map(OrganisationId::from_uuid)
}

async fn list_with(
    state: &HttpState,
    filter: OrganisationFilter,
    params: &ListParams,
) -> ApiResult<HttpResponse> {
    let request = ListOrganisationsRequest::new(filter)
        .with_sort(params.sort(EntityKind::Organisation)?)
        .with_page(params.page(EntityKind::Organisation)?);
    let page = state.organisations.list_organisations(request).await?;
    Ok(paged_response(&page.map(OrganisationResponse::from)))
}

/// Create an organisation.
///
/// Classes must name an administering school and be uniquely named there.
#[utoipa::path(
    post,
    path = "/api/organisationen",
    request_body = CreateOrganisationBody,
    responses(
        (status = 201, description = "Organisation created", body = OrganisationResponse),
        (status = 400, description = "Invalid attribute or rule violated", body = SchulConnexError),
        (status = 404, description = "Referenced organisation unknown", body = SchulConnexError)
    ),
    tags = ["organisationen"],
    operation_id = "createOrganisation"
)]
#[post("/organisationen")]
pub async fn create_organisation(
    state: web::Data<HttpState>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let body: CreateOrganisationBody =
        validated(payload.into_inner(), &CREATE_RULES, EntityKind::Organisation)?;
    let organisation = state
        .organisation_commands
        .create_organisation(CreateOrganisationRequest {
            kind: body.typ,
            name: body.name,
            identifier: body.kennung,
            administered_by: body.administriert_von,
            belongs_to: body.zugehoerig_zu,
        })
        .await?;
    Ok(HttpResponse::Created().json(OrganisationResponse::from(organisation)))
}

#[utoipa::path(
    get,
    path = "/api/organisationen",
    params(OrganisationFilterParams, ListParams),
    responses(
        (status = 200, description = "Matching organisations", body = [OrganisationResponse]),
        (status = 400, description = "Invalid filter, paging or sort parameter", body = SchulConnexError)
    ),
    tags = ["organisationen"],
    operation_id = "listOrganisations"
)]
#[get("/organisationen")]
pub async fn list_organisations(
    state: web::Data<HttpState>,
    filter: web::Query<OrganisationFilterParams>,
    params: web::Query<ListParams>,
) -> ApiResult<HttpResponse> {
    list_with(&state, filter.into_inner().into_filter()?, &params).await
}

#[utoipa::path(
    get,
    path = "/api/organisationen/{id}",
    params(("id" = String, Path, description = "Organisation id")),
    responses(
        (status = 200, description = "Organisation", body = OrganisationResponse),
        (status = 404, description = "Unknown organisation", body = SchulConnexError)
    ),
    tags = ["organisationen"],
    operation_id = "getOrganisation"
)]
#[get("/organisationen/{id}")]
pub async fn get_organisation(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrganisationResponse>> {
    let id = organisation_id(&path)?;
    let organisation = state.organisations.get_organisation(&id).await?;
    Ok(web::Json(organisation.into()))
}

/// Organisations administered by `{id}`.
#[utoipa::path(
    get,
    path = "/api/organisationen/{id}/administriert",
    params(("id" = String, Path, description = "Administering organisation id"), ListParams),
    responses(
        (status = 200, description = "Administered organisations", body = [OrganisationResponse]),
        (status = 404, description = "Unknown organisation", body = SchulConnexError)
    ),
    tags = ["organisationen"],
    operation_id = "listAdministeredOrganisations"
)]
#[get("/organisationen/{id}/administriert")]
pub async fn list_administered(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    params: web::Query<ListParams>,
) -> ApiResult<HttpResponse> {
    let id = organisation_id(&path)?;
    state.organisations.get_organisation(&id).await?;
    let filter = OrganisationFilter {
        criteria: OrganisationCriteria {
            administered_by: Some(id),
            ..OrganisationCriteria::default()
        },
        search: OrganisationSearch::default(),
    };
    list_with(&state, filter, &params).await
}

/// Rename an organisation; the organisation rules run again.
#[utoipa::path(
    patch,
    path = "/api/organisationen/{id}/name",
    params(("id" = String, Path, description = "Organisation id")),
    request_body = RenameOrganisationBody,
    responses(
        (status = 200, description = "Organisation renamed", body = OrganisationResponse),
        (status = 400, description = "Invalid name or rule violated", body = SchulConnexError),
        (status = 404, description = "Unknown organisation", body = SchulConnexError),
        (status = 409, description = "Stale revision", body = SchulConnexError)
    ),
    tags = ["organisationen"],
    operation_id = "renameOrganisation"
)]
#[patch("/organisationen/{id}/name")]
pub async fn rename_organisation(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<OrganisationResponse>> {
    let id = organisation_id(&path)?;
    let body: RenameOrganisationBody =
        validated(payload.into_inner(), &RENAME_RULES, EntityKind::Organisation)?;
    let organisation = state
        .organisation_commands
        .rename_organisation(
            &id,
            RenameOrganisationRequest {
                name: body.name,
                revision: body.revision,
            },
        )
        .await?;
    Ok(web::Json(organisation.into()))
}
