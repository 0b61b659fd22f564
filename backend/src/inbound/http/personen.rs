//! Person (Personen) HTTP handlers.
//!
//! ```text
//! POST   /api/personen {"referrer":"jdoe","name":{"vorname":"Jane","familienname":"Doe"}}
//! GET    /api/personen?familienname=Doe&sort=vorname&offset=0&limit=20
//! GET    /api/personen/{id}
//! PUT    /api/personen/{id} {"name":{...},"revision":1}
//! DELETE /api/personen/{id}
//! GET    /api/personen/{id}/personenkontexte
//! PUT    /api/personen/{id}/personenkontexte {"count":1,"personenkontexte":[...]}
//! ```

use std::sync::LazyLock;

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{CreatePersonRequest, ListPersonsRequest, UpdatePersonRequest};
use crate::domain::{
    AssignmentTarget, AssignmentUpdate, AttributeRule, Constraint, EntityKind, OrganisationId,
    Person, PersonCriteria, PersonId, RoleAssignment, RoleId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::paging::{ListParams, paged_response};
use crate::inbound::http::schulconnex::SchulConnexError;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_uuid, validated};

const NAME_LENGTH: Constraint = Constraint::Length { min: 1, max: 64 };

fn name_rules(rules: &mut Vec<AttributeRule>) {
    rules.push(AttributeRule::new("name", Constraint::Required));
    for field in ["name.vorname", "name.familienname"] {
        rules.push(AttributeRule::new(field, Constraint::Required));
        rules.push(AttributeRule::new(field, NAME_LENGTH));
        rules.push(AttributeRule::new(field, Constraint::NameCharacters));
    }
}

static CREATE_RULES: LazyLock<Vec<AttributeRule>> = LazyLock::new(|| {
    let mut rules = vec![AttributeRule::new(
        "referrer",
        Constraint::Length { min: 1, max: 255 },
    )];
    name_rules(&mut rules);
    rules
});

static UPDATE_RULES: LazyLock<Vec<AttributeRule>> = LazyLock::new(|| {
    let mut rules = Vec::new();
    name_rules(&mut rules);
    rules.push(AttributeRule::new("revision", Constraint::Required));
    rules
});

static REPLACE_RULES: LazyLock<Vec<AttributeRule>> = LazyLock::new(|| {
    vec![
        AttributeRule::new("count", Constraint::Required),
        AttributeRule::new("personenkontexte", Constraint::Required),
    ]
});

/// Given and family name.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonNameDto {
    #[schema(example = "Jane")]
    pub vorname: String,
    #[schema(example = "Doe")]
    pub familienname: String,
}

/// Body of `POST /api/personen`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonBody {
    pub referrer: Option<String>,
    pub name: PersonNameDto,
}

/// Body of `PUT /api/personen/{id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonBody {
    pub name: PersonNameDto,
    pub revision: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonResponse {
    pub id: String,
    pub referrer: Option<String>,
    pub name: PersonNameDto,
    pub revision: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Person> for PersonResponse {
    fn from(value: Person) -> Self {
        Self {
            id: value.id.to_string(),
            referrer: value.referrer,
            name: PersonNameDto {
                vorname: value.given_name,
                familienname: value.family_name,
            },
            revision: value.revision,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Equality filters accepted by `GET /api/personen`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PersonFilterParams {
    pub referrer: Option<String>,
    pub vorname: Option<String>,
    pub familienname: Option<String>,
}

/// One organisation/role pair of a person.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonAssignmentDto {
    pub organisation_id: String,
    pub rolle_id: String,
}

/// Current assignments of a person, or the desired replacement set.
///
/// On replacement `count` is the number of assignments the client last saw.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonAssignmentsBody {
    pub count: u64,
    pub personenkontexte: Vec<PersonAssignmentDto>,
}

impl PersonAssignmentsBody {
    fn from_assignments(assignments: Vec<RoleAssignment>) -> Self {
        Self {
            count: u64::try_from(assignments.len()).unwrap_or(u64::MAX),
            personenkontexte: assignments
                .into_iter()
                .map(|assignment| PersonAssignmentDto {
                    organisation_id: assignment.organisation_id.to_string(),
                    rolle_id: assignment.role_id.to_string(),
                })
                .collect(),
        }
    }

    fn into_update(self, person_id: PersonId) -> ApiResult<AssignmentUpdate> {
        let targets = self
            .personenkontexte
            .iter()
            .enumerate()
            .map(|(position, dto)| {
                let organisation = parse_uuid(
                    &dto.organisation_id,
                    EntityKind::RoleAssignment,
                    &format!("personenkontexte[{position}].organisationId"),
                )?;
                let role = parse_uuid(
                    &dto.rolle_id,
                    EntityKind::RoleAssignment,
                    &format!("personenkontexte[{position}].rolleId"),
                )?;
                Ok(AssignmentTarget {
                    organisation_id: OrganisationId::from_uuid(organisation),
                    role_id: RoleId::from_uuid(role),
                })
            })
            .collect::<ApiResult<Vec<_>>>()?;
        Ok(AssignmentUpdate {
            person_id,
            expected_count: self.count,
            targets,
        })
    }
}

fn person_id(raw: &str) -> ApiResult<PersonId> {
    parse_uuid(raw, EntityKind::Person, "personId").map(PersonId::from_uuid)
}

/// Create a person.
#[utoipa::path(
    post,
    path = "/api/personen",
    request_body = CreatePersonBody,
    responses(
        (status = 201, description = "Person created", body = PersonResponse),
        (status = 400, description = "Invalid attribute or referrer taken", body = SchulConnexError),
        (status = 500, description = "Internal server error", body = SchulConnexError)
    ),
    tags = ["personen"],
    operation_id = "createPerson"
)]
#[post("/personen")]
pub async fn create_person(
    state: web::Data<HttpState>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let body: CreatePersonBody =
        validated(payload.into_inner(), &CREATE_RULES, EntityKind::Person)?;
    let person = state
        .person_commands
        .create_person(CreatePersonRequest {
            referrer: body.referrer,
            given_name: body.name.vorname,
            family_name: body.name.familienname,
        })
        .await?;
    Ok(HttpResponse::Created().json(PersonResponse::from(person)))
}

/// List persons matching the filters.
#[utoipa::path(
    get,
    path = "/api/personen",
    params(PersonFilterParams, ListParams),
    responses(
        (status = 200, description = "Matching persons", body = [PersonResponse]),
        (status = 400, description = "Invalid paging or sort parameter", body = SchulConnexError)
    ),
    tags = ["personen"],
    operation_id = "listPersons"
)]
#[get("/personen")]
pub async fn list_persons(
    state: web::Data<HttpState>,
    filter: web::Query<PersonFilterParams>,
    params: web::Query<ListParams>,
) -> ApiResult<HttpResponse> {
    let filter = filter.into_inner();
    let request = ListPersonsRequest::new(PersonCriteria {
        referrer: filter.referrer,
        given_name: filter.vorname,
        family_name: filter.familienname,
    })
    .with_sort(params.sort(EntityKind::Person)?)
    .with_page(params.page(EntityKind::Person)?);
    let page = state.persons.list_persons(request).await?;
    Ok(paged_response(&page.map(PersonResponse::from)))
}

#[utoipa::path(
    get,
    path = "/api/personen/{id}",
    params(("id" = String, Path, description = "Person id")),
    responses(
        (status = 200, description = "Person", body = PersonResponse),
        (status = 404, description = "Unknown person", body = SchulConnexError)
    ),
    tags = ["personen"],
    operation_id = "getPerson"
)]
#[get("/personen/{id}")]
pub async fn get_person(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PersonResponse>> {
    let id = person_id(&path)?;
    let person = state.persons.get_person(&id).await?;
    Ok(web::Json(person.into()))
}

/// Rename a person; `revision` must match the stored revision.
#[utoipa::path(
    put,
    path = "/api/personen/{id}",
    params(("id" = String, Path, description = "Person id")),
    request_body = UpdatePersonBody,
    responses(
        (status = 200, description = "Person updated", body = PersonResponse),
        (status = 404, description = "Unknown person", body = SchulConnexError),
        (status = 409, description = "Stale revision", body = SchulConnexError)
    ),
    tags = ["personen"],
    operation_id = "updatePerson"
)]
#[put("/personen/{id}")]
pub async fn update_person(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<PersonResponse>> {
    let id = person_id(&path)?;
    let body: UpdatePersonBody =
        validated(payload.into_inner(), &UPDATE_RULES, EntityKind::Person)?;
    let person = state
        .person_commands
        .update_person(
            &id,
            UpdatePersonRequest {
                given_name: body.name.vorname,
                family_name: body.name.familienname,
                revision: body.revision,
            },
        )
        .await?;
    Ok(web::Json(person.into()))
}

#[utoipa::path(
    delete,
    path = "/api/personen/{id}",
    params(("id" = String, Path, description = "Person id")),
    responses(
        (status = 204, description = "Person deleted"),
        (status = 404, description = "Unknown person", body = SchulConnexError)
    ),
    tags = ["personen"],
    operation_id = "deletePerson"
)]
#[delete("/personen/{id}")]
pub async fn delete_person(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = person_id(&path)?;
    state.person_commands.delete_person(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Current role assignments of a person.
#[utoipa::path(
    get,
    path = "/api/personen/{id}/personenkontexte",
    params(("id" = String, Path, description = "Person id")),
    responses(
        (status = 200, description = "Assignments", body = PersonAssignmentsBody),
        (status = 404, description = "Unknown person", body = SchulConnexError)
    ),
    tags = ["personen"],
    operation_id = "getPersonAssignments"
)]
#[get("/personen/{id}/personenkontexte")]
pub async fn get_person_assignments(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PersonAssignmentsBody>> {
    let id = person_id(&path)?;
    state.persons.get_person(&id).await?;
    let assignments = state.assignments.list_for_person(&id).await?;
    Ok(web::Json(PersonAssignmentsBody::from_assignments(assignments)))
}

/// Replace every role assignment of a person.
///
/// Rejected without any write when `count` no longer matches the stored
/// number of assignments or any new pair breaks an assignment rule.
#[utoipa::path(
    put,
    path = "/api/personen/{id}/personenkontexte",
    params(("id" = String, Path, description = "Person id")),
    request_body = PersonAssignmentsBody,
    responses(
        (status = 200, description = "Assignments replaced", body = PersonAssignmentsBody),
        (status = 400, description = "Rule violated or stale count", body = SchulConnexError),
        (status = 404, description = "Unknown person, organisation or role", body = SchulConnexError)
    ),
    tags = ["personen"],
    operation_id = "replacePersonAssignments"
)]
#[put("/personen/{id}/personenkontexte")]
pub async fn replace_person_assignments(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<PersonAssignmentsBody>> {
    let id = person_id(&path)?;
    let body: PersonAssignmentsBody = validated(
        payload.into_inner(),
        &REPLACE_RULES,
        EntityKind::RoleAssignment,
    )?;
    let assignments = state
        .assignment_commands
        .replace_for_person(body.into_update(id)?)
        .await?;
    Ok(web::Json(PersonAssignmentsBody::from_assignments(assignments)))
}
