//! Customer REST endpoints below `/rest`.
//!
//! ```text
//! GET    /rest/{id}               ADMIN or KUNDE, ETag / If-None-Match
//! GET    /rest?nachname=a&plz=7   ADMIN
//! GET    /rest/nachname/{prefix}  KUNDE
//! POST   /rest                    open registration
//! PUT    /rest/{id}               ADMIN, If-Match
//! PATCH  /rest/{id}               ADMIN, If-Match
//! DELETE /rest/{id}               ADMIN
//! ```

pub mod dto;

use std::borrow::Cow;

use actix_web::http::header::{self, HeaderName};
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    Error, KundeId, NewLogin, PatchOperation, Rolle, Suchkriterien, etag, parse_version,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentUser;
use crate::inbound::http::state::HttpState;

pub use self::dto::{
    AdresseDto, EmbeddedKunden, KundeDto, KundeLinks, KundeModel, KundeUserDto, KundenModel, Link,
    UmsatzDto, UserDto,
};

/// Path of the customer scope.
pub const REST_PATH: &str = "/rest";

/// Absolute URI of the customer collection as seen by the client.
fn rest_base_uri(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}{REST_PATH}", info.scheme(), info.host())
}

/// Header value as text; bytes that are not UTF-8 are replaced so a garbled
/// header still counts as present.
fn header_str(req: &HttpRequest, name: HeaderName) -> Option<Cow<'_, str>> {
    req.headers()
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
}

/// Load one customer.
///
/// Customers may read their own record; other records need the admin role.
#[utoipa::path(
    get,
    path = "/rest/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer id"),
        ("If-None-Match" = Option<String>, Header, description = "Last seen ETag")
    ),
    responses(
        (status = 200, description = "Customer", body = KundeModel,
            headers(("ETag" = String, description = "Quoted version"))),
        (status = 304, description = "Not modified"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["kunden"],
    operation_id = "findKundeById",
    security(("basic_auth" = []))
)]
#[get("/{id}")]
pub async fn find_by_id(
    state: web::Data<HttpState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    user.require_any_role(&[Rolle::Admin, Rolle::Kunde])?;
    let id = KundeId::from(path.into_inner());
    debug!(%id, username = user.username(), "find_by_id");

    let kunde = state.kunden.find_by_id(&id, &user).await?;
    let current = etag(kunde.version);
    if header_str(&req, header::IF_NONE_MATCH).as_deref() == Some(current.as_str()) {
        return Ok(HttpResponse::NotModified()
            .insert_header((header::ETAG, current))
            .finish());
    }

    Ok(HttpResponse::Ok()
        .insert_header((header::ETAG, current))
        .json(KundeModel::new(&kunde, &rest_base_uri(&req))))
}

/// Search customers by query parameters. Without parameters every customer
/// is listed.
#[utoipa::path(
    get,
    path = "/rest",
    params(
        ("nachname" = Option<String>, Query, description = "Part of the surname"),
        ("email" = Option<String>, Query, description = "Part of the email address"),
        ("kategorie" = Option<i32>, Query, description = "Exact category"),
        ("plz" = Option<String>, Query, description = "Postal code prefix"),
        ("ort" = Option<String>, Query, description = "Part of the city, case-insensitive"),
        ("geschlecht" = Option<String>, Query, description = "Gender code"),
        ("familienstand" = Option<String>, Query, description = "Marital status code"),
        ("interesse" = Option<Vec<String>>, Query, description = "Interest codes, repeatable"),
        ("newsletter" = Option<bool>, Query, description = "Newsletter flag")
    ),
    responses(
        (status = 200, description = "Matching customers", body = KundenModel),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No match", body = Error)
    ),
    tags = ["kunden"],
    operation_id = "findKunden",
    security(("basic_auth" = []))
)]
#[get("")]
pub async fn find(
    state: web::Data<HttpState>,
    user: CurrentUser,
    query: web::Query<Vec<(String, String)>>,
    req: HttpRequest,
) -> ApiResult<web::Json<KundenModel>> {
    user.require_any_role(&[Rolle::Admin])?;
    let kriterien = Suchkriterien::from_pairs(query.into_inner());
    debug!(?kriterien, "find");

    let kunden = state.kunden.find(&kriterien).await?;
    let base_uri = rest_base_uri(&req);
    let kunden = kunden
        .iter()
        .map(|kunde| KundeModel::new(kunde, &base_uri))
        .collect();
    Ok(web::Json(KundenModel {
        embedded: EmbeddedKunden { kunden },
    }))
}

/// Distinct surnames starting with the prefix.
#[utoipa::path(
    get,
    path = "/rest/nachname/{prefix}",
    params(("prefix" = String, Path, description = "Surname prefix")),
    responses(
        (status = 200, description = "Surnames", body = [String]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No match", body = Error)
    ),
    tags = ["kunden"],
    operation_id = "findNachnamen",
    security(("basic_auth" = []))
)]
#[get("/nachname/{prefix}")]
pub async fn find_nachnamen(
    state: web::Data<HttpState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<String>>> {
    user.require_any_role(&[Rolle::Kunde])?;
    let prefix = path.into_inner();
    debug!(%prefix, "find_nachnamen");
    let nachnamen = state.kunden.find_nachnamen_by_prefix(&prefix).await?;
    Ok(web::Json(nachnamen))
}

/// Register a customer together with its login.
#[utoipa::path(
    post,
    path = "/rest",
    request_body = KundeUserDto,
    responses(
        (status = 201, description = "Created",
            headers(("Location" = String, description = "URI of the new customer"))),
        (status = 400, description = "Customer or user missing", body = Error),
        (status = 422, description = "Invalid values, email or username taken", body = Error)
    ),
    tags = ["kunden"],
    operation_id = "createKunde",
    security([])
)]
#[post("")]
pub async fn create(
    state: web::Data<HttpState>,
    payload: web::Json<KundeUserDto>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let KundeUserDto { kunde, user } = payload.into_inner();
    let Some(kunde) = kunde else {
        return Err(missing_part("kunde"));
    };
    let Some(user) = user else {
        return Err(missing_part("user"));
    };
    debug!(nachname = %kunde.nachname, username = %user.username, "create");

    let login = NewLogin::kunde(user.username.clone(), user.password);
    let created = state
        .kunden_command
        .create(kunde.into_kunde(Some(user.username)), login)
        .await?;
    let id = created
        .id
        .ok_or_else(|| Error::internal("stored customer has no id"))?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("{}/{id}", rest_base_uri(&req))))
        .finish())
}

fn missing_part(field: &str) -> Error {
    Error::invalid_request(format!("{field} fehlt im Request-Body"))
        .with_details(json!({ "field": field, "code": "missing_field" }))
}

/// Replace the scalar fields of a customer.
#[utoipa::path(
    put,
    path = "/rest/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer id"),
        ("If-Match" = String, Header, description = "Quoted version, e.g. \"0\"")
    ),
    request_body = KundeDto,
    responses(
        (status = 204, description = "Updated",
            headers(("ETag" = String, description = "New quoted version"))),
        (status = 400, description = "Malformed body", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 412, description = "Outdated or malformed version", body = Error),
        (status = 422, description = "Invalid values or email taken", body = Error),
        (status = 428, description = "Version missing", body = Error)
    ),
    tags = ["kunden"],
    operation_id = "updateKunde",
    security(("basic_auth" = []))
)]
#[put("/{id}")]
pub async fn update(
    state: web::Data<HttpState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    payload: web::Json<KundeDto>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    user.require_any_role(&[Rolle::Admin])?;
    let id = KundeId::from(path.into_inner());
    let version = parse_version(header_str(&req, header::IF_MATCH).as_deref())?;
    debug!(%id, version, "update");

    let updated = state
        .kunden_command
        .update(payload.into_inner().into_kunde(None), &id, version)
        .await?;
    Ok(HttpResponse::NoContent()
        .insert_header((header::ETAG, etag(updated.version)))
        .finish())
}

/// Apply patch operations to a customer.
#[utoipa::path(
    patch,
    path = "/rest/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer id"),
        ("If-Match" = String, Header, description = "Quoted version, e.g. \"0\"")
    ),
    request_body = Vec<PatchOperation>,
    responses(
        (status = 204, description = "Updated",
            headers(("ETag" = String, description = "New quoted version"))),
        (status = 400, description = "Malformed body", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 412, description = "Outdated or malformed version", body = Error),
        (status = 422, description = "Invalid patch or values", body = Error),
        (status = 428, description = "Version missing", body = Error)
    ),
    tags = ["kunden"],
    operation_id = "patchKunde",
    security(("basic_auth" = []))
)]
#[patch("/{id}")]
pub async fn patch_kunde(
    state: web::Data<HttpState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    payload: web::Json<Vec<PatchOperation>>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    user.require_any_role(&[Rolle::Admin])?;
    let id = KundeId::from(path.into_inner());
    let version = parse_version(header_str(&req, header::IF_MATCH).as_deref())?;
    let operations = payload.into_inner();
    debug!(%id, version, ?operations, "patch");

    let patched = state
        .kunden_command
        .patch(&id, version, operations, &user)
        .await?;
    Ok(HttpResponse::NoContent()
        .insert_header((header::ETAG, etag(patched.version)))
        .finish())
}

/// Delete a customer. Unknown ids succeed as well.
#[utoipa::path(
    delete,
    path = "/rest/{id}",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["kunden"],
    operation_id = "deleteKunde",
    security(("basic_auth" = []))
)]
#[delete("/{id}")]
pub async fn delete_by_id(
    state: web::Data<HttpState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    user.require_any_role(&[Rolle::Admin])?;
    let id = KundeId::from(path.into_inner());
    debug!(%id, "delete_by_id");
    state.kunden_command.delete_by_id(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the customer endpoints under [`REST_PATH`].
///
/// The collection routes come first so `/rest/nachname/{prefix}` is not
/// shadowed by `/rest/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(REST_PATH)
            .service(find)
            .service(create)
            .service(find_nachnamen)
            .service(find_by_id)
            .service(update)
            .service(patch_kunde)
            .service(delete_by_id),
    );
}

#[cfg(test)]
mod tests;
