//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the customer and authentication endpoints, the
//! health probes, the HAL-style response models and the HTTP Basic
//! security scheme. Swagger UI serves it in debug builds; the
//! `openapi-dump` binary prints it for external tooling.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    ConstraintViolation, Error, ErrorCode, PatchOperation, PatchOperationType, Rolle,
};
use crate::inbound::http::kunden::dto::{
    AdresseDto, EmbeddedKunden, KundeDto, KundeLinks, KundeModel, KundeUserDto, KundenModel,
    Link, UmsatzDto, UserDto,
};
use crate::inbound::http::login::LoginRequest;

/// Name of the security scheme referenced by protected operations.
pub const BASIC_AUTH_SCHEME: &str = "basic_auth";

/// Enrich the generated document with the HTTP Basic security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut basic = Http::new(HttpAuthScheme::Basic);
        basic.description = Some("User name and password of a stored login.".to_owned());
        components.add_security_scheme(BASIC_AUTH_SCHEME, SecurityScheme::Http(basic));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Kunde API",
        description = "Customer administration with HTTP Basic authentication and optimistic locking."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::kunden::find_by_id,
        crate::inbound::http::kunden::find,
        crate::inbound::http::kunden::find_nachnamen,
        crate::inbound::http::kunden::create,
        crate::inbound::http::kunden::update,
        crate::inbound::http::kunden::patch_kunde,
        crate::inbound::http::kunden::delete_by_id,
        crate::inbound::http::login::login,
        crate::inbound::http::login::rollen,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        KundeDto,
        AdresseDto,
        UmsatzDto,
        UserDto,
        KundeUserDto,
        KundeModel,
        KundenModel,
        EmbeddedKunden,
        KundeLinks,
        Link,
        LoginRequest,
        PatchOperation,
        PatchOperationType,
        Rolle,
        ConstraintViolation,
        Error,
        ErrorCode
    )),
    tags(
        (name = "kunden", description = "Customer lookup, search and maintenance"),
        (name = "auth", description = "Credential checks and roles"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
