//! Authentication endpoints below `/auth`.
//!
//! ```text
//! POST /auth/login {"username":"admin","password":"p"} -> ["ADMIN","KUNDE"]
//! GET /auth/rollen -> ["KUNDE"]
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::domain::{Error, LoginCredentials, LoginValidationError, Rolle};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentUser;
use crate::inbound::http::state::HttpState;

/// Login request body.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Check credentials and return the caller's roles.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Roles of the user", body = [Rolle]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<Vec<Rolle>>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    debug!(username = credentials.username(), "login");
    let user = state.login.authenticate(&credentials).await?;
    Ok(web::Json(user.rollen().to_vec()))
}

/// Roles of the authenticated caller.
#[utoipa::path(
    get,
    path = "/auth/rollen",
    responses(
        (status = 200, description = "Roles of the caller", body = [Rolle]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["auth"],
    operation_id = "rollen",
    security(("basic_auth" = []))
)]
#[get("/rollen")]
pub async fn rollen(user: CurrentUser) -> ApiResult<web::Json<Vec<Rolle>>> {
    user.require_any_role(&[Rolle::Kunde])?;
    Ok(web::Json(user.rollen().to_vec()))
}

/// Register the authentication endpoints under `/auth`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/auth").service(login).service(rollen));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{TestContext, basic_auth};
    use actix_web::http::{StatusCode, header};
    use actix_web::test;
    use rstest::rstest;
    use serde_json::Value;

    #[actix_web::test]
    async fn login_returns_the_roles() {
        let ctx = TestContext::new();
        let app = test::init_service(ctx.app()).await;
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"username": "ADMIN", "password": TestContext::ADMIN_PASSWORD}))
            .to_request();

        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Vec<Rolle> = test::read_body_json(res).await;
        assert_eq!(body, vec![Rolle::Admin, Rolle::Kunde, Rolle::Actuator]);
    }

    #[rstest]
    #[case::wrong_password("admin", "falsch", StatusCode::UNAUTHORIZED)]
    #[case::unknown_user("niemand", "Pass1234!", StatusCode::UNAUTHORIZED)]
    #[case::blank_user("  ", "Pass1234!", StatusCode::BAD_REQUEST)]
    #[actix_web::test]
    async fn rejected_logins(
        #[case] username: &str,
        #[case] password: &str,
        #[case] status: StatusCode,
    ) {
        let ctx = TestContext::new();
        let app = test::init_service(ctx.app()).await;
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"username": username, "password": password}))
            .to_request();

        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), status);
        let body: Value = test::read_body_json(res).await;
        assert!(body.get("message").is_some());
    }

    #[actix_web::test]
    async fn rollen_lists_the_callers_roles() {
        let ctx = TestContext::new();
        let app = test::init_service(ctx.app()).await;
        let req = test::TestRequest::get()
            .uri("/auth/rollen")
            .insert_header((
                header::AUTHORIZATION,
                basic_auth(TestContext::ADMIN_USERNAME, TestContext::ADMIN_PASSWORD),
            ))
            .to_request();

        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Vec<Rolle> = test::read_body_json(res).await;
        assert!(body.contains(&Rolle::Kunde));
    }
}
