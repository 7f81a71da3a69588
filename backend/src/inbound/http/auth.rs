//! HTTP Basic authentication for handlers.
//!
//! [`CurrentUser`] decodes the `Authorization` header, checks the
//! credentials through the [`crate::domain::ports::LoginService`] port and
//! hands the principal to the handler. Role checks stay in the handlers via
//! [`CurrentUser::require_any_role`].

use std::ops::Deref;

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use futures_util::future::LocalBoxFuture;
use serde_json::json;
use tracing::debug;

use crate::domain::{AuthenticatedUser, Error, LoginCredentials, Rolle};
use crate::inbound::http::state::HttpState;

const BASIC_PREFIX: &str = "Basic ";

/// Authenticated caller of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(AuthenticatedUser);

impl CurrentUser {
    pub fn into_inner(self) -> AuthenticatedUser {
        self.0
    }

    /// Fail with `403 Forbidden` unless the caller has one of `rollen`.
    pub fn require_any_role(&self, rollen: &[Rolle]) -> Result<(), Error> {
        if self.0.has_any_role(rollen) {
            return Ok(());
        }
        debug!(username = self.0.username(), required = ?rollen, "role check failed");
        Err(Error::forbidden("Zugriff verweigert").with_details(json!({
            "code": "access_forbidden",
            "rollen": self.0.rollen(),
        })))
    }
}

impl Deref for CurrentUser {
    type Target = AuthenticatedUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Decode `Basic <base64(user:password)>` into credentials.
///
/// Every malformed header is reported as `401 Unauthorized`.
pub fn decode_basic(value: &str) -> Result<LoginCredentials, Error> {
    let invalid = || Error::unauthorized("Ungueltige Anmeldedaten");

    let encoded = value.strip_prefix(BASIC_PREFIX).ok_or_else(invalid)?;
    let decoded = BASE64_STANDARD
        .decode(encoded.trim())
        .map_err(|_| invalid())?;
    let decoded = String::from_utf8(decoded).map_err(|_| invalid())?;
    let (username, password) = decoded.split_once(':').ok_or_else(invalid)?;
    LoginCredentials::try_from_parts(username, password).map_err(|_| invalid())
}

async fn authenticate_request(
    state: Option<web::Data<HttpState>>,
    authorization: Option<String>,
) -> Result<CurrentUser, Error> {
    let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let authorization =
        authorization.ok_or_else(|| Error::unauthorized("Authentifizierung erforderlich"))?;
    let credentials = decode_basic(&authorization)?;
    state
        .login
        .authenticate(&credentials)
        .await
        .map(CurrentUser)
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        Box::pin(authenticate_request(state, authorization))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{MockKundeCommand, MockKundeQuery, MockLoginService};
    use crate::inbound::http::error::BASIC_CHALLENGE;
    use crate::inbound::http::test_utils::basic_auth;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use actix_web::{App, HttpResponse};
    use rstest::rstest;

    fn state_with(login: MockLoginService) -> HttpState {
        HttpState::new(
            Arc::new(MockKundeQuery::new()),
            Arc::new(MockKundeCommand::new()),
            Arc::new(login),
        )
    }

    fn accepting_login() -> MockLoginService {
        let mut login = MockLoginService::new();
        login
            .expect_authenticate()
            .withf(|creds| creds.username() == "admin" && creds.password() == "p:w")
            .returning(|creds| {
                Ok(AuthenticatedUser::new(
                    creds.username(),
                    vec![Rolle::Admin, Rolle::Kunde],
                ))
            });
        login
    }

    async fn whoami(user: CurrentUser) -> Result<HttpResponse, Error> {
        user.require_any_role(&[Rolle::Admin])?;
        Ok(HttpResponse::Ok().body(user.username().to_owned()))
    }

    #[rstest]
    fn decodes_passwords_containing_colons() {
        let header = basic_auth("admin", "p:w");
        let creds = decode_basic(&header).expect("valid header");
        assert_eq!(creds.username(), "admin");
        assert_eq!(creds.password(), "p:w");
    }

    #[rstest]
    #[case::bearer("Bearer abc")]
    #[case::not_base64("Basic !!!")]
    #[case::no_colon("Basic YWRtaW4=")]
    #[case::blank_user("Basic OnB3")]
    fn malformed_headers_are_unauthorized(#[case] header: &str) {
        let err = decode_basic(header).expect_err("malformed header");
        assert_eq!(err.code(), crate::domain::ErrorCode::Unauthorized);
    }

    #[actix_web::test]
    async fn valid_credentials_reach_the_handler() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state_with(accepting_login())))
                .route("/", web::get().to(whoami)),
        )
        .await;
        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header((header::AUTHORIZATION, basic_auth("admin", "p:w")))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(res).await, "admin");
    }

    #[actix_web::test]
    async fn missing_header_challenges_the_client() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state_with(MockLoginService::new())))
                .route("/", web::get().to(whoami)),
        )
        .await;
        let req = actix_test::TestRequest::get().uri("/").to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            res.headers().get(header::WWW_AUTHENTICATE).expect("challenge"),
            BASIC_CHALLENGE
        );
    }

    #[actix_web::test]
    async fn missing_role_is_forbidden() {
        let mut login = MockLoginService::new();
        login
            .expect_authenticate()
            .returning(|creds| Ok(AuthenticatedUser::new(creds.username(), vec![Rolle::Kunde])));
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state_with(login)))
                .route("/", web::get().to(whoami)),
        )
        .await;
        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header((header::AUTHORIZATION, basic_auth("alpha", "Pass1234!")))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["rollen"], json!(["KUNDE"]));
    }
}
