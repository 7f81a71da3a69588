//! Handler tests against the real services on in-memory adapters.

use actix_web::http::{StatusCode, header};
use actix_web::{dev::ServiceResponse, test};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::error::BASIC_CHALLENGE;
use crate::inbound::http::test_utils::{TestContext, basic_auth};

fn admin() -> (header::HeaderName, String) {
    (
        header::AUTHORIZATION,
        basic_auth(TestContext::ADMIN_USERNAME, TestContext::ADMIN_PASSWORD),
    )
}

fn alpha() -> (header::HeaderName, String) {
    (
        header::AUTHORIZATION,
        basic_auth(TestContext::KUNDE_USERNAME, TestContext::KUNDE_PASSWORD),
    )
}

fn new_kunde_body(username: &str) -> Value {
    json!({
        "kunde": {
            "nachname": "Gamma",
            "email": "gamma@acme.de",
            "kategorie": 2,
            "hasNewsletter": true,
            "geburtsdatum": "1990-02-01",
            "geschlecht": "D",
            "adresse": {"plz": "99999", "ort": "Irgendwo"},
            "umsaetze": [{"betrag": "10.00", "waehrung": "EUR"}],
            "interessen": ["L"]
        },
        "user": {"username": username, "password": "Gamma123!"}
    })
}

fn error_code(body: &Value) -> Option<&str> {
    body["details"]["code"].as_str()
}

fn etag_of(res: &ServiceResponse) -> &str {
    res.headers()
        .get(header::ETAG)
        .expect("etag header")
        .to_str()
        .expect("ascii etag")
}

#[actix_web::test]
async fn admin_reads_a_customer_with_etag_and_self_link() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let req = test::TestRequest::get()
        .uri(&format!("/rest/{}", ctx.beta_id))
        .insert_header(admin())
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(etag_of(&res), "\"0\"");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["nachname"], json!("Beta"));
    assert_eq!(body["interessen"], json!(["S"]));
    let href = body["_links"]["self"]["href"].as_str().expect("self link");
    assert!(href.ends_with(&format!("/rest/{}", ctx.beta_id)), "{href}");
}

#[actix_web::test]
async fn matching_if_none_match_is_not_modified() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let req = test::TestRequest::get()
        .uri(&format!("/rest/{}", ctx.alpha_id))
        .insert_header(admin())
        .insert_header((header::IF_NONE_MATCH, "\"0\""))
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
    assert!(test::read_body(res).await.is_empty());
}

#[rstest]
#[case::own_record(true, StatusCode::OK)]
#[case::foreign_record(false, StatusCode::FORBIDDEN)]
#[actix_web::test]
async fn customers_only_read_their_own_record(#[case] own: bool, #[case] status: StatusCode) {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let id = if own { ctx.alpha_id } else { ctx.beta_id };
    let req = test::TestRequest::get()
        .uri(&format!("/rest/{id}"))
        .insert_header(alpha())
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), status);
}

#[actix_web::test]
async fn anonymous_reads_are_challenged() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let req = test::TestRequest::get()
        .uri(&format!("/rest/{}", ctx.alpha_id))
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.headers().get(header::WWW_AUTHENTICATE).expect("challenge"),
        BASIC_CHALLENGE
    );
}

#[actix_web::test]
async fn wrong_password_is_unauthorized() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let req = test::TestRequest::get()
        .uri(&format!("/rest/{}", ctx.alpha_id))
        .insert_header((header::AUTHORIZATION, basic_auth("admin", "Falsch123!")))
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn unknown_id_is_not_found_for_admins() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let req = test::TestRequest::get()
        .uri(&format!("/rest/{}", KundeId::random()))
        .insert_header(admin())
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case::everybody("/rest", &["Alpha", "Beta"])]
#[case::surname_part("/rest?nachname=ET", &["Beta"])]
#[case::postal_code_prefix("/rest?plz=1", &["Beta"])]
#[case::combined("/rest?interesse=S&ort=Karls", &["Alpha"])]
#[actix_web::test]
async fn search_embeds_the_matches(#[case] uri: &str, #[case] expected: &[&str]) {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let req = test::TestRequest::get()
        .uri(uri)
        .insert_header(admin())
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: KundenModel = test::read_body_json(res).await;
    let mut nachnamen: Vec<_> = body
        .embedded
        .kunden
        .iter()
        .map(|kunde| kunde.nachname.as_str())
        .collect();
    nachnamen.sort_unstable();
    assert_eq!(nachnamen, expected);
}

#[rstest]
#[case::no_match("/rest?nachname=Zeta")]
#[case::unknown_key("/rest?farbe=blau")]
#[actix_web::test]
async fn empty_searches_are_not_found(#[case] uri: &str) {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let req = test::TestRequest::get()
        .uri(uri)
        .insert_header(admin())
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn search_needs_the_admin_role() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let req = test::TestRequest::get()
        .uri("/rest")
        .insert_header(alpha())
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[case::match_found("/rest/nachname/al", StatusCode::OK)]
#[case::no_match("/rest/nachname/zz", StatusCode::NOT_FOUND)]
#[actix_web::test]
async fn surname_prefix_lookup(#[case] uri: &str, #[case] status: StatusCode) {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let req = test::TestRequest::get()
        .uri(uri)
        .insert_header(alpha())
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), status);
    if status == StatusCode::OK {
        let body: Vec<String> = test::read_body_json(res).await;
        assert_eq!(body, vec!["Alpha".to_owned()]);
    }
}

#[actix_web::test]
async fn registration_creates_a_readable_customer() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let req = test::TestRequest::post()
        .uri("/rest")
        .set_json(new_kunde_body("Gamma"))
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location")
        .to_owned();
    let path = location
        .find("/rest/")
        .map(|start| location[start..].to_owned())
        .expect("location below /rest");

    // The user name was stored lower-cased.
    let req = test::TestRequest::get()
        .uri(&path)
        .insert_header((header::AUTHORIZATION, basic_auth("gamma", "Gamma123!")))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: KundeModel = test::read_body_json(res).await;
    assert_eq!(body.email, "gamma@acme.de");
    assert_eq!(body.umsaetze.len(), 1);
}

#[rstest]
#[case::missing_kunde(json!({"user": {"username": "x", "password": "Gamma123!"}}), StatusCode::BAD_REQUEST, "missing_field")]
#[case::missing_user(json!({"kunde": {"nachname": "Gamma"}}), StatusCode::BAD_REQUEST, "missing_field")]
#[case::invalid_values(
    json!({"kunde": {"nachname": "gamma", "email": "gamma@acme.de"}, "user": {"username": "gamma", "password": "Gamma123!"}}),
    StatusCode::UNPROCESSABLE_ENTITY,
    "constraint_violations"
)]
#[case::weak_password(
    {
        let mut body = new_kunde_body("gamma");
        body["user"]["password"] = json!("schwach");
        body
    },
    StatusCode::UNPROCESSABLE_ENTITY,
    "password_invalid"
)]
#[case::email_taken(
    {
        let mut body = new_kunde_body("gamma");
        body["kunde"]["email"] = json!("alpha@acme.de");
        body
    },
    StatusCode::UNPROCESSABLE_ENTITY,
    "email_exists"
)]
#[case::username_taken(new_kunde_body("Alpha"), StatusCode::UNPROCESSABLE_ENTITY, "username_exists")]
#[actix_web::test]
async fn rejected_registrations(
    #[case] body: Value,
    #[case] status: StatusCode,
    #[case] code: &str,
) {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let req = test::TestRequest::post()
        .uri("/rest")
        .set_json(body)
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), status);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(error_code(&body), Some(code));
}

fn put_request(id: KundeId, if_match: Option<&str>) -> test::TestRequest {
    let mut req = test::TestRequest::put()
        .uri(&format!("/rest/{id}"))
        .insert_header(admin())
        .set_json(json!({"nachname": "Alphaneu", "email": "alpha.neu@acme.de", "kategorie": 3}));
    if let Some(token) = if_match {
        req = req.insert_header((header::IF_MATCH, token));
    }
    req
}

#[actix_web::test]
async fn put_replaces_scalars_and_bumps_the_version() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;

    let res = test::call_service(&app, put_request(ctx.alpha_id, Some("\"0\"")).to_request()).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(etag_of(&res), "\"1\"");

    let req = test::TestRequest::get()
        .uri(&format!("/rest/{}", ctx.alpha_id))
        .insert_header(admin())
        .to_request();
    let body: KundeModel = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.nachname, "Alphaneu");
    assert_eq!(body.kategorie, 3);
    // Address and interests survive a full replacement.
    assert_eq!(body.adresse.map(|adresse| adresse.plz), Some("76133".to_owned()));
    assert_eq!(body.interessen.len(), 1);
}

#[rstest]
#[case::missing_version(None, StatusCode::PRECONDITION_REQUIRED)]
#[case::unquoted_version(Some("0"), StatusCode::PRECONDITION_FAILED)]
#[case::stale_version(Some("\"7\""), StatusCode::PRECONDITION_FAILED)]
#[actix_web::test]
async fn put_needs_the_current_version(
    #[case] if_match: Option<&str>,
    #[case] status: StatusCode,
) {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let res = test::call_service(&app, put_request(ctx.alpha_id, if_match).to_request()).await;
    assert_eq!(res.status(), status);
}

#[rstest]
#[case::negative("\"-1\"")]
#[case::stale("\"7\"")]
#[actix_web::test]
async fn foreign_versions_are_outdated(#[case] if_match: &str) {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let res = test::call_service(&app, put_request(ctx.alpha_id, Some(if_match)).to_request()).await;
    assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(error_code(&body), Some("version_outdated"));
    assert_eq!(body["details"]["actualVersion"], 0);
}

#[actix_web::test]
async fn garbled_versions_are_invalid_not_missing() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let token = header::HeaderValue::from_bytes(b"\"0\xe9\"").expect("opaque header bytes");
    let req = test::TestRequest::patch()
        .uri(&format!("/rest/{}", ctx.alpha_id))
        .insert_header(admin())
        .insert_header((header::IF_MATCH, token))
        .set_json(json!([{"op": "replace", "path": "/nachname", "value": "Alphaneu"}]))
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(error_code(&body), Some("version_invalid"));
}

#[actix_web::test]
async fn put_of_an_unknown_customer_is_not_found() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let res =
        test::call_service(&app, put_request(KundeId::random(), Some("\"0\"")).to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn writes_need_the_admin_role() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let req = test::TestRequest::delete()
        .uri(&format!("/rest/{}", ctx.alpha_id))
        .insert_header(alpha())
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn patch_persists_interests() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let req = test::TestRequest::patch()
        .uri(&format!("/rest/{}", ctx.alpha_id))
        .insert_header(admin())
        .insert_header((header::IF_MATCH, "\"0\""))
        .set_json(json!([
            {"op": "add", "path": "/interessen", "value": "R"},
            {"op": "replace", "path": "/email", "value": "alpha@acme.com"}
        ]))
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(etag_of(&res), "\"1\"");

    let req = test::TestRequest::get()
        .uri(&format!("/rest/{}", ctx.alpha_id))
        .insert_header(admin())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["interessen"], json!(["S", "R"]));
    assert_eq!(body["email"], json!("alpha@acme.com"));
}

#[actix_web::test]
async fn invalid_patch_is_unprocessable() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let req = test::TestRequest::patch()
        .uri(&format!("/rest/{}", ctx.alpha_id))
        .insert_header(admin())
        .insert_header((header::IF_MATCH, "\"0\""))
        .set_json(json!([{"op": "replace", "path": "/kategorie", "value": "5"}]))
        .to_request();

    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn delete_is_idempotent() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    for _ in 0..2 {
        let req = test::TestRequest::delete()
            .uri(&format!("/rest/{}", ctx.beta_id))
            .insert_header(admin())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/rest/{}", ctx.beta_id))
        .insert_header(admin())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
