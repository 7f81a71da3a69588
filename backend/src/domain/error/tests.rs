//! Tests for the domain error payload and its serialisation contract.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn violation_error() -> Error {
    Error::unprocessable_entity("Constraints sind verletzt").with_details(json!({
        "violations": [{ "path": "nachname", "message": "ungueltiger Nachname" }],
    }))
}

#[rstest]
#[case::invalid_request(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case::unauthorized(Error::unauthorized("no auth"), ErrorCode::Unauthorized)]
#[case::forbidden(Error::forbidden("denied"), ErrorCode::Forbidden)]
#[case::not_found(Error::not_found("missing"), ErrorCode::NotFound)]
#[case::conflict(Error::conflict("clash"), ErrorCode::Conflict)]
#[case::precondition_failed(Error::precondition_failed("stale"), ErrorCode::PreconditionFailed)]
#[case::precondition_required(
    Error::precondition_required("Versionsnummer fehlt"),
    ErrorCode::PreconditionRequired
)]
#[case::unprocessable(Error::unprocessable_entity("invalid"), ErrorCode::UnprocessableEntity)]
#[case::unavailable(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case::internal(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_trace_id_rejects_empty_values() {
    let result = Error::not_found("missing").try_with_trace_id("  ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::not_found("Kunde fehlt") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
#[tokio::test]
async fn deserialising_ignores_the_ambient_trace(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let payload = json!({ "code": "not_found", "message": "missing" });

    let error: Error = TraceId::scope(trace_id, async move {
        serde_json::from_value(payload).expect("payload deserialises")
    })
    .await;

    assert!(error.trace_id().is_none());
}

#[rstest]
fn serialises_camel_case_and_skips_empty_fields(violation_error: Error) {
    let value = serde_json::to_value(&violation_error).expect("serialises");

    assert_eq!(value["code"], "unprocessable_entity");
    assert_eq!(value["message"], "Constraints sind verletzt");
    assert_eq!(value["details"]["violations"][0]["path"], "nachname");
    assert!(value.get("traceId").is_none());
}

#[rstest]
fn round_trips_trace_id_through_json(expected_trace_id: String) {
    let error = Error::precondition_failed("Die Versionsnummer 0 ist veraltet.")
        .with_trace_id(expected_trace_id.clone());

    let value = serde_json::to_value(&error).expect("serialises");
    assert_eq!(value["traceId"], json!(expected_trace_id));

    let decoded: Error = serde_json::from_value(value).expect("deserialises");
    assert_eq!(decoded, error);
}

#[rstest]
fn rejects_payloads_with_blank_messages() {
    let payload = json!({ "code": "internal_error", "message": " " });
    let result = serde_json::from_value::<Error>(payload);
    assert!(result.is_err());
}
