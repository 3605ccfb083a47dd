use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common_http_errors::ApiError;
use serde_json::Value;

async fn body_json(err: ApiError) -> (StatusCode, Option<String>, Value) {
    let response = err.into_response();
    let status = response.status();
    let header = response
        .headers()
        .get("X-Error-Code")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    (status, header, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn no_change_is_a_soft_bad_request() {
    let (status, header, body) = body_json(ApiError::NoChange).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(header.as_deref(), Some("no_change"));
    assert_eq!(body["code"], "no_change");
    assert_eq!(body["message"], "No changes made, the status may already be updated");
}

#[tokio::test]
async fn illegal_transition_names_both_states() {
    let err = ApiError::IllegalTransition {
        from: "refunded".into(),
        to: "paid".into(),
    };
    let (status, header, body) = body_json(err).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(header.as_deref(), Some("illegal_transition"));
    assert_eq!(body["message"], "cannot transition order from 'refunded' to 'paid'");
}

#[tokio::test]
async fn not_found_carries_the_resource_code() {
    let (status, header, body) = body_json(ApiError::not_found("user_not_found")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(header.as_deref(), Some("user_not_found"));
    assert_eq!(body["code"], "user_not_found");
}

#[tokio::test]
async fn gateway_failures_surface_only_the_sanitized_message() {
    let (status, _, body) = body_json(ApiError::gateway("Your card was declined.")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "gateway_error");
    assert_eq!(body["message"], "Your card was declined.");
}

#[tokio::test]
async fn error_bodies_have_exactly_code_and_message() {
    let (_, _, body) = body_json(ApiError::Internal).await;
    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert!(object.contains_key("code"));
    assert!(object.contains_key("message"));
}
