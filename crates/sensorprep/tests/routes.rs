use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::IntoResponse,
    Router,
};
use http_body_util::BodyExt;
use sensorprep::{router, ApiError, AppState};
use sensorprep_core::{CleanConfig, PreprocessConfig, PreprocessError};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    router(AppState::default())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request");
    let response = app.oneshot(request).await.expect("router responds");
    let status = response.status();
    (status, body_json(response).await)
}

fn duplicate_building() -> Value {
    json!({
        "B1": {
            "name": "B1",
            "sensors": [
                { "type": "T1", "desc": "d", "unit": "C" },
                { "type": "T2", "desc": "d", "unit": "C" }
            ],
            "dataframe": "{\"T1\":{\"0\":1.0,\"1000\":1.0,\"2000\":1.0},\"T2\":{\"0\":1.0,\"1000\":1.0,\"2000\":1.0}}"
        }
    })
}

#[tokio::test]
async fn root_lists_routes() {
    let request = Request::builder()
        .uri("/")
        .body(Body::empty())
        .expect("build request");
    let response = app().oneshot(request).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let routes = body_json(response).await;
    let paths: Vec<&str> = routes
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|route| route["path"].as_str())
        .collect();
    assert_eq!(paths, vec!["/", "/clean", "/interpolate"]);
}

#[tokio::test]
async fn clean_accepts_inline_payload_and_query_overrides() {
    let (status, body) = post(
        app(),
        "/clean?min_valid_values=3",
        json!({ "payload": duplicate_building() }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["B1"]["sensors"], json!([{ "type": "T1", "desc": "d", "unit": "C" }]));
}

#[tokio::test]
async fn clean_uses_server_defaults() {
    // Three values fall short of the default minimum of ten.
    let (status, body) = post(app(), "/clean", json!({ "payload": duplicate_building() })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let lenient = router(AppState::new(PreprocessConfig {
        clean: CleanConfig {
            merge_threshold: 10,
            min_valid_values: 1,
        },
        ..PreprocessConfig::default()
    }));
    let (status, body) = post(lenient, "/clean", json!({ "payload": duplicate_building() })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("B1").is_some());
}

#[tokio::test]
async fn clean_accepts_string_payload() {
    let (status, body) = post(app(), "/clean", json!({ "payload": "{}" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn empty_payload_is_bad_request() {
    for request in [json!({}), json!({ "payload": null }), json!({ "payload": "  " })] {
        let (status, body) = post(app(), "/interpolate", request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Payload can not be empty");
    }
}

#[tokio::test]
async fn malformed_payload_is_bad_request() {
    let payload = json!({ "B": { "name": "B", "sensors": [], "dataframe": "{\"T\":{\"later\":1}}" } });
    let (status, body) = post(app(), "/clean", json!({ "payload": payload })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().expect("detail string");
    assert!(detail.starts_with("Malformed input"), "unexpected detail: {detail}");
}

#[tokio::test]
async fn interpolate_fills_gaps_with_requested_method() {
    let payload = json!({
        "B": {
            "name": "B",
            "sensors": [{ "type": "T", "desc": "d", "unit": "C" }],
            "dataframe": "{\"T\":{\"0\":0.0,\"1000\":null,\"4000\":4.0}}"
        }
    });

    let (status, body) = post(app(), "/interpolate?method=time", json!({ "payload": payload.clone() })).await;
    assert_eq!(status, StatusCode::OK);
    let table: Value = serde_json::from_str(body["B"]["dataframe"].as_str().expect("string"))
        .expect("dataframe JSON");
    assert_eq!(table["T"]["1000"], 1.0);

    let (_, body) = post(app(), "/interpolate", json!({ "payload": payload })).await;
    let table: Value = serde_json::from_str(body["B"]["dataframe"].as_str().expect("string"))
        .expect("dataframe JSON");
    assert_eq!(table["T"]["1000"], 2.0);
}

#[tokio::test]
async fn processing_errors_hide_internals() {
    let response = ApiError::from(PreprocessError::Processing("index overflow".into())).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({ "detail": "Internal Server Error" }));
}
