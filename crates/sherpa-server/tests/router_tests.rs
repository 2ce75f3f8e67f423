//! Router tests driving the Axum service directly.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use sherpa_core::{ApiBuilder, Section};
use sherpa_server::{app, router, router_with_limit};
use std::sync::Arc;
use tower::ServiceExt;

async fn sum(a: i64, b: i64) -> i64 {
    a + b
}

fn sum_router() -> Router {
    let api = ApiBuilder::new("https://example.com/api/", "sumapi", "Sum API", "1.0.0")
        .function("sum", sum)
        .fallible("explode", || async {
            if true {
                panic!("kaboom");
            }
            Ok::<i64, String>(0)
        })
        .build()
        .unwrap();
    router(Arc::new(api))
}

async fn send(app: &Router, method: Method, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn assert_cors(response: &Response) {
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, POST");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
}

#[tokio::test]
async fn test_sum_call() {
    let app = sum_router();
    let response = send(&app, Method::POST, "/sum", r#"{"params":[1,2]}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    assert_eq!(body_json(response).await, json!({"result": 3}));
}

#[tokio::test]
async fn test_bad_params_envelope() {
    let app = sum_router();
    let response = send(&app, Method::POST, "/sum", r#"{"params":[1]}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "sherpaBadParams");
    assert_eq!(body["error"]["message"], "bad number of parameters, got 1, want 2");
    assert!(body.get("result").is_none());
}

#[tokio::test]
async fn test_unknown_function_is_200_with_bad_function() {
    let app = sum_router();
    let response = send(&app, Method::POST, "/product", r#"{"params":[1,2]}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "sherpaBadFunction");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = sum_router();
    for body in ["{", r#"{"params":"nope"}"#, "{}"] {
        let response = send(&app, Method::POST, "/sum", body).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["error"]["code"], "sherpaBadRequest");
    }
}

#[tokio::test]
async fn test_descriptor_is_stable() {
    let app = sum_router();
    let first = send(&app, Method::GET, "/sherpa.json", "").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()[header::CACHE_CONTROL], "no-cache");
    assert_cors(&first);
    let first = body_bytes(first).await;
    let second = body_bytes(send(&app, Method::GET, "/sherpa.json", "").await).await;
    assert_eq!(first, second);

    let text = String::from_utf8(first).unwrap();
    assert!(text.contains(r#""functions":["explode","sum"]"#), "{text}");
    assert!(text.contains(r#""sherpaVersion":0"#));
}

#[tokio::test]
async fn test_script() {
    let app = sum_router();
    let response = send(&app, Method::GET, "/sherpa.js", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/javascript"));
    let script = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(script.contains(r#""id":"sumapi""#));
}

#[tokio::test]
async fn test_landing_page() {
    let app = sum_router();
    let response = send(&app, Method::GET, "/", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(page.contains("Sum API"));
    assert!(page.contains("https://sherpa.irias.nl/x/example.com/api/"));
}

#[tokio::test]
async fn test_options_and_method_restrictions() {
    let app = sum_router();
    for uri in ["/", "/sum", "/sherpa.json", "/anything"] {
        let response = send(&app, Method::OPTIONS, uri, "").await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{uri}");
        assert_cors(&response);
    }

    let cases = [
        (Method::GET, "/sum"),
        (Method::PUT, "/sum"),
        (Method::POST, "/sherpa.json"),
        (Method::DELETE, "/sherpa.js"),
        (Method::POST, "/"),
    ];
    for (method, uri) in cases {
        let response = send(&app, method.clone(), uri, "").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_cors(&response);
    }
}

#[tokio::test]
async fn test_docs_function() {
    let app = sum_router();
    let response = send(&app, Method::POST, "/_docs", r#"{"params":[]}"#).await;
    let docs: Section = serde_json::from_value(body_json(response).await["result"].clone()).unwrap();
    assert_eq!(docs.title, "Sum API");
    assert_eq!(docs.version, 1);
    assert!(docs.find_function("sum").is_some());
}

#[tokio::test]
async fn test_panic_is_500_and_server_survives() {
    let app = sum_router();
    let response = send(&app, Method::POST, "/explode", r#"{"params":[]}"#).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&response);

    let response = send(&app, Method::POST, "/sum", r#"{"params":[2,2]}"#).await;
    assert_eq!(body_json(response).await, json!({"result": 4}));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let api = ApiBuilder::new("/", "t", "T", "1")
        .function("sum", sum)
        .build()
        .unwrap();
    let app = router_with_limit(Arc::new(api), 16);
    let response = send(&app, Method::POST, "/sum", r#"{"params":[1,2],"padding":"xxxxxxxx"}"#).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_cors(&response);
}

#[tokio::test]
async fn test_app_mounts_under_base_path() {
    let api = ApiBuilder::new("/example/", "t", "T", "1")
        .function("sum", sum)
        .build()
        .unwrap();
    let app = app(Arc::new(api), 1024);
    let response = send(&app, Method::POST, "/example/sum", r#"{"params":[20,22]}"#).await;
    assert_eq!(body_json(response).await, json!({"result": 42}));

    let response = send(&app, Method::GET, "/example/sherpa.json", "").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, Method::POST, "/sum", r#"{"params":[1,2]}"#).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_cors(&response);
}

#[tokio::test]
async fn test_mounted_base_url_serves_landing_page() {
    let api = ApiBuilder::new("http://localhost:8080/example/", "t", "Mounted", "1")
        .function("sum", sum)
        .build()
        .unwrap();
    let app = app(Arc::new(api), 1024);

    let response = send(&app, Method::GET, "/example/", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    let page = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(page.contains("<title>Mounted</title>"));
    assert!(page.contains(r#"<script src="http://localhost:8080/example/sherpa.js">"#));

    let response = send(&app, Method::OPTIONS, "/example/", "").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_cors(&response);

    let response = send(&app, Method::DELETE, "/example/", "").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_cors(&response);

    let response = send(&app, Method::OPTIONS, "/example/sum", "").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_cors(&response);

    let response = send(&app, Method::GET, "/example/sherpa.js", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
}
