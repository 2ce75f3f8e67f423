//! End-to-end tests: the client against a live server on a random port.

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use sherpa_client::Client;
use sherpa_core::{ErrorCode, Int64s, Section, SherpaError};
use sherpa_server::example::{example_api, Stats};
use sherpa_server::{start_server, ServerOptions};
use std::net::SocketAddr;

async fn start_example() -> String {
    let api = example_api("/").unwrap();
    let addr = start_server(api, &ServerOptions::default()).await.unwrap();
    format!("http://{}/", addr)
}

/// Serve a hand-written router, for responses a Sherpa server never sends.
async fn start_raw(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

#[tokio::test]
async fn test_discovery() {
    let base = start_example().await;
    let client = Client::new(&base, None).await.unwrap();
    let descriptor = client.descriptor().unwrap();
    assert_eq!(descriptor.id, "example");
    assert_eq!(descriptor.sherpa_version, 0);
    assert_eq!(
        client.functions(),
        ["concat", "divide", "echo", "int64Test", "stats", "sum"]
    );
}

#[tokio::test]
async fn test_sum_and_bad_params() {
    let base = start_example().await;
    let client = Client::new(&base, None).await.unwrap();

    let sum: i64 = client.call("sum", &[json!(1), json!(2)]).await.unwrap();
    assert_eq!(sum, 3);

    let err = client.call_value("sum", &[json!(1)]).await.unwrap_err();
    assert!(err.is(ErrorCode::BadParams));
    assert_eq!(err.message, "bad number of parameters, got 1, want 2");
}

#[tokio::test]
async fn test_server_errors_are_returned_verbatim() {
    let base = start_example().await;
    let client = Client::new(&base, Some(vec![])).await.unwrap();

    let err = client
        .call_value("divide", &[json!(1), json!(0)])
        .await
        .unwrap_err();
    assert_eq!(err.code, "divisionByZero");
    assert_eq!(err.message, "cannot divide by zero");

    let err = client.call_unit("stats", &[json!([])]).await.unwrap_err();
    assert_eq!(err.code, "");
    assert_eq!(err.message, "no values");

    let err = client.call_value("missing", &[]).await.unwrap_err();
    assert!(err.is(ErrorCode::BadFunction));
}

#[tokio::test]
async fn test_multiple_outputs_decode_as_tuple() {
    let base = start_example().await;
    let client = Client::new(&base, Some(vec![])).await.unwrap();
    let (min, max, stats): (f64, f64, Stats) = client
        .call("stats", &[json!([4.0, 1.0, 7.0])])
        .await
        .unwrap();
    assert_eq!(min, 1.0);
    assert_eq!(max, 7.0);
    assert_eq!(stats.count, 3);
    assert_eq!(stats.mean, 4.0);
}

#[tokio::test]
async fn test_int64_round_trip() {
    let base = start_example().await;
    let client = Client::new(&base, Some(vec![])).await.unwrap();

    let (a, b): (Int64s, Option<Int64s>) = client
        .call(
            "int64Test",
            &[json!("-4611686018427387904"), json!(4611686018427387904_i64)],
        )
        .await
        .unwrap();
    assert_eq!(a.get(), -4_611_686_018_427_387_904);
    assert_eq!(b, Some(Int64s(4_611_686_018_427_387_904)));

    let raw = client
        .call_value("int64Test", &[json!("1"), Value::Null])
        .await
        .unwrap();
    assert_eq!(raw, json!(["1", null]));
}

#[tokio::test]
async fn test_variadic_tail_may_be_omitted() {
    let base = start_example().await;
    let client = Client::new(&base, Some(vec![])).await.unwrap();
    let joined: String = client
        .call("concat", &[json!("+"), json!(["a", "b", "c"])])
        .await
        .unwrap();
    assert_eq!(joined, "a+b+c");
    let empty: String = client.call("concat", &[json!("+")]).await.unwrap();
    assert_eq!(empty, "");
}

#[tokio::test]
async fn test_docs_over_the_wire() {
    let base = start_example().await;
    let client = Client::new(&base, None).await.unwrap();
    let docs: Section = client.call("_docs", &[]).await.unwrap();
    assert_eq!(docs.title, "Example API");
    assert!(docs.find_function("divide").unwrap().text.contains("divisionByZero"));
    assert!(docs.render().contains("# Math"));
}

#[tokio::test]
async fn test_result_type_mismatch_is_bad_response() {
    let base = start_example().await;
    let client = Client::new(&base, Some(vec![])).await.unwrap();
    let err = client
        .call::<String>("sum", &[json!(1), json!(2)])
        .await
        .unwrap_err();
    assert!(err.is(ErrorCode::BadResponse));
}

#[tokio::test]
async fn test_unsupported_version_is_rejected() {
    let app = Router::new().route(
        "/sherpa.json",
        get(|| async {
            axum::Json(json!({
                "id": "future",
                "title": "Future",
                "functions": [],
                "baseurl": "/",
                "version": "9.0.0",
                "sherpaVersion": 1
            }))
        }),
    );
    let base = start_raw(app).await;
    let err = Client::new(&base, None).await.unwrap_err();
    assert!(
        matches!(err, SherpaError::UnsupportedVersion { found: 1, expected: 0 }),
        "{err}"
    );
}

#[tokio::test]
async fn test_discovery_without_api() {
    let base = start_raw(Router::new()).await;
    let err = Client::new(&base, None).await.unwrap_err();
    assert!(matches!(err, SherpaError::NoApi { .. }), "{err}");
}

#[tokio::test]
async fn test_transport_status_mapping() {
    let app = Router::new()
        .route("/broken", post(|| async { StatusCode::BAD_GATEWAY }))
        .route("/garbage", post(|| async { "<html>not json</html>" }))
        .route("/empty", post(|| async { axum::Json(json!({})) }));
    let base = start_raw(app).await;
    let client = Client::new(&base, Some(vec![])).await.unwrap();

    let err = client.call_value("absent", &[]).await.unwrap_err();
    assert!(err.is(ErrorCode::BadFunction), "{err:?}");

    let err = client.call_value("broken", &[]).await.unwrap_err();
    assert!(err.is(ErrorCode::HttpError), "{err:?}");
    assert!(err.message.contains("502"));

    let err = client.call_value("garbage", &[]).await.unwrap_err();
    assert!(err.is(ErrorCode::BadResponse), "{err:?}");

    let err = client.call_value("empty", &[]).await.unwrap_err();
    assert!(err.is(ErrorCode::BadResponse), "{err:?}");
}

#[tokio::test]
async fn test_call_unit_only_checks_for_error() {
    let app = Router::new()
        .route("/ack", post(|| async { axum::Json(json!({})) }))
        .route(
            "/refuse",
            post(|| async {
                axum::Json(json!({"error": {"code": "custom", "message": ""}}))
            }),
        );
    let base = start_raw(app).await;
    let client = Client::new(&base, Some(vec![])).await.unwrap();

    client.call_unit("ack", &[]).await.unwrap();

    let err = client.call_unit("refuse", &[]).await.unwrap_err();
    assert_eq!(err.code, "custom");
    assert_eq!(err.message, "unspecified error");

    let err = client.call_value("ack", &[]).await.unwrap_err();
    assert!(err.is(ErrorCode::BadResponse), "{err:?}");
}
