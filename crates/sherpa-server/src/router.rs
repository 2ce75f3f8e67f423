//! HTTP routing for a Sherpa API.
//!
//! Paths are relative to the API's mount point:
//!
//! | path | method | response |
//! |---|---|---|
//! | `/` | GET | HTML landing page |
//! | `/sherpa.json` | GET | API descriptor |
//! | `/sherpa.js` | GET | browser client |
//! | `/<function>` | POST | call envelope |
//! | any | OPTIONS | 204 |
//!
//! Other methods get 405. Every response carries permissive CORS headers.

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Path, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_TYPE,
        },
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use sherpa_core::config::ServerConfig;
use sherpa_core::{Api, ProtocolConfig};
use std::any::Any;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::error;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const JS_CONTENT_TYPE: &str = "text/javascript; charset=utf-8";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Router serving `api` with the default body limit.
pub fn router(api: Arc<Api>) -> Router {
    router_with_limit(api, ServerConfig::MAX_BODY_BYTES)
}

/// Router serving `api`, rejecting request bodies above `max_body_bytes`
/// with 413.
pub fn router_with_limit(api: Arc<Api>, max_body_bytes: usize) -> Router {
    with_layers(routes().with_state(api), max_body_bytes)
}

/// Router serving `api` under the path of its base URL. The base URL itself,
/// with its trailing slash, is the landing page.
pub fn mounted_router(api: Arc<Api>, max_body_bytes: usize) -> Router {
    let mount = api.base_url().path().trim_end_matches('/').to_string();
    if mount.is_empty() {
        return router_with_limit(api, max_body_bytes);
    }
    let router = Router::new()
        .route(&format!("{}/", mount), any(handle_root))
        .nest(&mount, routes())
        .with_state(api);
    with_layers(router, max_body_bytes)
}

fn routes() -> Router<Arc<Api>> {
    Router::new()
        .route("/", any(handle_root))
        .route("/*path", any(handle_path))
}

fn with_layers(router: Router, max_body_bytes: usize) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, POST"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type"),
            ))
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(max_body_bytes)),
    )
}

async fn handle_root(State(api): State<Arc<Api>>, method: Method) -> Response {
    match method {
        Method::GET => (
            [(CONTENT_TYPE, HTML_CONTENT_TYPE)],
            landing_page(&api),
        )
            .into_response(),
        Method::OPTIONS => StatusCode::NO_CONTENT.into_response(),
        _ => method_not_allowed(),
    }
}

async fn handle_path(
    State(api): State<Arc<Api>>,
    method: Method,
    Path(path): Path<String>,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }
    match path.as_str() {
        ProtocolConfig::DESCRIPTOR_PATH if method == Method::GET => {
            static_artifact(JSON_CONTENT_TYPE, api.descriptor_json())
        }
        ProtocolConfig::SCRIPT_PATH if method == Method::GET => {
            static_artifact(JS_CONTENT_TYPE, api.script())
        }
        ProtocolConfig::DESCRIPTOR_PATH | ProtocolConfig::SCRIPT_PATH => method_not_allowed(),
        name if method == Method::POST => call_function(&api, name, &body).await,
        _ => method_not_allowed(),
    }
}

async fn call_function(api: &Api, name: &str, body: &[u8]) -> Response {
    let result = api.call(name, body).await;
    match serde_json::to_vec(&result) {
        Ok(json) => ([(CONTENT_TYPE, JSON_CONTENT_TYPE)], json).into_response(),
        Err(e) => {
            error!("Failed to encode response for {}: {}", name, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn static_artifact(content_type: &'static str, bytes: Bytes) -> Response {
    (
        [(CONTENT_TYPE, content_type), (CACHE_CONTROL, "no-cache")],
        bytes,
    )
        .into_response()
}

fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, "method not allowed").into_response()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    error!("Function panicked: {}", detail);
    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
}

fn landing_page(api: &Api) -> String {
    let title = escape_html(api.title());
    let docs_link = match api.base_url().docs_url() {
        Some(url) => format!(
            "<p>You can also <a href=\"{}\">read the documentation</a> for this API.</p>\n",
            escape_html(url)
        ),
        None => String::new(),
    };
    format!(
        "<!doctype html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\" />\n\
         <title>{title}</title>\n\
         <script src=\"{script}\"></script>\n\
         </head>\n\
         <body>\n\
         <h1>{title} - version {version}</h1>\n\
         <p>This is the base URL for {title}. The API has been loaded on this page, \
         under variable <code>{id}</code>. Open your browser's developer console to \
         try it out.</p>\n\
         {docs_link}\
         </body>\n\
         </html>\n",
        title = title,
        script = escape_html(&format!(
            "{}{}",
            api.base_url().as_str(),
            ProtocolConfig::SCRIPT_PATH
        )),
        version = escape_html(api.version()),
        id = escape_html(api.id()),
        docs_link = docs_link,
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_landing_page_contents() {
        let api = sherpa_core::ApiBuilder::new(
            "https://example.com/demo/",
            "demo",
            "Demo <API>",
            "2.0.0",
        )
        .build()
        .unwrap();
        let page = landing_page(&api);
        assert!(page.contains("<title>Demo &lt;API&gt;</title>"));
        assert!(page.contains("version 2.0.0"));
        assert!(page.contains("<code>demo</code>"));
        assert!(page.contains(
            r#"<script src="https://example.com/demo/sherpa.js"></script>"#
        ));
        assert!(page.contains("https://sherpa.irias.nl/x/example.com/demo/"));
    }

    #[test]
    fn test_landing_page_for_path_base_url() {
        let api = sherpa_core::ApiBuilder::new("/example/", "demo", "Demo", "1.0.0")
            .build()
            .unwrap();
        let page = landing_page(&api);
        assert!(page.contains(r#"<script src="/example/sherpa.js"></script>"#));
        assert!(!page.contains("read the documentation"));
    }
}
