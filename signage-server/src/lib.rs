use std::net::{Ipv6Addr, SocketAddr};

use axum::routing::get;
use log::{debug, info};
use signage_collab::Signage;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

mod auth;
mod context;
mod displays;
mod docs;
mod errors;
mod layouts;
mod schemas;
mod serialized;
mod slideshows;
mod sse;
mod widgets;

pub use auth::CREATOR_HEADER;
pub use context::ServerContext;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9050;

pub type Router = axum::Router<ServerContext>;

/// Starts the signage server, serving until the listener fails
pub async fn run_server(signage: Signage, port: u16) -> std::io::Result<()> {
    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();
    let context = ServerContext::new(signage);

    spawn_keep_alive(&context);

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, router(context).into_make_service()).await
}

/// Builds the whole API around a context
pub fn router(context: ServerContext) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let version_one_router = Router::new()
        .nest("/displays", displays::router())
        .nest("/widgets", widgets::router())
        .nest("/slideshows", slideshows::router())
        .nest("/slides", slideshows::slides_router())
        .nest("/layouts", layouts::router())
        .nest("/events", sse::router());

    Router::new()
        .nest("/v1", version_one_router)
        .route("/api.json", get(docs::docs))
        .layer(cors)
        .with_state(context)
}

/// Keeps idle event streams from being closed by proxies
fn spawn_keep_alive(context: &ServerContext) {
    let events = context.events().clone();
    let period = context.signage.config.keep_alive_interval;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;

            let pinged = events.ping_all();
            debug!("Pinged {} subscribers", pinged);
        }
    });
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use signage_collab::{EventRegistry, MemoryDatabase, Signage};
    use signage_core::Config;
    use tower::ServiceExt;

    use super::{router, ServerContext, CREATOR_HEADER};

    fn app() -> Router {
        let signage = Signage::new(
            Arc::new(MemoryDatabase::new()),
            EventRegistry::new(),
            Config::default(),
        );

        router(ServerContext::new(signage))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(CREATOR_HEADER, "tester");

        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, bytes.to_vec())
    }

    async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, method, uri, body).await;

        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn displays_are_created_with_their_widgets() {
        let app = app();

        let (status, created) = send_json(
            &app,
            "POST",
            "/v1/displays",
            Some(json!({
                "name": "Lobby",
                "widgets": [
                    { "name": "Welcome", "type": "announcement", "data": { "text": "Hello" } },
                    { "name": "Blank", "type": "empty", "x": 1 }
                ]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["creator_id"], "tester");
        assert_eq!(created["widgets"].as_array().unwrap().len(), 2);

        let id = created["_id"].as_str().unwrap();
        let (status, populated) = send_json(&app, "GET", &format!("/v1/displays/{}", id), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(populated["widgets"][0]["name"], "Welcome");
        assert_eq!(populated["widgets"][1]["x"], 1);
    }

    #[tokio::test]
    async fn invalid_widget_data_is_a_bad_request() {
        let app = app();

        let (status, body) = send(
            &app,
            "POST",
            "/v1/displays",
            Some(json!({
                "name": "Lobby",
                "widgets": [{ "name": "Welcome", "type": "announcement", "data": { "text": " " } }]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "Invalid data for Announcement widget: text is required"
        );

        let (_, displays) = send_json(&app, "GET", "/v1/displays", None).await;
        let (_, widgets) = send_json(&app, "GET", "/v1/widgets", None).await;

        assert_eq!(displays, json!([]));
        assert_eq!(widgets, json!([]));
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids_are_rejected() {
        let app = app();

        let (status, _) = send(&app, "GET", "/v1/displays/000000000000000000000000", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "GET", "/v1/displays/not-an-id", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn updating_a_display_reconciles_its_widgets() {
        let app = app();

        let (_, created) = send_json(
            &app,
            "POST",
            "/v1/displays",
            Some(json!({
                "name": "Lobby",
                "widgets": [
                    { "name": "A", "type": "empty" },
                    { "name": "B", "type": "empty" }
                ]
            })),
        )
        .await;

        let id = created["_id"].as_str().unwrap().to_string();
        let kept = created["widgets"][0].clone();

        let (status, updated) = send_json(
            &app,
            "PUT",
            &format!("/v1/displays/{}", id),
            Some(json!({
                "widgets": [
                    { "_id": kept, "name": "A renamed", "type": "empty" },
                    { "name": "C", "type": "empty" }
                ]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["widgets"][0], kept);

        let (_, widgets) = send_json(&app, "GET", "/v1/widgets", None).await;
        let names: Vec<_> = widgets
            .as_array()
            .unwrap()
            .iter()
            .map(|w| w["name"].as_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["A renamed", "C"]);
    }

    #[tokio::test]
    async fn slideshows_resolve_their_slides() {
        let app = app();

        let (_, slide) = send_json(
            &app,
            "POST",
            "/v1/slides",
            Some(json!({ "name": "Menu", "type": "photo", "data": { "url": "menu.png" } })),
        )
        .await;

        assert_eq!(slide["effective_duration"], 10);

        let (status, show) = send_json(
            &app,
            "POST",
            "/v1/slideshows",
            Some(json!({ "name": "Cafeteria", "slides": [slide["_id"]] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let id = show["_id"].as_str().unwrap();
        let (_, resolved) = send_json(&app, "GET", &format!("/v1/slideshows/{}", id), None).await;

        assert_eq!(resolved["slides"][0]["name"], "Menu");

        let (status, _) = send(
            &app,
            "POST",
            &format!("/v1/slideshows/{}/reorder", id),
            Some(json!({ "old_index": 0, "new_index": 4 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn slideshow_widgets_must_reference_existing_slideshows() {
        let app = app();

        let (status, body) = send(
            &app,
            "POST",
            "/v1/widgets",
            Some(json!({
                "name": "Show",
                "type": "slideshow",
                "data": { "slideshow_id": "000000000000000000000000" }
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8(body).unwrap().contains("doesn't exist"));
    }

    #[tokio::test]
    async fn api_docs_are_served() {
        let app = app();
        let (status, docs) = send_json(&app, "GET", "/api.json", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(docs["paths"]["/v1/displays/{id}/events"].is_object());
    }
}
