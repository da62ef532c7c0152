use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

use engine::{Engine, users, visited_countries};
use migration::MigratorTrait;
use server::{ServerConfig, ServerState, WriteGate};

struct TestApp {
    router: Router,
    db: DatabaseConnection,
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn app_with_gate(gate: WriteGate) -> TestApp {
    let (engine, db) = engine_with_db().await;

    let config = ServerConfig {
        gate: gate.clone(),
        ..ServerConfig::default()
    };
    let state = ServerState {
        engine: Arc::new(engine),
        gate: Arc::new(gate),
    };
    TestApp {
        router: server::router(state, &config),
        db,
    }
}

async fn app() -> TestApp {
    app_with_gate(WriteGate::disabled()).await
}

fn bare_post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Option<String>, String) {
        let res = self.router.clone().oneshot(request).await.unwrap();
        let status = res.status();
        let location = res
            .headers()
            .get(header::LOCATION)
            .map(|value| value.to_str().unwrap().to_string());
        let body = res.into_body().collect().await.unwrap().to_bytes();
        (status, location, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn post(&self, uri: &str, body: &str) -> (StatusCode, Option<String>, String) {
        self.send(form(uri, body)).await
    }

    async fn index(&self) -> String {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, _, body) = self.send(request).await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    async fn user_ids(&self) -> Vec<i32> {
        users::Entity::find()
            .all(&self.db)
            .await
            .unwrap()
            .into_iter()
            .map(|user| user.id)
            .collect()
    }
}

#[tokio::test]
async fn empty_database_renders_empty_state() {
    let app = app().await;
    let page = app.index().await;
    assert!(page.contains("No family members yet"));
}

#[tokio::test]
async fn scenario_create_add_delete() {
    let app = app().await;

    let (status, location, _) = app.post("/new", "name=Alice&color=%23ff0000").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/"));
    let page = app.index().await;
    assert!(page.contains("Alice"));
    assert!(page.contains("Total Countries: 0"));

    let (_, location, _) = app.post("/add", "country=France").await;
    assert_eq!(location.as_deref(), Some("/"));
    let page = app.index().await;
    assert!(page.contains("Total Countries: 1"));
    assert!(page.contains(r#"data-code="FR""#));

    let (_, location, _) = app.post("/add", "country=france").await;
    assert_eq!(location.as_deref(), Some("/?error=Country+already+exist"));
    assert!(app.index().await.contains("Total Countries: 1"));

    let id = app.user_ids().await[0];
    let (_, location, _) = app.post(&format!("/delete/{id}"), "").await;
    assert_eq!(location.as_deref(), Some("/"));
    assert!(app.index().await.contains("No family members yet"));
    assert_eq!(
        visited_countries::Entity::find().count(&app.db).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn add_reports_validation_and_lookup_errors() {
    let app = app().await;
    app.post("/new", "name=Alice").await;

    let (_, location, _) = app.post("/add", "country=+++").await;
    assert_eq!(location.as_deref(), Some("/?error=Invalid+Input"));

    let (_, location, _) = app.post("/add", "").await;
    assert_eq!(location.as_deref(), Some("/?error=Invalid+Input"));

    let (_, location, _) = app.post("/add", "country=Atlantis").await;
    assert_eq!(location.as_deref(), Some("/?error=Country+not+found"));
}

#[tokio::test]
async fn add_without_users_reports_missing_user() {
    let app = app().await;
    let (_, location, _) = app.post("/add", "country=France").await;
    assert_eq!(location.as_deref(), Some("/?error=No+user+selected"));
}

#[tokio::test]
async fn index_shows_error_param() {
    let app = app().await;
    let request = Request::builder()
        .uri("/?error=Enter+a+name")
        .body(Body::empty())
        .unwrap();
    let (status, _, page) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Enter a name"));
}

#[tokio::test]
async fn new_user_rejects_blank_and_duplicate_names() {
    let app = app().await;

    let (_, location, _) = app.post("/new", "name=+").await;
    assert_eq!(location.as_deref(), Some("/?error=Enter+a+name"));
    assert!(app.user_ids().await.is_empty());

    app.post("/new", "name=Alice").await;
    let (_, location, _) = app.post("/new", "name=Alice").await;
    assert_eq!(location.as_deref(), Some("/?error=User+already+exists"));
    assert_eq!(app.user_ids().await.len(), 1);
}

#[tokio::test]
async fn user_route_renders_form_or_switches() {
    let app = app().await;

    let (status, _, page) = app.post("/user", "add=new").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains(r#"action="/new""#));

    app.post("/new", "name=Alice").await;
    app.post("/add", "country=Japan").await;
    app.post("/new", "name=Bob").await;
    let alice = app.user_ids().await[0];

    let (_, location, _) = app.post("/user", &format!("user={alice}")).await;
    assert_eq!(location.as_deref(), Some("/"));
    assert!(app.index().await.contains(r#"data-code="JP""#));

    let (_, location, _) = app.post("/user", "user=abc").await;
    assert_eq!(location.as_deref(), Some("/?error=Invalid+user"));
}

#[tokio::test]
async fn delete_reports_bad_and_unknown_ids() {
    let app = app().await;

    let (_, location, _) = app.post("/delete/abc", "").await;
    assert_eq!(location.as_deref(), Some("/?error=Invalid+id"));

    let (_, location, _) = app.post("/delete/-3", "").await;
    assert_eq!(location.as_deref(), Some("/?error=Invalid+id"));

    let (_, location, _) = app.post("/delete/99", "").await;
    assert_eq!(location.as_deref(), Some("/?error=No+user+found"));
}

#[tokio::test]
async fn remove_deletes_visit_and_answers_json() {
    let app = app().await;
    app.post("/new", "name=Alice").await;
    app.post("/add", "country=Kenya").await;
    let alice = app.user_ids().await[0];

    let (status, _, body) = app
        .post("/remove", &format!("countryCode=KE&userId={alice}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, serde_json::json!({ "message": "Success" }));
    assert!(app.index().await.contains("Total Countries: 0"));
}

#[tokio::test]
async fn remove_with_missing_fields_redirects() {
    let app = app().await;

    let (status, location, _) = app.post("/remove", "countryCode=KE").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/?error=Invalid+Data"));

    let (_, location, _) = app.post("/remove", "countryCode=KE&userId=x").await;
    assert_eq!(location.as_deref(), Some("/?error=Invalid+Data"));
}

#[tokio::test]
async fn production_gate_blocks_writes_without_secret() {
    let app = app_with_gate(WriteGate::production(Some("s3cret".to_string()))).await;

    let (status, _, body) = app.post("/new", "name=Alice").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "Demo Mode - Write access disabled");
    assert!(app.user_ids().await.is_empty());

    let mut request = form("/new", "name=Alice");
    request
        .headers_mut()
        .insert("x-admin-key", "wrong".parse().unwrap());
    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.user_ids().await.is_empty());

    let mut request = form("/new", "name=Alice");
    request
        .headers_mut()
        .insert("x-admin-key", "s3cret".parse().unwrap());
    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(app.user_ids().await.len(), 1);

    assert!(app.index().await.contains("Alice"));
}

#[tokio::test]
async fn production_gate_rejects_undecodable_key() {
    let app = app_with_gate(WriteGate::production(Some("s3cret".to_string()))).await;

    let mut request = form("/new", "name=Alice");
    request.headers_mut().insert(
        "x-admin-key",
        header::HeaderValue::from_bytes(b"s3cr\xffet").unwrap(),
    );
    let (status, _, body) = app.send(request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "Demo Mode - Write access disabled");
    assert!(app.user_ids().await.is_empty());
}

#[tokio::test]
async fn posts_without_body_redirect_with_validation_errors() {
    let app = app().await;
    app.post("/new", "name=Alice").await;

    for (uri, location) in [
        ("/add", "/?error=Invalid+Input"),
        ("/user", "/?error=Invalid+user"),
        ("/new", "/?error=Enter+a+name"),
        ("/remove", "/?error=Invalid+Data"),
    ] {
        let (status, actual, _) = app.send(bare_post(uri)).await;
        assert_eq!(status, StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(actual.as_deref(), Some(location), "{uri}");
    }
    assert_eq!(app.user_ids().await.len(), 1);
}

#[tokio::test]
async fn database_failures_answer_500() {
    let app = app().await;
    app.post("/new", "name=Alice").await;
    let alice = app.user_ids().await[0];
    app.db
        .execute_unprepared("DROP TABLE visited_countries")
        .await
        .unwrap();

    let (status, _, body) = app
        .post("/remove", &format!("countryCode=KE&userId={alice}"))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, serde_json::json!({ "message": "Internal Server Error" }));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, _, body) = app.send(request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
}

#[tokio::test]
async fn spawned_server_answers_over_tcp() {
    let (engine, _db) = engine_with_db().await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server::spawn_with_listener(engine, ServerConfig::default(), listener).unwrap();

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("No family members yet"));
}
