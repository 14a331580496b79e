use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use cinelog::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let state = cinelog::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    cinelog::api::router(state).await
}

async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn signup(app: &Router, username: &str, password: &str) {
    let response = post_json(
        app,
        "/signup",
        serde_json::json!({"username": username, "password": password}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_signup_and_login_flow() {
    let app = spawn_app().await;

    let response = post_json(
        &app,
        "/signup",
        serde_json::json!({"username": "alice", "password": "hunter2"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "User created");

    // Same username again is a client error.
    let response = post_json(
        &app,
        "/signup",
        serde_json::json!({"username": "alice", "password": "other"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);

    let response = post_json(
        &app,
        "/login",
        serde_json::json!({"username": "alice", "password": "hunter2"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["username"], "alice");

    let response = post_json(
        &app,
        "/login",
        serde_json::json!({"username": "alice", "password": "wrong"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Unknown users get the same response as a bad password.
    let response = post_json(
        &app,
        "/login",
        serde_json::json!({"username": "nobody", "password": "hunter2"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_rejects_blank_credentials() {
    let app = spawn_app().await;

    let response = post_json(
        &app,
        "/signup",
        serde_json::json!({"username": "  ", "password": "hunter2"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        &app,
        "/signup",
        serde_json::json!({"username": "dave", "password": ""}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_history_delete_round_trip() {
    let app = spawn_app().await;
    signup(&app, "alice", "hunter2").await;

    let response = post_json(
        &app,
        "/analyze",
        serde_json::json!({
            "movie": "Inception",
            "review": "I loved it",
            "username": "alice"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["sentiment"], "POSITIVE");
    let confidence = body["confidence"].as_str().unwrap();
    let percent = regex::Regex::new(r"^\d+\.\d{2}%$").unwrap();
    assert!(percent.is_match(confidence), "got {confidence}");
    assert!(body["explanation_html"].as_str().unwrap().contains("loved"));

    let response = get(&app, "/history/alice").await;
    assert_eq!(response.status(), StatusCode::OK);
    let rows = json_body(response).await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["movie"], "Inception");
    assert_eq!(rows[0]["owner"], "alice");
    assert_eq!(rows[0]["sentiment"], "POSITIVE");
    assert_eq!(rows[0]["confidence"], confidence);

    let id = rows[0]["id"].as_i64().unwrap();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/delete/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Deleted");

    let rows = json_body(get(&app, "/history/alice").await).await;
    assert_eq!(rows.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_analyze_explain_flag_omits_html() {
    let app = spawn_app().await;
    signup(&app, "bob", "pw").await;

    let response = post_json(
        &app,
        "/analyze",
        serde_json::json!({
            "movie": "Tenet",
            "review": "terrible and boring",
            "username": "bob",
            "explain": false
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["sentiment"], "NEGATIVE");
    assert!(body.get("explanation_html").is_none());
}

#[tokio::test]
async fn test_analyze_whitespace_review_has_no_explanation() {
    let app = spawn_app().await;
    signup(&app, "carol", "pw").await;

    let response = post_json(
        &app,
        "/analyze",
        serde_json::json!({
            "movie": "Blank",
            "review": "   ",
            "username": "carol"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    // Still classified and saved; there is just nothing to attribute.
    assert!(body.get("explanation_html").is_none());
    let rows = json_body(get(&app, "/history/carol").await).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_analyze_rejects_blank_username() {
    let app = spawn_app().await;

    let response = post_json(
        &app,
        "/analyze",
        serde_json::json!({
            "movie": "Ghost",
            "review": "fine",
            "username": ""
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_is_per_owner_and_newest_first() {
    let app = spawn_app().await;
    signup(&app, "alice", "pw").await;
    signup(&app, "bob", "pw").await;

    for (movie, review) in [("First", "great movie"), ("Second", "awful mess")] {
        let response = post_json(
            &app,
            "/analyze",
            serde_json::json!({
                "movie": movie,
                "review": review,
                "username": "alice",
                "explain": false
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let rows = json_body(get(&app, "/history/alice").await).await;
    let rows = rows.as_array().unwrap().clone();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["movie"], "Second");
    assert_eq!(rows[1]["movie"], "First");
    assert!(rows[0]["id"].as_i64().unwrap() > rows[1]["id"].as_i64().unwrap());

    // Reading again without intervening writes returns the same sequence.
    let again = json_body(get(&app, "/history/alice").await).await;
    assert_eq!(rows, *again.as_array().unwrap());

    let rows = json_body(get(&app, "/history/bob").await).await;
    assert_eq!(rows.as_array().unwrap().len(), 0);

    // Unknown owners are an empty history, not an error.
    let response = get(&app, "/history/nobody").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_update_reclassifies_and_renames() {
    let app = spawn_app().await;
    signup(&app, "alice", "pw").await;

    let response = post_json(
        &app,
        "/analyze",
        serde_json::json!({
            "movie": "Dune",
            "review": "a wonderful, brilliant film",
            "username": "alice",
            "explain": false
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let rows = json_body(get(&app, "/history/alice").await).await;
    let id = rows.as_array().unwrap()[0]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!(
                    "/update/{id}?new_movie_name=Dune+Part+Two&new_review_text=dull+and+terrible"
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Update successful");

    let rows = json_body(get(&app, "/history/alice").await).await;
    let rows = rows.as_array().unwrap().clone();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["movie"], "Dune Part Two");
    assert_eq!(rows[0]["sentiment"], "NEGATIVE");
}

#[tokio::test]
async fn test_update_and_delete_unknown_ids_are_silent() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/update/9999?new_movie_name=Ghost&new_review_text=fine")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/delete/9999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_concurrent_analyzes_get_distinct_ids() {
    let app = spawn_app().await;
    signup(&app, "alice", "pw").await;

    let first = post_json(
        &app,
        "/analyze",
        serde_json::json!({
            "movie": "A",
            "review": "good",
            "username": "alice",
            "explain": false
        }),
    );
    let second = post_json(
        &app,
        "/analyze",
        serde_json::json!({
            "movie": "B",
            "review": "bad",
            "username": "alice",
            "explain": false
        }),
    );

    let (first, second) = tokio::join!(first, second);
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);

    let rows = json_body(get(&app, "/history/alice").await).await;
    let rows = rows.as_array().unwrap().clone();
    assert_eq!(rows.len(), 2);
    assert_ne!(rows[0]["id"], rows[1]["id"]);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = spawn_app().await;

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}
