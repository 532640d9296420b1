use std::net::SocketAddr;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::state::AppState;
use crate::{auth, posts, profiles};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "API Working" }))
        .nest("/api",
              Router::new()
                  .merge(auth::router())
                  .merge(profiles::router())
                  .merge(posts::router())
                  .route("/health", get(|| async { "ok" }))
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "5000".into())
    )
        .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::extractors::TOKEN_HEADER;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(TOKEN_HEADER, token);
        }
        let req = match body {
            Some(body) => req
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn register(app: &Router, name: &str, email: &str) -> String {
        let (status, body) = call(
            app,
            "POST",
            "/api/users",
            None,
            Some(json!({ "name": name, "email": email, "password": "secret1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn register_login_and_fetch_identity() {
        let state = AppState::fake();
        let tokens = state.tokens.clone();
        let app = build_app(state);

        let reg_token = register(&app, "A", "a@x.com").await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/auth",
            None,
            Some(json!({ "email": "a@x.com", "password": "secret1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let login_token = body["token"].as_str().unwrap();
        assert_eq!(tokens.verify(&reg_token), tokens.verify(login_token));

        let (status, me) = call(&app, "GET", "/api/auth", Some(login_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "a@x.com");
        assert_eq!(me["name"], "A");
        assert!(me.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected_without_token() {
        let app = build_app(AppState::fake());
        register(&app, "A", "a@x.com").await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/users",
            None,
            Some(json!({ "name": "B", "email": "a@x.com", "password": "secret2" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("token").is_none());
        assert_eq!(body["errors"][0]["msg"], "User already exists");
    }

    #[tokio::test]
    async fn registration_validation_reports_fields() {
        let app = build_app(AppState::fake());
        let (status, body) = call(
            &app,
            "POST",
            "/api/users",
            None,
            Some(json!({ "email": "a@x.com", "password": "123" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let params: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["param"].as_str().unwrap())
            .collect();
        assert_eq!(params, vec!["name", "password"]);
    }

    #[tokio::test]
    async fn login_failures_share_one_response() {
        let app = build_app(AppState::fake());
        register(&app, "A", "a@x.com").await;

        let wrong_password = call(
            &app,
            "POST",
            "/api/auth",
            None,
            Some(json!({ "email": "a@x.com", "password": "wrong!!" })),
        )
        .await;
        let unknown_email = call(
            &app,
            "POST",
            "/api/auth",
            None,
            Some(json!({ "email": "nobody@x.com", "password": "secret1" })),
        )
        .await;
        assert_eq!(wrong_password.0, StatusCode::BAD_REQUEST);
        assert_eq!(wrong_password, unknown_email);
    }

    async fn send_raw(app: &Router, uri: &str, content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
        let mut req = Request::builder().method("POST").uri(uri);
        if let Some(content_type) = content_type {
            req = req.header("content-type", content_type);
        }
        let res = app
            .clone()
            .oneshot(req.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn undecodable_bodies_are_validation_errors() {
        let app = build_app(AppState::fake());

        let (status, body) = call(
            &app,
            "POST",
            "/api/users",
            None,
            Some(json!({ "name": "A", "email": "a@x.com", "password": 123456 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["param"], "body");

        let (status, body) = send_raw(
            &app,
            "/api/auth",
            Some("application/json"),
            r#"{"email": "a@x.com", "pass"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["param"], "body");
        assert_eq!(body["errors"][0]["msg"], "Request body is not valid JSON");

        let (status, body) = send_raw(
            &app,
            "/api/auth",
            None,
            r#"{"email": "a@x.com", "password": "secret1"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["param"], "body");
    }

    #[tokio::test]
    async fn private_routes_need_a_valid_token() {
        let app = build_app(AppState::fake());

        let (status, none) = call(&app, "GET", "/api/auth", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(none["msg"], "No token, authorization denied");

        let (status, bad) = call(&app, "GET", "/api/posts", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(bad["msg"], "Token is not valid");
    }

    #[tokio::test]
    async fn post_lifecycle_with_ownership() {
        let app = build_app(AppState::fake());
        let owner = register(&app, "Owner", "owner@x.com").await;
        let other = register(&app, "Other", "other@x.com").await;

        let (status, post) = call(
            &app,
            "POST",
            "/api/posts",
            Some(&owner),
            Some(json!({ "text": "hello world" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(post["name"], "Owner");
        let uri = format!("/api/posts/{}", post["id"].as_str().unwrap());
        let like_uri = format!("/api/posts/like/{}", post["id"].as_str().unwrap());

        let (status, likes) = call(&app, "PUT", &like_uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(likes.as_array().unwrap().len(), 1);
        let (status, likes) = call(&app, "PUT", &like_uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(likes.as_array().unwrap().is_empty());

        let (status, _) = call(&app, "DELETE", &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(&app, "DELETE", &uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["msg"], "Post removed");

        let (status, body) = call(&app, "GET", &uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["msg"], "Post not found");

        let (status, _) = call(&app, "GET", "/api/posts/not-a-uuid", Some(&owner), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn profile_upsert_entries_and_account_deletion() {
        let state = AppState::fake();
        let store = state.store.clone();
        let tokens = state.tokens.clone();
        let app = build_app(state);
        let token = register(&app, "A", "a@x.com").await;
        let user_id = tokens.verify(&token).unwrap();

        let (status, body) = call(&app, "POST", "/api/profiles", Some(&token), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);

        let (status, profile) = call(
            &app,
            "POST",
            "/api/profiles",
            Some(&token),
            Some(json!({ "status": "Developer", "skills": "rust, sql", "company": "Acme" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["skills"], json!(["rust", "sql"]));

        let (status, profile) = call(
            &app,
            "PUT",
            "/api/profiles/experience",
            Some(&token),
            Some(json!({ "title": "Engineer", "company": "Acme", "from": "2019-01-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let exp_id = profile["experience"][0]["id"].as_str().unwrap().to_string();

        let (status, view) = call(&app, "GET", "/api/profiles/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["company"], "Acme");
        assert_eq!(view["user"]["name"], "A");

        let (status, all) = call(&app, "GET", "/api/profiles", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 1);

        let (status, profile) = call(
            &app,
            "DELETE",
            &format!("/api/profiles/experience/{}", exp_id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(profile["experience"].as_array().unwrap().is_empty());

        call(&app, "POST", "/api/posts", Some(&token), Some(json!({ "text": "bye" }))).await;

        let (status, body) = call(&app, "DELETE", "/api/profiles", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["msg"], "User deleted");
        assert!(store.find_user_by_id(user_id).await.unwrap().is_none());
        assert!(store.find_profile(user_id).await.unwrap().is_none());
        assert!(store.list_posts().await.unwrap().is_empty());

        let (status, body) = call(&app, "GET", "/api/auth", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["msg"], "Token is not valid");

        let (status, _) = call(
            &app,
            "POST",
            "/api/profiles",
            Some(&token),
            Some(json!({ "status": "Developer", "skills": "rust" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(store.find_profile(user_id).await.unwrap().is_none());

        let (status, _) = call(
            &app,
            "GET",
            &format!("/api/profiles/user/{}", user_id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn liveness_routes() {
        let app = build_app(AppState::fake());
        let res = app
            .clone()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let res = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
