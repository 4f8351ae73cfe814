//! HTTP behaviour of the users router, driven with `oneshot`.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use domain_users::{
    InMemoryUserRepository, User, UserError, UserFilter, UserRepository, UserResult, UserService,
    handlers,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_utils::TestDataBuilder;
use test_utils::assertions::{assert_mentions, assert_some};
use tower::ServiceExt;

struct TestApp {
    router: Router,
}

struct TestResponse {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

impl TestApp {
    fn new() -> Self {
        Self::with_repository(InMemoryUserRepository::new())
    }

    fn with_repository<R: UserRepository + 'static>(repository: R) -> Self {
        let service = UserService::new(repository);
        Self {
            router: Router::new().nest(handlers::USERS_PATH, handlers::router(service)),
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<String>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body)
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    async fn post(&self, body: &Value) -> TestResponse {
        self.send(Method::POST, "/v1/user", Some(body.to_string()))
            .await
    }

    async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }
}

#[tokio::test]
async fn test_create_returns_location() {
    let app = TestApp::new();
    let data = TestDataBuilder::from_test_name("test_create_returns_location");
    let email = data.email("main");

    let response = app.post(&data.user_json(&email, "go")).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(
        response.location,
        Some(format!("/v1/user/{}", email.replace('@', "%40")))
    );

    let fetched = app.get(&format!("/v1/user/{}", email)).await;
    assert_eq!(fetched.status, StatusCode::OK);
    let user = fetched.json();
    assert_eq!(user["email"], email.as_str());
    assert_eq!(user["technology"], "go");
    assert!(user.get("deleted").is_none());
}

#[tokio::test]
async fn test_location_of_email_with_reserved_characters_resolves() {
    let app = TestApp::new();
    let data = TestDataBuilder::from_test_name("test_location_of_email_with_reserved_characters");
    let email = "a?b#c/d@x.y";

    let response = app.post(&data.user_json(email, "js")).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let location = assert_some(response.location, "Location header");
    assert_eq!(location, "/v1/user/a%3Fb%23c%2Fd%40x.y");

    let fetched = app.get(&location).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json()["email"], email);

    let deleted = app.send(Method::DELETE, &location, None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_location_of_email_with_control_character_is_sent() {
    let app = TestApp::new();
    let data = TestDataBuilder::from_test_name("test_location_of_email_with_control_character");
    let email = "john@smith.name\n";

    let response = app.post(&data.user_json(email, "go")).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let location = assert_some(response.location, "Location header");

    assert_eq!(app.get(&location).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_missing_field_names_it() {
    let app = TestApp::new();
    let data = TestDataBuilder::from_test_name("test_create_missing_field_names_it");

    for field in [
        "name",
        "surname",
        "email",
        "password",
        "birthday",
        "address",
        "technology",
    ] {
        let mut body = data.user_json(&data.email(field), "php");
        body.as_object_mut().unwrap().remove(field);

        let response = app.post(&body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "without {}", field);
        assert_mentions(&response.body, field, "missing field");
    }
}

#[tokio::test]
async fn test_create_invalid_values_name_the_field() {
    let app = TestApp::new();
    let data = TestDataBuilder::from_test_name("test_create_invalid_values_name_the_field");

    let bad_email = data.user_json("not-an-email", "go");
    let response = app.post(&bad_email).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_mentions(&response.body, "email", "email without @");

    let bad_technology = data.user_json(&data.email("tech"), "cobol");
    let response = app.post(&bad_technology).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_mentions(&response.body, "technology", "unknown technology");

    let mut with_deleted = data.user_json(&data.email("deleted"), "go");
    with_deleted["deleted"] = json!("2020-01-01T00:00:00Z");
    let response = app.post(&with_deleted).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_mentions(&response.body, "deleted", "deleted supplied");
}

#[tokio::test]
async fn test_create_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let response = app
        .send(Method::POST, "/v1/user", Some("{\"name\":".to_string()))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_duplicate_is_conflict() {
    let app = TestApp::new();
    let data = TestDataBuilder::from_test_name("test_create_duplicate_is_conflict");
    let email = data.email("main");

    assert_eq!(
        app.post(&data.user_json(&email, "go")).await.status,
        StatusCode::NO_CONTENT
    );
    let response = app.post(&data.user_json(&email, "js")).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.json()["error"], "CONFLICT");
}

#[tokio::test]
async fn test_list_empty_is_empty_array() {
    let app = TestApp::new();
    let response = app.get("/v1/user").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "[]");
}

#[tokio::test]
async fn test_list_applies_filter() {
    let app = TestApp::new();
    let data = TestDataBuilder::from_test_name("test_list_applies_filter");
    let go = data.email("go");
    let php = data.email("php");

    app.post(&data.user_json(&go, "go")).await;
    app.post(&data.user_json(&php, "php")).await;
    app.send(Method::DELETE, &format!("/v1/user/{}", php), None)
        .await;

    let active = app.get("/v1/user").await.json();
    assert_eq!(active.as_array().unwrap().len(), 1);
    assert_eq!(active[0]["email"], go.as_str());

    let deleted = app.get("/v1/user?deleted=yes").await.json();
    assert_eq!(deleted.as_array().unwrap().len(), 1);
    assert_eq!(deleted[0]["email"], php.as_str());
    assert!(deleted[0]["deleted"].is_string());

    let everyone = app.get("/v1/user?deleted=*&technology=*").await.json();
    assert_eq!(everyone.as_array().unwrap().len(), 2);

    let php_any = app.get("/v1/user?technology=php&deleted=*").await.json();
    assert_eq!(php_any.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_bad_filter_is_bad_request() {
    let app = TestApp::new();

    let response = app.get("/v1/user?technology=FOOBAR").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_mentions(&response.body, "technology", "bad technology filter");

    let response = app.get("/v1/user?deleted=FOOBAR").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_mentions(&response.body, "deleted", "bad deleted filter");
}

#[tokio::test]
async fn test_get_unknown_is_not_found() {
    let app = TestApp::new();
    let response = app.get("/v1/user/ghost@example.com").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_modify_then_get() {
    let app = TestApp::new();
    let data = TestDataBuilder::from_test_name("test_modify_then_get");
    let email = data.email("main");
    let uri = format!("/v1/user/{}", email);

    app.post(&data.user_json(&email, "go")).await;

    let mut changed = data.user_json(&email, "java");
    changed["phone"] = json!("+49 30 1234");
    let response = app
        .send(Method::PUT, &uri, Some(changed.to_string()))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let user = app.get(&uri).await.json();
    assert_eq!(user["technology"], "java");
    assert_eq!(user["phone"], "+49 30 1234");
}

#[tokio::test]
async fn test_modify_email_mismatch_is_bad_request() {
    let app = TestApp::new();
    let data = TestDataBuilder::from_test_name("test_modify_email_mismatch_is_bad_request");
    let email = data.email("main");

    app.post(&data.user_json(&email, "go")).await;

    let other = data.user_json(&data.email("other"), "go");
    let response = app
        .send(
            Method::PUT,
            &format!("/v1/user/{}", email),
            Some(other.to_string()),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_mentions(&response.body, "email", "email mismatch");
}

#[tokio::test]
async fn test_modify_unknown_is_not_found() {
    let app = TestApp::new();
    let data = TestDataBuilder::from_test_name("test_modify_unknown_is_not_found");
    let email = data.email("ghost");

    let response = app
        .send(
            Method::PUT,
            &format!("/v1/user/{}", email),
            Some(data.user_json(&email, "go").to_string()),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_twice() {
    let app = TestApp::new();
    let data = TestDataBuilder::from_test_name("test_delete_twice");
    let email = data.email("main");
    let uri = format!("/v1/user/{}", email);

    app.post(&data.user_json(&email, "go")).await;

    let first = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(first.status, StatusCode::NO_CONTENT);

    let second = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(second.status, StatusCode::NOT_FOUND);

    assert_eq!(app.get(&uri).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_email_reusable_after_delete() {
    let app = TestApp::new();
    let data = TestDataBuilder::from_test_name("test_email_reusable_after_delete");
    let email = data.email("main");

    app.post(&data.user_json(&email, "go")).await;
    app.send(Method::DELETE, &format!("/v1/user/{}", email), None)
        .await;

    let response = app.post(&data.user_json(&email, "php")).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
}

/// Storage whose every call fails.
struct BrokenRepository;

#[async_trait]
impl UserRepository for BrokenRepository {
    async fn list(&self, _filter: UserFilter) -> UserResult<Vec<User>> {
        Err(UserError::Internal("connection reset".to_string()))
    }

    async fn get(&self, _email: &str) -> UserResult<Option<User>> {
        Err(UserError::Internal("connection reset".to_string()))
    }

    async fn create(&self, _user: User) -> UserResult<()> {
        Err(UserError::Internal("connection reset".to_string()))
    }

    async fn modify(&self, _user: User) -> UserResult<()> {
        Err(UserError::Internal("connection reset".to_string()))
    }

    async fn delete(&self, _email: &str) -> UserResult<()> {
        Err(UserError::Internal("connection reset".to_string()))
    }

    async fn close(&self) -> UserResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_storage_failure_is_internal_error_on_every_endpoint() {
    let app = TestApp::with_repository(BrokenRepository);
    let data = TestDataBuilder::from_test_name("test_storage_failure_is_internal_error");
    let email = data.email("main");
    let uri = format!("/v1/user/{}", email);
    let body = data.user_json(&email, "go").to_string();

    let responses = [
        ("list", app.get("/v1/user").await),
        ("get", app.get(&uri).await),
        (
            "create",
            app.send(Method::POST, "/v1/user", Some(body.clone())).await,
        ),
        ("modify", app.send(Method::PUT, &uri, Some(body)).await),
        ("delete", app.send(Method::DELETE, &uri, None).await),
    ];

    for (operation, response) in responses {
        assert_eq!(
            response.status,
            StatusCode::INTERNAL_SERVER_ERROR,
            "{}",
            operation
        );
        assert_eq!(response.json()["error"], "INTERNAL_ERROR", "{}", operation);
        assert!(
            !response.body.contains("connection reset"),
            "{} leaked the cause",
            operation
        );
    }
}
