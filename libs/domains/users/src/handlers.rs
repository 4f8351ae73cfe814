use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{ErrorResponse, ValidatedJson};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::models::{Technology, User, UserInput};
use crate::repository::UserRepository;
use crate::service::UserService;

/// Mount point of [`router`].
pub const USERS_PATH: &str = "/v1/user";

const TAG: &str = "users";

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, modify_user, delete_user),
    components(schemas(User, UserInput, Technology, ErrorResponse)),
    tags(
        (name = TAG, description = "User management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the user router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{email}",
            get(get_user).put(modify_user).delete(delete_user),
        )
        .with_state(shared_service)
}

/// List users
///
/// Active users of any technology unless filtered otherwise.
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(
        ("technology" = Option<String>, Query, description = "`*` or one of go, java, js, php"),
        ("deleted" = Option<String>, Query, description = "`*`, yes, no, true or false")
    ),
    responses(
        (status = 200, description = "Matching users", body = Vec<User>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Query(query): Query<HashMap<String, String>>,
) -> UserResult<Json<Vec<User>>> {
    let users = service.list_users(&query).await?;
    Ok(Json(users))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = UserInput,
    responses(
        (status = 204, description = "User created",
            headers(("Location" = String, description = "Path of the new user"))),
        (status = 400, description = "Malformed or invalid user", body = ErrorResponse),
        (status = 409, description = "Email already used by an active user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<UserInput>,
) -> UserResult<impl IntoResponse> {
    let email = service.create_user(input).await?;
    let location = user_location(&email);

    Ok((StatusCode::NO_CONTENT, [(header::LOCATION, location)]))
}

/// Path of the user at `email`, with the email encoded as one path segment.
pub fn user_location(email: &str) -> String {
    format!("{}/{}", USERS_PATH, urlencoding::encode(email))
}

/// Get an active user by email
#[utoipa::path(
    get,
    path = "/{email}",
    tag = TAG,
    params(
        ("email" = String, Path, description = "User email")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "No active user with this email", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(email): Path<String>,
) -> UserResult<Json<User>> {
    let user = service.get_user(&email).await?;
    Ok(Json(user))
}

/// Replace an active user
#[utoipa::path(
    put,
    path = "/{email}",
    tag = TAG,
    params(
        ("email" = String, Path, description = "User email, must equal the payload email")
    ),
    request_body = UserInput,
    responses(
        (status = 204, description = "User modified"),
        (status = 400, description = "Malformed or invalid user", body = ErrorResponse),
        (status = 404, description = "No active user with this email", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn modify_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(email): Path<String>,
    ValidatedJson(input): ValidatedJson<UserInput>,
) -> UserResult<StatusCode> {
    service.modify_user(&email, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Soft-delete an active user
#[utoipa::path(
    delete,
    path = "/{email}",
    tag = TAG,
    params(
        ("email" = String, Path, description = "User email")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "No active user with this email", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(email): Path<String>,
) -> UserResult<StatusCode> {
    service.delete_user(&email).await?;
    Ok(StatusCode::NO_CONTENT)
}
