use domain_users::handlers::USERS_PATH;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Users API",
        version = "0.1.0",
        description = "CRUD over user records keyed by email, with soft delete"
    ),
    nest(
        (path = USERS_PATH, api = domain_users::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;
