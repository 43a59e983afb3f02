//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers::user_handler::{
    BulkDeleteRequest, BulkDeleteResponse, ChangePasswordRequest, CreateUserRequest, LoginRequest,
    UpdateUserRequest,
};
use domain::UserResponse;

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::user_handler::list_users,
        crate::handlers::user_handler::create_user,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::update_user,
        crate::handlers::user_handler::delete_user,
        crate::handlers::user_handler::login,
        crate::handlers::user_handler::search_users,
        crate::handlers::user_handler::change_password,
        crate::handlers::user_handler::bulk_delete,
    ),
    components(
        schemas(
            CreateUserRequest,
            UpdateUserRequest,
            LoginRequest,
            ChangePasswordRequest,
            BulkDeleteRequest,
            BulkDeleteResponse,
            UserResponse,
        )
    ),
    tags(
        (name = "Users", description = "User management and credential endpoints"),
    )
)]
pub struct ApiDoc;
