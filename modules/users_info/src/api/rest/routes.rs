use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

/// Routes of the users API, relative to the ingress prefix.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/users/create-random", get(handlers::create_random_user))
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .layer(Extension(service))
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Userdesk users API",
        description = "Create, read, update and delete users; generate random users."
    ),
    paths(
        handlers::list_users,
        handlers::create_random_user,
        handlers::get_user,
        handlers::create_user,
        handlers::update_user,
        handlers::delete_user,
    ),
    components(schemas(
        dto::UserDto,
        dto::GenderDto,
        dto::CreateUserReq,
        dto::UpdateUserReq,
        api_problem::Problem,
    )),
    tags((name = "users", description = "User management"))
)]
pub struct UsersApiDoc;
