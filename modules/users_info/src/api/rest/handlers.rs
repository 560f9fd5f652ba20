use std::sync::Arc;

use api_problem::{Problem, ProblemResponse, RequestContext};
use axum::{response::Json, Extension};
use tracing::info;

use crate::api::rest::dto::{CreateUserReq, ListUsersQuery, UpdateUserReq, UserDto, UserIdPath};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::validation::{ValidJson, ValidPath, ValidQuery};
use crate::domain::service::Service;

/// List users: filter, sort and page the collection.
#[utoipa::path(
    get,
    path = "/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users", body = [UserDto]),
        (status = 400, description = "Invalid query", body = Problem),
        (status = 500, description = "Internal server error", body = Problem)
    ),
    tag = "users",
    operation_id = "listUsers"
)]
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestContext,
    ValidQuery(query): ValidQuery<ListUsersQuery>,
) -> Result<Json<Vec<UserDto>>, ProblemResponse> {
    let users = svc
        .list_users(query.into())
        .await
        .map_err(|e| map_domain_error(&e, &ctx))?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// Fetch one user from the random-user service. The user is not stored.
#[utoipa::path(
    get,
    path = "/users/create-random",
    responses(
        (status = 200, description = "A freshly generated user", body = UserDto),
        (status = 502, description = "Random user service failed", body = Problem)
    ),
    tag = "users",
    operation_id = "createRandomUser"
)]
pub async fn create_random_user(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestContext,
) -> Result<Json<UserDto>, ProblemResponse> {
    let user = svc
        .create_random_user()
        .await
        .map_err(|e| map_domain_error(&e, &ctx))?;
    Ok(Json(UserDto::from(user)))
}

/// Get a specific user by id
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(UserIdPath),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 400, description = "Invalid id", body = Problem),
        (status = 404, description = "User not found", body = Problem)
    ),
    tag = "users",
    operation_id = "getUser"
)]
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestContext,
    ValidPath(path): ValidPath<UserIdPath>,
) -> Result<Json<UserDto>, ProblemResponse> {
    let user = svc
        .get_user(&path.id)
        .await
        .map_err(|e| map_domain_error(&e, &ctx))?;
    Ok(Json(UserDto::from(user)))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserReq,
    responses(
        (status = 200, description = "Created user", body = UserDto),
        (status = 400, description = "Invalid body", body = Problem),
        (status = 409, description = "Email or id already taken", body = Problem),
        (status = 413, description = "Body too large", body = Problem)
    ),
    tag = "users",
    operation_id = "createUser"
)]
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestContext,
    ValidJson(req): ValidJson<CreateUserReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!(email = %req.email, "Creating user");
    let user = svc
        .create_user(req.into())
        .await
        .map_err(|e| map_domain_error(&e, &ctx))?;
    Ok(Json(UserDto::from(user)))
}

/// Update an existing user (partial)
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(UserIdPath),
    request_body = UpdateUserReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 400, description = "Invalid id or body", body = Problem),
        (status = 404, description = "User not found", body = Problem),
        (status = 409, description = "Email already taken", body = Problem)
    ),
    tag = "users",
    operation_id = "updateUser"
)]
pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestContext,
    ValidPath(path): ValidPath<UserIdPath>,
    ValidJson(req): ValidJson<UpdateUserReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    let patch = req
        .into_patch(&path.id)
        .map_err(|e| map_domain_error(&e, &ctx))?;
    let user = svc
        .update_user(&path.id, patch)
        .await
        .map_err(|e| map_domain_error(&e, &ctx))?;
    Ok(Json(UserDto::from(user)))
}

/// Delete a user and return the removed record
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(UserIdPath),
    responses(
        (status = 200, description = "Deleted user", body = UserDto),
        (status = 400, description = "Invalid id", body = Problem),
        (status = 404, description = "User not found", body = Problem)
    ),
    tag = "users",
    operation_id = "deleteUser"
)]
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestContext,
    ValidPath(path): ValidPath<UserIdPath>,
) -> Result<Json<UserDto>, ProblemResponse> {
    let user = svc
        .delete_user(&path.id)
        .await
        .map_err(|e| map_domain_error(&e, &ctx))?;
    Ok(Json(UserDto::from(user)))
}
