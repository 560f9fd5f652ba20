use listing::{ListQuery, SortDir};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::contract::model::{Gender, NewUser, User, UserPatch};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GenderDto {
    Male,
    Female,
}

impl From<Gender> for GenderDto {
    fn from(g: Gender) -> Self {
        match g {
            Gender::Male => GenderDto::Male,
            Gender::Female => GenderDto::Female,
        }
    }
}

impl From<GenderDto> for Gender {
    fn from(g: GenderDto) -> Self {
        match g {
            GenderDto::Male => Gender::Male,
            GenderDto::Female => Gender::Female,
        }
    }
}

/// REST DTO for user representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[schema(example = "aB3dE5fG7h")]
    pub id: String,
    #[schema(example = "Mr")]
    pub title: String,
    #[schema(example = "Jon")]
    pub first_name: String,
    #[schema(example = "Snow")]
    pub last_name: String,
    pub gender: GenderDto,
    #[schema(example = 33)]
    pub age: u32,
    pub address: String,
    pub country: String,
    #[schema(example = "jon.snow@example.com")]
    pub email: String,
    pub phone: String,
    pub picture: String,
    pub thumbnail: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            title: user.title,
            first_name: user.first_name,
            last_name: user.last_name,
            gender: user.gender.into(),
            age: user.age,
            address: user.address,
            country: user.country,
            email: user.email,
            phone: user.phone,
            picture: user.picture,
            thumbnail: user.thumbnail,
        }
    }
}

/// REST DTO for creating a new user. `id` is generated when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserReq {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: GenderDto,
    pub age: u32,
    pub address: String,
    pub country: String,
    pub email: String,
    pub phone: String,
    pub picture: String,
    pub thumbnail: String,
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            id: req.id,
            title: req.title,
            first_name: req.first_name,
            last_name: req.last_name,
            gender: req.gender.into(),
            age: req.age,
            address: req.address,
            country: req.country,
            email: req.email,
            phone: req.phone,
            picture: req.picture,
            thumbnail: req.thumbnail,
        }
    }
}

/// REST DTO for updating a user (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserReq {
    /// Must equal the id in the path when present.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<GenderDto>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl UpdateUserReq {
    /// Turn the body into a patch for the user at `path_id`.
    pub fn into_patch(self, path_id: &str) -> Result<UserPatch, DomainError> {
        if let Some(id) = self.id.as_deref().filter(|id| *id != path_id) {
            return Err(DomainError::validation(
                "id",
                format!("\"id\" must be [{path_id}]"),
                Some(serde_json::Value::String(id.to_string())),
            ));
        }

        Ok(UserPatch {
            title: self.title,
            first_name: self.first_name,
            last_name: self.last_name,
            gender: self.gender.map(Into::into),
            age: self.age,
            address: self.address,
            country: self.country,
            email: self.email,
            phone: self.phone,
            picture: self.picture,
            thumbnail: self.thumbnail,
        })
    }
}

/// Query parameters of `GET /users`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// 1-based page number, 1 to 10.
    #[param(minimum = 1, maximum = 10, example = 1)]
    pub page_number: u32,
    /// Users per page, 1 to 100.
    #[param(minimum = 1, maximum = 100, example = 10)]
    pub page_size: u32,
    /// Camel-case user field to sort by.
    #[param(example = "firstName")]
    pub sort_by: String,
    #[param(value_type = String, example = "asc")]
    pub sort_order: SortDir,
    /// Case-insensitive substring of the first or last name.
    #[serde(default)]
    pub search: Option<String>,
}

impl From<ListUsersQuery> for ListQuery {
    fn from(q: ListUsersQuery) -> Self {
        Self {
            page_number: q.page_number,
            page_size: q.page_size,
            sort_by: q.sort_by,
            sort_order: q.sort_order,
            search: q.search,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct UserIdPath {
    /// User id
    pub id: String,
}
