use std::fmt;
use std::str::FromStr;

use listing::{Searchable, SortKey, Sortable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [&'static str; 2] = ["male", "female"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(other.to_string()),
        }
    }
}

/// Pure user model shared across layers (no serde/utoipa)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub age: u32,
    pub address: String,
    pub country: String,
    /// Always trimmed and lower-cased.
    pub email: String,
    pub phone: String,
    pub picture: String,
    pub thumbnail: String,
}

/// Data for creating a new user. `id` is synthesized when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: Option<String>,
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub age: u32,
    pub address: String,
    pub country: String,
    pub email: String,
    pub phone: String,
    pub picture: String,
    pub thumbnail: String,
}

/// Partial update data for a user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserPatch {
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub age: Option<u32>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub picture: Option<String>,
    pub thumbnail: Option<String>,
}

impl User {
    pub fn from_new(id: String, new: NewUser) -> Self {
        Self {
            id,
            title: new.title,
            first_name: new.first_name,
            last_name: new.last_name,
            gender: new.gender,
            age: new.age,
            address: new.address,
            country: new.country,
            email: normalize_email(&new.email),
            phone: new.phone,
            picture: new.picture,
            thumbnail: new.thumbnail,
        }
    }

    /// Shallow merge: every `Some` field of `patch` replaces the current value.
    pub fn apply(&mut self, patch: UserPatch) {
        let UserPatch {
            title,
            first_name,
            last_name,
            gender,
            age,
            address,
            country,
            email,
            phone,
            picture,
            thumbnail,
        } = patch;

        replace(&mut self.title, title);
        replace(&mut self.first_name, first_name);
        replace(&mut self.last_name, last_name);
        replace(&mut self.gender, gender);
        replace(&mut self.age, age);
        replace(&mut self.address, address);
        replace(&mut self.country, country);
        replace(&mut self.email, email.map(|e| normalize_email(&e)));
        replace(&mut self.phone, phone);
        replace(&mut self.picture, picture);
        replace(&mut self.thumbnail, thumbnail);
    }
}

fn replace<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Sortable for User {
    fn sort_key(&self, field: &str) -> SortKey<'_> {
        match field {
            "id" => self.id.as_str().into(),
            "title" => self.title.as_str().into(),
            "firstName" => self.first_name.as_str().into(),
            "lastName" => self.last_name.as_str().into(),
            "gender" => self.gender.as_str().into(),
            "age" => i64::from(self.age).into(),
            "address" => self.address.as_str().into(),
            "country" => self.country.as_str().into(),
            "email" => self.email.as_str().into(),
            "phone" => self.phone.as_str().into(),
            "picture" => self.picture.as_str().into(),
            "thumbnail" => self.thumbnail.as_str().into(),
            _ => SortKey::Missing,
        }
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.first_name, &self.last_name]
    }
}
