//! Validation tables for every users route.

use crate::api::rest::dto::{CreateUserReq, ListUsersQuery, UpdateUserReq, UserIdPath};
use crate::api::rest::validation::{FieldRule, HasSchema, Rule, Schema};
use crate::contract::model::Gender;
use crate::domain::schema::USER_FIELDS;

const ID: Rule = Rule::Text {
    min: 1,
    max: 1 << 20,
};
const TITLE: Rule = Rule::Text { min: 2, max: 10 };
const NAME: Rule = Rule::Text { min: 2, max: 100 };
const ADDRESS: Rule = Rule::Text { min: 10, max: 300 };
const COUNTRY: Rule = Rule::Text { min: 2, max: 100 };
const AGE: Rule = Rule::Integer { min: 18, max: 120 };
const GENDER: Rule = Rule::OneOf(&Gender::ALL);
const PHONE: Rule = Rule::Text {
    min: 1,
    max: usize::MAX,
};

pub static USER_ID_PARAMS: Schema = Schema {
    fields: &[FieldRule::required("id", ID)],
};

pub static CREATE_USER_BODY: Schema = Schema {
    fields: &[
        FieldRule::optional("id", ID),
        FieldRule::required("title", TITLE),
        FieldRule::required("firstName", NAME),
        FieldRule::required("lastName", NAME),
        FieldRule::required("gender", GENDER),
        FieldRule::required("age", AGE),
        FieldRule::required("address", ADDRESS),
        FieldRule::required("country", COUNTRY),
        FieldRule::required("email", Rule::Email),
        FieldRule::required("phone", PHONE),
        FieldRule::required("picture", Rule::Uri),
        FieldRule::required("thumbnail", Rule::Uri),
    ],
};

pub static UPDATE_USER_BODY: Schema = Schema {
    fields: &[
        FieldRule::optional("id", ID),
        FieldRule::optional("title", TITLE),
        FieldRule::optional("firstName", NAME),
        FieldRule::optional("lastName", NAME),
        FieldRule::optional("gender", GENDER),
        FieldRule::optional("age", AGE),
        FieldRule::optional("address", ADDRESS),
        FieldRule::optional("country", COUNTRY),
        FieldRule::optional("email", Rule::Email),
        FieldRule::optional("phone", PHONE),
        FieldRule::optional("picture", Rule::Uri),
        FieldRule::optional("thumbnail", Rule::Uri),
    ],
};

pub static LIST_USERS_QUERY: Schema = Schema {
    fields: &[
        FieldRule::required("pageNumber", Rule::Integer { min: 1, max: 10 }),
        FieldRule::required("pageSize", Rule::Integer { min: 1, max: 100 }),
        FieldRule::required("sortBy", Rule::OneOf(USER_FIELDS)),
        FieldRule::required("sortOrder", Rule::OneOf(&["asc", "desc"])),
        FieldRule::optional("search", Rule::Text { min: 1, max: 100 }),
    ],
};

impl HasSchema for UserIdPath {
    fn schema() -> &'static Schema {
        &USER_ID_PARAMS
    }
}

impl HasSchema for CreateUserReq {
    fn schema() -> &'static Schema {
        &CREATE_USER_BODY
    }
}

impl HasSchema for UpdateUserReq {
    fn schema() -> &'static Schema {
        &UPDATE_USER_BODY
    }
}

impl HasSchema for ListUsersQuery {
    fn schema() -> &'static Schema {
        &LIST_USERS_QUERY
    }
}
