//! Field tables describing the internal user record.

/// One internal field and where it lives in an external record.
///
/// `path` is a dot-separated walk into the external JSON; `None` reads the
/// key named `field` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath {
    pub field: &'static str,
    pub path: Option<&'static str>,
}

const fn direct(field: &'static str) -> FieldPath {
    FieldPath { field, path: None }
}

const fn nested(field: &'static str, path: &'static str) -> FieldPath {
    FieldPath {
        field,
        path: Some(path),
    }
}

/// External random-user record → flat record, in output order.
pub const EXTERNAL_FIELDS: &[FieldPath] = &[
    nested("id", "id.value"),
    nested("title", "name.title"),
    nested("firstName", "name.first"),
    nested("lastName", "name.last"),
    nested("streetName", "location.street.name"),
    nested("streetNumber", "location.street.number"),
    nested("city", "location.city"),
    nested("state", "location.state"),
    nested("country", "location.country"),
    nested("age", "dob.age"),
    direct("gender"),
    direct("email"),
    direct("phone"),
    nested("picture", "picture.large"),
    nested("thumbnail", "picture.thumbnail"),
];

/// Field names of the internal record; the accepted `sortBy` values.
pub const USER_FIELDS: &[&str] = &[
    "id",
    "title",
    "firstName",
    "lastName",
    "gender",
    "age",
    "address",
    "country",
    "email",
    "phone",
    "picture",
    "thumbnail",
];
