//! Request validation driven by declarative schemas.
//!
//! A [`Schema`] is a static table of [`FieldRule`]s. [`Schema::validate`]
//! interprets it against a JSON object and stops at the first violated rule.
//! The extractors at the bottom of this module run a schema before the typed
//! value ever reaches a handler.

use std::collections::HashMap;

use api_problem::{ProblemResponse, RequestContext};
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use validator::{ValidateEmail, ValidateUrl};

use crate::api::rest::error::map_domain_error;
use crate::domain::error::DomainError;
use crate::errors::ErrorCode;

/// Constraint on a single field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// String whose length in characters lies in `min..=max`.
    Text { min: usize, max: usize },
    /// Integer in `min..=max`. Numeric strings are coerced.
    Integer { min: i64, max: i64 },
    OneOf(&'static [&'static str]),
    Email,
    Uri,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub rule: Rule,
    pub required: bool,
}

impl FieldRule {
    pub const fn required(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            rule,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            rule,
            required: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [FieldRule],
}

impl Schema {
    /// Check `input` against every rule in declared order, then reject keys
    /// the schema does not know.
    ///
    /// Returns the accepted fields with coerced values.
    pub fn validate(&self, input: &Map<String, Value>) -> Result<Map<String, Value>, DomainError> {
        let mut accepted = Map::new();

        for field in self.fields {
            match input.get(field.name) {
                None if field.required => {
                    return Err(DomainError::validation(
                        field.name,
                        format!("\"{}\" is required", field.name),
                        None,
                    ));
                }
                None => {}
                Some(value) => {
                    let value = field.rule.check(field.name, value)?;
                    accepted.insert(field.name.to_string(), value);
                }
            }
        }

        if let Some((key, value)) = input
            .iter()
            .find(|(key, _)| !self.fields.iter().any(|f| f.name == key.as_str()))
        {
            return Err(DomainError::validation(
                key.as_str(),
                format!("\"{key}\" is not allowed"),
                Some(value.clone()),
            ));
        }

        Ok(accepted)
    }
}

impl Rule {
    fn check(&self, name: &str, value: &Value) -> Result<Value, DomainError> {
        let fail = |reason: String| {
            DomainError::validation(name, format!("\"{name}\" {reason}"), Some(value.clone()))
        };

        match *self {
            Rule::Text { min, max } => {
                let s = as_text(value).ok_or_else(|| fail("must be a string".into()))?;
                let len = s.chars().count();
                if len == 0 {
                    return Err(fail("is not allowed to be empty".into()));
                }
                if len < min {
                    return Err(fail(format!(
                        "length must be at least {min} characters long"
                    )));
                }
                if len > max {
                    return Err(fail(format!(
                        "length must be less than or equal to {max} characters long"
                    )));
                }
                Ok(value.clone())
            }
            Rule::Integer { min, max } => {
                let n = as_number(value).ok_or_else(|| fail("must be a number".into()))?;
                if !n.is_finite() || n.fract() != 0.0 {
                    return Err(fail("must be an integer".into()));
                }
                if n < min as f64 {
                    return Err(fail(format!("must be greater than or equal to {min}")));
                }
                if n > max as f64 {
                    return Err(fail(format!("must be less than or equal to {max}")));
                }
                Ok(Value::Number(Number::from(n as i64)))
            }
            Rule::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => Ok(value.clone()),
                _ => Err(fail(format!("must be one of [{}]", allowed.join(", ")))),
            },
            Rule::Email => {
                let s = as_text(value).ok_or_else(|| fail("must be a string".into()))?;
                if s.is_empty() {
                    return Err(fail("is not allowed to be empty".into()));
                }
                if !s.validate_email() {
                    return Err(fail("must be a valid email".into()));
                }
                Ok(value.clone())
            }
            Rule::Uri => {
                let s = as_text(value).ok_or_else(|| fail("must be a string".into()))?;
                if s.is_empty() {
                    return Err(fail("is not allowed to be empty".into()));
                }
                if !s.validate_url() {
                    return Err(fail("must be a valid uri".into()));
                }
                Ok(value.clone())
            }
        }
    }
}

fn as_text(value: &Value) -> Option<&str> {
    value.as_str()
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}

/// Types that declare the schema their raw input must satisfy.
pub trait HasSchema: DeserializeOwned {
    fn schema() -> &'static Schema;
}

fn into_typed<T: HasSchema>(
    location: &str,
    raw: &Map<String, Value>,
    ctx: &RequestContext,
) -> Result<T, ProblemResponse> {
    let accepted = T::schema()
        .validate(raw)
        .map_err(|e| map_domain_error(&e, ctx))?;
    serde_json::from_value(Value::Object(accepted)).map_err(|e| {
        map_domain_error(
            &DomainError::validation(location, format!("\"{location}\" {e}"), None),
            ctx,
        )
    })
}

fn strings_to_map(pairs: HashMap<String, String>) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

/// JSON body extractor that runs `T::schema()` first.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: HasSchema,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let ctx = RequestContext::from_parts(&parts);
        let req = Request::from_parts(parts, body);

        let value = match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => value,
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(ErrorCode::PayloadTooLarge.to_response(rejection.body_text(), &ctx));
            }
            Err(rejection) => {
                return Err(map_domain_error(
                    &DomainError::validation("body", rejection.body_text(), None),
                    &ctx,
                ));
            }
        };

        match value {
            Value::Object(map) => into_typed("body", &map, &ctx).map(ValidJson),
            other => Err(map_domain_error(
                &DomainError::validation("body", "\"body\" must be of type object", Some(other)),
                &ctx,
            )),
        }
    }
}

/// Query string extractor that runs `T::schema()` first.
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: HasSchema,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext::from_parts(parts);
        let Query(pairs) =
            Query::<HashMap<String, String>>::try_from_uri(&parts.uri).map_err(|rejection| {
                map_domain_error(
                    &DomainError::validation("query", rejection.body_text(), None),
                    &ctx,
                )
            })?;
        into_typed("query", &strings_to_map(pairs), &ctx).map(ValidQuery)
    }
}

/// Path parameters extractor that runs `T::schema()` first.
#[derive(Debug, Clone)]
pub struct ValidPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    S: Send + Sync,
    T: HasSchema,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext::from_parts(parts);
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                map_domain_error(
                    &DomainError::validation("params", rejection.body_text(), None),
                    &ctx,
                )
            })?;
        into_typed("params", &strings_to_map(params), &ctx).map(ValidPath)
    }
}
