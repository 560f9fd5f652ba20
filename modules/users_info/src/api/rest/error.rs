use api_problem::{ProblemResponse, RequestContext};
use tracing::{error, warn};

use crate::domain::error::DomainError;
use crate::errors::ErrorCode;

fn code_for(e: &DomainError) -> ErrorCode {
    match e {
        DomainError::UserNotFound { .. } => ErrorCode::UserNotFound,
        DomainError::EmailAlreadyExists { .. } => ErrorCode::EmailConflict,
        DomainError::IdAlreadyExists { .. } => ErrorCode::IdConflict,
        DomainError::Validation { .. } => ErrorCode::Validation,
        DomainError::Upstream { .. } => ErrorCode::UpstreamFailure,
        DomainError::Gateway { .. } => ErrorCode::GatewayUnavailable,
        DomainError::Internal { .. } => ErrorCode::Internal,
    }
}

/// Map a domain error to its HTTP problem response and log it.
///
/// This is the only place where a [`DomainError`] becomes an HTTP status.
pub fn map_domain_error(e: &DomainError, ctx: &RequestContext) -> ProblemResponse {
    let code = code_for(e);

    match e {
        DomainError::Upstream { status, message } => {
            error!(
                upstream_status = status,
                instance = %ctx.instance,
                "random user service failed: {message}"
            );
        }
        DomainError::Gateway { .. } | DomainError::Internal { .. } => {
            error!(instance = %ctx.instance, code = code.def().code, "{e}");
        }
        _ => {
            warn!(instance = %ctx.instance, code = code.def().code, "{e}");
        }
    }

    let message = match e {
        DomainError::Internal { .. } => "Internal server error".to_string(),
        other => other.to_string(),
    };
    let resp = code.to_response(message, ctx);
    match e {
        DomainError::Validation {
            invalid_value: Some(value),
            ..
        } => ProblemResponse(resp.0.with_invalid_value(value.clone())),
        _ => resp,
    }
}
