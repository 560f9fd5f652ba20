//! Error catalog of the users_info module: one entry per error kind the REST
//! API can return.

use api_problem::{ErrDef, Problem, ProblemResponse, RequestContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UserNotFound,
    EmailConflict,
    IdConflict,
    Validation,
    PayloadTooLarge,
    UpstreamFailure,
    GatewayUnavailable,
    Internal,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 8] = [
        ErrorCode::UserNotFound,
        ErrorCode::EmailConflict,
        ErrorCode::IdConflict,
        ErrorCode::Validation,
        ErrorCode::PayloadTooLarge,
        ErrorCode::UpstreamFailure,
        ErrorCode::GatewayUnavailable,
        ErrorCode::Internal,
    ];

    pub const fn def(self) -> ErrDef {
        match self {
            ErrorCode::UserNotFound => ErrDef {
                status: 404,
                code: "users_info.user.not_found.v1",
            },
            ErrorCode::EmailConflict => ErrDef {
                status: 409,
                code: "users_info.user.email_conflict.v1",
            },
            ErrorCode::IdConflict => ErrDef {
                status: 409,
                code: "users_info.user.id_conflict.v1",
            },
            ErrorCode::Validation => ErrDef {
                status: 400,
                code: "users_info.request.validation.v1",
            },
            ErrorCode::PayloadTooLarge => ErrDef {
                status: 413,
                code: "users_info.request.too_large.v1",
            },
            ErrorCode::UpstreamFailure => ErrDef {
                status: 502,
                code: "users_info.upstream.failure.v1",
            },
            ErrorCode::GatewayUnavailable => ErrDef {
                status: 502,
                code: "users_info.upstream.unavailable.v1",
            },
            ErrorCode::Internal => ErrDef {
                status: 500,
                code: "users_info.internal.v1",
            },
        }
    }

    pub const fn status(self) -> u16 {
        self.def().status
    }

    pub fn to_problem(self, message: impl Into<String>) -> Problem {
        self.def().to_problem(message)
    }

    pub fn to_response(self, message: impl Into<String>, ctx: &RequestContext) -> ProblemResponse {
        ProblemResponse(self.to_problem(message).in_context(ctx))
    }
}
