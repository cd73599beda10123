use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::envelope::failure;
use crate::marketplace::domain::UserId;
use crate::marketplace::identity::{Principal, Role};

/// Header carrying the authenticated user id, set by the identity gate.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the authenticated role, set by the identity gate.
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalRejection {
    MissingIdentity,
    UnknownRole,
}

impl IntoResponse for PrincipalRejection {
    fn into_response(self) -> Response {
        let message = match self {
            PrincipalRejection::MissingIdentity => "authentication required",
            PrincipalRejection::UnknownRole => "unrecognized account role",
        };
        failure(StatusCode::UNAUTHORIZED, "unauthenticated", message, None)
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = PrincipalRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header(parts, USER_ID_HEADER).ok_or(PrincipalRejection::MissingIdentity)?;
        let role = header(parts, USER_ROLE_HEADER).ok_or(PrincipalRejection::MissingIdentity)?;
        let role = Role::parse(role).ok_or(PrincipalRejection::UnknownRole)?;
        Ok(Principal {
            id: UserId(id.to_string()),
            role,
        })
    }
}
