//! Authentication collaborator seam.
//!
//! Session issuance and verification are external to this pipeline: the
//! surrounding application authenticates the request and hands us an identity
//! plus role. [`auth_context_middleware`] materializes that hand-off from
//! trusted gateway headers into an [`AuthContext`] request extension;
//! handlers extract it via `FromRequestParts`.

use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::http::{request::Parts, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;
use designmart_core::AppError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ErrorResponse;

/// User role for authorization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Designer,
    Buyer,
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Designer => write!(f, "designer"),
            UserRole::Buyer => write!(f, "buyer"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "designer" => Ok(UserRole::Designer),
            "buyer" => Ok(UserRole::Buyer),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Authenticated identity stored in request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    /// Whether the uploader account has been approved by an admin.
    pub approved: bool,
}

impl AuthContext {
    /// The review queue and administrative delete require this permission.
    pub fn require_manage_designs(&self) -> Result<(), AppError> {
        if self.role != UserRole::Admin {
            return Err(AppError::Forbidden(
                "Missing manage_designs permission".to_string(),
            ));
        }
        Ok(())
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse {
                        error: "Authentication required".to_string(),
                        code: "UNAUTHORIZED".to_string(),
                    }),
                )
            })
    }
}

fn context_from_headers(headers: &HeaderMap) -> Option<AuthContext> {
    let user_id = headers
        .get("x-user-id")?
        .to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v).ok())?;
    let role = headers
        .get("x-user-role")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| UserRole::from_str(v).ok())?;
    let email = headers
        .get("x-user-email")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let approved = headers
        .get("x-user-approved")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    Some(AuthContext {
        user_id,
        email,
        role,
        approved,
    })
}

/// Insert the authenticated identity from the gateway's trusted headers.
/// Requests without the headers simply carry no context; extraction then
/// rejects with 401 on the routes that need one.
pub async fn auth_context_middleware(mut request: Request, next: Next) -> Response {
    if let Some(ctx) = context_from_headers(request.headers()) {
        request.extensions_mut().insert(ctx);
    }
    next.run(request).await
}
