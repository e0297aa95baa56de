//! Token issuance and bearer-token verification.
//!
//! Tokens are HS256 JWTs signed with the configured secret and valid for one
//! hour. Protected routes run [`require_auth`], which stores the decoded
//! [`Claims`] in the request extensions for [`CurrentUser`] to pick up.

use axum::Json;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Demo account accepted by the login route.
pub const DEMO_USERNAME: &str = "testuser";

/// Password of the demo account.
pub const DEMO_PASSWORD: &str = "password123";

/// Token lifetime in seconds.
pub const TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// Payload of an issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub id: u64,
    /// User name
    pub name: String,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

/// Authentication failures.
///
/// Every variant except [`AuthError::Encoding`] maps to `401 Unauthorized`
/// with a JSON body `{message, reason}`.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Username or password did not match.
    #[error("Invalid username or password")]
    BadCredentials,

    /// No `Authorization` header.
    #[error("Access denied: an authentication token is required")]
    MissingToken,

    /// `Authorization` header present but not `Bearer <token>`.
    #[error("Access denied: the Authorization header must be 'Bearer <token>'")]
    MalformedToken,

    /// Signature valid, token past its expiry.
    #[error("Access denied: the token has expired")]
    Expired,

    /// Bad signature or undecodable token.
    #[error("Access denied: the token is invalid")]
    Invalid,

    /// Signing failed.
    #[error("Failed to sign token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Machine-readable reason sent alongside the message.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::BadCredentials => "bad_credentials",
            Self::MissingToken => "missing_token",
            Self::MalformedToken => "malformed_token",
            Self::Expired => "token_expired",
            Self::Invalid => "invalid_token",
            Self::Encoding(_) => "internal_error",
        }
    }

    /// HTTP status for this failure.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({ "message": self.to_string(), "reason": self.reason() });
        (self.status(), Json(body)).into_response()
    }
}

/// Signs and verifies session tokens.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer for the given HMAC secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.required_spec_claims.clear();
        validation.required_spec_claims.insert("exp".to_string());

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Checks the demo credentials and returns a fresh token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::BadCredentials`] for anything but the demo
    /// account.
    pub fn issue_token(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if username != DEMO_USERNAME || password != DEMO_PASSWORD {
            tracing::debug!(username, "rejected login");
            return Err(AuthError::BadCredentials);
        }
        self.issue_with_expiry(1, username, Utc::now() + Duration::seconds(TOKEN_LIFETIME_SECS))
    }

    /// Signs a token for `name` expiring at `exp`, without checking
    /// credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Encoding`] if signing fails.
    pub fn issue_with_expiry(
        &self,
        id: u64,
        name: &str,
        exp: chrono::DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            id,
            name: name.to_string(),
            exp: exp.timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::Encoding)
    }

    /// Verifies signature and expiry.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Expired`] for an expired token and
    /// [`AuthError::Invalid`] for anything else that fails to decode.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid,
            })
    }
}

/// Middleware guarding protected routes.
///
/// # Errors
///
/// Rejects the request with the matching [`AuthError`] when the header is
/// missing, malformed, expired or invalid.
pub async fn require_auth(
    State(tokens): State<Arc<TokenIssuer>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;
    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MalformedToken)?;

    let claims = tokens.verify_token(token).inspect_err(|e| {
        tracing::warn!(reason = e.reason(), "token verification failed");
    })?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// The authenticated user, if [`require_auth`] ran for this request.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<Claims>);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Claims>().cloned()))
    }
}
