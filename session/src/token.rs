//! Bearer token payload decoding.
//!
//! DESIGN
//! ======
//! The API issues compact three-segment tokens. Only the middle segment is
//! read: a base64url JSON object carrying the user's identity claims. Decoding
//! is all-or-nothing. A token that cannot be split, decoded, parsed or
//! validated yields an error and never a partially populated [`User`].

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder avatar shown for every user; tokens carry no image claim.
pub const DEFAULT_AVATAR: &str = "/images/avatar-placeholder.png";

/// Error returned by [`decode_token`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token does not have exactly three dot-separated segments.
    #[error("token must have three segments, found {0}")]
    Segments(usize),
    /// The payload segment is not valid base64url.
    #[error("token payload is not base64url: {0}")]
    Base64(String),
    /// The payload is not a JSON object with the expected claims.
    #[error("token payload is not valid claims JSON: {0}")]
    Claims(String),
    /// A claim parsed but failed shape validation.
    #[error("token claim `{0}` is invalid")]
    InvalidClaim(&'static str),
}

/// Dashboard role carried in the token's `role` claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Staff,
}

impl Role {
    /// Lowercase wire name (`"admin"`, `"doctor"`, `"staff"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Doctor => "doctor",
            Self::Staff => "staff",
        }
    }

    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "doctor" => Ok(Self::Doctor),
            "staff" => Ok(Self::Staff),
            _ => Err(TokenError::InvalidClaim("role")),
        }
    }
}

/// Identity derived from a decoded token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Display-only avatar path.
    pub avatar: String,
    /// Set when the account must change its password before doing anything else.
    pub must_change_password: bool,
}

/// Raw claims as they appear in the payload segment.
#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(deserialize_with = "deserialize_id")]
    user_id: String,
    name: String,
    email: String,
    role: String,
    #[serde(default)]
    must_change_password: bool,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        _ => Err(D::Error::custom("expected string or integer user_id")),
    }
}

/// Decode the identity claims embedded in `token`.
///
/// # Errors
///
/// Returns a [`TokenError`] when the token is malformed or any required claim
/// is missing or fails validation.
pub fn decode_token(token: &str) -> Result<User, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Segments(segments.len()));
    }

    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| TokenError::Base64(e.to_string()))?;
    let claims: Claims = serde_json::from_slice(&bytes).map_err(|e| TokenError::Claims(e.to_string()))?;

    let id = claims.user_id.trim();
    if id.is_empty() {
        return Err(TokenError::InvalidClaim("user_id"));
    }
    let email = claims.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(TokenError::InvalidClaim("email"));
    }
    let role = claims.role.parse::<Role>()?;

    Ok(User {
        id: id.to_owned(),
        name: claims.name,
        email: email.to_owned(),
        role,
        avatar: DEFAULT_AVATAR.to_owned(),
        must_change_password: claims.must_change_password,
    })
}
