//! Caller authentication for connections and REST calls.
//!
//! Real identity management lives outside the gateway; here a caller is
//! mapped to a [`Principal`] by bearer token. Browsers cannot set headers
//! on WebSocket upgrades, so the token may also come as `?token=`.

use std::collections::HashSet;
use std::convert::Infallible;

use axum::extract::{FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::domain::Principal;

/// Resolves bearer tokens to principals.
#[derive(Debug, Clone, Default)]
pub struct TokenAuthenticator {
    superusers: HashSet<String>,
    staff: HashSet<String>,
}

impl TokenAuthenticator {
    /// Creates an authenticator from the configured token sets.
    #[must_use]
    pub fn new(superusers: HashSet<String>, staff: HashSet<String>) -> Self {
        Self { superusers, staff }
    }

    /// Maps a token to a principal. Missing or unknown tokens are
    /// anonymous.
    #[must_use]
    pub fn resolve(&self, token: Option<&str>) -> Principal {
        match token {
            Some(token) if self.superusers.contains(token) => Principal::Superuser,
            Some(token) if self.staff.contains(token) => Principal::Staff,
            _ => Principal::Anonymous,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Extracts the caller's token from `Authorization: Bearer` or `?token=`.
fn request_token(parts: &Parts) -> Option<String> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    header.or_else(|| {
        Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.token)
    })
}

/// Extractor yielding the [`Principal`] of the current request.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Principal);

impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = request_token(parts);
        Ok(Self(state.authenticator.resolve(token.as_deref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn authenticator() -> TokenAuthenticator {
        TokenAuthenticator::new(
            HashSet::from(["root-token".to_string()]),
            HashSet::from(["staff-token".to_string()]),
        )
    }

    #[test]
    fn resolves_roles() {
        let auth = authenticator();
        assert_eq!(auth.resolve(Some("root-token")), Principal::Superuser);
        assert_eq!(auth.resolve(Some("staff-token")), Principal::Staff);
        assert_eq!(auth.resolve(Some("guess")), Principal::Anonymous);
        assert_eq!(auth.resolve(None), Principal::Anonymous);
    }

    #[test]
    fn token_from_header_wins_over_query() {
        let request = Request::builder()
            .uri("/ws/shell/foo?token=from-query")
            .header(AUTHORIZATION, "Bearer from-header")
            .body(())
            .unwrap_or_default();
        let (parts, ()) = request.into_parts();
        assert_eq!(request_token(&parts).as_deref(), Some("from-header"));
    }

    #[test]
    fn token_from_query() {
        let request = Request::builder()
            .uri("/ws/shell/foo?token=from-query")
            .body(())
            .unwrap_or_default();
        let (parts, ()) = request.into_parts();
        assert_eq!(request_token(&parts).as_deref(), Some("from-query"));
    }
}
