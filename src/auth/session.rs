use anyhow::Context;
use axum::extract::FromRef;
use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{config::SessionConfig, state::AppState};

pub const SESSION_COOKIE: &str = "session_token";

/// Payload of the signed session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // username
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

/// Signing and verification keys for the `session_token` cookie.
#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
    pub cookie_secure: bool,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.session)
    }
}

impl SessionKeys {
    pub fn new(cfg: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::hours(cfg.ttl_hours),
            cookie_secure: cfg.cookie_secure,
        }
    }

    pub fn sign(&self, username: &str) -> anyhow::Result<(String, OffsetDateTime)> {
        let now = OffsetDateTime::now_utc();
        let exp = now
            .checked_add(self.ttl)
            .context("session expiry out of range")?;
        let claims = SessionClaims {
            sub: username.to_owned(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(username, "session signed");
        Ok((token, exp))
    }

    /// Verifies signature, expiry, issuer and audience; returns the username.
    pub fn verify(&self, token: &str) -> anyhow::Result<String> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims.sub)
    }

    /// Cookie carrying a freshly signed session for `username`.
    pub fn login_cookie(&self, username: &str) -> anyhow::Result<Cookie<'static>> {
        let (token, expires) = self.sign(username)?;
        Ok(Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie_secure)
            .expires(expires)
            .build())
    }

    /// Empty cookie that expired an hour ago.
    pub fn logout_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie_secure)
            .expires(OffsetDateTime::now_utc() - Duration::hours(1))
            .build()
    }
}
