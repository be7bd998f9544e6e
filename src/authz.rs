//! Token acquisition against the OreCast authz service.
//!
//! The exchange is two blocking calls followed by a local check:
//!
//! 1. `POST {authz}/oauth/authorize?client_id=..&response_type=code` with the
//!    user's `{Login, Password}` as JSON; the reply is a `{status, error}`
//!    envelope and anything but `"ok"` means the user is unknown.
//! 2. `GET {authz}/oauth/token?client_id=..&client_secret=..&grant_type=client_credentials&scope=read`
//!    which returns `{access_token, ...}`.
//! 3. The access token is verified as an HMAC-signed JWT keyed with the
//!    client id. The raw token string is what callers get back.

use crate::config::OreConfig;
use crate::error::AuthError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// End-user credential, as the authz users DB expects it.
#[derive(Serialize, Deserialize, Clone, PartialEq)]
pub struct Credential {
    #[serde(rename = "Login")]
    pub login: String,
    #[serde(rename = "Password")]
    pub password: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// Reply of the authorize endpoint.
#[derive(Deserialize, Debug)]
pub struct AuthorizationResult {
    pub status: String,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl AuthorizationResult {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Reply of the token endpoint. Other fields (`expires_in`, `scope`, ...)
/// are ignored.
#[derive(Deserialize, Debug)]
pub struct Token {
    pub access_token: String,
}

/// Claims carried by an OreCast token. Their shape belongs to the authz
/// service; `exp`/`nbf` are checked by the decoder, nothing else is read.
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Client for the authz service. Borrows the HTTP client and configuration
/// of its owner; nothing is cached between calls.
pub struct AuthzClient<'a> {
    http: &'a Client,
    config: &'a OreConfig,
}

impl<'a> AuthzClient<'a> {
    pub fn new(http: &'a Client, config: &'a OreConfig) -> Self {
        AuthzClient { http, config }
    }

    /// Trade a user credential for a validated bearer token.
    pub fn token(&self, cred: &Credential) -> Result<String, AuthError> {
        self.authorize(cred)?;
        let token = self.request_token()?;
        validate_token(&token.access_token, self.config.authz.client_id.as_bytes())?;
        Ok(token.access_token)
    }

    /// Check the credential against the users DB of the authz service.
    pub fn authorize(&self, cred: &Credential) -> Result<AuthorizationResult, AuthError> {
        let url = format!("{}/oauth/authorize", self.config.services.authz_url);
        debug!(%url, login = %cred.login, "HTTP POST");
        let res = self
            .http
            .post(&url)
            .query(&[
                ("client_id", self.config.authz.client_id.as_str()),
                ("response_type", "code"),
            ])
            .json(cred)
            .send()?;
        let result: AuthorizationResult = decode_body("authorize", res)?;
        if !result.is_ok() {
            debug!(login = %cred.login, error = ?result.error, "authorization refused");
            return Err(AuthError::NoSuchUser(cred.login.clone()));
        }
        Ok(result)
    }

    /// Ask the token endpoint for a client-credentials token.
    pub fn request_token(&self) -> Result<Token, AuthError> {
        let url = format!("{}/oauth/token", self.config.services.authz_url);
        debug!(%url, "HTTP GET");
        let res = self
            .http
            .get(&url)
            .query(&[
                ("client_id", self.config.authz.client_id.as_str()),
                ("client_secret", self.config.authz.client_secret.as_str()),
                ("grant_type", "client_credentials"),
                ("scope", "read"),
            ])
            .send()?;
        let token: Token = decode_body("token", res)?;
        trace!(token = %token.access_token, "request token");
        Ok(token)
    }
}

/// Read the whole body and decode it as JSON, keeping the raw text on
/// failure. The HTTP status is not looked at: OreCast services report
/// failures inside the envelope.
pub(crate) fn decode_body<T: DeserializeOwned>(
    what: &'static str,
    res: reqwest::blocking::Response,
) -> Result<T, AuthError> {
    let status = res.status();
    let body = res.text()?;
    trace!(%status, %body, "{} response", what);
    serde_json::from_str(&body).map_err(|source| AuthError::MalformedResponse { what, body, source })
}

/// Verify `token` as an HMAC-signed JWT and return its claims.
///
/// A bad signature is reported as [`AuthError::InvalidSignature`]; expiry
/// and not-before failures as "invalid token validity"; anything else as
/// the parser's own message.
pub fn validate_token(token: &str, key: &[u8]) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    // exp/nbf are checked when present, never required
    validation.required_spec_claims.clear();
    validation.validate_nbf = true;
    validation.validate_aud = false;

    let data = jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(key), &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => {
                AuthError::InvalidToken("invalid token validity".into())
            }
            _ => AuthError::InvalidToken(format!("invalid token: {}", e)),
        })?;
    Ok(data.claims)
}
