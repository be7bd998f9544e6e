// API client module: a small blocking HTTP client for the OreCast
// services. Reads are plain GETs; every mutating call goes through
// `dispatch`, which obtains a fresh bearer token first.

use crate::authz::{decode_body, AuthzClient};
use crate::config::OreConfig;
use crate::error::AuthError;
use crate::ui::{CredentialPrompt, Terminal};
use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client, RequestBuilder};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Envelope returned by every mutating OreCast call. Fields beyond
/// `status` and `error` (upload `msg`, `object`, ...) are kept in `rest`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl ServiceResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Human readable reason of a failed call.
    pub fn reason(&self) -> String {
        match &self.error {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(v) => v.to_string(),
            None => format!("status {}", self.status),
        }
    }
}

/// Append `segments` to `base` as escaped path segments, so a `/` inside a
/// site name or record id stays part of that segment.
pub fn service_url<S: AsRef<str>>(base: &str, segments: &[S]) -> Result<String> {
    let mut url = Url::parse(base).with_context(|| format!("Invalid service URL {}", base))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Service URL {} cannot carry a path", base))?
        .pop_if_empty()
        .extend(segments.iter().map(|s| s.as_ref()));
    Ok(url.into())
}

/// Blocking client for the OreCast services. Holds the HTTP client, the
/// configuration and the terminal used to ask for credentials.
pub struct ApiClient {
    client: Client,
    config: OreConfig,
    terminal: Box<dyn Terminal>,
}

impl ApiClient {
    pub fn new(config: OreConfig, terminal: Box<dyn Terminal>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            config,
            terminal,
        })
    }

    pub fn config(&self) -> &OreConfig {
        &self.config
    }

    pub fn authz(&self) -> AuthzClient<'_> {
        AuthzClient::new(&self.client, &self.config)
    }

    /// Prompt for the user's credential and run the full token exchange.
    /// Every call prompts again; tokens are never kept.
    pub fn access_token(&mut self) -> Result<String, AuthError> {
        let cred = CredentialPrompt::new(self.terminal.as_mut()).read_credential()?;
        self.authz().token(&cred)
    }

    /// Authorize `req` with a fresh bearer token, send it and decode the
    /// `{status, error}` envelope. Whether the status means success is left
    /// to the caller.
    pub fn dispatch(&mut self, req: RequestBuilder) -> Result<ServiceResponse> {
        let token = self.access_token().context("Failed to obtain access token")?;
        self.send_authorized(req, &token)
    }

    /// Send `req` with an already obtained bearer token.
    pub fn send_authorized(&self, req: RequestBuilder, token: &str) -> Result<ServiceResponse> {
        let res = req
            .bearer_auth(token)
            .send()
            .context("Failed to send request")?;
        debug!(url = %res.url(), status = %res.status(), "authorized request done");
        let resp: ServiceResponse = decode_body("service", res)?;
        Ok(resp)
    }

    /// Unauthenticated GET returning decoded JSON.
    pub fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(%url, "HTTP GET");
        let res = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to send request to {}", url))?;
        Ok(decode_body("service", res)?)
    }

    /// Authorized POST with a JSON body.
    pub fn post_json<B: Serialize + ?Sized>(&mut self, url: &str, body: &B) -> Result<ServiceResponse> {
        debug!(%url, "HTTP POST");
        let req = self.client.post(url).json(body);
        self.dispatch(req)
    }

    /// Authorized POST with an empty body.
    pub fn post(&mut self, url: &str) -> Result<ServiceResponse> {
        debug!(%url, "HTTP POST");
        let req = self.client.post(url);
        self.dispatch(req)
    }

    /// Authorized DELETE.
    pub fn delete(&mut self, url: &str) -> Result<ServiceResponse> {
        debug!(%url, "HTTP DELETE");
        let req = self.client.delete(url);
        self.dispatch(req)
    }

    /// Upload a file as the `file` part of a multipart/form-data POST,
    /// authorized with `token`.
    pub fn upload_file(&self, url: &str, file_path: &Path, token: &str) -> Result<ServiceResponse> {
        let form = multipart::Form::new()
            .file("file", file_path)
            .with_context(|| format!("Failed to open {}", file_path.display()))?;
        debug!(%url, file = %file_path.display(), "HTTP POST multipart");
        let req = self.client.post(url).multipart(form);
        self.send_authorized(req, token)
    }
}
