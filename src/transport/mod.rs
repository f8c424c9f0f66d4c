//! SUNAT GRE REST client: token acquisition, send, and ticket polling.
//!
//! One [`SunatClient`] serves every company; the bearer token is cached per
//! client id in a compare-and-set cache so concurrent submissions that both
//! observe an expired token cannot overwrite each other's refresh.

mod response;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, warn};

use crate::core::{Company, DespatchError, SunatCredentials};
use crate::envelope::Envelope;

/// Endpoints of the GRE service. The defaults point at production.
#[derive(Debug, Clone)]
pub struct SunatEndpoints {
    /// Base of the OAuth2 token service; the client id is appended as a path
    /// segment, URL-encoded.
    pub token_base: String,
    /// Base of the despatch document API.
    pub api_base: String,
}

impl Default for SunatEndpoints {
    fn default() -> Self {
        Self {
            token_base: "https://api-seguridad.sunat.gob.pe/v1/clientessol".into(),
            api_base: "https://api-cpe.sunat.gob.pe/v1/contribuyente/gem".into(),
        }
    }
}

impl SunatEndpoints {
    fn token_url(&self, client_id: &str) -> Result<reqwest::Url, DespatchError> {
        let mut url = reqwest::Url::parse(&self.token_base)
            .map_err(|e| DespatchError::Config(format!("invalid token URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| DespatchError::Config("token URL cannot be a base".into()))?
            .push(client_id)
            .push("oauth2")
            .push("token")
            .push("");
        Ok(url)
    }

    fn send_url(&self, filename: &str) -> String {
        format!("{}/comprobantes/{filename}", self.api_base)
    }

    fn poll_url(&self, ticket: &str) -> String {
        format!("{}/comprobantes/envios/{ticket}", self.api_base)
    }
}

/// Per-client-id bearer token cache with compare-and-set refresh.
#[derive(Debug, Default)]
pub struct TokenCache {
    entries: Mutex<HashMap<String, String>>,
}

impl TokenCache {
    pub fn get(&self, client_id: &str) -> Option<String> {
        self.lock().get(client_id).cloned()
    }

    /// Install `fresh` only when the cached value still equals `stale`;
    /// returns whichever token is current after the call. A concurrent
    /// refresher that already replaced the token wins.
    pub fn refresh(&self, client_id: &str, stale: Option<&str>, fresh: String) -> String {
        let mut entries = self.lock();
        match entries.get(client_id) {
            Some(current) if Some(current.as_str()) != stale => current.clone(),
            _ => {
                entries.insert(client_id.to_string(), fresh.clone());
                fresh
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Timeout for token and send requests.
const SEND_TIMEOUT: Duration = Duration::from_secs(20);

/// Timeout for poll requests.
const POLL_TIMEOUT: Duration = Duration::from_secs(10);

/// The transport operations the orchestrator drives.
///
/// Splitting these behind a trait keeps the state machine testable with a
/// scripted transport.
#[allow(async_fn_in_trait)]
pub trait SunatApi {
    /// Return the cached bearer token for the company, requesting a new one
    /// on a cache miss or when `force` is set.
    async fn get_token(&self, company: &Company, force: bool) -> Result<String, DespatchError>;

    /// Submit a packaged document; returns the processing ticket.
    async fn send(&self, envelope: &Envelope, token: &str) -> Result<String, DespatchError>;

    /// Ask for the outcome of a ticket; returns the CDR bytes on acceptance.
    async fn poll(&self, ticket: &str, token: &str) -> Result<Vec<u8>, DespatchError>;
}

impl<T: SunatApi> SunatApi for &T {
    async fn get_token(&self, company: &Company, force: bool) -> Result<String, DespatchError> {
        (**self).get_token(company, force).await
    }

    async fn send(&self, envelope: &Envelope, token: &str) -> Result<String, DespatchError> {
        (**self).send(envelope, token).await
    }

    async fn poll(&self, ticket: &str, token: &str) -> Result<Vec<u8>, DespatchError> {
        (**self).poll(ticket, token).await
    }
}

/// reqwest-backed implementation of [`SunatApi`].
pub struct SunatClient {
    http: reqwest::Client,
    endpoints: SunatEndpoints,
    tokens: TokenCache,
}

impl SunatClient {
    pub fn new() -> Result<Self, DespatchError> {
        Self::with_endpoints(SunatEndpoints::default())
    }

    pub fn with_endpoints(endpoints: SunatEndpoints) -> Result<Self, DespatchError> {
        let http = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| DespatchError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoints,
            tokens: TokenCache::default(),
        })
    }

    fn credentials<'a>(
        &self,
        company: &'a Company,
    ) -> Result<&'a SunatCredentials, DespatchError> {
        company.credentials.as_ref().ok_or_else(|| {
            DespatchError::Config("the company has no SUNAT API credentials configured".into())
        })
    }
}

impl SunatApi for SunatClient {
    async fn get_token(&self, company: &Company, force: bool) -> Result<String, DespatchError> {
        let credentials = self.credentials(company)?;
        let cached = self.tokens.get(&credentials.client_id);
        if !force {
            if let Some(token) = &cached {
                return Ok(token.clone());
            }
        }

        let url = self.endpoints.token_url(&credentials.client_id)?;
        debug!(client_id = %credentials.client_id, force, "requesting SUNAT token");
        let response = self
            .http
            .post(url)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "password"),
                ("scope", self.endpoints.api_base.as_str()),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DespatchError::Transport(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| DespatchError::Transport(e.to_string()))?;

        let token = response::decode_token_response(&body)?;
        Ok(self
            .tokens
            .refresh(&credentials.client_id, cached.as_deref(), token))
    }

    async fn send(&self, envelope: &Envelope, token: &str) -> Result<String, DespatchError> {
        let url = self.endpoints.send_url(&envelope.filename);
        debug!(filename = %envelope.filename, "sending despatch document");
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&response::SendBody::new(envelope))
            .send()
            .await
            .map_err(|e| DespatchError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| DespatchError::Transport(e.to_string()))?;

        let ticket = response::decode_send_response(status, &body)?;
        debug!(filename = %envelope.filename, ticket = %ticket, "document queued");
        Ok(ticket)
    }

    async fn poll(&self, ticket: &str, token: &str) -> Result<Vec<u8>, DespatchError> {
        let url = self.endpoints.poll_url(ticket);
        debug!(ticket = %ticket, "polling ticket");
        let response = self
            .http
            .get(&url)
            .timeout(POLL_TIMEOUT)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| DespatchError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| DespatchError::Transport(e.to_string()))?;

        match response::decode_poll_response(status, &body) {
            Ok(cdr) => Ok(cdr),
            Err(err) => {
                warn!(ticket = %ticket, error = %err, "poll did not return a CDR");
                Err(err)
            }
        }
    }
}
