//! Outbound HTTP execution for `knox_client` calls.

use crate::error::{KnoxError, Result};
use crate::safety::{parse_target_url, redact_url};
use crate::tool::{KNOX_CLIENT_TOOL, KnoxClientArgs};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Issues one HTTP request per tool call.
///
/// The wrapped `reqwest::Client` is an immutable handle; it keeps no idle connections, so nothing
/// carries over from one call to the next. Redirects are not followed: a 3xx is a failed call.
#[derive(Clone)]
pub struct HttpCaller {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpCaller {
    /// Build a caller. `timeout` of `None` keeps the HTTP client's default.
    ///
    /// # Errors
    ///
    /// Returns [`KnoxError::Config`] if the TLS backend cannot be initialized.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| KnoxError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, timeout })
    }

    /// Execute the request described by `args` and return the response body as text.
    ///
    /// # Errors
    ///
    /// - [`KnoxError::InvalidArguments`] if the URL is not absolute `http(s)`
    /// - [`KnoxError::Transport`] on network failure
    /// - [`KnoxError::Http`] if the response status is not 2xx
    pub async fn execute(&self, args: &KnoxClientArgs) -> Result<String> {
        let url = parse_target_url(&args.url)?;
        let method = args.method();
        let redacted = redact_url(&url);

        let mut request = self.client.request(method.into(), url);
        if let Some(token) = args.bearer_token() {
            request = request.bearer_auth(token);
        }
        if let Some(t) = self.timeout {
            request = request.timeout(t);
        }

        let started = Instant::now();
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                let err = KnoxError::from(e);
                warn!(
                    tool = KNOX_CLIENT_TOOL,
                    method = method.as_str(),
                    url = %redacted,
                    error = %err,
                    "knox_client request failed"
                );
                return Err(err);
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                let err = KnoxError::from(e);
                warn!(
                    tool = KNOX_CLIENT_TOOL,
                    method = method.as_str(),
                    url = %redacted,
                    status = status.as_u16(),
                    error = %err,
                    "knox_client response body read failed"
                );
                return Err(err);
            }
        };
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        if status.is_success() {
            info!(
                tool = KNOX_CLIENT_TOOL,
                method = method.as_str(),
                url = %redacted,
                status = status.as_u16(),
                elapsed_ms,
                "knox_client request completed"
            );
            return Ok(body);
        }

        warn!(
            tool = KNOX_CLIENT_TOOL,
            method = method.as_str(),
            url = %redacted,
            status = status.as_u16(),
            elapsed_ms,
            "knox_client upstream returned an error status"
        );
        Err(KnoxError::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            body,
        })
    }
}
