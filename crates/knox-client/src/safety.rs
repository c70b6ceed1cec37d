//! Outbound URL validation and redaction.
//!
//! The tool accepts arbitrary caller-supplied URLs; these helpers keep secrets that ride in a URL
//! (userinfo, query tokens) out of logs and error messages.

use crate::error::{KnoxError, Result};
use url::Url;

/// Parse a caller-supplied URL and reject anything that is not absolute `http(s)`.
///
/// # Errors
///
/// Returns [`KnoxError::InvalidArguments`] if the URL does not parse, uses another scheme, or has
/// no host.
pub fn parse_target_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        KnoxError::InvalidArguments(format!("url is not a valid absolute URL: {e}"))
    })?;

    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(KnoxError::InvalidArguments(format!(
            "unsupported URL scheme '{scheme}'"
        )));
    }

    if url.host_str().is_none() {
        return Err(KnoxError::InvalidArguments(
            "url is missing a host".to_string(),
        ));
    }

    Ok(url)
}

#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    // Best-effort: drop credentials + query + fragment.
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    msg
}
