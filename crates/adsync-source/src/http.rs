//! Shared request/response handling for the platform clients.

use serde::de::DeserializeOwned;

use crate::error::SourceError;
use crate::retry::retry_send;

/// Send a request (retrying transport failures) and decode a 2xx JSON body.
///
/// `build` is called once per attempt. Non-2xx responses become
/// [`SourceError::Api`] with the response body; undecodable bodies become
/// [`SourceError::Malformed`].
pub(crate) async fn send_json<T, F>(endpoint: &str, build: F) -> Result<T, SourceError>
where
    T: DeserializeOwned,
    F: Fn() -> reqwest::RequestBuilder,
{
    let resp = retry_send(endpoint, || build().send())
        .await
        .map_err(|source| SourceError::Http {
            endpoint: endpoint.to_string(),
            source,
        })?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SourceError::Api {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    resp.json::<T>()
        .await
        .map_err(|e| SourceError::malformed(endpoint, e.to_string()))
}

/// A header value that is kept out of `Debug` output.
pub(crate) fn secret_header(
    value: &str,
    name: &'static str,
) -> Result<reqwest::header::HeaderValue, crate::config::ConfigError> {
    let mut v = reqwest::header::HeaderValue::from_str(value)
        .map_err(|_| crate::config::ConfigError::InvalidHeader(name))?;
    v.set_sensitive(true);
    Ok(v)
}
