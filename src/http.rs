//! Shared blocking HTTP plumbing for the registry and review clients.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};

use crate::error::ApiError;

const USER_AGENT: &str = concat!("bumpcheck/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(30);

/// Build the client every collaborator uses
pub fn client() -> Result<Client, ApiError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .build()
        .map_err(ApiError::Client)
}

/// Send a request, mapping transport failures to `ApiError`
pub fn send(url: &str, request: RequestBuilder) -> Result<Response, ApiError> {
    request.send().map_err(|source| ApiError::Request {
        url: url.to_string(),
        source,
    })
}

/// Turn a non-2xx response into `ApiError::Status`, keeping a bounded body excerpt
pub fn ensure_success(url: &str, response: Response) -> Result<Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(status_error(url, response))
}

/// `ApiError::Status` for a response the caller has already rejected
pub fn status_error(url: &str, response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().unwrap_or_default();
    ApiError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body: excerpt(&body),
    }
}

/// Read the body as text
pub fn text(url: &str, response: Response) -> Result<String, ApiError> {
    response.text().map_err(|source| ApiError::Request {
        url: url.to_string(),
        source,
    })
}

fn excerpt(body: &str) -> String {
    const MAX: usize = 200;
    let body = body.trim();
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
