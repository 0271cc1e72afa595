//! Relay client adapter using reqwest

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Response;
use serde::Serialize;

use super::{DATA_ATTACHED, DATA_TYPE, DATA_VERSION};
use crate::application::ports::{ClipboardState, RelayClient, RelayError, VersionedPayload};
use crate::domain::clipboard::{ClipboardFormat, Payload};
use crate::domain::error::{EpochParseError, FormatParseError};
use crate::domain::node::ServerEpoch;
use crate::domain::timing::Duration as AppDuration;

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
}

/// HTTP relay client
pub struct HttpRelayClient {
    client: reqwest::Client,
    probe_timeout: Duration,
}

impl HttpRelayClient {
    /// Create a client with the default request and probe timeouts
    pub fn new() -> Result<Self, RelayError> {
        Self::with_timeouts(
            AppDuration::default_request_timeout().as_std(),
            AppDuration::default_probe_timeout().as_std(),
        )
    }

    /// Create a client. `request_timeout` bounds sync traffic, `probe_timeout`
    /// bounds `/timestamp` probes during scans.
    pub fn with_timeouts(request_timeout: Duration, probe_timeout: Duration) -> Result<Self, RelayError> {
        // LAN peers are never reached through a proxy
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(probe_timeout.min(request_timeout))
            .no_proxy()
            .build()
            .map_err(|e| RelayError::Unreachable(e.to_string()))?;

        Ok(Self {
            client,
            probe_timeout,
        })
    }

    fn url(server: &str, path: &str) -> String {
        format!("{}/{}", server.trim_end_matches('/'), path)
    }

    /// Fail on any non-success status
    fn check(response: Response) -> Result<Response, RelayError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(RelayError::Rejected(status.as_u16()))
        }
    }
}

/// Map a transport failure to the relay error taxonomy
fn transport_error(e: reqwest::Error) -> RelayError {
    if e.is_timeout() || e.is_connect() || e.is_request() {
        RelayError::Unreachable(e.to_string())
    } else {
        RelayError::Protocol(e.to_string())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &reqwest::header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

/// Read the optional `Data-Version` header
fn parse_version(headers: &HeaderMap) -> Result<Option<u64>, RelayError> {
    match header_str(headers, &DATA_VERSION) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| RelayError::Protocol(format!("invalid Data-Version: {:?}", raw))),
    }
}

/// Interpret a `HEAD /clipboard` response
fn parse_state(headers: &HeaderMap) -> Result<ClipboardState, RelayError> {
    let attached = match header_str(headers, &DATA_ATTACHED) {
        Some("True") => true,
        Some("False") => false,
        Some(other) => {
            return Err(RelayError::Protocol(format!(
                "invalid Data-Attached: {:?}",
                other
            )))
        }
        None => return Err(RelayError::Protocol("missing Data-Attached header".to_string())),
    };

    Ok(ClipboardState {
        attached,
        version: if attached { parse_version(headers)? } else { None },
    })
}

fn parse_format(headers: &HeaderMap) -> Result<ClipboardFormat, RelayError> {
    header_str(headers, &DATA_TYPE)
        .ok_or_else(|| RelayError::Protocol("missing Data-Type header".to_string()))?
        .parse()
        .map_err(|e: FormatParseError| RelayError::Protocol(e.to_string()))
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn register(&self, server: &str, name: &str) -> Result<(), RelayError> {
        let response = self
            .client
            .post(Self::url(server, "register"))
            .json(&RegisterRequest { name })
            .send()
            .await
            .map_err(transport_error)?;

        Self::check(response)?;
        Ok(())
    }

    async fn timestamp(&self, server: &str) -> Result<ServerEpoch, RelayError> {
        let response = self
            .client
            .get(Self::url(server, "timestamp"))
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(transport_error)?;

        let body = Self::check(response)?.text().await.map_err(transport_error)?;
        body.parse()
            .map_err(|e: EpochParseError| RelayError::Protocol(e.to_string()))
    }

    async fn probe(&self, server: &str) -> Result<ClipboardState, RelayError> {
        let response = self
            .client
            .head(Self::url(server, "clipboard"))
            .send()
            .await
            .map_err(transport_error)?;

        parse_state(Self::check(response)?.headers())
    }

    async fn fetch(&self, server: &str) -> Result<VersionedPayload, RelayError> {
        let response = self
            .client
            .get(Self::url(server, "clipboard"))
            .send()
            .await
            .map_err(transport_error)?;

        let response = Self::check(response)?;
        let format = parse_format(response.headers())?;
        let version = parse_version(response.headers())?;
        let content = response.bytes().await.map_err(transport_error)?;

        if format == ClipboardFormat::Text && std::str::from_utf8(&content).is_err() {
            return Err(RelayError::Protocol(
                "text payload is not valid UTF-8".to_string(),
            ));
        }

        Ok(VersionedPayload {
            payload: Payload::new(content, format),
            version,
        })
    }

    async fn push(&self, server: &str, payload: &Payload) -> Result<Option<u64>, RelayError> {
        let response = self
            .client
            .post(Self::url(server, "clipboard"))
            .header(DATA_TYPE, payload.format().as_str())
            .body(payload.content().clone())
            .send()
            .await
            .map_err(transport_error)?;

        let response = Self::check(response)?;
        parse_version(response.headers())
    }
}
