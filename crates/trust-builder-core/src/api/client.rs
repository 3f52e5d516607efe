//! reqwest-backed client for the device and gateway management endpoints.

use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::Method;

use super::{ApiResponse, ManagementApi, Target};
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};

/// Management API client holding one HTTP client per endpoint.
///
/// Device calls skip TLS peer verification (devices ship self-signed
/// management certificates) and carry basic-auth credentials. Gateway calls
/// are sent as-is.
#[derive(Debug, Clone)]
pub struct RestClient {
    device: Endpoint,
    gateway: Endpoint,
    device_http: reqwest::Client,
    gateway_http: reqwest::Client,
}

impl RestClient {
    /// Endpoints are taken as given; callers validate them first
    /// (see [`crate::driver::execute`]).
    pub fn new(device: Endpoint, gateway: Endpoint) -> Result<Self> {
        // reqwest is built with rustls-no-provider; `Err` means a provider
        // is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let device_http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;
        let gateway_http = reqwest::Client::builder().build()?;

        Ok(Self {
            device,
            gateway,
            device_http,
            gateway_http,
        })
    }

    pub const fn endpoint(&self, target: Target) -> &Endpoint {
        match target {
            Target::Device => &self.device,
            Target::Gateway => &self.gateway,
        }
    }

    const fn http(&self, target: Target) -> &reqwest::Client {
        match target {
            Target::Device => &self.device_http,
            Target::Gateway => &self.gateway_http,
        }
    }

    async fn send(
        &self,
        target: Target,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse> {
        let endpoint = self.endpoint(target);
        let url = endpoint.url(path);
        tracing::debug!(%target, %method, %url, "management request");

        let mut req = self
            .http(target)
            .request(method, &url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(creds) = &endpoint.credentials {
            req = req.basic_auth(&creds.username, Some(&creds.password));
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        tracing::debug!(%target, status, len = bytes.len(), "management response");

        Ok(ApiResponse::new(status, decode_body(path, status, &bytes)?))
    }
}

/// Decode a response body. Error pages are not always JSON, so a body that
/// fails to parse is only an error on a 2xx response.
fn decode_body(path: &str, status: u16, bytes: &[u8]) -> Result<serde_json::Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Null);
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Ok(value),
        Err(_) if !(200..300).contains(&status) => Ok(serde_json::Value::Null),
        Err(source) => Err(Error::Json {
            path: path.to_string(),
            source,
        }),
    }
}

impl ManagementApi for RestClient {
    async fn get(&self, target: Target, path: &str) -> Result<ApiResponse> {
        self.send(target, Method::GET, path, None).await
    }

    async fn post(
        &self,
        target: Target,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ApiResponse> {
        self.send(target, Method::POST, path, Some(body)).await
    }

    async fn delete(&self, target: Target, path: &str) -> Result<u16> {
        Ok(self.send(target, Method::DELETE, path, None).await?.status)
    }
}
