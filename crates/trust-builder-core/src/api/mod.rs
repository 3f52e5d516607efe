//! Remote management API access.
//!
//! [`ManagementApi`] is the seam the sequencers are written against;
//! [`RestClient`] is the reqwest-backed implementation talking to the real
//! device and gateway endpoints.

mod client;
pub mod paths;
pub mod types;


use std::fmt;
use std::future::Future;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

pub use client::RestClient;

/// Which of the two management endpoints a call is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Device,
    Gateway,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Device => "device",
            Self::Gateway => "gateway",
        })
    }
}

/// Status code and decoded JSON body of a completed request.
///
/// An empty body decodes to `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub const fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Fail with [`Error::Status`] unless the status is 2xx.
    pub fn ensure_success(self, target: Target, method: &'static str, path: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::Status {
                target,
                method,
                path: path.to_string(),
                status: self.status,
            })
        }
    }

    /// Deserialize the body into `T`.
    pub fn json<T: DeserializeOwned>(self, path: &str) -> Result<T> {
        serde_json::from_value(self.body).map_err(|source| Error::Json {
            path: path.to_string(),
            source,
        })
    }
}

/// Typed access to the device and gateway management APIs.
///
/// Implementations return `Ok` for every response the endpoint produced,
/// whatever its status; only connection/protocol failures are `Err`.
/// Interpreting the status is left to the caller.
pub trait ManagementApi: Send + Sync {
    fn get(&self, target: Target, path: &str) -> impl Future<Output = Result<ApiResponse>> + Send;

    fn post(
        &self,
        target: Target,
        path: &str,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<ApiResponse>> + Send;

    fn delete(&self, target: Target, path: &str) -> impl Future<Output = Result<u16>> + Send;
}

/// Serialize a request body for `path`.
pub(crate) fn to_body<T: serde::Serialize>(value: &T, path: &str) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|source| Error::Json {
        path: path.to_string(),
        source,
    })
}
