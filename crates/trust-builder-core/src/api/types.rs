//! Management API request and response bodies.
//!
//! Field names follow the remote JSON (camelCase).

use serde::{Deserialize, Serialize};

/// `{"items": [...]}` collection wrapper. A missing `items` is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Subset of the device-info document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(default)]
    pub machine_id: Option<String>,
}

/// A trust group on the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustGroup {
    pub group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A device's membership record inside a trust group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEntry {
    pub uuid: String,
    #[serde(default)]
    pub device_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Reported as either a number or a string depending on the gateway build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_port: Option<serde_json::Value>,
}

/// Body of a device-entry creation request.
///
/// The gateway uses these credentials to authenticate to the device itself.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeviceEntry {
    pub user_name: String,
    pub password: String,
    pub address: String,
    pub https_port: u16,
}

impl std::fmt::Debug for NewDeviceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewDeviceEntry")
            .field("user_name", &self.user_name)
            .field("address", &self.address)
            .field("https_port", &self.https_port)
            .finish_non_exhaustive()
    }
}

/// A peer certificate stored on an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub certificate_id: String,
    #[serde(default)]
    pub machine_id: Option<String>,
}
