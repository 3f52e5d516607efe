//! Existence checks against the remote collections.
//!
//! Every probe fetches its collection fresh and scans it with
//! [`find_item`]. Absence is reported as `None`/`false`, never as an error.

use std::fmt;

use serde::de::DeserializeOwned;

use crate::api::types::{Certificate, Collection, DeviceEntry, DeviceInfo, TrustGroup};
use crate::api::{ManagementApi, Target, paths};
use crate::error::{Error, Result};

/// Opaque identifier a device or gateway reports about itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MachineId(String);

impl MachineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First item of a fetched collection matching `predicate`.
pub fn find_item<T>(items: Vec<T>, predicate: impl FnMut(&T) -> bool) -> Option<T> {
    items.into_iter().find(predicate)
}

/// GET a collection; any non-2xx status is fatal.
pub async fn fetch_items<A, T>(api: &A, target: Target, path: &str) -> Result<Vec<T>>
where
    A: ManagementApi,
    T: DeserializeOwned,
{
    let resp = api
        .get(target, path)
        .await?
        .ensure_success(target, "GET", path)?;
    Ok(resp.json::<Collection<T>>(path)?.items)
}

/// GET a collection, mapping a 404 to `None`.
pub async fn fetch_items_or_absent<A, T>(
    api: &A,
    target: Target,
    path: &str,
) -> Result<Option<Vec<T>>>
where
    A: ManagementApi,
    T: DeserializeOwned,
{
    let resp = api.get(target, path).await?;
    if resp.is_not_found() {
        return Ok(None);
    }
    let resp = resp.ensure_success(target, "GET", path)?;
    Ok(Some(resp.json::<Collection<T>>(path)?.items))
}

/// Query the device-info document of `target` for its machine identifier.
pub async fn resolve_machine_id<A: ManagementApi>(api: &A, target: Target) -> Result<MachineId> {
    let resp = api
        .get(target, paths::DEVICE_INFO)
        .await?
        .ensure_success(target, "GET", paths::DEVICE_INFO)?;
    let info: DeviceInfo = resp.json(paths::DEVICE_INFO)?;
    info.machine_id
        .filter(|id| !id.is_empty())
        .map(MachineId)
        .ok_or(Error::MissingMachineId(target))
}

pub async fn trust_group_exists<A: ManagementApi>(api: &A, name: &str) -> Result<bool> {
    let groups: Vec<TrustGroup> = fetch_items(api, Target::Gateway, paths::DEVICE_GROUPS).await?;
    Ok(find_item(groups, |g| g.group_name == name).is_some())
}

pub async fn list_certificates<A: ManagementApi>(api: &A, target: Target) -> Result<Vec<Certificate>> {
    fetch_items(api, target, paths::DEVICE_CERTIFICATES).await
}

/// Certificate stored on `target` for the peer identified by `machine_id`.
pub async fn certificate_by_machine_id<A: ManagementApi>(
    api: &A,
    target: Target,
    machine_id: &MachineId,
) -> Result<Option<Certificate>> {
    let certs = list_certificates(api, target).await?;
    Ok(find_item(certs, |c| {
        c.machine_id.as_deref() == Some(machine_id.as_str())
    }))
}

/// Devices collection of a trust group; `None` when the gateway answers 404.
pub async fn group_devices<A: ManagementApi>(
    api: &A,
    group: &str,
) -> Result<Option<Vec<DeviceEntry>>> {
    fetch_items_or_absent(api, Target::Gateway, &paths::group_devices(group)).await
}

/// Membership record whose `deviceUri` equals `uri`. A missing devices
/// collection counts as empty.
pub async fn device_entry_by_uri<A: ManagementApi>(
    api: &A,
    group: &str,
    uri: &str,
) -> Result<Option<DeviceEntry>> {
    let devices = group_devices(api, group).await?.unwrap_or_default();
    Ok(find_item(devices, |d| d.device_uri.as_deref() == Some(uri)))
}
