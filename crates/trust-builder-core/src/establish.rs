//! Forward path: make the gateway trust the device.
//!
//! Steps run strictly in order and each one inspects the remote state
//! before mutating it, so re-running against an already-trusted pair is a
//! no-op. Nothing is rolled back when a later step fails.

use tracing::{info, warn};

use crate::api::types::{NewDeviceEntry, TrustGroup};
use crate::api::{ManagementApi, Target, paths, to_body};
use crate::driver::TrustSettings;
use crate::error::{Error, Result, StepContext};
use crate::probes::{self, MachineId};

/// Display name and description given to trust groups this tool creates.
pub const TRUST_GROUP_LABEL: &str = "API Gateway Trust Group";

/// What an establishment run found and changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstablishReport {
    pub device_machine_id: MachineId,
    pub gateway_machine_id: MachineId,
    /// `false` when the trust group already existed.
    pub group_created: bool,
    /// `false` when the device was already a member of the group.
    pub device_added: bool,
}

pub async fn establish<A: ManagementApi>(api: &A, settings: &TrustSettings) -> Result<EstablishReport> {
    info!(device = %settings.device, "validating device exists");
    let device_machine_id = probes::resolve_machine_id(api, Target::Device)
        .await
        .step("resolve device machine id")?;

    info!(gateway = %settings.gateway, "validating gateway");
    let gateway_machine_id = probes::resolve_machine_id(api, Target::Gateway)
        .await
        .step("resolve gateway machine id")?;

    info!(group = %settings.group_name, "creating trust group on gateway");
    let group_created = ensure_trust_group(api, &settings.group_name)
        .await
        .step("create trust group")?;

    info!(group = %settings.group_name, "establishing device trust");
    let device_added = ensure_device_trust(api, settings)
        .await
        .step("establish device trust")?;

    Ok(EstablishReport {
        device_machine_id,
        gateway_machine_id,
        group_created,
        device_added,
    })
}

/// Create the trust group unless one with that name already exists.
/// Returns whether it was created.
pub async fn ensure_trust_group<A: ManagementApi>(api: &A, name: &str) -> Result<bool> {
    if probes::trust_group_exists(api, name).await? {
        info!(group = %name, "trust group already exists");
        return Ok(false);
    }

    let body = TrustGroup {
        group_name: name.to_string(),
        display: Some(TRUST_GROUP_LABEL.to_string()),
        description: Some(TRUST_GROUP_LABEL.to_string()),
    };
    let body = to_body(&body, paths::DEVICE_GROUPS)?;
    api.post(Target::Gateway, paths::DEVICE_GROUPS, &body)
        .await?
        .ensure_success(Target::Gateway, "POST", paths::DEVICE_GROUPS)?;
    info!(group = %name, "trust group created");
    Ok(true)
}

/// Add the device to the trust group unless an entry with its URI is
/// already present. Returns whether an entry was added.
pub async fn ensure_device_trust<A: ManagementApi>(api: &A, settings: &TrustSettings) -> Result<bool> {
    let uri = settings.device_uri();
    if probes::device_entry_by_uri(api, &settings.group_name, &uri)
        .await?
        .is_some()
    {
        warn!(device = %uri, group = %settings.group_name, "device already exists in gateway trust group");
        return Ok(false);
    }

    let creds = settings
        .device
        .credentials
        .as_ref()
        .ok_or_else(|| Error::Config("device credentials are required to establish trust".into()))?;
    let entry = NewDeviceEntry {
        user_name: creds.username.clone(),
        password: creds.password.clone(),
        address: settings.device.host.clone(),
        https_port: settings.device.port,
    };
    let path = paths::group_devices(&settings.group_name);
    let body = to_body(&entry, &path)?;
    api.post(Target::Gateway, &path, &body)
        .await?
        .ensure_success(Target::Gateway, "POST", &path)?;
    info!(device = %uri, "device added to trust group");
    Ok(true)
}
