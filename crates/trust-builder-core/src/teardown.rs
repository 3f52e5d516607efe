//! Reverse path: remove every trace of the trust relationship.
//!
//! Each step tolerates its target already being gone, so tearing down a
//! pair that was never (or only partially) trusted succeeds.

use futures::future::join_all;
use tracing::{info, warn};

use crate::api::{ManagementApi, Target, paths};
use crate::driver::TrustSettings;
use crate::error::{Error, Result, StepContext};
use crate::probes::{self, MachineId};

/// What a teardown run removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Gateway's certificate deleted from the device.
    pub gateway_certificate_removed: bool,
    /// Device's certificate deleted from the gateway.
    pub device_certificate_removed: bool,
    pub device_entry_removed: bool,
    pub group_removed: bool,
    /// Certificates deleted by the purge step (0 when not requested).
    pub purged_certificates: usize,
}

/// Result of removing the device's membership entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipRemoval {
    /// Members listed just before removal; `None` when the devices
    /// collection does not exist.
    pub members_before: Option<usize>,
    pub removed: bool,
}

pub async fn teardown<A: ManagementApi>(api: &A, settings: &TrustSettings) -> Result<TeardownReport> {
    info!(device = %settings.device, "validating device exists");
    let device_machine_id = probes::resolve_machine_id(api, Target::Device)
        .await
        .step("resolve device machine id")?;

    info!(gateway = %settings.gateway, "validating gateway");
    let gateway_machine_id = probes::resolve_machine_id(api, Target::Gateway)
        .await
        .step("resolve gateway machine id")?;

    let mut report = TeardownReport {
        gateway_certificate_removed: delete_peer_certificate(api, Target::Device, &gateway_machine_id)
            .await
            .step("delete gateway certificate from device")?,
        device_certificate_removed: delete_peer_certificate(api, Target::Gateway, &device_machine_id)
            .await
            .step("delete device certificate from gateway")?,
        ..TeardownReport::default()
    };

    let removal = remove_device_from_group(api, &settings.group_name, &settings.device_uri())
        .await
        .step("remove device from trust group")?;
    report.device_entry_removed = removal.removed;

    report.group_removed = delete_group_if_sole_member(api, &settings.group_name, removal.members_before)
        .await
        .step("delete trust group")?;

    if settings.purge_device_certificates {
        report.purged_certificates = purge_certificates(api, Target::Device)
            .await
            .step("purge device certificates")?;
    }

    Ok(report)
}

/// DELETE `path`, treating 404 as already gone. Returns whether something
/// was deleted.
pub async fn delete_idempotent<A: ManagementApi>(api: &A, target: Target, path: &str) -> Result<bool> {
    let status = api.delete(target, path).await?;
    match status {
        200..=299 => Ok(true),
        404 => Ok(false),
        status => Err(Error::Status {
            target,
            method: "DELETE",
            path: path.to_string(),
            status,
        }),
    }
}

/// Delete the certificate stored on `on` for the peer `peer`.
pub async fn delete_peer_certificate<A: ManagementApi>(
    api: &A,
    on: Target,
    peer: &MachineId,
) -> Result<bool> {
    let Some(cert) = probes::certificate_by_machine_id(api, on, peer).await? else {
        info!(%on, machine_id = %peer, "no peer certificate to delete");
        return Ok(false);
    };
    info!(%on, machine_id = %peer, certificate_id = %cert.certificate_id, "deleting peer certificate");
    delete_idempotent(api, on, &paths::certificate(&cert.certificate_id)).await
}

/// Delete the group member whose `deviceUri` is `uri`.
pub async fn remove_device_from_group<A: ManagementApi>(
    api: &A,
    group: &str,
    uri: &str,
) -> Result<MembershipRemoval> {
    let Some(devices) = probes::group_devices(api, group).await? else {
        info!(%group, "trust group has no devices collection");
        return Ok(MembershipRemoval {
            members_before: None,
            removed: false,
        });
    };
    let members_before = Some(devices.len());

    let Some(entry) = probes::find_item(devices, |d| d.device_uri.as_deref() == Some(uri)) else {
        info!(%group, device = %uri, "device is not a member of the trust group");
        return Ok(MembershipRemoval {
            members_before,
            removed: false,
        });
    };

    info!(%group, device = %uri, uuid = %entry.uuid, "removing device from trust group");
    let removed = delete_idempotent(api, Target::Gateway, &paths::group_device(group, &entry.uuid)).await?;
    Ok(MembershipRemoval {
        members_before,
        removed,
    })
}

/// Delete the trust group when it held exactly one member before removal.
///
/// The lone member is not checked to be the device just removed; whatever
/// single entry is still listed is deleted along with the group. A group
/// that gained members since the removal is left alone.
pub async fn delete_group_if_sole_member<A: ManagementApi>(
    api: &A,
    group: &str,
    members_before: Option<usize>,
) -> Result<bool> {
    if members_before != Some(1) {
        info!(%group, ?members_before, "leaving trust group in place");
        return Ok(false);
    }

    let Some(remaining) = probes::group_devices(api, group).await? else {
        return Ok(false);
    };
    if remaining.len() > 1 {
        warn!(%group, members = remaining.len(), "trust group gained members, leaving it in place");
        return Ok(false);
    }
    for entry in &remaining {
        delete_idempotent(api, Target::Gateway, &paths::group_device(group, &entry.uuid)).await?;
    }

    info!(%group, "deleting trust group");
    delete_idempotent(api, Target::Gateway, &paths::group(group)).await
}

/// Delete every certificate stored on `target`, concurrently.
///
/// Every deletion runs to completion before the result is decided; the
/// step fails with the first error if any single deletion failed.
pub async fn purge_certificates<A: ManagementApi>(api: &A, target: Target) -> Result<usize> {
    warn!(%target, "forcing deletion of all device certificates");
    let certs = probes::list_certificates(api, target).await?;
    let cert_paths: Vec<String> = certs
        .iter()
        .map(|c| paths::certificate(&c.certificate_id))
        .collect();
    let results = join_all(cert_paths.iter().map(|p| delete_idempotent(api, target, p))).await;
    let deleted = results.into_iter().collect::<Result<Vec<bool>>>()?;
    Ok(deleted.into_iter().filter(|d| *d).count())
}
