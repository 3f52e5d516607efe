//! Fixed REST paths of the management API.

use std::fmt::Write;

/// Self-description of a device or gateway, carrying its `machineId`.
pub const DEVICE_INFO: &str = "/mgmt/shared/identified-devices/config/device-info";

/// Trust groups on the gateway.
pub const DEVICE_GROUPS: &str = "/mgmt/shared/resolver/device-groups";

/// Peer certificates stored on either endpoint.
pub const DEVICE_CERTIFICATES: &str = "/mgmt/shared/device-certificates";

/// Percent-encode a single path segment (RFC 3986 unreserved set kept as-is).
pub fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for b in segment.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    out
}

pub fn group(name: &str) -> String {
    format!("{DEVICE_GROUPS}/{}", encode_segment(name))
}

pub fn group_devices(name: &str) -> String {
    format!("{}/devices", group(name))
}

pub fn group_device(name: &str, uuid: &str) -> String {
    format!("{}/{}", group_devices(name), encode_segment(uuid))
}

pub fn certificate(certificate_id: &str) -> String {
    format!("{DEVICE_CERTIFICATES}/{}", encode_segment(certificate_id))
}
