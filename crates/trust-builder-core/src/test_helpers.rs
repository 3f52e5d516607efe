//! In-memory stand-in for the device and gateway management APIs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde_json::{Value, json};

use crate::api::types::{Certificate, DeviceEntry, NewDeviceEntry, TrustGroup};
use crate::api::{ApiResponse, ManagementApi, Target, paths};
use crate::error::Result;

/// A recorded request: target, method, path.
pub type Call = (Target, &'static str, String);

#[derive(Default)]
struct State {
    machine_ids: HashMap<Target, String>,
    groups: Vec<TrustGroup>,
    devices: HashMap<String, Vec<DeviceEntry>>,
    certificates: HashMap<Target, Vec<Certificate>>,
    failures: HashMap<Call, u16>,
    calls: Vec<Call>,
    next_id: u32,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Fake gateway + device pair.
///
/// Adding a device to a group emulates the certificate exchange the real
/// gateway performs: each side gets a certificate naming the other's
/// machine id.
pub struct FakeApi {
    state: Mutex<State>,
}

fn not_found() -> ApiResponse {
    ApiResponse::new(404, json!({"code": 404, "message": "not found"}))
}

fn ok(body: Value) -> ApiResponse {
    ApiResponse::new(200, body)
}

impl FakeApi {
    pub fn new(device_machine_id: &str, gateway_machine_id: &str) -> Self {
        let mut state = State::default();
        state
            .machine_ids
            .insert(Target::Device, device_machine_id.to_string());
        state
            .machine_ids
            .insert(Target::Gateway, gateway_machine_id.to_string());
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Answer `method path` on `target` with `status` instead of handling it.
    pub fn fail_with(&self, target: Target, method: &'static str, path: &str, status: u16) {
        self.lock()
            .failures
            .insert((target, method, path.to_string()), status);
    }

    pub fn seed_group(&self, name: &str) {
        let mut state = self.lock();
        state.groups.push(TrustGroup {
            group_name: name.to_string(),
            display: None,
            description: None,
        });
        state.devices.insert(name.to_string(), Vec::new());
    }

    /// Add a member entry directly, without the certificate exchange.
    pub fn seed_device(&self, group: &str, uri: &str) -> String {
        let mut state = self.lock();
        let uuid = state.next_id("dev");
        state
            .devices
            .entry(group.to_string())
            .or_default()
            .push(DeviceEntry {
                uuid: uuid.clone(),
                device_uri: Some(uri.to_string()),
                user_name: None,
                address: None,
                https_port: None,
            });
        uuid
    }

    pub fn seed_certificate(&self, target: Target, certificate_id: &str, machine_id: Option<&str>) {
        self.lock()
            .certificates
            .entry(target)
            .or_default()
            .push(Certificate {
                certificate_id: certificate_id.to_string(),
                machine_id: machine_id.map(str::to_string),
            });
    }

    pub fn groups(&self) -> Vec<TrustGroup> {
        self.lock().groups.clone()
    }

    /// Members of `group`, `None` when the group does not exist.
    pub fn devices(&self, group: &str) -> Option<Vec<DeviceEntry>> {
        let state = self.lock();
        if !state.groups.iter().any(|g| g.group_name == group) {
            return None;
        }
        Some(state.devices.get(group).cloned().unwrap_or_default())
    }

    pub fn certificates(&self, target: Target) -> Vec<Certificate> {
        self.lock()
            .certificates
            .get(&target)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Recorded POST and DELETE requests.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|(_, method, _)| *method != "GET")
            .collect()
    }

    fn handle(&self, target: Target, method: &'static str, path: &str, body: Option<&Value>) -> ApiResponse {
        let mut state = self.lock();
        let call = (target, method, path.to_string());
        state.calls.push(call.clone());
        if let Some(status) = state.failures.get(&call) {
            return ApiResponse::new(*status, Value::Null);
        }

        if path == paths::DEVICE_INFO && method == "GET" {
            let id = &state.machine_ids[&target];
            return if id.is_empty() {
                ok(json!({"hostname": "fake"}))
            } else {
                ok(json!({"machineId": id, "hostname": "fake"}))
            };
        }

        if path == paths::DEVICE_CERTIFICATES && method == "GET" {
            let items = state.certificates.get(&target).cloned().unwrap_or_default();
            return ok(json!({ "items": items }));
        }

        if let Some(id) = path.strip_prefix(&format!("{}/", paths::DEVICE_CERTIFICATES)) {
            if method != "DELETE" {
                return not_found();
            }
            let certs = state.certificates.entry(target).or_default();
            let before = certs.len();
            certs.retain(|c| c.certificate_id != id);
            return if certs.len() < before { ok(Value::Null) } else { not_found() };
        }

        if target == Target::Gateway {
            return Self::handle_groups(&mut state, method, path, body);
        }
        not_found()
    }

    fn handle_groups(state: &mut State, method: &'static str, path: &str, body: Option<&Value>) -> ApiResponse {
        if path == paths::DEVICE_GROUPS {
            return match method {
                "GET" => ok(json!({ "items": state.groups })),
                "POST" => {
                    let group: TrustGroup = serde_json::from_value(body.cloned().unwrap_or_default()).unwrap();
                    state.devices.insert(group.group_name.clone(), Vec::new());
                    state.groups.push(group.clone());
                    ok(serde_json::to_value(group).unwrap())
                }
                _ => not_found(),
            };
        }

        let Some(rest) = path.strip_prefix(&format!("{}/", paths::DEVICE_GROUPS)) else {
            return not_found();
        };
        let mut parts = rest.splitn(3, '/');
        let group = parts.next().unwrap_or_default().to_string();
        let exists = state.groups.iter().any(|g| g.group_name == group);
        if !exists {
            return not_found();
        }

        match (parts.next(), parts.next(), method) {
            (None, None, "DELETE") => {
                state.groups.retain(|g| g.group_name != group);
                state.devices.remove(&group);
                ok(Value::Null)
            }
            (Some("devices"), None, "GET") => {
                let items = state.devices.get(&group).cloned().unwrap_or_default();
                ok(json!({ "items": items }))
            }
            (Some("devices"), None, "POST") => {
                let new: NewDeviceEntry = serde_json::from_value(body.cloned().unwrap_or_default()).unwrap();
                let entry = DeviceEntry {
                    uuid: state.next_id("dev"),
                    device_uri: Some(format!("https://{}:{}", new.address, new.https_port)),
                    user_name: Some(new.user_name),
                    address: Some(new.address),
                    https_port: Some(json!(new.https_port)),
                };
                state.devices.entry(group).or_default().push(entry.clone());

                let device_id = state.machine_ids[&Target::Device].clone();
                let gateway_id = state.machine_ids[&Target::Gateway].clone();
                let device_cert = state.next_id("cert");
                let gateway_cert = state.next_id("cert");
                state.certificates.entry(Target::Device).or_default().push(Certificate {
                    certificate_id: device_cert,
                    machine_id: Some(gateway_id),
                });
                state.certificates.entry(Target::Gateway).or_default().push(Certificate {
                    certificate_id: gateway_cert,
                    machine_id: Some(device_id),
                });
                ok(serde_json::to_value(entry).unwrap())
            }
            (Some("devices"), Some(uuid), "DELETE") => {
                let devices = state.devices.entry(group).or_default();
                let before = devices.len();
                devices.retain(|d| d.uuid != uuid);
                if devices.len() < before { ok(Value::Null) } else { not_found() }
            }
            _ => not_found(),
        }
    }
}

impl ManagementApi for FakeApi {
    async fn get(&self, target: Target, path: &str) -> Result<ApiResponse> {
        Ok(self.handle(target, "GET", path, None))
    }

    async fn post(&self, target: Target, path: &str, body: &Value) -> Result<ApiResponse> {
        Ok(self.handle(target, "POST", path, Some(body)))
    }

    async fn delete(&self, target: Target, path: &str) -> Result<u16> {
        Ok(self.handle(target, "DELETE", path, None).status)
    }
}
