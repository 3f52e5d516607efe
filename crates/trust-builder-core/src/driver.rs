//! Orchestration entry point: pick a sequencer and run it to completion.

use std::fmt;

use crate::api::{ManagementApi, RestClient};
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::establish::{EstablishReport, establish};
use crate::teardown::{TeardownReport, teardown};

/// Default name of the gateway trust group.
pub const DEFAULT_GROUP_NAME: &str = "dockerContainers";

/// Which direction to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Establish,
    Clean,
}

impl Mode {
    pub const fn from_clean_flag(clean: bool) -> Self {
        if clean { Self::Clean } else { Self::Establish }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Establish => "establish",
            Self::Clean => "clean",
        })
    }
}

/// Read-only inputs of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustSettings {
    pub device: Endpoint,
    pub gateway: Endpoint,
    pub group_name: String,
    /// Teardown also deletes every certificate stored on the device.
    pub purge_device_certificates: bool,
}

impl TrustSettings {
    pub fn new(device: Endpoint, gateway: Endpoint, group_name: impl Into<String>) -> Self {
        Self {
            device,
            gateway,
            group_name: group_name.into(),
            purge_device_certificates: false,
        }
    }

    #[must_use]
    pub const fn with_purge(mut self, purge: bool) -> Self {
        self.purge_device_certificates = purge;
        self
    }

    /// URI the gateway records for the device in its trust group.
    pub fn device_uri(&self) -> String {
        self.device.base_url()
    }

    pub fn validate(&self) -> Result<()> {
        self.device.validate()?;
        self.gateway.validate()?;
        if self.group_name.trim().is_empty() {
            return Err(Error::Config("trust group name is empty".into()));
        }
        Ok(())
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Established(EstablishReport),
    Cleaned(TeardownReport),
}

/// Run the sequencer for `mode` against `api`. The first failing step
/// aborts the run.
pub async fn run<A: ManagementApi>(api: &A, settings: &TrustSettings, mode: Mode) -> Result<Outcome> {
    settings.validate()?;
    dispatch(api, settings, mode).await
}

/// Validate `settings`, build a [`RestClient`] for them and run `mode`.
pub async fn execute(settings: &TrustSettings, mode: Mode) -> Result<Outcome> {
    settings.validate()?;
    let client = RestClient::new(settings.device.clone(), settings.gateway.clone())?;
    dispatch(&client, settings, mode).await
}

async fn dispatch<A: ManagementApi>(api: &A, settings: &TrustSettings, mode: Mode) -> Result<Outcome> {
    tracing::info!(%mode, group = %settings.group_name, "starting trust run");
    match mode {
        Mode::Establish => establish(api, settings).await.map(Outcome::Established),
        Mode::Clean => teardown(api, settings).await.map(Outcome::Cleaned),
    }
}
