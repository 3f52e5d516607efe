//! `trust-builder`
//!
//! Establishes (or, with `--clean`, removes) a gateway's delegated trust in
//! a managed device.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use trust_builder_core::driver::{self, DEFAULT_GROUP_NAME, Mode, Outcome};
use trust_builder_core::tracing_init::init_tracing;
use trust_builder_core::usage;
use trust_builder_core::{Credentials, Endpoint, TrustSettings};

const EXAMPLES: &str = "\
Examples:

    trust-builder --device-host 192.168.245.1 --device-port 443 \\
        --device-username admin --device-password admin \\
        --group-name dockerContainer --clean

    trust-builder --device-host 172.13.1.103 --device-port 443 \\
        --device-username admin --device-password admin \\
        --group-name webapp1 --gateway-host f5gw --gateway-port 8080

    trust-builder --device-host 172.13.1.103 --device-port 443 \\
        --device-username admin --device-password admin \\
        --group-name service1 --clean --purge-device-certificates
";

#[derive(Parser, Debug)]
#[command(name = "trust-builder")]
#[command(version, about = "Establish or remove gateway trust for a managed device")]
#[command(arg_required_else_help = true, after_help = EXAMPLES)]
struct Args {
    /// Device host to add to or remove from gateway trust
    #[arg(long, env = "TRUST_BUILDER_DEVICE_HOST")]
    device_host: String,

    /// Device management HTTPS port
    #[arg(long, default_value_t = 443, env = "TRUST_BUILDER_DEVICE_PORT")]
    device_port: u16,

    /// Device management username
    #[arg(long, default_value = "admin", env = "TRUST_BUILDER_DEVICE_USERNAME")]
    device_username: String,

    /// Device management password
    #[arg(long, env = "TRUST_BUILDER_DEVICE_PASSWORD", hide_env_values = true)]
    device_password: String,

    /// Gateway HTTP host
    #[arg(long, default_value = "localhost", env = "TRUST_BUILDER_GATEWAY_HOST")]
    gateway_host: String,

    /// Gateway HTTP port
    #[arg(long, default_value_t = 8080, env = "TRUST_BUILDER_GATEWAY_PORT")]
    gateway_port: u16,

    /// Gateway trust group name
    #[arg(long, default_value = DEFAULT_GROUP_NAME, env = "TRUST_BUILDER_GROUP_NAME")]
    group_name: String,

    /// Remove certificates, the device entry and the trust group instead of creating them
    #[arg(long, env = "TRUST_BUILDER_CLEAN")]
    clean: bool,

    /// While cleaning, also delete every certificate stored on the device
    #[arg(long, requires = "clean", env = "TRUST_BUILDER_PURGE_DEVICE_CERTIFICATES")]
    purge_device_certificates: bool,

    /// Log level filter (e.g. "info", "debug", "warn").
    #[arg(long, default_value = "info", env = "TRUST_BUILDER_LOG_LEVEL")]
    log_level: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "TRUST_BUILDER_LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn settings(&self) -> TrustSettings {
        TrustSettings::new(
            Endpoint::device(
                &self.device_host,
                self.device_port,
                Credentials::new(&self.device_username, &self.device_password),
            ),
            Endpoint::gateway(&self.gateway_host, self.gateway_port),
            &self.group_name,
        )
        .with_purge(self.purge_device_certificates)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_tracing(&args.log_level, args.log_json);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("{}", failure_message(&e));
            }
            ExitCode::FAILURE
        }
    }
}

/// The single human-readable line reported on stderr when a run fails.
fn failure_message(err: &anyhow::Error) -> String {
    format!("error: {err:#}")
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let settings = args.settings();
    let mode = Mode::from_clean_flag(args.clean);

    let outcome = driver::execute(&settings, mode)
        .await
        .with_context(|| format!("{mode} trust for {}", settings.device))?;

    match outcome {
        Outcome::Established(report) => {
            info!(
                device_machine_id = %report.device_machine_id,
                gateway_machine_id = %report.gateway_machine_id,
                group_created = report.group_created,
                device_added = report.device_added,
                proxy = %usage::proxy_url(&settings),
                "trusted requests can be made through the gateway"
            );
            #[allow(clippy::print_stdout)]
            {
                println!();
                print!("{}", usage::proxy_usage(&settings));
            }
        }
        Outcome::Cleaned(report) => {
            info!(
                gateway_certificate_removed = report.gateway_certificate_removed,
                device_certificate_removed = report.device_certificate_removed,
                device_entry_removed = report.device_entry_removed,
                group_removed = report.group_removed,
                purged_certificates = report.purged_certificates,
                "requests proxied through the gateway are no longer trusted"
            );
        }
    }
    Ok(())
}
