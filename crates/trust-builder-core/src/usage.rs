//! Operator guidance printed after trust is established.

use std::fmt::Write;

use crate::api::paths;
use crate::driver::TrustSettings;

/// Gateway path that forwards trusted requests to a device.
pub const PROXY_PATH: &str = "/mgmt/shared/test/proxy-js";

/// `http://<gateway>/mgmt/shared/test/proxy-js`
pub fn proxy_url(settings: &TrustSettings) -> String {
    settings.gateway.url(PROXY_PATH)
}

/// Describe how to submit proxied requests through the gateway.
pub fn proxy_usage(settings: &TrustSettings) -> String {
    let proxy = proxy_url(settings);
    let example_uri = settings.device.url(paths::DEVICE_INFO);

    let mut out = String::new();
    let _ = writeln!(out, "All proxy requests are of the form:");
    let _ = writeln!(out);
    let _ = writeln!(out, "POST {proxy}");
    let _ = writeln!(out);
    let _ = writeln!(out, "{{");
    let _ = writeln!(out, "    \"method\": [Get,Post,Put,Patch,Delete],");
    let _ = writeln!(out, "    \"uri\": [remote device full uri],");
    let _ = writeln!(out, "    \"body\": [request body]");
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Example:");
    let _ = writeln!(out);
    let _ = writeln!(out, "POST {proxy}");
    let _ = writeln!(out);
    let _ = writeln!(out, "{{");
    let _ = writeln!(out, "    \"method\": \"Get\",");
    let _ = writeln!(out, "    \"uri\": \"{example_uri}\"");
    let _ = writeln!(out, "}}");
    out
}
