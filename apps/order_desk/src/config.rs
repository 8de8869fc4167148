use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::{ClientSettings, Protocol};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "order_desk.toml";

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    protocol: Option<String>,
    soap_url: Option<String>,
    rest_url: Option<String>,
    page_size: Option<u32>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the config file, then `ORDER_DESK__*` variables.
///
/// An explicit `path` must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(error) if required => {
            return Err(error)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut ClientSettings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileConfig = toml::from_str(raw)?;
    if let Some(v) = file_cfg.protocol {
        set_protocol(settings, "protocol", &v);
    }
    if let Some(v) = file_cfg.soap_url {
        settings.soap_url = v;
    }
    if let Some(v) = file_cfg.rest_url {
        settings.rest_base_url = v;
    }
    if let Some(v) = file_cfg.page_size {
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout = Duration::from_secs(v);
    }
    Ok(())
}

fn apply_env(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("ORDER_DESK__PROTOCOL") {
        set_protocol(settings, "ORDER_DESK__PROTOCOL", &v);
    }
    if let Some(v) = lookup("ORDER_DESK__SOAP_URL") {
        settings.soap_url = v;
    }
    if let Some(v) = lookup("ORDER_DESK__REST_URL") {
        settings.rest_base_url = v;
    }
    if let Some(v) = lookup("ORDER_DESK__PAGE_SIZE") {
        match v.trim().parse() {
            Ok(parsed) => settings.page_size = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid ORDER_DESK__PAGE_SIZE"),
        }
    }
    if let Some(v) = lookup("ORDER_DESK__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse() {
            Ok(parsed) => settings.request_timeout = Duration::from_secs(parsed),
            Err(_) => warn!(value = %v, "ignoring invalid ORDER_DESK__REQUEST_TIMEOUT_SECS"),
        }
    }
}

fn set_protocol(settings: &mut ClientSettings, source: &str, raw: &str) {
    match raw.parse::<Protocol>() {
        Ok(protocol) => settings.protocol = protocol,
        Err(error) => warn!(source, %error, "ignoring invalid protocol"),
    }
}
