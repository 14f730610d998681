//! Utilities
use log::*;
use std::{env, fs, collections::HashMap, io::Write};
use anyhow::{Context, Result};
use regex::Regex;
use crate::endpoints::EndpointRegistry;

pub const DEFAULT_HOSTS: &str = "192.168.66.80,192.168.66.81,192.168.66.82";
pub const DEFAULT_PORTS: &str = "8097";
pub const DEFAULT_PARALLEL: &str = "8";
pub const DEFAULT_TIMEOUT_MS: &str = "5000";

/// Resolve a setting: the command line option if set, otherwise the environment variable
/// (which includes `.env` after `dotenv().ok()`), otherwise the default.
///
/// A value from the command line or the environment is recorded in `changed_options`,
/// so it can be written to `.env`.
pub fn set_setting(
    option: &Option<String>,
    env_var: &'static str,
    default: Option<&str>,
    changed_options: &mut HashMap<&str, String>,
) -> Option<String>
{
    if let Some(value) = option {
        info!("{} argument set: using: {}", env_var, value);
        changed_options.insert(env_var, value.to_string());
        return Some(value.to_string());
    }
    match env::var(env_var) {
        Ok(set_var) => {
            info!("{} not set: set via .env: {}", env_var, set_var);
            changed_options.insert(env_var, set_var.to_owned());
            Some(set_var)
        },
        Err(_e) => {
            match default {
                Some(default) => info!("{} not set: and not set via .env: using default: {}", env_var, default),
                None => info!("{} not set: and not set via .env", env_var),
            }
            default.map(str::to_string)
        },
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn set_hosts(
    option: &Option<String>,
    changed_options: &mut HashMap<&str, String>,
) -> Vec<String>
{
    split_list(&set_setting(option, "TABLE_SIZES_HOSTS", Some(DEFAULT_HOSTS), changed_options).unwrap_or_default())
}

pub fn set_ports(
    option: &Option<String>,
    changed_options: &mut HashMap<&str, String>,
) -> Vec<String>
{
    split_list(&set_setting(option, "TABLE_SIZES_PORTS", Some(DEFAULT_PORTS), changed_options).unwrap_or_default())
}

/// The explicit server list (`id=host:port,...`), which has no default.
pub fn set_servers(
    option: &Option<String>,
    changed_options: &mut HashMap<&str, String>,
) -> Option<String>
{
    set_setting(option, "TABLE_SIZES_SERVERS", None, changed_options)
}

pub fn set_parallel(
    option: &Option<String>,
    changed_options: &mut HashMap<&str, String>,
) -> Result<usize>
{
    let parallel = set_setting(option, "TABLE_SIZES_PARALLEL", Some(DEFAULT_PARALLEL), changed_options).unwrap_or_default();
    let parallel: usize = parallel.parse()
        .with_context(|| format!("Invalid value for parallel: {}", parallel))?;
    anyhow::ensure!(parallel > 0, "parallel must be at least 1");
    Ok(parallel)
}

pub fn set_timeout_ms(
    option: &Option<String>,
    changed_options: &mut HashMap<&str, String>,
) -> Result<u64>
{
    let timeout_ms = set_setting(option, "TABLE_SIZES_TIMEOUT_MS", Some(DEFAULT_TIMEOUT_MS), changed_options).unwrap_or_default();
    let timeout_ms: u64 = timeout_ms.parse()
        .with_context(|| format!("Invalid value for timeout_ms: {}", timeout_ms))?;
    anyhow::ensure!(timeout_ms > 0, "timeout_ms must be greater than 0");
    Ok(timeout_ms)
}

/// The servers to read: the explicit server list if set, otherwise every host and port combination.
pub fn set_registry(
    servers: &Option<String>,
    hosts: &[String],
    ports: &[String],
) -> Result<EndpointRegistry>
{
    let registry = match servers {
        Some(servers) => EndpointRegistry::parse_server_list(servers)
            .with_context(|| "Invalid server list")?,
        None => EndpointRegistry::from_hosts_ports(hosts, ports)
            .with_context(|| "Invalid hosts or ports")?,
    };
    Ok(registry)
}

pub fn set_regex(
    regex: &Option<String>,
) -> Result<Regex>
{
    let regex = match regex {
        Some(regex) => Regex::new(regex.as_str())
            .with_context(|| format!("Invalid regex: {}", regex))?,
        None => Regex::new(".*")?,
    };
    Ok(regex)
}

pub fn dotenv_writer(
    write_dotenv: bool,
    changed_options: HashMap<&str, String>,
) -> Result<()>
{
    if !changed_options.is_empty() && write_dotenv {
        info!("Writing .env file");
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(".env")
            .with_context(|| "Error writing .env file: .env")?;

        for (key, value) in changed_options {
            file.write_all(format!("{}={}\n", key, value).as_bytes())?;
            info!("{}={}", key, value);
        }
    }
    Ok(())
}
