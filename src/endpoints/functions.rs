//! The impls and functions
//!
use std::{collections::hash_map::Entry, fmt, sync::OnceLock};
use regex::Regex;
use log::*;
use crate::error::{GatherError, Result};
use crate::endpoints::{Endpoint, EndpointRegistry, ServerId};

impl ServerId {
    pub fn new(id: impl Into<String>) -> Self {
        ServerId(id.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServerId {
    fn from(id: &str) -> Self {
        ServerId(id.to_string())
    }
}

impl Endpoint {
    pub fn new(hostname_port: impl Into<String>) -> Self {
        Endpoint(hostname_port.into())
    }
    pub fn from_host_port(
        host: &str,
        port: &str,
    ) -> Self
    {
        Endpoint(format!("{}:{}", host, port))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    /// The id a server gets when it is not explicitly named: `Server_<host>_<port>`.
    pub fn derived_server_id(&self) -> ServerId {
        match self.0.rsplit_once(':') {
            Some((host, port)) => ServerId(format!("Server_{}_{}", host, port)),
            None => ServerId(format!("Server_{}", self.0)),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(hostname_port: &str) -> Self {
        Endpoint(hostname_port.to_string())
    }
}

/// The `host:port` or `[ipv6]:port` pattern, compiled once per process.
fn hostname_port_regex() -> Result<&'static Regex> {
    static HOSTNAME_PORT: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    HOSTNAME_PORT
        .get_or_init(|| Regex::new(r"^(\[[0-9A-Fa-f:.]+\]|[A-Za-z0-9._-]+):[0-9]{1,5}$"))
        .as_ref()
        .map_err(|e| GatherError::InvalidArgument(e.to_string()))
}

impl EndpointRegistry {
    /// Build the registry from (server id, endpoint) pairs.
    ///
    /// The pairs must be one-to-one: a second occurrence of a server id or of an endpoint is an error,
    /// and never overwrites the first one, because that would attribute responses to the wrong server.
    pub fn new<I>(servers: I) -> Result<EndpointRegistry>
    where
        I: IntoIterator<Item = (ServerId, Endpoint)>,
    {
        let hostname_port = hostname_port_regex()?;

        let mut registry = EndpointRegistry::default();
        for (server, endpoint) in servers {
            if server.0.trim().is_empty() {
                return Err(GatherError::InvalidArgument(format!("empty server id for endpoint: {}", endpoint)));
            }
            if !hostname_port.is_match(&endpoint.0) {
                return Err(GatherError::InvalidArgument(format!("endpoint for server {} is not host:port: '{}'", server, endpoint)));
            }
            match registry.server_by_endpoint.entry(endpoint.clone()) {
                Entry::Occupied(existing) => {
                    return Err(GatherError::DuplicateAddress {
                        address: endpoint.0,
                        first: existing.get().0.clone(),
                        second: server.0,
                    });
                }
                Entry::Vacant(slot) => {
                    if registry.endpoint_by_server.contains_key(&server) {
                        return Err(GatherError::DuplicateId(server.0));
                    }
                    slot.insert(server.clone());
                    registry.endpoint_by_server.insert(server, endpoint);
                }
            }
        }
        debug!("endpoint registry with {} servers", registry.len());
        Ok(registry)
    }
    /// Build the registry from every combination of host and port, with derived server ids.
    pub fn from_hosts_ports(
        hosts: &[String],
        ports: &[String],
    ) -> Result<EndpointRegistry>
    {
        EndpointRegistry::new(
            hosts.iter()
                .flat_map(|host| ports.iter().map(move |port| Endpoint::from_host_port(host, port)))
                .map(|endpoint| (endpoint.derived_server_id(), endpoint))
        )
    }
    /// Parse a comma separated server list.
    ///
    /// Every entry is either `id=host:port`, or `host:port` in which case the id is derived.
    pub fn parse_server_list(list: &str) -> Result<EndpointRegistry>
    {
        let mut servers = Vec::new();
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (server, endpoint) = match entry.split_once('=') {
                Some((id, hostname_port)) => (ServerId::new(id.trim()), Endpoint::new(hostname_port.trim())),
                None => {
                    let endpoint = Endpoint::new(entry);
                    (endpoint.derived_server_id(), endpoint)
                }
            };
            servers.push((server, endpoint));
        }
        if servers.is_empty() {
            return Err(GatherError::InvalidArgument(format!("no servers in server list: '{}'", list)));
        }
        EndpointRegistry::new(servers)
    }
    pub fn address_of(&self, server: &ServerId) -> Result<&Endpoint> {
        self.endpoint_by_server
            .get(server)
            .ok_or_else(|| GatherError::UnknownEndpoint(server.0.clone()))
    }
    pub fn server_of(&self, endpoint: &Endpoint) -> Result<&ServerId> {
        self.server_by_endpoint
            .get(endpoint)
            .ok_or_else(|| GatherError::UnknownEndpoint(endpoint.0.clone()))
    }
    pub fn contains_server(&self, server: &ServerId) -> bool {
        self.endpoint_by_server.contains_key(server)
    }
    pub fn len(&self) -> usize {
        self.endpoint_by_server.len()
    }
    pub fn is_empty(&self) -> bool {
        self.endpoint_by_server.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&ServerId, &Endpoint)> {
        self.endpoint_by_server.iter()
    }
}
