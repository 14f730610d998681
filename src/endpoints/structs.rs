//! The structs
//!
use std::collections::HashMap;

/// The logical id of a server, as used by the rest of the cluster.
///
/// It is stable across restarts, and is the key of the gathered results.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ServerId(pub String);

/// The `host:port` a server can be reached at.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Endpoint(pub String);

/// One-to-one mapping between [ServerId] and [Endpoint].
///
/// Both maps are filled together in [EndpointRegistry::new] and are read-only afterwards,
/// which means a registry can be shared by any number of threads without locking.
#[derive(Debug, Default, Clone)]
pub struct EndpointRegistry {
    pub(super) endpoint_by_server: HashMap<ServerId, Endpoint>,
    pub(super) server_by_endpoint: HashMap<Endpoint, ServerId>,
}
