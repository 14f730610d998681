//! Module for the mapping between the logical server ids and their `host:port` endpoints.
//!
//! A cluster refers to its servers by a logical id (such as `Server_192.168.66.80_8097`),
//! while http requests only know the `host:port` they were sent to.
//! The [EndpointRegistry] holds both directions of the mapping, so a response received from an
//! endpoint can be attributed to the logical server it came from.
//!
//! The registry is built once for a fan-out call, validated to be one-to-one, and never changed afterwards.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
