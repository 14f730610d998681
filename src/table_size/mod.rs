//! Module for reading `/table/<table name>/size` from the servers.
//!
//! Every server that hosts segments of a table reports the on-disk size of its segments at
//! `/table/<table name>/size`, default port 8097:
//! ```text
//! {"tableName":"t1_OFFLINE","diskSizeInBytes":100,"segments":[{"segmentName":"s1","diskSizeInBytes":100}]}
//! ```
//! The short form `{"segments":[{"id":"s1","size":100}]}` is accepted as well.
//!
//! [TableSizeReader] reads the endpoint from all servers in parallel using the scatter-gather engine,
//! and returns the segments per server. Servers that are down, slow or return an error are left out,
//! which is reported, but is not an error.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
