//! Read the on-disk segment sizes of a table from all servers of a cluster.
//!
//! The servers are read in parallel with a scatter-gather engine ([scatter_gather]), that returns
//! within a single deadline no matter how many servers are slow or down, and that merges the answers
//! per logical server id. Servers that fail are left out of the result and reported.
//!
#[macro_use]
extern crate serde_derive;

pub mod error;
pub mod endpoints;
pub mod transport;
pub mod scatter_gather;
pub mod table_size;
pub mod cost_entry;
pub mod snapshot;
pub mod utility;
