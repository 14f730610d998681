//! The scatter-gather engine.
//!
//! The engine sends one request to every server of a call at the same time, and merges the answers
//! into a single [GatherResult] keyed by logical server id.
//! It works in the following steps:
//! 1. [FanOutTarget::for_registry] creates a target (server id, endpoint, url) per server.
//! 2. [ScatterGather::dispatch] spawns a request per target on the worker pool,
//!    every request bounded by the time left until the deadline of the call.
//! 3. [Completions] yields the outcomes in the order the requests finish, and stops at the deadline.
//! 4. [aggregate] maps every outcome back to its server id, decodes it with a [ResponseDecoder],
//!    and records the servers that failed or did not answer in time.
//!
//! The deadline is absolute: a call never takes longer than its timeout plus the time to release
//! the request that is in flight, regardless of the number of servers or how many of them hang.
//! A server that fails is never an error of the call; it is absent from the result and logged.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
