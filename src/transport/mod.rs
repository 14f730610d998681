//! Module for the http transport used to reach the servers.
//!
//! The scatter-gather engine only needs "GET this url, and give up after this much time".
//! That is the [Transport] trait; [HttpTransport] implements it with a pooled blocking reqwest client.
//! The client is created once and shared by all requests and all calls, so connections are reused.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
