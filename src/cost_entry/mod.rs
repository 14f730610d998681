//! Module for ranking the contributions of dimension values to a change of a metric.
//!
//! A [CostEntry] describes how much one value of a dimension (for example the server `Server_h1_8097`
//! of the dimension `server`) contributed to the change of a metric between a baseline and a current reading.
//! Entries are ordered by their cost only, so sorting a list of entries ranks the contributors.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
