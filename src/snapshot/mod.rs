//! Module for numbered snapshots on disk.
//!
//! A snapshot directory holds `snapshot.index`, a CSV file with the number, timestamp and comment of every snapshot,
//! and a directory per snapshot number with the data of the snapshot in JSON.
//! The default snapshot directory is `table_sizes.snapshots` in the current working directory.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
