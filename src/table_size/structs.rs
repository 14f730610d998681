//! The structs
//!
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use crate::error::FailureReason;
use crate::scatter_gather::ScatterGather;
use crate::transport::{HttpTransport, Transport};

/// The size of a single segment.
///
/// Serialized with the names used by the servers, `id` and `size` are accepted when reading.
/// A negative size does not decode.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SegmentSizeInfo {
    #[serde(rename = "segmentName", alias = "id")]
    pub segment_name: String,
    #[serde(rename = "diskSizeInBytes", alias = "size")]
    pub disk_size_in_bytes: u64,
}
/// The root struct for deserializing `/table/<table name>/size`.
///
/// Only `segments` is required.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableSizeInfo {
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub disk_size_in_bytes: u64,
    pub segments: Vec<SegmentSizeInfo>,
}
/// The [crate::scatter_gather::ResponseDecoder] for [TableSizeInfo], which keeps the segments.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableSizeDecoder;
/// Reads the segment sizes of a table from a set of servers.
///
/// The reader owns the http client and the worker pool, and should be kept to reuse both.
pub struct TableSizeReader<T: Transport = HttpTransport> {
    pub(super) engine: ScatterGather<T>,
}
/// The struct that is used to print, and to store and retrieve the fetched data in a snapshot.
///
/// There is one per invited server: a server that did not respond has an empty segments list,
/// and the reason in `failure`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServerTableSize {
    pub server_id: String,
    pub hostname_port: String,
    pub timestamp: DateTime<Local>,
    pub table_name: String,
    pub segments: Vec<SegmentSizeInfo>,
    pub failure: Option<FailureReason>,
}
/// Wrapper struct for holding the [ServerTableSize] structs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AllTableSizes {
    pub table_sizes: Vec<ServerTableSize>,
}
// diff
/// BTreeMap for storing the table size diff struct per server id.
type BTreeTableSizeDiff = BTreeMap<String, TableSizeDiffFields>;
/// The wrapper struct for holding the btreemap holding the diff structs.
#[derive(Debug, Default)]
pub struct TableSizeDiff {
    pub btreetablesizediff: BTreeTableSizeDiff,
}
/// The table size diff struct.
///
/// A server that is not in a snapshot, or did not respond in it, has `present` set to false.
/// A server that did not respond in a snapshot also has `no_response` set.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TableSizeDiffFields {
    pub first_present: bool,
    pub first_no_response: bool,
    pub first_hostname_port: String,
    pub first_segments: usize,
    pub first_disk_size_in_bytes: u64,
    pub second_present: bool,
    pub second_no_response: bool,
    pub second_hostname_port: String,
    pub second_segments: usize,
    pub second_disk_size_in_bytes: u64,
}
