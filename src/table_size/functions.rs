//! The impls and functions
//!
use chrono::{DateTime, Local};
use std::{path::Path, sync::Arc, time::{Duration, Instant}};
use colored::Colorize;
use itertools::Itertools;
use regex::Regex;
use log::*;
use anyhow::Context;
use crate::cost_entry::CostEntry;
use crate::endpoints::{Endpoint, EndpointRegistry};
use crate::error::{FailureReason, GatherError, Result};
use crate::scatter_gather::{FanOutTarget, GatherResult, ResponseDecoder, ScatterGather};
use crate::snapshot;
use crate::transport::Transport;
use crate::table_size::{AllTableSizes, SegmentSizeInfo, ServerTableSize, TableSizeDecoder, TableSizeDiff, TableSizeDiffFields, TableSizeInfo, TableSizeReader};

/// The name of the table size data in a snapshot.
pub const SNAPSHOT_NAME: &str = "table-size";

/// Create the url to read the segment sizes of `table_name` from `endpoint`.
///
/// The table name must be usable as a single path element.
pub fn table_size_url(
    endpoint: &Endpoint,
    table_name: &str,
) -> Result<String>
{
    if table_name.trim().is_empty() {
        return Err(GatherError::InvalidArgument("table name is empty".to_string()));
    }
    if table_name.chars().any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%')) {
        return Err(GatherError::InvalidArgument(format!("table name is not a valid path element: '{}'", table_name)));
    }
    Ok(format!("http://{}/table/{}/size", endpoint, table_name))
}

impl ResponseDecoder for TableSizeDecoder {
    type Payload = Vec<SegmentSizeInfo>;

    fn decode(&self, body: &str) -> std::result::Result<Vec<SegmentSizeInfo>, FailureReason> {
        serde_json::from_str::<TableSizeInfo>(body)
            .map(|table_size_info| table_size_info.segments)
            .map_err(|e| FailureReason::Decode(e.to_string()))
    }
}

impl<T: Transport> TableSizeReader<T> {
    pub fn new(
        transport: T,
        parallel: usize,
    ) -> Result<Self>
    {
        Ok(TableSizeReader { engine: ScatterGather::new(transport, parallel)? })
    }
    pub fn engine(&self) -> &ScatterGather<T> {
        &self.engine
    }
    /// Read the segment sizes of `table_name` from every server in the registry, within `timeout_ms` milliseconds.
    ///
    /// The result only contains the servers that responded successfully; the others are in the failures.
    pub fn get_segment_size_info_from_servers(
        &self,
        registry: &EndpointRegistry,
        table_name: &str,
        timeout_ms: u64,
    ) -> Result<GatherResult<Vec<SegmentSizeInfo>>>
    {
        if timeout_ms == 0 {
            return Err(GatherError::InvalidArgument("timeout must be greater than 0".to_string()));
        }
        let targets = FanOutTarget::for_registry(registry, |endpoint| table_size_url(endpoint, table_name))?;
        self.engine.gather(registry, table_name, targets, &TableSizeDecoder, Duration::from_millis(timeout_ms))
    }
    /// Read the segment sizes, and turn them into a [ServerTableSize] per invited server.
    pub fn read_table_sizes(
        &self,
        registry: &EndpointRegistry,
        table_name: &str,
        timeout_ms: u64,
    ) -> Result<AllTableSizes>
    {
        info!("begin parallel http read");
        let timer = Instant::now();
        let timestamp = Local::now();

        let result = self.get_segment_size_info_from_servers(registry, table_name, timeout_ms)?;

        info!("end parallel http read {:?}", timer.elapsed());
        Ok(AllTableSizes::from_gather_result(registry, table_name, timestamp, result))
    }
}

impl<T: Transport> TableSizeReader<T> {
    /// [TableSizeReader::read_table_sizes] for async callers.
    ///
    /// The read blocks while waiting for the servers, so it is run on the blocking thread pool of tokio.
    pub async fn read_table_sizes_async(
        self: Arc<Self>,
        registry: Arc<EndpointRegistry>,
        table_name: String,
        timeout_ms: u64,
    ) -> anyhow::Result<AllTableSizes>
    {
        let allsizes = tokio::task::spawn_blocking(move || self.read_table_sizes(&registry, &table_name, timeout_ms))
            .await
            .with_context(|| "Table size reader task failed")??;
        Ok(allsizes)
    }
}

impl AllTableSizes {
    pub fn new() -> Self {
        Default::default()
    }
    /// One row per invited server, sorted by server id.
    pub fn from_gather_result(
        registry: &EndpointRegistry,
        table_name: &str,
        timestamp: DateTime<Local>,
        mut result: GatherResult<Vec<SegmentSizeInfo>>,
    ) -> Self
    {
        let mut allsizes = AllTableSizes::new();
        let servers = result.responses.keys()
            .chain(result.failures.keys())
            .cloned()
            .sorted()
            .collect::<Vec<_>>();
        for server in servers {
            let hostname_port = registry.address_of(&server).map(|endpoint| endpoint.to_string()).unwrap_or_default();
            let segments = result.responses.remove(&server);
            let failure = match segments {
                Some(_) => None,
                None => result.failures.remove(&server),
            };
            allsizes.table_sizes.push(ServerTableSize {
                server_id: server.to_string(),
                hostname_port,
                timestamp,
                table_name: table_name.to_string(),
                segments: segments.unwrap_or_default(),
                failure,
            });
        }
        allsizes
    }
    pub fn responded(&self) -> usize {
        self.table_sizes.iter().filter(|row| row.failure.is_none()).count()
    }
    /// Save the rows as a new snapshot, and return the snapshot number.
    pub fn save_snapshot(
        &self,
        snapshot_directory: &Path,
        snapshot_comment: &Option<String>,
    ) -> anyhow::Result<i32>
    {
        info!("begin snapshot");
        let timer = Instant::now();

        let snapshot_number = snapshot::Snapshot::insert_new_snapshot_number(snapshot_directory, snapshot_comment)?;
        snapshot::save_snapshot_json(snapshot_directory, snapshot_number, SNAPSHOT_NAME, &self.table_sizes)?;

        info!("end snapshot: {:?}", timer.elapsed());
        Ok(snapshot_number)
    }
    pub fn read_snapshot(
        snapshot_directory: &Path,
        snapshot_number: &str,
    ) -> anyhow::Result<AllTableSizes>
    {
        let mut allsizes = AllTableSizes::new();
        allsizes.table_sizes = snapshot::read_snapshot_json(snapshot_directory, snapshot_number, SNAPSHOT_NAME)?;
        Ok(allsizes)
    }
    /// The sum over all servers, capped at `u64::MAX`.
    pub fn total_disk_size_in_bytes(&self) -> u64 {
        self.table_sizes.iter()
            .map(ServerTableSize::disk_size_in_bytes)
            .fold(0, u64::saturating_add)
    }
    pub fn print(
        &self,
        hostname_filter: &Regex,
        segment_filter: &Regex,
        details: bool,
    )
    {
        println!("{:40} {:25} {:>10} {:>20}",
                 "server_id",
                 "hostname_port",
                 "segments",
                 "disk_size_in_bytes"
        );
        for row in self.table_sizes.iter()
            .filter(|row| hostname_filter.is_match(&row.hostname_port) || hostname_filter.is_match(&row.server_id))
        {
            match &row.failure {
                None => {
                    println!("{:40} {:25} {:>10} {:>20}",
                             row.server_id,
                             row.hostname_port,
                             row.segments.len(),
                             row.disk_size_in_bytes()
                    );
                    if details {
                        for segment in row.segments.iter()
                            .filter(|segment| segment_filter.is_match(&segment.segment_name))
                            .sorted_by(|a, b| a.segment_name.cmp(&b.segment_name))
                        {
                            println!("  {:75} {:>20}", segment.segment_name, segment.disk_size_in_bytes);
                        }
                    }
                },
                Some(reason) => {
                    println!("{:40} {:25} {}",
                             row.server_id,
                             row.hostname_port,
                             format!("no response: {}", reason).red()
                    );
                },
            }
        }
        let summary = format!("{}/{} servers responded, total disk size in bytes: {}", self.responded(), self.table_sizes.len(), self.total_disk_size_in_bytes());
        if self.responded() == self.table_sizes.len() {
            println!("{}", summary);
        } else {
            println!("{}", summary.yellow());
        }
    }
}

impl ServerTableSize {
    /// The sum of the segment sizes, capped at `u64::MAX`: the sizes come from the server as-is.
    pub fn disk_size_in_bytes(&self) -> u64 {
        self.segments.iter()
            .map(|segment| segment.disk_size_in_bytes)
            .fold(0, u64::saturating_add)
    }
}

impl TableSizeDiff {
    pub fn new() -> Self { Default::default() }
    pub fn snapshot_diff(
        snapshot_directory: &Path,
        begin_snapshot: &str,
        end_snapshot: &str,
    ) -> anyhow::Result<TableSizeDiff>
    {
        let mut tablesizediff = TableSizeDiff::new();
        tablesizediff.first_snapshot(AllTableSizes::read_snapshot(snapshot_directory, begin_snapshot)?);
        tablesizediff.second_snapshot(AllTableSizes::read_snapshot(snapshot_directory, end_snapshot)?);

        Ok(tablesizediff)
    }
    pub fn first_snapshot(
        &mut self,
        allsizes: AllTableSizes,
    )
    {
        for row in allsizes.table_sizes.into_iter()
        {
            let disk_size_in_bytes = row.disk_size_in_bytes();
            let responded = row.failure.is_none();
            self.btreetablesizediff
                .entry(row.server_id.clone())
                .and_modify(|_| error!("Duplicate server id entry: {}", row.server_id))
                .or_insert(TableSizeDiffFields {
                    first_present: responded,
                    first_no_response: !responded,
                    first_hostname_port: row.hostname_port,
                    first_segments: row.segments.len(),
                    first_disk_size_in_bytes: disk_size_in_bytes,
                    ..Default::default()
                });
        }
    }
    pub fn second_snapshot(
        &mut self,
        allsizes: AllTableSizes,
    )
    {
        for row in allsizes.table_sizes.into_iter()
        {
            let disk_size_in_bytes = row.disk_size_in_bytes();
            let responded = row.failure.is_none();
            self.btreetablesizediff
                .entry(row.server_id.clone())
                .and_modify(|tablesizedifffields| {
                    tablesizedifffields.second_present = responded;
                    tablesizedifffields.second_no_response = !responded;
                    tablesizedifffields.second_hostname_port = row.hostname_port.clone();
                    tablesizedifffields.second_segments = row.segments.len();
                    tablesizedifffields.second_disk_size_in_bytes = disk_size_in_bytes;
                })
                .or_insert(TableSizeDiffFields {
                    second_present: responded,
                    second_no_response: !responded,
                    second_hostname_port: row.hostname_port,
                    second_segments: row.segments.len(),
                    second_disk_size_in_bytes: disk_size_in_bytes,
                    ..Default::default()
                });
        }
    }
    /// Rank the servers by their share in the total change of the disk size, largest first.
    ///
    /// Servers without any change, and servers that did not respond in one of the snapshots, are left out.
    /// The sizes are added up as `i128`, which cannot overflow for `u64` sizes.
    pub fn ranked_changes(&self) -> Vec<CostEntry>
    {
        let comparable = || self.btreetablesizediff.iter()
            .filter(|(_, row)| !row.first_no_response && !row.second_no_response);
        let first_total: i128 = comparable().map(|(_, row)| i128::from(row.first_disk_size_in_bytes)).sum();
        let second_total: i128 = comparable().map(|(_, row)| i128::from(row.second_disk_size_in_bytes)).sum();
        let total_change: i128 = comparable().map(|(_, row)| row.size_change().abs()).sum();

        let share = |part: i128, total: i128| if total == 0 { 0. } else { part as f64 / total as f64 };

        comparable()
            .filter(|(_, row)| row.first_disk_size_in_bytes != row.second_disk_size_in_bytes)
            .map(|(server_id, row)| {
                let baseline = i128::from(row.first_disk_size_in_bytes);
                let current = i128::from(row.second_disk_size_in_bytes);
                let change_ratio = if baseline == 0 { f64::INFINITY } else { current as f64 / baseline as f64 };
                CostEntry::new(
                    "server",
                    server_id,
                    baseline as f64,
                    current as f64,
                    change_ratio,
                    (current - baseline) as f64,
                    share(baseline, first_total),
                    share(current, second_total),
                    share(baseline + current, first_total + second_total),
                    share((current - baseline).abs(), total_change),
                )
            })
            .sorted_by(|a, b| b.cmp(a))
            .collect()
    }
    pub fn print(
        &self,
        hostname_filter: &Regex,
    )
    {
        for (server_id, row) in self.btreetablesizediff.iter()
            .filter(|(server_id, row)| hostname_filter.is_match(server_id)
                || hostname_filter.is_match(&row.first_hostname_port)
                || hostname_filter.is_match(&row.second_hostname_port))
        {
            match row.diff_line(server_id) {
                Some(line) => println!("{}", line),
                None => debug!("equal, next server"),
            }
        }
        for entry in self.ranked_changes() {
            println!("{}", entry);
        }
    }
}

impl TableSizeDiffFields {
    /// The change of the disk size from the first to the second snapshot.
    pub fn size_change(&self) -> i128 {
        i128::from(self.second_disk_size_in_bytes) - i128::from(self.first_disk_size_in_bytes)
    }
    /// The line printed for the server in the diff, or `None` when nothing changed.
    ///
    /// `+` is a server that was added, `-` a server that was removed and `*` a changed server.
    /// A server that did not respond in a snapshot is shown with `?`, and is not counted as added or removed.
    pub fn diff_line(
        &self,
        server_id: &str,
    ) -> Option<String>
    {
        if self.first_no_response || self.second_no_response {
            let which = match (self.first_no_response, self.second_no_response) {
                (true, true) => "no response in both snapshots",
                (true, false) => "no response in begin snapshot",
                _ => "no response in end snapshot",
            };
            let (hostname_port, segments, disk_size_in_bytes) = if self.second_present {
                (&self.second_hostname_port, self.second_segments, self.second_disk_size_in_bytes)
            } else if self.first_present || self.second_hostname_port.is_empty() {
                (&self.first_hostname_port, self.first_segments, self.first_disk_size_in_bytes)
            } else {
                (&self.second_hostname_port, 0, 0)
            };
            return Some(format!("{} {:40} {:25} segments: {:>6} size: {:>15} {}",
                                "?".to_string().yellow(), server_id, hostname_port, segments, disk_size_in_bytes, which.yellow()));
        }
        if self.first_present
            && self.second_present
            && self.first_segments == self.second_segments
            && self.first_disk_size_in_bytes == self.second_disk_size_in_bytes
        {
            None
        }
        else if !self.first_present
        {
            Some(format!("{} {:40} {:25} segments: {:>6} size: {:>15}", "+".to_string().green(), server_id, self.second_hostname_port, self.second_segments, self.second_disk_size_in_bytes))
        }
        else if !self.second_present
        {
            Some(format!("{} {:40} {:25} segments: {:>6} size: {:>15}", "-".to_string().red(), server_id, self.first_hostname_port, self.first_segments, self.first_disk_size_in_bytes))
        }
        else
        {
            Some(format!("{} {:40} {:25} segments: {:>6} size: {:>15} {:+}",
                         "*".to_string().yellow(),
                         server_id,
                         self.second_hostname_port,
                         format!("{}->{}", self.first_segments, self.second_segments),
                         format!("{}->{}", self.first_disk_size_in_bytes, self.second_disk_size_in_bytes),
                         self.size_change()
            ))
        }
    }
}

/// Print the difference of the segment sizes between two snapshots.
pub fn table_size_diff(
    snapshot_directory: &Path,
    begin: Option<i32>,
    end: Option<i32>,
    hostname_filter: &Regex,
) -> anyhow::Result<()>
{
    info!("table size diff");

    if begin.is_none() || end.is_none() {
        snapshot::Snapshot::print(snapshot_directory)?;
    }
    let (begin_snapshot, end_snapshot, _begin_snapshot_row) = snapshot::Snapshot::read_begin_end_snapshot_from_user(snapshot_directory, begin, end)?;
    let tablesizediff = TableSizeDiff::snapshot_diff(snapshot_directory, &begin_snapshot, &end_snapshot)?;
    tablesizediff.print(hostname_filter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::ServerId;
    use crate::transport::RawResponse;

    #[test]
    fn unit_table_size_url() {
        let url = table_size_url(&Endpoint::from("h1:8097"), "t1_OFFLINE").unwrap();
        assert_eq!(url, "http://h1:8097/table/t1_OFFLINE/size");
    }

    #[test]
    fn unit_table_size_url_invalid_table_name() {
        for table_name in ["", "  ", "a/b", "t1?x=1", "t 1", "t1#"] {
            let result = table_size_url(&Endpoint::from("h1:8097"), table_name);
            assert!(matches!(result, Err(GatherError::InvalidArgument(_))), "accepted: '{}'", table_name);
        }
    }

    #[test]
    fn unit_parse_short_form() {
        let json = r#"{"segments":[{"id":"s1","size":100}]}"#;
        let segments = TableSizeDecoder.decode(json).unwrap();
        assert_eq!(segments, vec![SegmentSizeInfo { segment_name: "s1".to_string(), disk_size_in_bytes: 100 }]);
    }

    #[test]
    fn unit_parse_server_form() {
        // This is what /table/<table name>/size returns on a server.
        let json = r#"
{
  "tableName": "airlineStats_OFFLINE",
  "diskSizeInBytes": 3370,
  "segments": [
    { "segmentName": "airlineStats_OFFLINE_16071_16071_0", "diskSizeInBytes": 1685 },
    { "segmentName": "airlineStats_OFFLINE_16072_16072_0", "diskSizeInBytes": 1685 }
  ]
}
        "#;
        let segments = TableSizeDecoder.decode(json).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].segment_name, "airlineStats_OFFLINE_16072_16072_0");
        assert_eq!(segments.iter().map(|s| s.disk_size_in_bytes).sum::<u64>(), 3370);
    }

    #[test]
    fn unit_parse_negative_size() {
        let json = r#"{"segments":[{"id":"s1","size":-1}]}"#;
        assert!(matches!(TableSizeDecoder.decode(json), Err(FailureReason::Decode(_))));
    }

    #[test]
    fn unit_near_max_segment_sizes_do_not_overflow() {
        let json = format!(r#"{{"segments":[{{"id":"s1","size":{}}},{{"id":"s2","size":1}}]}}"#, u64::MAX);
        let segments = TableSizeDecoder.decode(&json).unwrap();
        let huge = ServerTableSize { segments, ..row("A", &[], None) };
        assert_eq!(huge.disk_size_in_bytes(), u64::MAX);

        let allsizes = AllTableSizes { table_sizes: vec![huge.clone(), row("B", &[i64::MAX as u64], None)] };
        assert_eq!(allsizes.total_disk_size_in_bytes(), u64::MAX);

        let mut diff = TableSizeDiff::new();
        diff.first_snapshot(AllTableSizes { table_sizes: vec![row("A", &[0], None), row("B", &[u64::MAX], None)] });
        diff.second_snapshot(AllTableSizes { table_sizes: vec![huge, row("B", &[0], None)] });
        assert_eq!(diff.btreetablesizediff["B"].size_change(), -i128::from(u64::MAX));
        let ranked = diff.ranked_changes();
        assert_eq!(ranked.len(), 2);
        assert!((ranked[0].cost - 0.5).abs() < 1e-9);
        assert!(diff.btreetablesizediff["A"].diff_line("A").is_some());
    }

    #[test]
    fn unit_parse_invalid_body() {
        // This is what is returned for a table the server does not have.
        assert!(matches!(TableSizeDecoder.decode("Error 404: Not Found"), Err(FailureReason::Decode(_))));
        assert!(matches!(TableSizeDecoder.decode(r#"{"tableName":"t1"}"#), Err(FailureReason::Decode(_))));
    }

    /// Replies with a fixed body per endpoint, after a delay; endpoints not listed never answer.
    struct ScriptedTransport {
        replies: Vec<(&'static str, u64, u16, &'static str)>,
    }

    impl Transport for ScriptedTransport {
        fn get(&self, url: &str, timeout: Duration) -> std::result::Result<RawResponse, FailureReason> {
            match self.replies.iter().find(|(endpoint, ..)| url.contains(endpoint)) {
                Some((_, delay_ms, status, body)) => {
                    std::thread::sleep(Duration::from_millis(*delay_ms));
                    Ok(RawResponse { status: *status, body: body.to_string() })
                },
                None => {
                    std::thread::sleep(timeout);
                    Err(FailureReason::Timeout)
                },
            }
        }
    }

    fn scenario_reader() -> TableSizeReader<ScriptedTransport> {
        TableSizeReader::new(ScriptedTransport {
            replies: vec![
                ("h1:80", 50, 200, r#"{"segments":[{"id":"s1","size":100}]}"#),
                ("h2:80", 30, 500, ""),
            ],
        }, 3).unwrap()
    }

    fn scenario_registry() -> EndpointRegistry {
        EndpointRegistry::parse_server_list("A=h1:80,B=h2:80,C=h3:80").unwrap()
    }

    #[test]
    fn unit_one_ok_one_error_one_silent() {
        let reader = scenario_reader();
        let registry = scenario_registry();

        let timer = Instant::now();
        let result = reader.get_segment_size_info_from_servers(&registry, "t1", 500).unwrap();
        let elapsed = timer.elapsed();

        assert_eq!(result.responded(), 1);
        assert_eq!(result.invited, 3);
        assert_eq!(result.responses[&ServerId::from("A")], vec![SegmentSizeInfo { segment_name: "s1".to_string(), disk_size_in_bytes: 100 }]);
        assert_eq!(result.failures.get(&ServerId::from("B")), Some(&FailureReason::Status(500)));
        assert_eq!(result.failures.get(&ServerId::from("C")), Some(&FailureReason::Timeout));
        // the silent server is waited for until the deadline, not longer.
        assert!(elapsed >= Duration::from_millis(490) && elapsed < Duration::from_millis(900), "{:?}", elapsed);
    }

    #[test]
    fn unit_invalid_arguments() {
        let reader = scenario_reader();
        let registry = scenario_registry();
        assert!(matches!(reader.get_segment_size_info_from_servers(&registry, "t1", 0), Err(GatherError::InvalidArgument(_))));
        assert!(matches!(reader.get_segment_size_info_from_servers(&registry, "", 500), Err(GatherError::InvalidArgument(_))));
    }

    #[test]
    fn unit_rows_per_invited_server() {
        let reader = scenario_reader();
        let registry = scenario_registry();

        let allsizes = reader.read_table_sizes(&registry, "t1", 300).unwrap();

        let servers: Vec<&str> = allsizes.table_sizes.iter().map(|row| row.server_id.as_str()).collect();
        assert_eq!(servers, vec!["A", "B", "C"]);
        assert_eq!(allsizes.responded(), 1);
        assert_eq!(allsizes.total_disk_size_in_bytes(), 100);
        assert_eq!(allsizes.table_sizes[1].hostname_port, "h2:80");
        assert_eq!(allsizes.table_sizes[1].failure, Some(FailureReason::Status(500)));
    }

    #[tokio::test]
    async fn unit_read_table_sizes_async() {
        let reader = Arc::new(scenario_reader());
        let registry = Arc::new(scenario_registry());

        let allsizes = reader.read_table_sizes_async(registry, "t1".to_string(), 300).await.unwrap();

        assert_eq!(allsizes.table_sizes.len(), 3);
        assert_eq!(allsizes.responded(), 1);
    }

    fn row(server_id: &str, sizes: &[u64], failure: Option<FailureReason>) -> ServerTableSize {
        ServerTableSize {
            server_id: server_id.to_string(),
            hostname_port: format!("{}:8097", server_id),
            timestamp: Local::now(),
            table_name: "t1".to_string(),
            segments: sizes.iter().enumerate()
                .map(|(nr, size)| SegmentSizeInfo { segment_name: format!("s{}", nr), disk_size_in_bytes: *size })
                .collect(),
            failure,
        }
    }

    #[test]
    fn unit_diff_and_ranking() {
        let mut diff = TableSizeDiff::new();
        diff.first_snapshot(AllTableSizes { table_sizes: vec![
            row("A", &[100, 100], None),
            row("B", &[100], None),
            row("C", &[50], None),
            row("D", &[], Some(FailureReason::Timeout)),
        ]});
        diff.second_snapshot(AllTableSizes { table_sizes: vec![
            row("A", &[100, 100, 100, 100], None),
            row("B", &[100], None),
            row("D", &[25], None),
        ]});

        assert_eq!(diff.btreetablesizediff["B"].first_disk_size_in_bytes, 100);
        assert!(!diff.btreetablesizediff["C"].second_present);
        assert!(!diff.btreetablesizediff["D"].first_present);
        assert!(diff.btreetablesizediff["D"].first_no_response);

        let ranked = diff.ranked_changes();
        let order: Vec<&str> = ranked.iter().map(|entry| entry.dim_value.as_str()).collect();
        // A: +200, C: -50, B unchanged, D did not respond in the first snapshot.
        assert_eq!(order, vec!["A", "C"]);
        assert_eq!(ranked[0].change_diff, 200.);
        assert_eq!(ranked[0].change_ratio, 2.);
        assert!((ranked.iter().map(|entry| entry.cost).sum::<f64>() - 1.).abs() < 1e-9);
    }

    #[test]
    fn unit_diff_line_marks_no_response() {
        let mut diff = TableSizeDiff::new();
        diff.first_snapshot(AllTableSizes { table_sizes: vec![
            row("A", &[], Some(FailureReason::Timeout)),
            row("B", &[100], None),
            row("C", &[100], None),
        ]});
        diff.second_snapshot(AllTableSizes { table_sizes: vec![
            row("A", &[25], None),
            row("B", &[], Some(FailureReason::Status(500))),
            row("C", &[100], None),
            row("N", &[10], None),
        ]});

        let line = diff.btreetablesizediff["A"].diff_line("A").unwrap();
        assert!(line.contains("no response in begin snapshot"), "{}", line);
        assert!(!line.contains('+'), "{}", line);
        let line = diff.btreetablesizediff["B"].diff_line("B").unwrap();
        assert!(line.contains("no response in end snapshot"), "{}", line);
        assert!(line.contains("B:8097"), "{}", line);
        assert_eq!(diff.btreetablesizediff["C"].diff_line("C"), None);
        assert!(diff.btreetablesizediff["N"].diff_line("N").unwrap().contains('+'));
        let ranked: Vec<String> = diff.ranked_changes().into_iter().map(|entry| entry.dim_value).collect();
        assert_eq!(ranked, vec!["N".to_string()]);
    }

    #[test]
    fn unit_snapshot_diff_from_disk() {
        let directory = tempfile::tempdir().unwrap();
        let snapshots = directory.path();
        for (expected, sizes) in [(0, &[100_u64][..]), (1, &[100, 300][..])] {
            let allsizes = AllTableSizes { table_sizes: vec![row("A", sizes, None), row("B", &[], Some(FailureReason::Status(503)))] };
            assert_eq!(allsizes.save_snapshot(snapshots, &None).unwrap(), expected);
        }
        let stored = AllTableSizes::read_snapshot(snapshots, "1").unwrap();
        assert_eq!(stored.table_sizes[1].failure, Some(FailureReason::Status(503)));

        let diff = TableSizeDiff::snapshot_diff(snapshots, "0", "1").unwrap();

        assert_eq!(diff.btreetablesizediff["A"].first_disk_size_in_bytes, 100);
        assert_eq!(diff.btreetablesizediff["A"].second_disk_size_in_bytes, 400);
        assert_eq!(diff.btreetablesizediff["A"].second_segments, 2);
    }
}
