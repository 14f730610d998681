//! table_sizes: read the on-disk segment sizes of a table from all servers of a cluster.
//!
//! The servers are set with `--servers id=hostname:port,...`, or with `--hosts` and `--ports`,
//! in which case every combination is read and the server id is `Server_<hostname>_<port>`.
//! Settings that are provided on the command line or in the environment can be saved in `.env` with `--write-dotenv`.
use clap::Parser;
use std::{collections::HashMap, time::Duration};
use log::*;
use anyhow::{Context, Result};
use dotenv::dotenv;

use table_sizes::{snapshot, table_size, utility};
use table_sizes::table_size::{AllTableSizes, TableSizeReader};
use table_sizes::transport::HttpTransport;

/// The number of idle connections that are kept per server between calls.
const MAX_IDLE_PER_HOST: usize = 2;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Opts {
    /// table name to read the segment sizes of, with its type suffix (such as `mytable_OFFLINE`)
    #[arg(short, long, value_name = "table name")]
    table: Option<String>,
    /// servers as a comma separated list of id=hostname:port or hostname:port
    #[arg(long, value_name = "id=hostname:port,...")]
    servers: Option<String>,
    /// hostnames, used with ports when servers is not set
    #[arg(short = 'H', long, value_name = "hostname,hostname")]
    hosts: Option<String>,
    /// port numbers, used with hosts when servers is not set
    #[arg(short, long, value_name = "port,port")]
    ports: Option<String>,
    /// the number of servers read at the same time
    #[arg(long, value_name = "nr")]
    parallel: Option<String>,
    /// the time in milliseconds all servers together are given to respond
    #[arg(long, value_name = "ms")]
    timeout_ms: Option<String>,
    /// only print the servers of which the id or hostname:port matches the regex
    #[arg(long, value_name = "regex")]
    hostname_match: Option<String>,
    /// only print the segments of which the name matches the regex (with --details)
    #[arg(long, value_name = "regex")]
    segment_match: Option<String>,
    /// print every segment
    #[arg(short, long)]
    details: bool,
    /// save the segment sizes in a new snapshot instead of printing them
    #[arg(long)]
    snapshot: bool,
    /// comment for the snapshot
    #[arg(long, value_name = "\"comment\"")]
    snapshot_comment: Option<String>,
    /// list the snapshots
    #[arg(long)]
    snapshot_list: bool,
    /// print the difference of the segment sizes between two snapshots
    #[arg(long)]
    snapshot_diff: bool,
    /// begin snapshot number for the difference
    #[arg(short, long, value_name = "snapshot nr")]
    begin: Option<i32>,
    /// end snapshot number for the difference
    #[arg(short, long, value_name = "snapshot nr")]
    end: Option<i32>,
    /// print the segment sizes stored in a snapshot
    #[arg(long, value_name = "snapshot nr")]
    print_table_size: Option<String>,
    /// write the settings to .env
    #[arg(long)]
    write_dotenv: bool,
}

#[tokio::main]
async fn main() -> Result<()>
{
    env_logger::init();
    let options = Opts::parse();
    dotenv().ok();

    let snapshot_directory = snapshot::snapshot_directory()?;
    let hostname_filter = utility::set_regex(&options.hostname_match)?;
    let segment_filter = utility::set_regex(&options.segment_match)?;

    if options.snapshot_list {
        snapshot::Snapshot::print(&snapshot_directory)?;
        return Ok(());
    }
    if options.snapshot_diff {
        table_size::table_size_diff(&snapshot_directory, options.begin, options.end, &hostname_filter)?;
        return Ok(());
    }
    if let Some(snapshot_number) = &options.print_table_size {
        AllTableSizes::read_snapshot(&snapshot_directory, snapshot_number)?
            .print(&hostname_filter, &segment_filter, options.details);
        return Ok(());
    }

    let mut changed_options = HashMap::new();
    let servers = utility::set_servers(&options.servers, &mut changed_options);
    let hosts = utility::set_hosts(&options.hosts, &mut changed_options);
    let ports = utility::set_ports(&options.ports, &mut changed_options);
    let parallel = utility::set_parallel(&options.parallel, &mut changed_options)?;
    let timeout_ms = utility::set_timeout_ms(&options.timeout_ms, &mut changed_options)?;
    let registry = utility::set_registry(&servers, &hosts, &ports)?;
    let table_name = options.table.clone()
        .with_context(|| "A table name must be set with --table")?;

    // the blocking http client is created, used and dropped on a blocking thread.
    let allsizes = tokio::task::spawn_blocking(move || -> Result<AllTableSizes> {
        let transport = HttpTransport::new(Duration::from_millis(timeout_ms), MAX_IDLE_PER_HOST)?;
        let reader = TableSizeReader::new(transport, parallel)?;
        Ok(reader.read_table_sizes(&registry, &table_name, timeout_ms)?)
    })
        .await
        .with_context(|| "Table size reader task failed")??;

    if options.snapshot {
        let snapshot_number = allsizes.save_snapshot(&snapshot_directory, &options.snapshot_comment)?;
        println!("snapshot number {}", snapshot_number);
    } else {
        allsizes.print(&hostname_filter, &segment_filter, options.details);
    }
    if allsizes.responded() < allsizes.table_sizes.len() {
        warn!("{} of {} servers did not respond", allsizes.table_sizes.len() - allsizes.responded(), allsizes.table_sizes.len());
    }

    utility::dotenv_writer(options.write_dotenv, changed_options)?;
    Ok(())
}
