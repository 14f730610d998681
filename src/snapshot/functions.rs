//! Snapshot functions
//!
use log::*;
use std::{env, fs, io::{stdin, stdout, Write}, path::{Path, PathBuf}};
use chrono::Local;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use crate::snapshot::Snapshot;

pub const SNAPSHOT_DIRECTORY: &str = "table_sizes.snapshots";

/// The snapshot directory in the current working directory.
pub fn snapshot_directory() -> Result<PathBuf>
{
    let current_directory = env::current_dir()
        .with_context(|| "Cannot evaluate current working directory")?;
    Ok(current_directory.join(SNAPSHOT_DIRECTORY))
}

impl Snapshot {
    /// This is a public function to:
    /// - create the snapshot directory (if it exists, it does nothing).
    /// - read the snapshot.index if it exists, and get the highest snapshot number, otherwise snapshot_number remains 0.
    /// - add a new Snapshot, and write the index back.
    /// - create the directory for the data of the new snapshot.
    /// - return snapshot_number.
    pub fn insert_new_snapshot_number(
        snapshot_directory: &Path,
        snapshot_comment: &Option<String>,
    ) -> Result<i32>
    {
        info!("insert_new_snapshot_number");
        let mut snapshots: Vec<Snapshot> = Vec::new();
        let mut snapshot_number: i32 = 0;

        fs::create_dir_all(snapshot_directory)
            .with_context(|| format!("Cannot create directory: {}", snapshot_directory.display()))?;
        if snapshot_directory.join("snapshot.index").exists() {
            snapshots = Snapshot::read_snapshot_index(snapshot_directory)?;
            if let Some(highest) = snapshots.iter().map(|snapshot| snapshot.number).max() {
                snapshot_number = highest + 1;
            }
        }
        snapshots.push(Snapshot { number: snapshot_number, timestamp: Local::now(), comment: snapshot_comment.clone().unwrap_or_default() });
        Snapshot::write_snapshot_index(snapshot_directory, &snapshots)?;

        let current_snapshot_directory = snapshot_directory.join(snapshot_number.to_string());
        fs::create_dir_all(&current_snapshot_directory)
            .with_context(|| format!("Cannot create directory: {}", current_snapshot_directory.display()))?;
        Ok(snapshot_number)
    }
    /// Read the snapshots index file, and return a vector with the snapshots.
    pub fn read_snapshot_index(
        snapshot_directory: &Path,
    ) -> Result<Vec<Snapshot>>
    {
        let snapshot_index = snapshot_directory.join("snapshot.index");
        let file = fs::File::open(&snapshot_index)
            .with_context(|| format!("Error opening file: {}", snapshot_index.display()))?;
        let mut reader = csv::Reader::from_reader(file);
        let mut snapshots: Vec<Snapshot> = Vec::new();
        for row in reader.deserialize() {
            let data: Snapshot = row
                .with_context(|| "Error deserialize row")?;
            snapshots.push(data);
        }
        Ok(snapshots)
    }
    /// Write the vector to the snapshots index file.
    /// The file gets truncated and overwritten upon write.
    fn write_snapshot_index(
        snapshot_directory: &Path,
        snapshots: &[Snapshot],
    ) -> Result<()>
    {
        let snapshot_index = snapshot_directory.join("snapshot.index");
        let file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&snapshot_index)
            .with_context(|| format!("Cannot create file: {}", snapshot_index.display()))?;
        let mut writer = csv::Writer::from_writer(file);
        for row in snapshots {
            writer.serialize(row)
                .with_context(|| format!("Unable to serialize: {} {} {}", row.number, row.timestamp, row.comment))?;
        }
        writer.flush()
            .with_context(|| "Error flushing buffer")?;
        Ok(())
    }
    /// Print the snapshots in the index.
    pub fn print(
        snapshot_directory: &Path,
    ) -> Result<()>
    {
        let snapshots = Snapshot::read_snapshot_index(snapshot_directory)?;
        for row in &snapshots {
            println!("{:>3} {:30} {:50}", row.number, row.timestamp, row.comment);
        }
        Ok(())
    }
    /// Validate the begin and end snapshot numbers, and ask for them on stdin when they are not provided.
    ///
    /// Both must exist in the index. The begin and end snapshot numbers and the begin [Snapshot] are returned.
    pub fn read_begin_end_snapshot_from_user(
        snapshot_directory: &Path,
        option_begin: Option<i32>,
        option_end: Option<i32>,
    ) -> Result<(String, String, Snapshot)>
    {
        let snapshots = Snapshot::read_snapshot_index(snapshot_directory)?;
        let begin_snapshot = match option_begin {
            Some(nr) => nr,
            None => read_snapshot_number_from_stdin("Enter begin snapshot: ")?,
        };
        let begin_snapshot_row = snapshots.iter()
            .find(|&row| row.number == begin_snapshot)
            .with_context(|| format!("Unable to find begin snapshot number: {}", begin_snapshot))?;
        let end_snapshot = match option_end {
            Some(nr) => nr,
            None => read_snapshot_number_from_stdin("Enter end snapshot: ")?,
        };
        snapshots.iter()
            .find(|&row| row.number == end_snapshot)
            .with_context(|| format!("Unable to find end snapshot number: {}", end_snapshot))?;
        Ok((begin_snapshot.to_string(), end_snapshot.to_string(), begin_snapshot_row.clone()))
    }
}

fn read_snapshot_number_from_stdin(
    prompt: &str,
) -> Result<i32>
{
    print!("{}", prompt);
    stdout().flush()?;
    let mut snap = String::new();
    stdin().read_line(&mut snap)
        .with_context(|| "Failed to read input")?;
    snap.trim().parse()
        .with_context(|| format!("Invalid snapshot number: {}", snap.trim()))
}

/// Save a vector as `<filename>.json` in the directory of the snapshot.
pub fn save_snapshot_json<T: Serialize>(
    snapshot_directory: &Path,
    snapshot_number: i32,
    filename: &str,
    vector: &[T],
) -> Result<()>
{
    let filepath = snapshot_directory.join(snapshot_number.to_string()).join(format!("{}.{}", filename, "json"));
    fs::write(&filepath, serde_json::to_string(vector)
        .with_context(|| "Json serialization error")?
    ).with_context(|| format!("Error saving snapshot: {}", filepath.display()))?;
    Ok(())
}
/// Read `<filename>.json` from the directory of the snapshot.
pub fn read_snapshot_json<T: for<'de> Deserialize<'de>>(
    snapshot_directory: &Path,
    snapshot_number: &str,
    filename: &str,
) -> Result<Vec<T>>
{
    let filepath = snapshot_directory.join(snapshot_number).join(format!("{}.{}", filename, "json"));
    let read_from_file = fs::read_to_string(&filepath)
        .with_context(|| format!("Error reading snapshot: {}", filepath.display()))?;
    let vector = serde_json::from_str(&read_from_file)
        .with_context(|| "Json deserialization error")?;
    Ok(vector)
}
