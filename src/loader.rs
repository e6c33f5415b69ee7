//! Loading order dumps from disk
//!
//! Accepts either a JSON file or a directory. For a directory, the newest
//! `orders_<YYYYmmdd_HHMMSS>.json` anywhere below it is used; the order
//! scraper writes one per run into timestamped `dumps_*` folders, so the
//! file name alone orders them.

use crate::error::{Error, Result};
use crate::event::EventRecord;
use crate::normalize::Rejected;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const DUMP_PREFIX: &str = "orders_";
const DUMP_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct Dump {
    /// File the records came from
    pub path: PathBuf,
    /// Valid records, each with its position in the dump array
    pub records: Vec<(usize, EventRecord)>,
    /// Array entries that were not valid records
    pub rejected: Vec<Rejected>,
}

/// Load records from a dump file, or from the newest dump under a directory.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Dump> {
    let path = path.as_ref();
    let file = if path.is_dir() {
        find_latest_dump(path)?
    } else {
        path.to_path_buf()
    };

    let text = std::fs::read_to_string(&file).map_err(|e| Error::io(&file, e))?;
    let dump = parse(&file, &text)?;
    info!(
        path = %dump.path.display(),
        records = dump.records.len(),
        rejected = dump.rejected.len(),
        "loaded order dump"
    );
    Ok(dump)
}

/// Parse dump text. Entries that fail to deserialize are rejected one by one
/// instead of failing the whole file.
pub fn parse(path: &Path, text: &str) -> Result<Dump> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let serde_json::Value::Array(entries) = value else {
        return Err(Error::NotAnArray(path.to_path_buf()));
    };

    let mut records = Vec::with_capacity(entries.len());
    let mut rejected = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        let title = entry
            .get("event_title")
            .and_then(|t| t.as_str())
            .map(String::from);
        match serde_json::from_value::<EventRecord>(entry) {
            Ok(record) => records.push((index, record)),
            Err(e) => {
                warn!(index, "skipping malformed record: {}", e);
                rejected.push(Rejected {
                    index,
                    title,
                    reason: format!("malformed record: {}", e),
                });
            }
        }
    }

    Ok(Dump {
        path: path.to_path_buf(),
        records,
        rejected,
    })
}

/// Newest `orders_*.json` below `dir`, by file name.
pub fn find_latest_dump(dir: &Path) -> Result<PathBuf> {
    let latest = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_dump_file(e.path()))
        .max_by(|a, b| a.file_name().cmp(b.file_name()))
        .map(|e| e.path().to_path_buf());

    match latest {
        Some(path) => {
            debug!(path = %path.display(), "selected newest dump");
            Ok(path)
        }
        None => Err(Error::NoDumpFound(dir.to_path_buf())),
    }
}

fn is_dump_file(path: &Path) -> bool {
    let name_ok = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with(DUMP_PREFIX))
        .unwrap_or(false);
    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(DUMP_EXTENSION))
        .unwrap_or(false);
    name_ok && ext_ok
}
