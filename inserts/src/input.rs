//! Input format: records of two lines each.
//!
//! The first line holds the key as space-separated decimal nibbles, the second
//! line holds the raw value bytes (without its trailing newline).

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

pub fn read_path(path: Option<&Path>) -> Result<Vec<Record>> {
    match path {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            read_records(BufReader::new(file))
        }
        None => read_records(io::stdin().lock()),
    }
}

pub fn read_records(mut reader: impl BufRead) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut line_no = 0usize;
    let mut key_line = Vec::new();
    let mut value = Vec::new();

    loop {
        key_line.clear();
        if reader.read_until(b'\n', &mut key_line)? == 0 {
            break;
        }
        line_no += 1;
        let key = parse_key(strip_newline(&key_line)).with_context(|| format!("line {line_no}"))?;

        value.clear();
        if reader.read_until(b'\n', &mut value)? == 0 {
            bail!("line {line_no}: key without a value line");
        }
        line_no += 1;

        records.push(Record {
            key,
            value: strip_newline(&value).to_vec(),
        });
    }

    tracing::debug!(records = records.len(), lines = line_no, "read input");
    Ok(records)
}

fn parse_key(line: &[u8]) -> Result<Vec<u8>> {
    let line = std::str::from_utf8(line).context("key line is not UTF-8")?;
    line.split_whitespace()
        .map(|n| n.parse::<u8>().with_context(|| format!("bad nibble {n:?}")))
        .collect()
}

fn strip_newline(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
