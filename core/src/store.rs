//! Result persistence — flat comma-separated rows.
//!
//! RULE: only store.rs knows the row format. Each record is one line
//! `seed,period,sample_size,market_share`, no header, in the order the
//! driver produced them. The analysis side reads the same format back.

use crate::{
    error::{SimError, SimResult},
    types::{Period, Seed},
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

/// One (seed, period, N) observation of HIGH market share.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ResultRecord {
    pub seed:         Seed,
    pub period:       Period,
    pub sample_size:  usize,
    pub market_share: f64,
}

impl ResultRecord {
    pub fn to_row(&self) -> String {
        format!("{},{},{},{}", self.seed, self.period, self.sample_size, self.market_share)
    }

    /// Parse one row. `line` is 1-based and only used in errors.
    pub fn parse_row(row: &str, line: usize) -> SimResult<Self> {
        let fields: Vec<&str> = row.trim().split(',').map(str::trim).collect();
        if fields.len() != 4 {
            return Err(SimError::MalformedRecord {
                line,
                reason: format!("expected 4 fields, found {}", fields.len()),
            });
        }
        let malformed = |name: &str, value: &str| SimError::MalformedRecord {
            line,
            reason: format!("bad {name} '{value}'"),
        };
        let market_share: f64 = fields[3].parse().map_err(|_| malformed("market_share", fields[3]))?;
        if !(0.0..=1.0).contains(&market_share) {
            return Err(malformed("market_share", fields[3]));
        }
        Ok(Self {
            seed:         fields[0].parse().map_err(|_| malformed("seed", fields[0]))?,
            period:       fields[1].parse().map_err(|_| malformed("period", fields[1]))?,
            sample_size:  fields[2].parse().map_err(|_| malformed("sample_size", fields[2]))?,
            market_share,
        })
    }
}

/// Anything that accepts result records in driver order.
pub trait RecordSink {
    fn accept(&mut self, record: &ResultRecord) -> SimResult<()>;

    fn finish(&mut self) -> SimResult<()> {
        Ok(())
    }
}

impl RecordSink for Vec<ResultRecord> {
    fn accept(&mut self, record: &ResultRecord) -> SimResult<()> {
        self.push(*record);
        Ok(())
    }
}

/// Writes records as CSV rows to any writer.
pub struct ResultWriter<W: Write> {
    out:     W,
    written: usize,
}

impl ResultWriter<BufWriter<File>> {
    /// Create (or truncate) the result file at `path`.
    pub fn create(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            SimError::Other(anyhow::anyhow!("Cannot create {}: {e}", path.display()))
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ResultWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for ResultWriter<W> {
    fn accept(&mut self, record: &ResultRecord) -> SimResult<()> {
        writeln!(self.out, "{}", record.to_row())?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> SimResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Parse every non-blank line of a result stream.
pub fn read_records(reader: impl BufRead) -> SimResult<Vec<ResultRecord>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(ResultRecord::parse_row(&line, idx + 1)?);
    }
    Ok(records)
}

pub fn read_records_from_path(path: impl AsRef<Path>) -> SimResult<Vec<ResultRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        SimError::Other(anyhow::anyhow!("Cannot read {}: {e}", path.display()))
    })?;
    let records = read_records(BufReader::new(file))?;
    log::info!("read {} records from {}", records.len(), path.display());
    Ok(records)
}
