//! CSV export of history tables.
//!
//! Amounts are written at full precision, unlike the truncated on-screen
//! values.

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::amount;
use crate::history::{BalanceTransferItem, HistoryBuckets, HistoryKind, StakingHistoryItem};

const STAKING_HEADER: &[&str] = &["Block", "Hash", "Time", "Section", "Method", "Amount"];
const TRANSFER_HEADER: &[&str] = &[
    "Block",
    "Hash",
    "Time",
    "Section",
    "Method",
    "Direction",
    "Amount",
];

/// A history item that can be written as a CSV row.
pub trait CsvRecord {
    fn header() -> &'static [&'static str];
    fn row(&self, decimals: u8) -> Vec<String>;
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

impl CsvRecord for StakingHistoryItem {
    fn header() -> &'static [&'static str] {
        STAKING_HEADER
    }

    fn row(&self, decimals: u8) -> Vec<String> {
        vec![
            self.block_number.to_string(),
            self.hash.clone(),
            format_time(self.block_timestamp),
            self.section.clone(),
            self.method.clone(),
            amount::format_full_precision(self.amount, decimals),
        ]
    }
}

impl CsvRecord for BalanceTransferItem {
    fn header() -> &'static [&'static str] {
        TRANSFER_HEADER
    }

    fn row(&self, decimals: u8) -> Vec<String> {
        vec![
            self.block_number.to_string(),
            self.extrinsic_hash.clone(),
            format_time(self.block_timestamp),
            self.section.clone(),
            self.method.clone(),
            self.direction.label().to_string(),
            amount::format_full_precision(self.amount, decimals),
        ]
    }
}

/// Header row followed by one row per item.
pub fn to_csv_rows<T: CsvRecord>(items: &[T], decimals: u8) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(items.len() + 1);
    rows.push(T::header().iter().map(|h| h.to_string()).collect());
    rows.extend(items.iter().map(|item| item.row(decimals)));
    rows
}

/// Rows of one bucket. Reward rows omit the direction column since every
/// reward is incoming.
pub fn bucket_rows(buckets: &HistoryBuckets, kind: HistoryKind, decimals: u8) -> Vec<Vec<String>> {
    match kind {
        HistoryKind::Stake => to_csv_rows(&buckets.stake, decimals),
        HistoryKind::Unstake => to_csv_rows(&buckets.unstake, decimals),
        HistoryKind::Transfers => to_csv_rows(&buckets.transfers, decimals),
        HistoryKind::Rewards => to_csv_rows(&buckets.rewards, decimals)
            .into_iter()
            .map(|mut row| {
                row.remove(5);
                row
            })
            .collect(),
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// CSV writer that quotes every cell.
pub fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer)
}

/// Write all rows and flush.
pub fn write_rows<W: Write>(
    writer: &mut csv::Writer<W>,
    rows: &[Vec<String>],
) -> Result<(), ExportError> {
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Render rows as CSV text, one quoted record per line.
pub fn render_csv(rows: &[Vec<String>]) -> Result<String, ExportError> {
    let mut writer = csv_writer(Vec::new());
    write_rows(&mut writer, rows)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
