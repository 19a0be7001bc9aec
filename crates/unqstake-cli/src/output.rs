//! Plain-text rendering of balances and history tables.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use unqstake_core::address::shorten;
use unqstake_core::amount::{self, DEFAULT_DISPLAY_DECIMALS};
use unqstake_core::validation::TOTAL_STAKES;
use unqstake_core::{
    Balance, BalanceSnapshot, HistoryBuckets, HistoryKind, Network, PageMarker, Pagination,
};

/// Explorer link for a row, if links were requested.
pub type LinkFn<'a> = dyn Fn(&str, u64) -> Option<String> + 'a;

pub fn balance_report(
    address: &str,
    network: Network,
    balances: &BalanceSnapshot,
    stakes_left: Option<u32>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Account     {} ({})", shorten(address), network);
    let _ = writeln!(out, "Available   {}", balances.available.format_with_unit());
    let _ = writeln!(out, "Staked      {}", balances.staked.format_with_unit());
    let _ = writeln!(out, "Unstaked    {}", balances.unstaked.format_with_unit());
    let _ = writeln!(out, "Total       {}", balances.total.format_with_unit());
    match stakes_left {
        Some(left) => {
            let _ = writeln!(out, "Stakes left {} of {}", left, TOTAL_STAKES);
        }
        None => {
            let _ = writeln!(out, "Stakes left unknown");
        }
    }
    out
}

/// Page strip such as `1 ... 4 [5] 6 ... 12`.
pub fn page_strip(pagination: &Pagination) -> String {
    pagination
        .page_markers()
        .into_iter()
        .map(|marker| match marker {
            PageMarker::Page(page) if page == pagination.page() => format!("[{page}]"),
            PageMarker::Page(page) => page.to_string(),
            PageMarker::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn time(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn amount_cell(value: Balance, decimals: u8, symbol: &str) -> String {
    let formatted = amount::format_display(value, decimals, DEFAULT_DISPLAY_DECIMALS);
    format!("{} {}", formatted.label(), symbol)
}

fn hash_cell(hash: &str) -> String {
    if hash.is_empty() {
        "-".to_string()
    } else {
        shorten(hash)
    }
}

/// Current page of one history table.
pub fn history_table(
    kind: HistoryKind,
    buckets: &HistoryBuckets,
    pagination: &Pagination,
    decimals: u8,
    network: Network,
    link: &LinkFn<'_>,
) -> String {
    let symbol = network.token_symbol();
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} total)", kind.label(), buckets.len(kind));

    if buckets.len(kind) == 0 {
        let _ = writeln!(out, "No history found");
        return out;
    }

    let mut rows: Vec<(String, Option<String>)> = Vec::new();
    match kind {
        HistoryKind::Stake | HistoryKind::Unstake => {
            let items = match kind {
                HistoryKind::Stake => &buckets.stake,
                _ => &buckets.unstake,
            };
            for item in pagination.slice(items) {
                let line = format!(
                    "{:>10}  {:<16}  {:<15}  {:<16}  {}",
                    item.block_number,
                    time(item.block_timestamp),
                    hash_cell(&item.hash),
                    item.method,
                    amount_cell(item.amount, decimals, symbol)
                );
                rows.push((line, link(&item.hash, item.block_number)));
            }
        }
        HistoryKind::Rewards | HistoryKind::Transfers => {
            let items = match kind {
                HistoryKind::Rewards => &buckets.rewards,
                _ => &buckets.transfers,
            };
            for item in pagination.slice(items) {
                let line = format!(
                    "{:>10}  {:<16}  {:<15}  {:<8}  {}",
                    item.block_number,
                    time(item.block_timestamp),
                    hash_cell(&item.extrinsic_hash),
                    item.direction.label(),
                    amount_cell(item.amount, decimals, symbol)
                );
                rows.push((line, link(&item.extrinsic_hash, item.block_number)));
            }
        }
    }

    for (line, url) in rows {
        let _ = writeln!(out, "{}", line);
        if let Some(url) = url {
            let _ = writeln!(out, "            {}", url);
        }
    }
    let _ = writeln!(
        out,
        "Page {} of {}: {}",
        pagination.page(),
        pagination.total_pages(),
        page_strip(pagination)
    );
    out
}
