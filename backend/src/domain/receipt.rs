//! Receipt numbering for completed transactions.
//!
//! The ledger never decides how receipts are numbered. Callers inject a
//! [`ReceiptNumbering`] so the policy can be swapped, and tests can use a
//! fixed closure instead of depending on the wall clock.

use chrono::{DateTime, Timelike, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

pub trait ReceiptNumbering {
    fn next_receipt_id(&self, timestamp: DateTime<Utc>) -> String;
}

impl<F> ReceiptNumbering for F
where
    F: Fn(DateTime<Utc>) -> String,
{
    fn next_receipt_id(&self, timestamp: DateTime<Utc>) -> String {
        self(timestamp)
    }
}

/// Time-based receipt numbers.
/// Format: `<prefix>-<yyyymmdd>-<millis of day>-<sequence>`
/// Example: `RCP-20261018-37815042-0003`
#[derive(Debug)]
pub struct TimestampReceipts {
    prefix: String,
    sequence: AtomicU64,
}

impl TimestampReceipts {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            sequence: AtomicU64::new(0),
        }
    }
}

impl ReceiptNumbering for TimestampReceipts {
    fn next_receipt_id(&self, timestamp: DateTime<Utc>) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let millis_of_day = u64::from(timestamp.num_seconds_from_midnight()) * 1000
            + u64::from(timestamp.timestamp_subsec_millis());
        format!(
            "{}-{}-{}-{:04}",
            self.prefix,
            timestamp.format("%Y%m%d"),
            millis_of_day,
            sequence
        )
    }
}
