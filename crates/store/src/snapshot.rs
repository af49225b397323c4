use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use common::MarketQuote;

use crate::SeriesStore;

/// Snapshots older than this many rounds are dropped.
pub const MAX_SNAPSHOTS: usize = 1000;

/// Snapshot count at which collected data is considered `Good`.
const GOOD_QUALITY_SNAPSHOTS: usize = 10;

/// One observation round; holds only the quotes the store accepted.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    pub(crate) collected_at: DateTime<Utc>,
    pub(crate) quotes: Vec<MarketQuote>,
}

/// Outcome of recording one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotReport {
    pub accepted: usize,
    /// `(token, reason)` for every quote the store refused.
    pub rejected: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    Basic,
    Good,
}

/// How much history has been collected so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionStatus {
    pub snapshots_collected: usize,
    pub tokens_tracked: usize,
    pub data_quality: DataQuality,
    pub first_snapshot: Option<DateTime<Utc>>,
    pub last_snapshot: Option<DateTime<Utc>>,
}

/// Aggregates over the quotes of the most recent snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub collected_at: DateTime<Utc>,
    pub total_tokens: usize,
    pub total_volume: f64,
    pub average_price_change: f64,
    pub positive_movers: usize,
    pub negative_movers: usize,
}

impl SeriesStore {
    /// Append every quote of one snapshot. A bad quote is reported and
    /// skipped; it does not abort the rest of the snapshot.
    pub fn record_snapshot(&mut self, quotes: &[MarketQuote]) -> SnapshotReport {
        let mut report = SnapshotReport::default();
        let mut accepted = Vec::with_capacity(quotes.len());

        for quote in quotes {
            match self.append(&quote.token_code, quote.price, quote.volume, quote.timestamp) {
                Ok(()) => {
                    report.accepted += 1;
                    accepted.push(quote.clone());
                }
                Err(e) => {
                    warn!(token = %quote.token_code, error = %e, "Quote rejected");
                    report.rejected.push((quote.token_code.clone(), e.to_string()));
                }
            }
        }

        let collected_at = quotes
            .iter()
            .map(|q| q.timestamp)
            .max()
            .unwrap_or_else(Utc::now);
        self.snapshots.push_back(Snapshot {
            collected_at,
            quotes: accepted,
        });
        if self.snapshots.len() > MAX_SNAPSHOTS {
            self.snapshots.pop_front();
        }

        info!(
            accepted = report.accepted,
            rejected = report.rejected.len(),
            snapshots = self.snapshots.len(),
            "Snapshot recorded"
        );
        report
    }

    pub fn status(&self) -> CollectionStatus {
        let snapshots_collected = self.snapshots.len();
        CollectionStatus {
            snapshots_collected,
            tokens_tracked: self.token_count(),
            data_quality: if snapshots_collected >= GOOD_QUALITY_SNAPSHOTS {
                DataQuality::Good
            } else {
                DataQuality::Basic
            },
            first_snapshot: self.snapshots.front().map(|s| s.collected_at),
            last_snapshot: self.snapshots.back().map(|s| s.collected_at),
        }
    }

    /// Summary of the accepted quotes of the latest snapshot, `None` before
    /// the first one.
    pub fn market_summary(&self) -> Option<MarketSummary> {
        let latest = self.snapshots.back()?;
        let quotes = &latest.quotes;
        let average_price_change = if quotes.is_empty() {
            0.0
        } else {
            quotes.iter().map(|q| q.change_24h).sum::<f64>() / quotes.len() as f64
        };

        Some(MarketSummary {
            collected_at: latest.collected_at,
            total_tokens: quotes.len(),
            total_volume: quotes.iter().map(|q| q.volume).sum(),
            average_price_change,
            positive_movers: quotes.iter().filter(|q| q.change_24h > 0.0).count(),
            negative_movers: quotes.iter().filter(|q| q.change_24h < 0.0).count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn quote(token: &str, price: f64, change: f64, hour: i64) -> MarketQuote {
        MarketQuote {
            token_code: token.into(),
            price,
            volume: 500.0,
            change_24h: change,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::hours(hour),
        }
    }

    #[test]
    fn snapshot_skips_bad_quotes() {
        let mut store = SeriesStore::default();
        let report = store.record_snapshot(&[
            quote("XLM", 0.12, 0.01, 0),
            quote("AQUA", -4.0, 0.0, 0),
            quote("USDC", 1.0, -0.001, 0),
        ]);
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, "AQUA");
        assert_eq!(store.token_count(), 2);
    }

    #[test]
    fn market_summary_ignores_rejected_quotes() {
        let mut store = SeriesStore::default();
        let mut junk = quote("AQUA", -4.0, 0.3, 0);
        junk.volume = 1e9;
        store.record_snapshot(&[quote("XLM", 0.12, 0.02, 0), junk]);

        let summary = store.market_summary().unwrap();
        assert_eq!(summary.total_tokens, 1);
        assert!((summary.total_volume - 500.0).abs() < 1e-9);
        assert!((summary.average_price_change - 0.02).abs() < 1e-12);
        assert_eq!(summary.positive_movers, 1);
    }

    #[test]
    fn status_tracks_snapshot_range_and_quality() {
        let mut store = SeriesStore::default();
        assert_eq!(store.status().snapshots_collected, 0);
        assert!(store.market_summary().is_none());

        for h in 0..10 {
            store.record_snapshot(&[quote("XLM", 0.12, 0.0, h)]);
        }
        let status = store.status();
        assert_eq!(status.snapshots_collected, 10);
        assert_eq!(status.tokens_tracked, 1);
        assert_eq!(status.data_quality, DataQuality::Good);
        assert!(status.first_snapshot < status.last_snapshot);
    }

    #[test]
    fn market_summary_counts_movers() {
        let mut store = SeriesStore::default();
        store.record_snapshot(&[
            quote("XLM", 0.12, 0.05, 0),
            quote("USDC", 1.0, -0.01, 0),
            quote("EURC", 1.08, 0.0, 0),
        ]);
        let summary = store.market_summary().unwrap();
        assert_eq!(summary.total_tokens, 3);
        assert_eq!(summary.positive_movers, 1);
        assert_eq!(summary.negative_movers, 1);
        assert!((summary.total_volume - 1500.0).abs() < 1e-9);
        assert!((summary.average_price_change - 0.04 / 3.0).abs() < 1e-12);
    }
}
