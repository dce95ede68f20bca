//! Periodic refresh loop: load offers, aggregate, publish.

use crate::{
    config::AggregatorSettings,
    errors::Result,
    export::write_snapshot,
    feed::OfferSource,
    market::{MarketSnapshot, build_snapshot, refresh_offer_prices},
    models::Offer,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::watch;
use tracing::{info, warn};

/// Owns the state carried between refreshes: the RNG and, for the mock
/// source, the batch that the next price tick is applied to.
pub struct MarketAggregator {
    source: OfferSource,
    settings: AggregatorSettings,
    rng: StdRng,
    mock_batch: Option<Vec<Offer>>,
}

impl MarketAggregator {
    pub fn new(source: OfferSource, settings: AggregatorSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            source,
            settings,
            rng,
            mock_batch: None,
        }
    }

    /// Next batch of offers. Mock batches are generated once and then moved
    /// by one price tick per refresh. A failed tick leaves the stored batch
    /// untouched.
    async fn next_offers(&mut self) -> Result<Vec<Offer>> {
        if !self.source.is_mock() {
            return self.source.load_offers(&mut self.rng).await;
        }
        let next = match self.mock_batch.as_ref() {
            Some(previous) => refresh_offer_prices(previous, &self.settings.tick, &mut self.rng)?,
            None => self.source.load_offers(&mut self.rng).await?,
        };
        self.mock_batch = Some(next.clone());
        Ok(next)
    }

    /// Run one refresh and return the snapshot it produced.
    pub async fn refresh(&mut self) -> Result<MarketSnapshot> {
        let offers = self.next_offers().await?;
        build_snapshot(&offers, self.settings.grouping)
    }
}

/// Spawn the refresh loop. Each successful refresh replaces the value on
/// `snapshot_tx`; failures are logged and the previous snapshot is kept.
pub fn spawn_market_aggregator(
    source: OfferSource,
    settings: AggregatorSettings,
    snapshot_tx: watch::Sender<Option<MarketSnapshot>>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(settings.refresh_interval);
        let heartbeat_every = settings.heartbeat_every.max(1);
        let mut ticks: u64 = 0;
        info!(
            source = %source,
            interval_secs = settings.refresh_interval.as_secs(),
            grouping = ?settings.grouping,
            "[INIT] market aggregator started"
        );
        let export_path = settings.export_path.clone();
        let mut aggregator = MarketAggregator::new(source, settings);

        loop {
            ticker.tick().await;
            ticks += 1;

            match aggregator.refresh().await {
                Ok(snapshot) => {
                    if let Some(path) = export_path.as_deref() {
                        if let Err(e) = write_snapshot(path, &snapshot).await {
                            warn!(
                                error = %e,
                                path = %path.display(),
                                "[EXPORT] snapshot not written"
                            );
                        }
                    }
                    if snapshot_tx.send(Some(snapshot)).is_err() {
                        info!("[SHUTDOWN] no snapshot receivers left, stopping aggregator");
                        break;
                    }
                }
                Err(e) if e.is_fetch() => {
                    warn!(error = %e, "[FEED] offer source failed, keeping previous snapshot");
                }
                Err(e) => {
                    warn!(error = %e, "[AGG] refresh rejected, keeping previous snapshot");
                }
            }

            if ticks % heartbeat_every == 0 {
                let has_snapshot = snapshot_tx.borrow().is_some();
                info!(ticks, has_snapshot, "[HEARTBEAT] aggregator alive");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::feed::MockConfig;
    use crate::market::PriceTick;
    use bigdecimal::BigDecimal;
    use std::time::Duration;

    fn settings(seed: u64) -> AggregatorSettings {
        AggregatorSettings {
            refresh_interval: Duration::from_millis(10),
            seed: Some(seed),
            ..AggregatorSettings::default()
        }
    }

    fn mock(buy_count: usize, sell_count: usize) -> OfferSource {
        OfferSource::Mock(MockConfig {
            buy_count,
            sell_count,
            ..MockConfig::default()
        })
    }

    #[tokio::test]
    async fn mock_refresh_keeps_users_and_moves_prices_within_band() {
        let mut aggregator = MarketAggregator::new(mock(12, 8), settings(1));
        let first = aggregator.refresh().await.unwrap();
        let second = aggregator.refresh().await.unwrap();

        assert_eq!(first.stats.total_offer_count, 20);
        assert_eq!(second.stats.total_offer_count, 20);
        assert_eq!(first.stats.total_liquidity, second.stats.total_liquidity);
        let tick = AggregatorSettings::default().tick;
        assert!(second.stats.min_price >= tick.low);
        assert!(second.stats.max_price <= tick.high);
        assert_eq!(second.buy.as_ref().map(|b| b.offer_count), Some(12));
        assert_eq!(second.sell.as_ref().map(|s| s.offer_count), Some(8));
    }

    #[tokio::test]
    async fn failed_tick_keeps_the_mock_batch() {
        let broken = AggregatorSettings {
            tick: PriceTick {
                max_step: BigDecimal::from(-1),
                ..AggregatorSettings::default().tick
            },
            ..settings(4)
        };
        let mut aggregator = MarketAggregator::new(mock(3, 2), broken);
        let first = aggregator.refresh().await.unwrap();

        assert!(aggregator.refresh().await.is_err());
        assert!(aggregator.refresh().await.is_err());

        let kept = aggregator.mock_batch.as_ref().expect("batch kept after failed tick");
        assert_eq!(kept.len(), 5);
        let rebuilt = build_snapshot(kept, aggregator.settings.grouping).unwrap();
        assert_eq!(rebuilt.by_user, first.by_user);
        assert_eq!(rebuilt.by_price, first.by_price);
        assert_eq!(rebuilt.stats, first.stats);
    }

    #[tokio::test]
    async fn empty_mock_batch_is_rejected() {
        let mut aggregator = MarketAggregator::new(mock(0, 0), settings(1));
        assert!(matches!(aggregator.refresh().await, Err(AppError::EmptyInput)));
    }

    #[tokio::test]
    async fn missing_file_source_surfaces_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = OfferSource::File(dir.path().join("missing.json"));
        let mut aggregator = MarketAggregator::new(source, settings(1));
        let err = aggregator.refresh().await.unwrap_err();
        assert!(err.is_fetch());
    }

    #[tokio::test]
    async fn loop_publishes_snapshots() {
        let (tx, mut rx) = watch::channel(None);
        let handle = spawn_market_aggregator(mock(3, 2), settings(3), tx);

        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("snapshot published in time")
            .unwrap();
        let snapshot = rx.borrow().clone().expect("snapshot present");
        assert_eq!(snapshot.stats.total_offer_count, 5);

        drop(rx);
        handle.abort();
    }

    #[tokio::test]
    async fn loop_exports_each_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let settings = AggregatorSettings {
            export_path: Some(path.clone()),
            ..settings(5)
        };
        let (tx, mut rx) = watch::channel(None);
        let handle = spawn_market_aggregator(mock(2, 2), settings, tx);

        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("snapshot published in time")
            .unwrap();
        handle.abort();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["stats"]["total_offer_count"], 4);
    }

    #[tokio::test]
    async fn loop_keeps_none_when_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = OfferSource::File(dir.path().join("missing.json"));
        let (tx, rx) = watch::channel(None);
        let handle = spawn_market_aggregator(source, settings(1), tx);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.borrow().is_none());
        handle.abort();
    }
}
