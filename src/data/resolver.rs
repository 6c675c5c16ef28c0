//! Sequential provider fallback.
//!
//! Providers are tried strictly one at a time in priority order. The first
//! non-empty, normalized result wins and later providers are never called.
//! Failures are recorded and never surface as errors: the caller gets either
//! candles or an explicit `Exhausted` outcome.

use std::sync::Arc;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
#[cfg(not(target_arch = "wasm32"))]
use crate::config::ENDPOINTS;
use crate::data::providers::{
    AttemptOutcome, BackendKlines, KlineProvider, MarketDataOhlc, ProviderAttempt, ProviderError,
    ProviderId,
};
use crate::domain::candle::normalize_candles;
use crate::domain::{Candle, Interval};
use crate::utils::TimeUtils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    NotStarted,
    TryingConfiguredBackend,
    TryingPublicMarketApi,
    TryingExchangeRest,
    Resolved(ProviderId),
    Exhausted,
}

impl ResolverState {
    fn trying(provider: ProviderId) -> Self {
        match provider {
            ProviderId::ConfiguredBackend => ResolverState::TryingConfiguredBackend,
            ProviderId::PublicMarketApi => ResolverState::TryingPublicMarketApi,
            ProviderId::ExchangeRest => ResolverState::TryingExchangeRest,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Resolved {
        provider: ProviderId,
        candles: Vec<Candle>,
    },
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub symbol: String,
    pub interval: Interval,
    pub outcome: ResolutionOutcome,
    pub attempts: Vec<ProviderAttempt>,
    /// Every state passed through, `NotStarted` first
    pub trace: Vec<ResolverState>,
}

impl Resolution {
    pub fn final_state(&self) -> ResolverState {
        self.trace.last().copied().unwrap_or(ResolverState::NotStarted)
    }
}

pub struct SourceResolver {
    providers: Vec<Arc<dyn KlineProvider>>,
    #[cfg(not(target_arch = "wasm32"))]
    deadline: Duration,
}

impl SourceResolver {
    /// Providers are ordered by priority regardless of the order given.
    pub fn new(mut providers: Vec<Arc<dyn KlineProvider>>) -> Self {
        providers.sort_by_key(|p| p.id());
        Self {
            providers,
            #[cfg(not(target_arch = "wasm32"))]
            deadline: Duration::from_millis(ENDPOINTS.client.provider_deadline_ms),
        }
    }

    /// The production chain: configured backend, market-data API, then the
    /// exchange (native builds only).
    pub fn standard(backend_url: &str) -> Self {
        #[allow(unused_mut)]
        let mut providers: Vec<Arc<dyn KlineProvider>> = vec![
            Arc::new(BackendKlines::new(backend_url)),
            Arc::new(MarketDataOhlc::default()),
        ];
        #[cfg(not(target_arch = "wasm32"))]
        providers.push(Arc::new(crate::data::providers::ExchangeKlines));
        Self::new(providers)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    async fn attempt(
        &self,
        provider: &dyn KlineProvider,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, ProviderError> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            match tokio::time::timeout(self.deadline, provider.fetch_klines(symbol, interval, limit))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(ProviderError::DeadlineExceeded(self.deadline)),
            }
        }
        #[cfg(target_arch = "wasm32")]
        {
            provider.fetch_klines(symbol, interval, limit).await
        }
    }

    pub async fn resolve(&self, symbol: &str, interval: Interval, limit: usize) -> Resolution {
        let mut trace = vec![ResolverState::NotStarted];
        let mut attempts = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let id = provider.id();
            trace.push(ResolverState::trying(id));
            let started = TimeUtils::instant_now();

            let result = self
                .attempt(provider.as_ref(), symbol, interval, limit)
                .await
                .map(|candles| normalize_candles(candles, limit))
                .and_then(|candles| {
                    if candles.is_empty() {
                        Err(ProviderError::EmptyResult)
                    } else {
                        Ok(candles)
                    }
                });

            match result {
                Ok(candles) => {
                    #[cfg(debug_assertions)]
                    if DEBUG_FLAGS.print_resolver_transitions {
                        log::info!(
                            "[resolver] {} {} resolved by {} in {:?}",
                            symbol,
                            interval,
                            id,
                            started.elapsed()
                        );
                    }
                    attempts.push(ProviderAttempt {
                        provider: id,
                        outcome: AttemptOutcome::Candles(candles.len()),
                    });
                    trace.push(ResolverState::Resolved(id));
                    return Resolution {
                        symbol: symbol.to_string(),
                        interval,
                        outcome: ResolutionOutcome::Resolved {
                            provider: id,
                            candles,
                        },
                        attempts,
                        trace,
                    };
                }
                Err(e) => {
                    log::warn!(
                        "⚠️  {} {} from {} failed after {:?}: {}",
                        symbol,
                        interval,
                        id,
                        started.elapsed(),
                        e
                    );
                    attempts.push(ProviderAttempt {
                        provider: id,
                        outcome: AttemptOutcome::Failed(e),
                    });
                }
            }
        }

        log::warn!("❌ No data available for {} {}", symbol, interval);
        trace.push(ResolverState::Exhausted);
        Resolution {
            symbol: symbol.to_string(),
            interval,
            outcome: ResolutionOutcome::Exhausted,
            attempts,
            trace,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    pub type Responder = Box<dyn Fn(&str) -> Result<Vec<Candle>, ProviderError> + Send + Sync>;

    /// Scripted provider counting its calls.
    pub struct FakeProvider {
        pub id: ProviderId,
        pub calls: AtomicUsize,
        pub delay: Duration,
        pub respond: Responder,
    }

    impl FakeProvider {
        pub fn new(
            id: ProviderId,
            respond: impl Fn(&str) -> Result<Vec<Candle>, ProviderError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Self::delayed(id, Duration::ZERO, respond)
        }

        pub fn delayed(
            id: ProviderId,
            delay: Duration,
            respond: impl Fn(&str) -> Result<Vec<Candle>, ProviderError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                id,
                calls: AtomicUsize::new(0),
                delay,
                respond: Box::new(respond),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KlineProvider for FakeProvider {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn fetch_klines(
            &self,
            symbol: &str,
            _interval: Interval,
            _limit: usize,
        ) -> Result<Vec<Candle>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            (self.respond)(symbol)
        }
    }

    pub fn dyn_provider(p: &Arc<FakeProvider>) -> Arc<dyn KlineProvider> {
        p.clone()
    }

    /// `n` hourly candles with closes start, start+step, ...
    pub fn rising_candles(n: usize, start: f64, step: f64) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let c = start + step * i as f64;
                Candle::new(i as i64 * 3_600_000, c, c + 0.5, c - 0.5, c, 1.0)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::test_support::{FakeProvider, dyn_provider, rising_candles};
    use super::*;

    #[tokio::test]
    async fn first_success_short_circuits() {
        let backend = FakeProvider::new(ProviderId::ConfiguredBackend, |_| {
            Err(ProviderError::TransportFailure("connection refused".into()))
        });
        let market = FakeProvider::new(ProviderId::PublicMarketApi, |_| Ok(rising_candles(10, 1.0, 1.0)));
        let exchange = FakeProvider::new(ProviderId::ExchangeRest, |_| Ok(rising_candles(10, 1.0, 1.0)));

        // Deliberately out of order: priority comes from the ids
        let resolver = SourceResolver::new(vec![
            dyn_provider(&exchange),
            dyn_provider(&market),
            dyn_provider(&backend),
        ]);
        let resolution = resolver.resolve("BTCUSDT", Interval::OneHour, 500).await;

        assert_eq!(
            resolution.trace,
            vec![
                ResolverState::NotStarted,
                ResolverState::TryingConfiguredBackend,
                ResolverState::TryingPublicMarketApi,
                ResolverState::Resolved(ProviderId::PublicMarketApi),
            ]
        );
        assert_eq!((backend.calls(), market.calls(), exchange.calls()), (1, 1, 0));
        assert!(matches!(
            resolution.outcome,
            ResolutionOutcome::Resolved { provider: ProviderId::PublicMarketApi, .. }
        ));
    }

    #[tokio::test]
    async fn all_failing_is_exhausted_with_each_provider_called_once() {
        let backend = FakeProvider::new(ProviderId::ConfiguredBackend, |_| {
            Err(ProviderError::UnsuccessfulResponse {
                status: Some(500),
                message: "Internal Server Error".into(),
            })
        });
        let market = FakeProvider::new(ProviderId::PublicMarketApi, |s| {
            Err(ProviderError::UnsupportedSymbol(s.to_string()))
        });
        let exchange = FakeProvider::new(ProviderId::ExchangeRest, |_| Ok(Vec::new()));

        let resolver = SourceResolver::new(vec![
            dyn_provider(&backend),
            dyn_provider(&market),
            dyn_provider(&exchange),
        ]);
        let resolution = resolver.resolve("FOOUSDT", Interval::OneHour, 500).await;

        assert_eq!(resolution.outcome, ResolutionOutcome::Exhausted);
        assert_eq!(resolution.final_state(), ResolverState::Exhausted);
        assert_eq!((backend.calls(), market.calls(), exchange.calls()), (1, 1, 1));
        assert_eq!(resolution.attempts.len(), 3);
        assert_eq!(
            resolution.attempts[2].outcome,
            AttemptOutcome::Failed(ProviderError::EmptyResult)
        );
    }

    #[tokio::test]
    async fn slow_provider_hits_the_deadline_and_falls_through() {
        let backend = FakeProvider::delayed(ProviderId::ConfiguredBackend, Duration::from_secs(5), |_| {
            Ok(rising_candles(5, 1.0, 1.0))
        });
        let market = FakeProvider::new(ProviderId::PublicMarketApi, |_| Ok(rising_candles(5, 2.0, 1.0)));

        let resolver = SourceResolver::new(vec![dyn_provider(&backend), dyn_provider(&market)])
            .with_deadline(Duration::from_millis(50));
        let resolution = resolver.resolve("BTCUSDT", Interval::OneHour, 500).await;

        assert_eq!(
            resolution.attempts[0].outcome,
            AttemptOutcome::Failed(ProviderError::DeadlineExceeded(Duration::from_millis(50)))
        );
        assert_eq!(resolution.final_state(), ResolverState::Resolved(ProviderId::PublicMarketApi));
    }

    #[tokio::test]
    async fn provider_output_is_normalized() {
        let backend = FakeProvider::new(ProviderId::ConfiguredBackend, |_| {
            let mut candles = rising_candles(6, 1.0, 1.0);
            candles.reverse();
            candles.push(candles[0]);
            Ok(candles)
        });
        let resolver = SourceResolver::new(vec![dyn_provider(&backend)]);
        let resolution = resolver.resolve("BTCUSDT", Interval::OneHour, 4).await;

        let ResolutionOutcome::Resolved { candles, .. } = resolution.outcome else {
            panic!("expected candles");
        };
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        assert_eq!(closes, vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn standard_chain_is_in_priority_order() {
        let ids = SourceResolver::standard("http://localhost:8000").provider_ids();
        assert_eq!(
            ids,
            vec![
                ProviderId::ConfiguredBackend,
                ProviderId::PublicMarketApi,
                ProviderId::ExchangeRest
            ]
        );
    }
}
