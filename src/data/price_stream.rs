//! Live trade feed for the displayed symbol.
//!
//! One WebSocket per subscription on the exchange's raw `<symbol>@trade`
//! stream. Dropping the [`LiveSubscription`] closes it. Failures never reach
//! the caller: the feed reconnects with backoff and eventually gives up,
//! leaving the dashboard without live updates.

use std::sync::Arc;

use serde::Deserialize;

use crate::config::ENDPOINTS;
use crate::domain::symbol::has_quote_suffix;

#[cfg(all(debug_assertions, not(target_arch = "wasm32")))]
use crate::config::DEBUG_FLAGS;
#[cfg(not(target_arch = "wasm32"))]
use futures::StreamExt;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::{Mutex, PoisonError};
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
#[cfg(not(target_arch = "wasm32"))]
use tokio::task::JoinHandle;
#[cfg(not(target_arch = "wasm32"))]
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Called with every parsed trade price.
pub type TickHandler = Arc<dyn Fn(f64) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    /// Gave up after too many failed connects
    Stopped,
}

#[derive(Debug, Deserialize)]
struct TradeEvent {
    #[serde(rename = "s")]
    symbol: String,
    #[serde(rename = "p")]
    price: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeTick {
    pub symbol: String,
    pub price: f64,
}

/// Reads a trade event. Anything else (acks, malformed prices) is `None`.
pub fn parse_trade(text: &str) -> Option<TradeTick> {
    let event: TradeEvent = serde_json::from_str(text).ok()?;
    let price = event.price.parse::<f64>().ok()?;
    (price.is_finite() && price > 0.0).then(|| TradeTick {
        symbol: event.symbol.to_uppercase(),
        price,
    })
}

#[derive(Debug, Clone)]
pub struct LiveTickFeed {
    ws_base_url: String,
    quote_suffixes: &'static [&'static str],
    enabled: bool,
    max_reconnect_attempts: u32,
    initial_reconnect_delay_ms: u64,
}

impl Default for LiveTickFeed {
    fn default() -> Self {
        Self::new(ENDPOINTS.exchange.ws_base_url)
    }
}

impl LiveTickFeed {
    pub fn new(ws_base_url: &str) -> Self {
        Self {
            ws_base_url: ws_base_url.to_string(),
            quote_suffixes: ENDPOINTS.exchange.live_quote_suffixes,
            enabled: true,
            max_reconnect_attempts: ENDPOINTS.exchange.max_reconnect_attempts,
            initial_reconnect_delay_ms: ENDPOINTS.exchange.initial_reconnect_delay_sec * 1000,
        }
    }

    /// Overrides how many failed connects are tolerated and the first backoff step.
    pub fn with_reconnect(mut self, max_attempts: u32, initial_delay_ms: u64) -> Self {
        self.max_reconnect_attempts = max_attempts.max(1);
        self.initial_reconnect_delay_ms = initial_delay_ms;
        self
    }

    /// A feed that never subscribes (headless runs, tests).
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Whether a live stream exists for this pair at all.
    pub fn supports(&self, symbol: &str) -> bool {
        self.enabled && has_quote_suffix(symbol, self.quote_suffixes)
    }

    pub fn stream_url(&self, symbol: &str) -> String {
        format!("{}{}@trade", self.ws_base_url, symbol.to_lowercase())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub struct LiveSubscription {
    symbol: String,
    status: Arc<Mutex<ConnectionStatus>>,
    task: JoinHandle<()>,
}

#[cfg(not(target_arch = "wasm32"))]
impl LiveSubscription {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The stream task has ended and no more ticks will arrive.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Drop for LiveSubscription {
    fn drop(&mut self) {
        self.task.abort();
        log::info!("🔌 Closed live feed for {}", self.symbol);
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl LiveTickFeed {
    /// Opens the trade stream for `symbol` on the current tokio runtime.
    /// `None` when the pair has no live stream or no runtime is available.
    pub fn subscribe(&self, symbol: &str, on_tick: TickHandler) -> Option<LiveSubscription> {
        if !self.supports(symbol) {
            return None;
        }
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("⚠️  No runtime for live feed of {}: {}", symbol, e);
                return None;
            }
        };

        let status = Arc::new(Mutex::new(ConnectionStatus::Connecting));
        let task = runtime.spawn(run_with_reconnect(
            symbol.to_uppercase(),
            self.stream_url(symbol),
            on_tick,
            status.clone(),
            ReconnectPolicy {
                max_attempts: self.max_reconnect_attempts,
                initial_delay_ms: self.initial_reconnect_delay_ms,
            },
        ));
        log::info!("📡 Live feed requested for {}", symbol);

        Some(LiveSubscription {
            symbol: symbol.to_string(),
            status,
            task,
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
struct ReconnectPolicy {
    max_attempts: u32,
    initial_delay_ms: u64,
}

#[cfg(not(target_arch = "wasm32"))]
fn set_status(status: &Mutex<ConnectionStatus>, value: ConnectionStatus) {
    *status.lock().unwrap_or_else(PoisonError::into_inner) = value;
}

/// Keeps the stream alive with exponential backoff; gives up after too many
/// consecutive failed connects.
#[cfg(not(target_arch = "wasm32"))]
async fn run_with_reconnect(
    symbol: String,
    url: String,
    on_tick: TickHandler,
    status: Arc<Mutex<ConnectionStatus>>,
    policy: ReconnectPolicy,
) {
    let max_delay_ms = ENDPOINTS.exchange.max_reconnect_delay_sec * 1000;
    let mut reconnect_delay = policy.initial_delay_ms;
    let mut failures: u32 = 0;

    loop {
        set_status(&status, ConnectionStatus::Connecting);

        match run_stream(&symbol, &url, &on_tick, &status).await {
            Ok(()) => {
                // Server closed a healthy connection (e.g. the 24h limit)
                #[cfg(debug_assertions)]
                if DEBUG_FLAGS.print_price_stream_updates {
                    log::info!("Live feed for {} closed, reconnecting...", symbol);
                }
                reconnect_delay = policy.initial_delay_ms;
                failures = 0;
                tokio::time::sleep(Duration::from_millis(reconnect_delay)).await;
            }
            Err(e) => {
                failures += 1;
                if failures >= policy.max_attempts {
                    set_status(&status, ConnectionStatus::Stopped);
                    log::warn!(
                        "⚠️  Giving up on live feed for {} after {} attempts: {}",
                        symbol,
                        failures,
                        e
                    );
                    return;
                }
                set_status(&status, ConnectionStatus::Disconnected);
                log::error!("Live feed error for {}: {}", symbol, e);
                #[cfg(debug_assertions)]
                if DEBUG_FLAGS.print_price_stream_updates {
                    log::info!("Reconnecting {} in {} ms...", symbol, reconnect_delay);
                }
                tokio::time::sleep(Duration::from_millis(reconnect_delay)).await;
                reconnect_delay = (reconnect_delay * 2).min(max_delay_ms);
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn run_stream(
    symbol: &str,
    url: &str,
    on_tick: &TickHandler,
    status: &Mutex<ConnectionStatus>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    #[cfg(debug_assertions)]
    if DEBUG_FLAGS.print_price_stream_updates {
        log::info!("Connecting to trade stream: {}", url);
    }

    let (ws_stream, _) = connect_async(url).await?;
    set_status(status, ConnectionStatus::Connected);
    log::info!("✓ Live feed connected for {}", symbol);

    let (_write, mut read) = ws_stream.split();

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => match parse_trade(&text) {
                Some(tick) if tick.symbol == symbol => {
                    #[cfg(debug_assertions)]
                    if DEBUG_FLAGS.print_price_stream_updates {
                        log::info!("[price-stream] {} -> {:.6}", tick.symbol, tick.price);
                    }
                    on_tick(tick.price);
                }
                _ => {
                    #[cfg(debug_assertions)]
                    if DEBUG_FLAGS.print_price_stream_updates {
                        log::warn!("⚠️ Ignoring stream payload: {}", text.as_str());
                    }
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {
                // Ping/pong are answered by the library
            }
            Err(e) => {
                set_status(status, ConnectionStatus::Disconnected);
                return Err(e.into());
            }
        }
    }

    set_status(status, ConnectionStatus::Disconnected);
    Ok(())
}

/// Browser builds have no live feed; the dashboard works from loaded history.
#[cfg(target_arch = "wasm32")]
pub struct LiveSubscription {
    symbol: String,
}

#[cfg(target_arch = "wasm32")]
impl LiveSubscription {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus::Stopped
    }

    pub fn is_finished(&self) -> bool {
        true
    }
}

#[cfg(target_arch = "wasm32")]
impl LiveTickFeed {
    pub fn subscribe(&self, _symbol: &str, _on_tick: TickHandler) -> Option<LiveSubscription> {
        None
    }
}
