//! Remote endpoints and transport settings.

/// The configured backend (user-overridable through settings)
pub struct BackendDefaults {
    pub base_url: &'static str,
}

/// Public market-data API (CoinGecko-style OHLC)
pub struct MarketDataApi {
    pub base_url: &'static str,
    pub vs_currency: &'static str,
    /// `days` values the OHLC endpoint accepts, ascending
    pub accepted_days: &'static [u32],
}

/// Exchange REST + streaming (Binance spot)
pub struct ExchangeApi {
    /// Single raw stream base; `<symbol>@trade` is appended
    pub ws_base_url: &'static str,
    /// Quote suffixes the live trade feed is opened for
    pub live_quote_suffixes: &'static [&'static str],
    /// Maximum reconnection delay (seconds)
    pub max_reconnect_delay_sec: u64,
    /// Initial reconnection delay (seconds)
    pub initial_reconnect_delay_sec: u64,
    /// Give up on the live feed after this many consecutive failed connects
    pub max_reconnect_attempts: u32,
}

/// Default values for the HTTP clients
pub struct HttpClientConfig {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
    /// Upper bound for one provider attempt during fallback, on top of `timeout_ms`
    pub provider_deadline_ms: u64,
}

/// The Master Endpoint Configuration
pub struct EndpointConfig {
    pub backend: BackendDefaults,
    pub market_data: MarketDataApi,
    pub exchange: ExchangeApi,
    pub client: HttpClientConfig,
}

pub const ENDPOINTS: EndpointConfig = EndpointConfig {
    backend: BackendDefaults {
        base_url: "https://smart-crypto-backend.onrender.com",
    },
    market_data: MarketDataApi {
        base_url: "https://api.coingecko.com/api/v3",
        vs_currency: "usd",
        accepted_days: &[1, 7, 14, 30, 90, 180, 365],
    },
    exchange: ExchangeApi {
        ws_base_url: "wss://stream.binance.com:9443/ws/",
        live_quote_suffixes: &["USDT", "USDC", "FDUSD"],
        max_reconnect_delay_sec: 60,
        initial_reconnect_delay_sec: 1,
        max_reconnect_attempts: 5,
    },
    client: HttpClientConfig {
        timeout_ms: 8000,
        retries: 1,
        backoff_ms: 1000,
        provider_deadline_ms: 10_000,
    },
};
