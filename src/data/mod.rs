// Market data: kline providers, the fallback resolver, the live trade feed
// and the configured backend's auxiliary endpoints.
pub mod backend_api;
pub mod price_stream;
pub mod providers;
pub mod resolver;

pub use backend_api::BackendClient;
pub use price_stream::{ConnectionStatus, LiveSubscription, LiveTickFeed, TickHandler};
pub use providers::{KlineProvider, ProviderAttempt, ProviderError, ProviderId};
pub use resolver::{Resolution, ResolutionOutcome, ResolverState, SourceResolver};
