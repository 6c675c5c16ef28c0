//! Configuration module for the dashboard.

pub mod analysis;
pub mod endpoints;

mod debug; // Private: callers go through crate::config::DEBUG_FLAGS
pub use debug::DEBUG_FLAGS;

pub mod settings;

// Re-export commonly used items
pub use analysis::{ANALYSIS, AnalysisConfig, IndicatorSettings, NarrativeSettings};
pub use endpoints::{ENDPOINTS, HttpClientConfig};
pub use settings::{JsonFileStore, KeyValueStore, MemoryStore, UserSettings};
