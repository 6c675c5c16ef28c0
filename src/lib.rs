#![allow(clippy::collapsible_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod models;
pub mod ui;
pub mod utils;

#[cfg(not(target_arch = "wasm32"))]
pub mod headless;

// Re-export commonly used types
pub use data::{BackendClient, SourceResolver};
pub use domain::{Candle, Interval};
pub use engine::{DashboardObserver, DashboardSession};
pub use models::AnalysisResult;
pub use ui::{PulseDashApp, StartupOverrides, TaskSpawner};

// CLI argument parsing
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides the stored endpoint)
    #[arg(long)]
    pub backend: Option<String>,

    /// Symbol to open with, e.g. ETHUSDT
    #[arg(long)]
    pub symbol: Option<String>,

    /// Candle interval: 1m, 5m, 1h, 4h, 1d, ...
    #[arg(long)]
    pub interval: Option<Interval>,

    /// Run one analysis, print it and exit instead of opening the window
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Settings file used by headless runs
    #[arg(long, default_value = "pulse_dash_settings.json")]
    pub settings: PathBuf,
}

impl Cli {
    pub fn overrides(&self) -> StartupOverrides {
        StartupOverrides {
            backend_url: self.backend.clone(),
            symbol: self.symbol.clone(),
            interval: self.interval,
        }
    }
}

/// Main application entry point - creates the GUI app
pub fn run_app(
    cc: &eframe::CreationContext,
    spawner: TaskSpawner,
    overrides: StartupOverrides,
) -> Box<dyn eframe::App> {
    Box::new(PulseDashApp::new(cc, spawner, overrides))
}
