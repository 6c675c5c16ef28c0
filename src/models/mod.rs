// Analysis outputs and the pure models that produce them.
// Nothing in here touches the network or the UI.

pub mod analysis;
pub mod forecast;
pub mod portfolio;

// Re-export key types for convenience
pub use analysis::{
    Analysis, AnalysisResult, IndicatorLines, IndicatorSnapshot, Momentum, Narrative, RsiZone,
    TrendBias,
};
pub use forecast::{Forecast, ForecastFit, predict_next};
pub use portfolio::{Holding, HoldingValuation, PortfolioValuation};
