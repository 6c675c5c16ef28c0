pub mod narrative;
pub mod session;

// Re-export key components
pub use narrative::build_narrative;
pub use session::{AnalyzeOutcome, DashboardObserver, DashboardSession, SessionStatus, build_analysis};
