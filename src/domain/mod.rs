// Domain types and value objects
pub mod candle;
pub mod interval;
pub mod symbol;

// Re-export commonly used types
pub use candle::{Candle, PricePoint, SeriesWindow};
pub use interval::Interval;
