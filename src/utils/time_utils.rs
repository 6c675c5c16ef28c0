use chrono::{DateTime, Utc};

// Monotonic clock for UI bookkeeping. `std::time::Instant` panics in the browser.
#[cfg(not(target_arch = "wasm32"))]
pub type AppInstant = std::time::Instant;

#[cfg(target_arch = "wasm32")]
pub type AppInstant = web_time::Instant;

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_3_MIN: i64 = Self::MS_IN_MIN * 3;
    pub const MS_IN_5_MIN: i64 = Self::MS_IN_MIN * 5;
    pub const MS_IN_15_MIN: i64 = Self::MS_IN_MIN * 15;
    pub const MS_IN_30_MIN: i64 = Self::MS_IN_MIN * 30;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_2_H: i64 = Self::MS_IN_H * 2;
    pub const MS_IN_4_H: i64 = Self::MS_IN_H * 4;
    pub const MS_IN_6_H: i64 = Self::MS_IN_H * 6;
    pub const MS_IN_8_H: i64 = Self::MS_IN_H * 8;
    pub const MS_IN_12_H: i64 = Self::MS_IN_H * 12;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const MS_IN_3_D: i64 = Self::MS_IN_D * 3;
    pub const MS_IN_W: i64 = Self::MS_IN_D * 7;
    pub const MS_IN_1_M: i64 = Self::MS_IN_D * 30;
    pub const CHART_TIME_FORMAT: &str = "%m-%d %H:%M";

    pub fn instant_now() -> AppInstant {
        AppInstant::now()
    }
}

/// Wall-clock milliseconds since the unix epoch (UTC).
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Short label used on the chart's time axis. Empty for out-of-range input.
pub fn epoch_ms_to_chart_label(epoch_ms: i64) -> String {
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|dt| dt.format(TimeUtils::CHART_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_label_formats_utc() {
        // 2024-01-02 03:04:00 UTC
        assert_eq!(epoch_ms_to_chart_label(1_704_164_640_000), "01-02 03:04");
    }

    #[test]
    fn interval_constants_chain() {
        assert_eq!(TimeUtils::MS_IN_D, 86_400_000);
        assert_eq!(TimeUtils::MS_IN_4_H, 14_400_000);
    }
}
