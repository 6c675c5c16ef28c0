use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::utils::TimeUtils;

/// Candle width, named with the exchange-style shorthand (`1m`, `1h`, `1d`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
pub enum Interval {
    #[strum(serialize = "1m")]
    OneMinute,
    #[strum(serialize = "3m")]
    ThreeMinutes,
    #[strum(serialize = "5m")]
    FiveMinutes,
    #[strum(serialize = "15m")]
    FifteenMinutes,
    #[strum(serialize = "30m")]
    ThirtyMinutes,
    #[default]
    #[strum(serialize = "1h")]
    OneHour,
    #[strum(serialize = "2h")]
    TwoHours,
    #[strum(serialize = "4h")]
    FourHours,
    #[strum(serialize = "6h")]
    SixHours,
    #[strum(serialize = "8h")]
    EightHours,
    #[strum(serialize = "12h")]
    TwelveHours,
    #[strum(serialize = "1d")]
    OneDay,
    #[strum(serialize = "3d")]
    ThreeDays,
    #[strum(serialize = "1w")]
    OneWeek,
    #[strum(serialize = "1M")]
    OneMonth,
}

impl Interval {
    pub fn as_ms(&self) -> i64 {
        match self {
            Interval::OneMinute => TimeUtils::MS_IN_MIN,
            Interval::ThreeMinutes => TimeUtils::MS_IN_3_MIN,
            Interval::FiveMinutes => TimeUtils::MS_IN_5_MIN,
            Interval::FifteenMinutes => TimeUtils::MS_IN_15_MIN,
            Interval::ThirtyMinutes => TimeUtils::MS_IN_30_MIN,
            Interval::OneHour => TimeUtils::MS_IN_H,
            Interval::TwoHours => TimeUtils::MS_IN_2_H,
            Interval::FourHours => TimeUtils::MS_IN_4_H,
            Interval::SixHours => TimeUtils::MS_IN_6_H,
            Interval::EightHours => TimeUtils::MS_IN_8_H,
            Interval::TwelveHours => TimeUtils::MS_IN_12_H,
            Interval::OneDay => TimeUtils::MS_IN_D,
            Interval::ThreeDays => TimeUtils::MS_IN_3_D,
            Interval::OneWeek => TimeUtils::MS_IN_W,
            Interval::OneMonth => TimeUtils::MS_IN_1_M,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn shorthand_round_trips_through_strum() {
        assert_eq!(Interval::from_str("4h").unwrap(), Interval::FourHours);
        assert_eq!(Interval::OneMonth.to_string(), "1M");
        assert_eq!(Interval::OneMinute.as_ref(), "1m");
        assert!(Interval::from_str("7h").is_err());
    }

    #[test]
    fn widths_are_strictly_increasing() {
        let widths: Vec<i64> = Interval::iter().map(|i| i.as_ms()).collect();
        assert!(widths.windows(2).all(|w| w[0] < w[1]));
    }
}
