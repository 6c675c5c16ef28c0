pub mod time_utils;

pub use time_utils::{AppInstant, TimeUtils, now_ms};
