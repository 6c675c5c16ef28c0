//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so release
//! builds remain quiet. Callers additionally gate on `cfg(debug_assertions)`.

pub struct DebugFlags {
    /// Emit every live tick and every (re)connect of the trade stream.
    pub print_price_stream_updates: bool,
    /// Emit each resolver state transition and provider outcome.
    pub print_resolver_transitions: bool,
    /// Emit when an analysis result is discarded because a newer request started.
    pub print_stale_results: bool,
    /// Emit UI interaction logs (symbol switching, manual refresh).
    pub print_ui_interactions: bool,
    /// Emit settings store reads and writes.
    pub print_settings_serde: bool,
}

pub const DEBUG_FLAGS: DebugFlags = DebugFlags {
    print_price_stream_updates: false,
    print_resolver_transitions: true,
    print_stale_results: true,
    print_ui_interactions: true,
    print_settings_serde: false,
};
