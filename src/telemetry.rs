//! Telemetry helpers for hosts embedding `vote-charts`.
//!
//! The crate only emits `tracing` events (skipped vote entries, palette
//! mismatches, cache builds, scheduler sleep/wake). Hosts either call
//! `init_default_tracing` or install their own subscriber.

/// Installs a compact `tracing` subscriber when the `telemetry` feature is on.
///
/// The filter comes from `RUST_LOG` and falls back to `warn`, which surfaces
/// the non-fatal data diagnostics without the per-frame scheduler noise.
///
/// Returns `false` when the feature is disabled or a global subscriber is
/// already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_target(true)
            .compact();

        return builder.try_init().is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
