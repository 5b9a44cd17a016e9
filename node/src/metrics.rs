//! Prometheus metrics for the verifier.
//!
//! [`VerifierMetrics`] owns a dedicated [`Registry`] so that several
//! orchestrators in one process never collide on metric names. An embedder
//! exposes it with [`VerifierMetrics::encode`].

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry, Encoder, Histogram,
    HistogramOpts, IntCounter, Opts, Registry, TextEncoder,
};

use crate::VerificationError;

pub struct VerifierMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Invocations that reached camera acquisition.
    pub sessions_started: IntCounter,
    /// Sessions that ended with a stored video and still.
    pub sessions_verified: IntCounter,
    /// Sessions that ran out of trials.
    pub sessions_failed: IntCounter,
    /// Invocations dismissed before the camera was acquired.
    pub sessions_not_started: IntCounter,
    /// Detection ticks on which no face was found.
    pub no_detection_ticks: IntCounter,
    /// Confirmed blinks whose still could not be extracted.
    pub extraction_failures: IntCounter,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Time from camera acquisition to a terminal outcome, in milliseconds.
    pub session_duration_ms: Histogram,
}

impl VerifierMetrics {
    pub fn new() -> Result<Self, VerificationError> {
        let registry = Registry::new();

        let sessions_started = register_int_counter_with_registry!(
            Opts::new(
                "blinkgate_sessions_started_total",
                "Verification sessions that acquired a camera"
            ),
            registry
        )?;

        let sessions_verified = register_int_counter_with_registry!(
            Opts::new(
                "blinkgate_sessions_verified_total",
                "Verification sessions that confirmed a blink"
            ),
            registry
        )?;

        let sessions_failed = register_int_counter_with_registry!(
            Opts::new(
                "blinkgate_sessions_failed_total",
                "Verification sessions that exhausted their trials"
            ),
            registry
        )?;

        let sessions_not_started = register_int_counter_with_registry!(
            Opts::new(
                "blinkgate_sessions_not_started_total",
                "Invocations dismissed before camera acquisition"
            ),
            registry
        )?;

        let no_detection_ticks = register_int_counter_with_registry!(
            Opts::new(
                "blinkgate_no_detection_ticks_total",
                "Detection ticks without a face"
            ),
            registry
        )?;

        let extraction_failures = register_int_counter_with_registry!(
            Opts::new(
                "blinkgate_extraction_failures_total",
                "Still extractions that failed after a confirmed blink"
            ),
            registry
        )?;

        // 50 ms → ~27 min.
        let session_duration_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "blinkgate_session_duration_ms",
                "Session duration from camera acquisition to outcome, in milliseconds"
            )
            .buckets(prometheus::exponential_buckets(50.0, 2.0, 16)?),
            registry
        )?;

        Ok(Self {
            registry,
            sessions_started,
            sessions_verified,
            sessions_failed,
            sessions_not_started,
            no_detection_ticks,
            extraction_failures,
            session_duration_ms,
        })
    }

    /// Render every metric in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, VerificationError> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        let text = String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registries_are_independent() {
        let a = VerifierMetrics::new().unwrap();
        let b = VerifierMetrics::new().unwrap();
        a.sessions_started.inc();
        assert_eq!(a.sessions_started.get(), 1);
        assert_eq!(b.sessions_started.get(), 0);
    }

    #[test]
    fn encodes_text_format() {
        let metrics = VerifierMetrics::new().unwrap();
        metrics.no_detection_ticks.inc_by(3);
        metrics.session_duration_ms.observe(1_200.0);
        let text = metrics.encode().unwrap();
        assert!(text.contains("blinkgate_no_detection_ticks_total 3"));
        assert!(text.contains("blinkgate_session_duration_ms_count 1"));
    }
}
