// Connectivity latency measurement

use serde::{Deserialize, Serialize};

/// Where the end timestamp of a latency measurement came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencySource {
    /// `ping_end` reported in the remote response body
    Server,
    /// Local clock read after the response arrived
    Client,
}

/// Result of a connectivity probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Latency {
    /// Signed: a remote clock behind ours yields a negative value
    pub nanos: i64,
    pub source: LatencySource,
}

impl Latency {
    /// Prefer the server-reported `ping_end`; fall back to the local clock.
    ///
    /// A `ping_end` whose difference to `ping_start` does not fit in an `i64`
    /// is treated as absent.
    pub fn measure(ping_start: i64, ping_end: Option<i64>, now_nanos: impl FnOnce() -> i64) -> Self {
        match ping_end.and_then(|end| end.checked_sub(ping_start)) {
            Some(nanos) => Self {
                nanos,
                source: LatencySource::Server,
            },
            None => Self {
                nanos: now_nanos().saturating_sub(ping_start),
                source: LatencySource::Client,
            },
        }
    }

    pub fn as_millis_f64(&self) -> f64 {
        self.nanos as f64 / 1_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_reported_end_wins() {
        let latency = Latency::measure(1_000, Some(4_500), || panic!("clock must not be read"));
        assert_eq!(latency.nanos, 3_500);
        assert_eq!(latency.source, LatencySource::Server);
    }

    #[test]
    fn test_client_fallback() {
        let latency = Latency::measure(1_000, None, || 2_000_000);
        assert_eq!(latency.nanos, 1_999_000);
        assert_eq!(latency.source, LatencySource::Client);
        assert!((latency.as_millis_f64() - 1.999).abs() < 1e-9);
    }

    #[test]
    fn test_overflowing_server_end_falls_back_to_client() {
        let latency = Latency::measure(1_000, Some(i64::MIN), || 6_000);
        assert_eq!(latency.nanos, 5_000);
        assert_eq!(latency.source, LatencySource::Client);
    }

    #[test]
    fn test_client_clock_saturates() {
        let latency = Latency::measure(i64::MIN, None, || i64::MAX);
        assert_eq!(latency.nanos, i64::MAX);
    }
}
