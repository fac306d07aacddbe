// Upstream throttle cooldown with exponential growth
// Author: kelexine (https://github.com/kelexine)
//
// The upstream rate limit applies to the shared API key, not to a single
// feed, so a 429/403 closes the gate for every key. Consecutive throttles
// stretch the cooldown; the first success closes it.

use backoff::{backoff::Backoff, ExponentialBackoff};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Determine if an HTTP status code means "stop calling for a while"
pub fn is_throttle_status(status: u16) -> bool {
    matches!(status, 403 | 429)
}

/// Parse a `Retry-After` header given in seconds (e.g. "40", "1.5").
/// HTTP-date values are ignored. Capped at `cap`.
pub fn parse_retry_after(value: &str, cap: Duration) -> Option<Duration> {
    let seconds: f64 = value.trim().parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let millis = (seconds.min(cap.as_secs_f64()) * 1000.0) as u64;
    Some(Duration::from_millis(millis))
}

/// Create the backoff schedule used to size successive cooldowns
fn create_backoff(initial: Duration, max: Duration) -> ExponentialBackoff {
    ExponentialBackoff {
        current_interval: initial,
        initial_interval: initial,
        randomization_factor: 0.0,
        multiplier: 2.0,
        max_interval: max,
        max_elapsed_time: None,
        ..Default::default()
    }
}

struct GateState {
    backoff: ExponentialBackoff,
    until: Option<Instant>,
    consecutive: u32,
}

/// Global cooldown gate consulted before each upstream dispatch.
pub struct ThrottleGate {
    state: Mutex<GateState>,
    initial: Duration,
    max: Duration,
}

impl ThrottleGate {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            state: Mutex::new(GateState {
                backoff: create_backoff(initial, max),
                until: None,
                consecutive: 0,
            }),
            initial,
            max,
        }
    }

    /// Time left before upstream calls are allowed again, if any.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let state = self.state.lock();
        state
            .until
            .filter(|until| *until > now)
            .map(|until| until - now)
    }

    /// Close the gate after a throttling response. Returns the cooldown
    /// applied, which honours `retry_after` when it is longer.
    pub fn record_throttle(&self, now: Instant, retry_after: Option<Duration>) -> Duration {
        let mut state = self.state.lock();
        state.consecutive += 1;

        let scheduled = state.backoff.next_backoff().unwrap_or(self.max);
        let cooldown = retry_after
            .map(|hint| hint.max(scheduled))
            .unwrap_or(scheduled)
            .min(self.max);

        state.until = Some(now + cooldown);
        warn!(
            consecutive = state.consecutive,
            cooldown_secs = cooldown.as_secs_f64(),
            "Upstream throttled; pausing upstream calls"
        );
        cooldown
    }

    /// A successful call ends any cooldown and restarts the schedule.
    pub fn record_success(&self) {
        let mut state = self.state.lock();
        if state.consecutive > 0 {
            debug!("Upstream recovered after {} throttled calls", state.consecutive);
        }
        state.consecutive = 0;
        state.until = None;
        state.backoff.reset();
    }

    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.backoff = create_backoff(self.initial, self.max);
        state.until = None;
        state.consecutive = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_throttle_status() {
        assert!(is_throttle_status(429));
        assert!(is_throttle_status(403));
        assert!(!is_throttle_status(500));
        assert!(!is_throttle_status(404));
        assert!(!is_throttle_status(200));
    }

    #[test]
    fn test_parse_retry_after() {
        let cap = Duration::from_secs(60);
        assert_eq!(parse_retry_after("40", cap).unwrap().as_secs(), 40);
        assert_eq!(parse_retry_after("1.5", cap).unwrap().as_millis(), 1500);
        assert_eq!(parse_retry_after("120", cap).unwrap().as_secs(), 60);
        assert!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT", cap).is_none());
        assert!(parse_retry_after("-3", cap).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_grows_and_resets() {
        let gate = ThrottleGate::new(Duration::from_secs(60), Duration::from_secs(200));
        let now = Instant::now();

        assert!(gate.remaining(now).is_none());
        assert_eq!(gate.record_throttle(now, None), Duration::from_secs(60));
        assert_eq!(gate.record_throttle(now, None), Duration::from_secs(120));
        // Capped
        assert_eq!(gate.record_throttle(now, None), Duration::from_secs(200));
        assert_eq!(gate.remaining(now), Some(Duration::from_secs(200)));

        gate.record_success();
        assert!(gate.remaining(now).is_none());
        assert_eq!(gate.record_throttle(now, None), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_hint_extends_cooldown() {
        let gate = ThrottleGate::new(Duration::from_secs(10), Duration::from_secs(300));
        let now = Instant::now();
        let applied = gate.record_throttle(now, Some(Duration::from_secs(90)));
        assert_eq!(applied, Duration::from_secs(90));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_opens_after_cooldown() {
        let gate = ThrottleGate::new(Duration::from_secs(5), Duration::from_secs(50));
        gate.record_throttle(Instant::now(), None);
        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(gate.remaining(Instant::now()).is_none());
    }
}
