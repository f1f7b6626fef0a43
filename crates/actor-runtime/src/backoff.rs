//! # Retry Back-Off
//!
//! A [`BackOff`] policy hands out single-use [`BackOffSession`]s. Each call to
//! [`BackOffSession::back_off`] sleeps for the session's current delay and then reports
//! whether another attempt remains.
//!
//! Both policies apply the same jitter: the computed delay is multiplied by
//! `1 - hysteresis * r` with `r` drawn uniformly from `[0, 1)`, so a hysteresis of `0.25`
//! shortens each wait by up to a quarter.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Stateful, single-use retry pacing.
#[async_trait]
pub trait BackOffSession: Send {
    /// Sleeps for the current delay. Returns `false` once the attempts are exhausted; a
    /// session that is already exhausted returns `false` without sleeping.
    async fn back_off(&mut self) -> bool;
}

/// Factory for [`BackOffSession`]s.
pub trait BackOff: Send + Sync {
    fn begin(&self) -> Box<dyn BackOffSession>;
}

fn jittered(delay: Duration, hysteresis: f64) -> Duration {
    if hysteresis <= 0.0 || delay.is_zero() {
        return delay;
    }
    let deviation = hysteresis.min(1.0) * rand::rng().random::<f64>();
    Duration::try_from_secs_f64(delay.as_secs_f64() * (1.0 - deviation)).unwrap_or(delay)
}

/// `delay * factor`, saturating at `Duration::MAX`.
fn grown(delay: Duration, factor: f64) -> Duration {
    let factor = if factor.is_nan() { 0.0 } else { factor.max(0.0) };
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

/// Constant delay between attempts.
#[derive(Debug, Clone)]
pub struct FixedBackOff {
    delay: Duration,
    count: u32,
    hysteresis: f64,
}

impl FixedBackOff {
    pub fn new(delay: Duration, count: u32, hysteresis: f64) -> Self {
        Self {
            delay,
            count,
            hysteresis,
        }
    }
}

impl BackOff for FixedBackOff {
    fn begin(&self) -> Box<dyn BackOffSession> {
        Box::new(FixedSession {
            policy: self.clone(),
            remaining: self.count,
        })
    }
}

struct FixedSession {
    policy: FixedBackOff,
    remaining: u32,
}

#[async_trait]
impl BackOffSession for FixedSession {
    async fn back_off(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        tokio::time::sleep(jittered(self.policy.delay, self.policy.hysteresis)).await;
        self.remaining -= 1;
        self.remaining > 0
    }
}

/// Delay grows by `factor` after every wait.
#[derive(Debug, Clone)]
pub struct ExponentialBackOff {
    base_delay: Duration,
    count: u32,
    factor: f64,
    hysteresis: f64,
}

impl ExponentialBackOff {
    pub fn new(base_delay: Duration, count: u32, factor: f64, hysteresis: f64) -> Self {
        Self {
            base_delay,
            count,
            factor,
            hysteresis,
        }
    }
}

impl BackOff for ExponentialBackOff {
    fn begin(&self) -> Box<dyn BackOffSession> {
        Box::new(ExponentialSession {
            next_delay: self.base_delay,
            remaining: self.count,
            policy: self.clone(),
        })
    }
}

struct ExponentialSession {
    policy: ExponentialBackOff,
    next_delay: Duration,
    remaining: u32,
}

#[async_trait]
impl BackOffSession for ExponentialSession {
    async fn back_off(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        tokio::time::sleep(jittered(self.next_delay, self.policy.hysteresis)).await;
        self.next_delay = grown(self.next_delay, self.policy.factor);
        self.remaining -= 1;
        self.remaining > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_session_counts_down() {
        let policy = FixedBackOff::new(Duration::from_millis(100), 3, 0.0);
        let mut session = policy.begin();
        let started = Instant::now();

        assert!(session.back_off().await);
        assert!(session.back_off().await);
        assert!(!session.back_off().await);
        assert_eq!(started.elapsed(), Duration::from_millis(300));

        // Exhausted sessions return immediately.
        assert!(!session.back_off().await);
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_session_grows() {
        let policy = ExponentialBackOff::new(Duration::from_millis(10), 3, 4.0, 0.0);
        let mut session = policy.begin();
        let started = Instant::now();

        session.back_off().await;
        assert_eq!(started.elapsed(), Duration::from_millis(10));
        session.back_off().await;
        assert_eq!(started.elapsed(), Duration::from_millis(50));
        session.back_off().await;
        assert_eq!(started.elapsed(), Duration::from_millis(210));
    }

    #[test]
    fn test_growth_saturates_instead_of_overflowing() {
        let huge = grown(Duration::from_millis(1), 1.0e30);
        assert_eq!(huge, Duration::MAX);
        assert_eq!(grown(Duration::MAX, 2.0), Duration::MAX);
        assert_eq!(grown(Duration::from_millis(3), -1.0), Duration::ZERO);
        assert_eq!(grown(Duration::from_millis(3), f64::NAN), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_extreme_factor_saturates() {
        let policy = ExponentialBackOff::new(Duration::from_millis(1), 3, 1.0e30, 0.0);
        let mut session = policy.begin();
        let started = Instant::now();

        assert!(session.back_off().await);
        assert_eq!(started.elapsed(), Duration::from_millis(1));
        // The grown delay saturated at Duration::MAX, so the next wait outlasts any timeout.
        let second = tokio::time::timeout(Duration::from_secs(1), session.back_off()).await;
        assert!(second.is_err());
    }

    #[test]
    fn test_jitter_stays_within_hysteresis() {
        let delay = Duration::from_millis(1000);
        for _ in 0..100 {
            let actual = jittered(delay, 0.25);
            assert!(actual <= delay);
            assert!(actual > Duration::from_millis(750));
        }
        assert!(jittered(Duration::MAX, 0.25) <= Duration::MAX);
    }

    #[test]
    fn test_sessions_are_independent() {
        let policy = FixedBackOff::new(Duration::ZERO, 1, 0.0);
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(async {
            let mut first = policy.begin();
            assert!(!first.back_off().await);
            let mut second = policy.begin();
            assert!(!second.back_off().await);
            assert!(!second.back_off().await);
        });
    }
}
