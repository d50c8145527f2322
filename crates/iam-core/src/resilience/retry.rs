//! Retry policy with exponential backoff and jitter, grounded on
//! `rustok_core::resilience::retry`. Used by iam-jobs to drive the
//! tenant-initialization task's per-service fan-out (spec §4.8).

use std::time::Duration;

#[derive(Debug, Clone)]
pub enum RetryStrategy {
    Fixed(Duration),
    Linear { base: Duration, max: Duration },
    /// delay = min(base * 2^attempt, max) +/- up to `jitter_ratio` of that
    /// delay, so retries from many tasks don't all land on the same tick.
    ExponentialJitter {
        base: Duration,
        max: Duration,
        jitter_ratio: f64,
    },
}

impl RetryStrategy {
    pub fn delay(&self, attempt: u32, jitter_seed: u64) -> Duration {
        match self {
            Self::Fixed(duration) => *duration,
            Self::Linear { base, max } => base.mul_f64(attempt as f64).min(*max),
            Self::ExponentialJitter {
                base,
                max,
                jitter_ratio,
            } => {
                let unjittered = base.mul_f64(2f64.powi(attempt as i32)).min(*max);
                // Deterministic pseudo-jitter from the seed: no external RNG
                // dependency, fully reproducible in tests. Scales the delay
                // by a factor in [1 - jitter_ratio/2, 1 + jitter_ratio/2].
                let spread = (jitter_seed % 1000) as f64 / 1000.0;
                let factor = 1.0 + jitter_ratio * (spread - 0.5);
                unjittered.mul_f64(factor.max(0.0)).min(*max)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub strategy: RetryStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            strategy: RetryStrategy::ExponentialJitter {
                base: Duration::from_millis(200),
                max: Duration::from_secs(30),
                jitter_ratio: 0.2,
            },
        }
    }
}

impl RetryPolicy {
    /// Policy for the tenant-initialization task (spec §4.8: max 5 retries).
    pub fn tenant_init() -> Self {
        Self::default()
    }

    /// Policy for the invitation-email task (spec §4.8: max 3 retries).
    pub fn invitation_email() -> Self {
        Self {
            max_attempts: 3,
            strategy: RetryStrategy::ExponentialJitter {
                base: Duration::from_millis(500),
                max: Duration::from_secs(10),
                jitter_ratio: 0.2,
            },
        }
    }

    pub async fn execute<F, Fut, T, E>(&self, mut f: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            match f(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(err);
                    }
                    let delay = self.strategy.delay(attempt, attempt as u64);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_delay_grows_then_caps_at_max() {
        let strategy = RetryStrategy::ExponentialJitter {
            base: Duration::from_millis(100),
            max: Duration::from_secs(1),
            jitter_ratio: 0.0,
        };
        assert_eq!(strategy.delay(0, 0), Duration::from_millis(100));
        assert_eq!(strategy.delay(1, 0), Duration::from_millis(200));
        assert_eq!(strategy.delay(10, 0), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn execute_retries_until_success_within_max_attempts() {
        let policy = RetryPolicy {
            max_attempts: 3,
            strategy: RetryStrategy::Fixed(Duration::from_millis(1)),
        };
        let mut calls = 0;
        let result: Result<u32, &str> = policy
            .execute(|attempt| {
                calls += 1;
                async move {
                    if attempt < 2 {
                        Err("not yet")
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;
        assert_eq!(result, Ok(42));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn execute_gives_up_after_max_attempts() {
        let policy = RetryPolicy {
            max_attempts: 2,
            strategy: RetryStrategy::Fixed(Duration::from_millis(1)),
        };
        let result: Result<u32, &str> = policy.execute(|_| async { Err("nope") }).await;
        assert_eq!(result, Err("nope"));
    }
}
