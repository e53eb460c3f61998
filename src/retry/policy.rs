//! Retry policy types and configuration.

use std::time::Duration;

/// How many times to invoke a computation and how long to wait in between.
///
/// Policies are plain data. They describe retry timing but do not execute it;
/// the functions in [`crate::retry`] do that.
///
/// Every constructor starts with 3 attempts and no jitter. The attempt count
/// includes the initial invocation, so `with_attempts(1)` means "never retry".
///
/// # Examples
///
/// ```rust
/// use sluice::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::exponential(Duration::from_millis(100))
///     .with_attempts(4);
///
/// assert_eq!(policy.attempts(), 4);
/// assert_eq!(policy.nominal_delay(1), Some(Duration::from_millis(100)));
/// assert_eq!(policy.nominal_delay(3), Some(Duration::from_millis(400)));
/// assert_eq!(policy.nominal_delay(4), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    attempts: u32,
    delay: DelayStrategy,
    jitter: JitterStrategy,
    max_delay: Option<Duration>,
}

/// The backoff strategy for retry delays.
///
/// `n` below is the 1-based index of the retry about to be made.
#[derive(Debug, Clone, PartialEq)]
pub enum DelayStrategy {
    /// Same delay before every retry.
    Fixed(Duration),
    /// `base * 2^(n-1)`.
    Exponential {
        /// Delay before the first retry.
        base: Duration,
    },
    /// `base * n`.
    Linear {
        /// Delay before the first retry.
        base: Duration,
    },
    /// `base * fib(n)`.
    Fibonacci {
        /// Delay before the first retry.
        base: Duration,
    },
    /// Delay computed by a function of `n`.
    Custom(fn(u32) -> Duration),
}

/// Strategy for adding randomness to delays.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JitterStrategy {
    /// No jitter applied.
    #[default]
    None,
    /// Scale the delay by a random factor in `[1 - f, 1 + f]`.
    Proportional(f64),
    /// Random delay between 0 and the calculated delay.
    Full,
}

/// Jitter factor used by [`RetryPolicy::with_jitter`]: ±10%.
pub const DEFAULT_JITTER_FACTOR: f64 = 0.1;

const DEFAULT_ATTEMPTS: u32 = 3;

impl RetryPolicy {
    fn with_strategy(delay: DelayStrategy) -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay,
            jitter: JitterStrategy::None,
            max_delay: None,
        }
    }

    /// Create a policy with the same delay before every retry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sluice::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::fixed(Duration::from_millis(500));
    ///
    /// assert_eq!(policy.nominal_delay(1), Some(Duration::from_millis(500)));
    /// assert_eq!(policy.nominal_delay(2), Some(Duration::from_millis(500)));
    /// assert_eq!(policy.nominal_delay(3), None); // 3 attempts means 2 retries
    /// ```
    pub fn fixed(delay: Duration) -> Self {
        Self::with_strategy(DelayStrategy::Fixed(delay))
    }

    /// Create a policy that retries immediately.
    pub fn immediate() -> Self {
        Self::fixed(Duration::ZERO)
    }

    /// Create a policy whose delay doubles before each retry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sluice::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::exponential(Duration::from_millis(100))
    ///     .with_attempts(5);
    ///
    /// // 100ms, 200ms, 400ms, 800ms
    /// assert_eq!(policy.nominal_delay(1), Some(Duration::from_millis(100)));
    /// assert_eq!(policy.nominal_delay(2), Some(Duration::from_millis(200)));
    /// assert_eq!(policy.nominal_delay(4), Some(Duration::from_millis(800)));
    /// ```
    pub fn exponential(base: Duration) -> Self {
        Self::with_strategy(DelayStrategy::Exponential { base })
    }

    /// Create a policy whose delay grows linearly: `base * n`.
    pub fn linear(base: Duration) -> Self {
        Self::with_strategy(DelayStrategy::Linear { base })
    }

    /// Create a policy whose delay follows the Fibonacci sequence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sluice::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::fibonacci(Duration::from_millis(100))
    ///     .with_attempts(6);
    ///
    /// // 100ms, 100ms, 200ms, 300ms, 500ms
    /// assert_eq!(policy.nominal_delay(3), Some(Duration::from_millis(200)));
    /// assert_eq!(policy.nominal_delay(5), Some(Duration::from_millis(500)));
    /// ```
    pub fn fibonacci(base: Duration) -> Self {
        Self::with_strategy(DelayStrategy::Fibonacci { base })
    }

    /// Create a policy whose delay is computed by `delay(n)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sluice::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::custom(|n| Duration::from_secs(u64::from(n) * 10));
    /// assert_eq!(policy.nominal_delay(2), Some(Duration::from_secs(20)));
    /// ```
    pub fn custom(delay: fn(u32) -> Duration) -> Self {
        Self::with_strategy(DelayStrategy::Custom(delay))
    }

    /// Set the total number of invocations, including the first one.
    ///
    /// # Panics
    ///
    /// Panics if `attempts` is zero.
    #[track_caller]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        assert!(attempts >= 1, "RetryPolicy requires at least one attempt");
        self.attempts = attempts;
        self
    }

    /// Cap every delay, after jitter.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sluice::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::exponential(Duration::from_millis(100))
    ///     .with_attempts(10)
    ///     .with_max_delay(Duration::from_millis(500));
    ///
    /// assert_eq!(policy.nominal_delay(3), Some(Duration::from_millis(400)));
    /// assert_eq!(policy.nominal_delay(4), Some(Duration::from_millis(500)));
    /// ```
    pub fn with_max_delay(mut self, max: Duration) -> Self {
        self.max_delay = Some(max);
        self
    }

    /// Add ±10% proportional jitter.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, delays are not
    /// randomized.
    pub fn with_jitter(self) -> Self {
        self.with_jitter_factor(DEFAULT_JITTER_FACTOR)
    }

    /// Add proportional jitter with a custom factor, clamped to `[0, 1]`.
    ///
    /// A factor of `0.25` spreads each delay across ±25% of its nominal value.
    pub fn with_jitter_factor(mut self, factor: f64) -> Self {
        self.jitter = JitterStrategy::Proportional(clamp_factor(factor));
        self
    }

    /// Use full jitter: each delay is uniform in `[0, nominal]`.
    pub fn with_full_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Full;
        self
    }

    /// Total number of invocations allowed.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Get the maximum delay cap.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Get the jitter strategy.
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// Get the delay strategy.
    pub fn delay(&self) -> &DelayStrategy {
        &self.delay
    }

    /// The delay before retry `n` without jitter, capped by `max_delay`.
    ///
    /// `n` is 1-based and counts retries, not the initial invocation. Returns
    /// `None` when retry `n` is outside the attempt budget.
    pub fn nominal_delay(&self, n: u32) -> Option<Duration> {
        if n == 0 || n >= self.attempts {
            return None;
        }
        Some(self.cap(self.delay.delay_for(n)))
    }

    /// The delay to wait before retry `n`, with jitter applied.
    ///
    /// Never negative. The same contract as [`nominal_delay`](Self::nominal_delay)
    /// for which indices return `None`.
    pub fn delay_for_retry(&self, n: u32) -> Option<Duration> {
        if n == 0 || n >= self.attempts {
            return None;
        }
        let jittered = self.jitter.apply(self.delay.delay_for(n));
        Some(self.cap(jittered))
    }

    fn cap(&self, delay: Duration) -> Duration {
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

impl DelayStrategy {
    /// The nominal delay before retry `n` (1-based).
    pub fn delay_for(&self, n: u32) -> Duration {
        match self {
            DelayStrategy::Fixed(d) => *d,
            DelayStrategy::Exponential { base } => {
                base.saturating_mul(2u32.saturating_pow(n.saturating_sub(1)))
            }
            DelayStrategy::Linear { base } => base.saturating_mul(n),
            DelayStrategy::Fibonacci { base } => base.saturating_mul(fibonacci(n)),
            DelayStrategy::Custom(f) => f(n),
        }
    }
}

impl JitterStrategy {
    /// Apply jitter to a nominal delay.
    ///
    /// Without the `jitter` feature this returns `delay` unchanged.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterStrategy::None => delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Proportional(factor) => {
                use rand::Rng;
                let factor = clamp_factor(*factor);
                let scale = rand::rng().random_range((1.0 - factor)..=(1.0 + factor));
                scale_saturating(delay, scale)
            }
            #[cfg(feature = "jitter")]
            JitterStrategy::Full => {
                use rand::Rng;
                scale_saturating(delay, rand::rng().random_range(0.0..=1.0))
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Proportional(_) | JitterStrategy::Full => delay,
        }
    }
}

/// Clamp a jitter factor to `[0, 1]`; NaN means no jitter.
fn clamp_factor(factor: f64) -> f64 {
    if factor.is_nan() {
        0.0
    } else {
        factor.clamp(0.0, 1.0)
    }
}

#[cfg(feature = "jitter")]
fn scale_saturating(delay: Duration, scale: f64) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * scale).unwrap_or(Duration::MAX)
}

/// Calculate the nth Fibonacci number, saturating.
fn fibonacci(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let mut a = 0u32;
    let mut b = 1u32;
    for _ in 1..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    b
}
