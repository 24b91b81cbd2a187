// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt::Display;
use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(2_000);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Whether a failed call may be attempted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Retryable,
    Fatal,
}

fn quota_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:429\b|too many requests|rate[ -]?limit|quota exceeded)")
            .expect("quota pattern is valid")
    })
}

/// Whether a backend error message is a quota rejection. The phrase must lead the message,
/// so a quota word buried in unrelated error text does not count.
pub fn is_quota_message(message: &str) -> bool {
    quota_pattern().is_match(message)
}

/// A failure that can tell a quota rejection apart from everything else.
pub trait Classify {
    fn disposition(&self) -> Disposition;
}

impl Classify for str {
    fn disposition(&self) -> Disposition {
        if is_quota_message(self) {
            Disposition::Retryable
        } else {
            Disposition::Fatal
        }
    }
}

impl Classify for String {
    fn disposition(&self) -> Disposition {
        self.as_str().disposition()
    }
}

/// Only quota rejections are retryable; everything else surfaces immediately.
pub fn classify<E: Classify + ?Sized>(error: &E) -> Disposition {
    error.disposition()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base: Duration,
    max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self { base: DEFAULT_BASE_DELAY, max_attempts: DEFAULT_MAX_ATTEMPTS }
    }
}

impl BackoffPolicy {
    /// `max_attempts` counts the first call, so `1` disables retries.
    pub fn new(base: Duration, max_attempts: u32) -> Self {
        Self { base, max_attempts: max_attempts.max(1) }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// `base * 2^n` for the `n`-th retry (0-based). Saturates instead of overflowing.
    pub fn delay_for_attempt(&self, n: u32) -> Duration {
        let factor = 1u32.checked_shl(n).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    #[error(transparent)]
    Fatal(E),
    #[error("gave up after {attempts} rate-limited attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: E,
    },
}

impl<E> RetryError<E> {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    pub fn into_inner(self) -> E {
        match self {
            Self::Fatal(err) => err,
            Self::Exhausted { last, .. } => last,
        }
    }
}

/// Runs `op` until it succeeds, fails fatally, or the attempt ceiling is reached.
///
/// `op` receives the 0-based attempt index. Sleeps use `tokio::time`, so paused-clock tests
/// observe the exact delays.
pub async fn retry<T, E, F, Fut, C>(
    policy: &BackoffPolicy,
    classify: C,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> Disposition,
    E: Display,
{
    let mut attempt = 0u32;
    loop {
        let err = match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if classify(&err) == Disposition::Fatal {
            return Err(RetryError::Fatal(err));
        }

        let next = attempt + 1;
        if next >= policy.max_attempts {
            tracing::warn!(attempts = next, error = %err, "retry budget exhausted");
            return Err(RetryError::Exhausted { attempts: next, last: err });
        }

        let delay = policy.delay_for_attempt(attempt);
        tracing::warn!(
            attempt = next,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "rate limited; backing off"
        );
        tokio::time::sleep(delay).await;
        attempt = next;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;

    use super::{classify, BackoffPolicy, Disposition};

    #[rstest]
    #[case("Too many requests, reached maximum of 50 requests per minute")]
    #[case("429 Too Many Requests")]
    #[case("Rate limit exceeded")]
    #[case("quota exceeded for graph")]
    fn quota_messages_are_retryable(#[case] message: &str) {
        assert_eq!(classify(message), Disposition::Retryable);
    }

    #[rstest]
    #[case("remote store returned 500 Internal Server Error: boom")]
    #[case("unexpected response shape: missing result")]
    #[case("block abc not found")]
    #[case("Invalid uid 429")]
    #[case("remote store returned 400 Bad Request: Invalid uid 429")]
    #[case("uid must not mention a rate limit")]
    fn other_messages_are_fatal(#[case] message: &str) {
        assert_eq!(classify(message), Disposition::Fatal);
    }

    #[test]
    fn delay_doubles_from_base() {
        let policy = BackoffPolicy::new(Duration::from_millis(250), 6);
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(250));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(2_000));
    }

    #[test]
    fn delay_saturates_for_huge_attempts() {
        let policy = BackoffPolicy::new(Duration::from_secs(1), 6);
        assert_eq!(policy.delay_for_attempt(64), Duration::from_secs(1).saturating_mul(u32::MAX));
    }

    #[test]
    fn zero_attempts_means_one_call() {
        assert_eq!(BackoffPolicy::new(Duration::from_millis(1), 0).max_attempts(), 1);
    }
}
