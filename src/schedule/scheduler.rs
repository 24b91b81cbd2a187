// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore, SemaphorePermit};
use tokio::time::Instant;
use tracing::Instrument;

use super::backoff::{classify, retry, BackoffPolicy, Classify, RetryError};

/// Pacing budget shared by every caller of one [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaConfig {
    /// Calls allowed to be in flight at once.
    pub max_concurrent: usize,
    /// Minimum gap between two dispatches.
    pub min_spacing: Duration,
    /// Calls allowed per refill window.
    pub reservoir: u32,
    /// Length of one refill window; the reservoir is reset to full at each boundary.
    pub refill_interval: Duration,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 1,
            min_spacing: Duration::from_millis(200),
            reservoir: 50,
            refill_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
struct QuotaState {
    remaining: u32,
    window_start: Instant,
    last_dispatch: Option<Instant>,
}

impl QuotaState {
    fn refill(&mut self, now: Instant, config: &QuotaConfig) {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < config.refill_interval {
            return;
        }
        let interval = config.refill_interval.as_nanos().max(1);
        let into_window = u64::try_from(elapsed.as_nanos() % interval).unwrap_or(0);
        self.window_start = now - Duration::from_nanos(into_window);
        self.remaining = config.reservoir;
    }

    /// Consumes one dispatch slot, or reports how long to wait for the next one.
    fn try_dispatch(&mut self, now: Instant, config: &QuotaConfig) -> Result<(), Duration> {
        self.refill(now, config);

        if self.remaining == 0 {
            let next_window = self.window_start + config.refill_interval;
            return Err(next_window.saturating_duration_since(now));
        }

        if let Some(last) = self.last_dispatch {
            let ready_at = last + config.min_spacing;
            if ready_at > now {
                return Err(ready_at - now);
            }
        }

        self.remaining -= 1;
        self.last_dispatch = Some(now);
        Ok(())
    }
}

#[derive(Debug)]
struct Quota {
    config: QuotaConfig,
    permits: Semaphore,
    state: Mutex<QuotaState>,
}

/// Admission gate for every remote call.
///
/// Construct one at startup and hand clones (or [`Scheduler::scoped`] handles) to every
/// component that talks to the graph. Clones share the quota; there is no way to derive an
/// independent budget from an existing handle.
#[derive(Debug, Clone)]
pub struct Scheduler {
    quota: Arc<Quota>,
    backoff: BackoffPolicy,
    scope: Arc<str>,
}

impl Scheduler {
    pub fn new(config: QuotaConfig, backoff: BackoffPolicy) -> Self {
        let config = QuotaConfig {
            max_concurrent: config.max_concurrent.max(1),
            reservoir: config.reservoir.max(1),
            ..config
        };
        Self {
            quota: Arc::new(Quota {
                permits: Semaphore::new(config.max_concurrent),
                state: Mutex::new(QuotaState {
                    remaining: config.reservoir,
                    window_start: Instant::now(),
                    last_dispatch: None,
                }),
                config,
            }),
            backoff,
            scope: Arc::from("root"),
        }
    }

    /// A handle for one feature that funnels through the same quota; the label shows up in logs.
    pub fn scoped(&self, scope: &str) -> Self {
        Self { quota: Arc::clone(&self.quota), backoff: self.backoff, scope: Arc::from(scope) }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn quota(&self) -> &QuotaConfig {
        &self.quota.config
    }

    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    pub fn shares_quota_with(&self, other: &Scheduler) -> bool {
        Arc::ptr_eq(&self.quota, &other.quota)
    }

    /// Runs `op` (exactly one remote call per invocation) under the shared quota.
    ///
    /// Each attempt is admitted separately. Backoff sleeps happen after the permit is
    /// released, so other callers keep flowing while this one waits.
    pub async fn schedule<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display + Classify,
    {
        let span = tracing::debug_span!("schedule", scope = %self.scope);
        retry(&self.backoff, |err: &E| classify(err), |_attempt| {
            let call = op();
            async move {
                let _permit = self.admit().await;
                call.await
            }
        })
        .instrument(span)
        .await
    }

    async fn admit(&self) -> SemaphorePermit<'_> {
        let permit = self.quota.permits.acquire().await.expect("scheduler semaphore is never closed");

        loop {
            let wait = {
                let mut state = self.quota.state.lock().await;
                match state.try_dispatch(Instant::now(), &self.quota.config) {
                    Ok(()) => return permit,
                    Err(wait) => wait,
                }
            };
            tracing::debug!(wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX), "pacing");
            tokio::time::sleep(wait).await;
        }
    }
}
