// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Request pacing for the remote graph.
//!
//! The Roam backend rejects callers that exceed its per-minute quota. Every query is admitted
//! by a [`Scheduler`] (concurrency bound, minimum spacing, refilled reservoir) and retried with
//! exponential backoff when the backend reports a quota error.

pub mod backoff;
mod scheduler;

pub use backoff::{
    classify, is_quota_message, retry, BackoffPolicy, Classify, Disposition, RetryError,
};
pub use scheduler::{QuotaConfig, Scheduler};
