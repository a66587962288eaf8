//! Startup readiness gate for the database.

use std::fmt::Display;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::StoreError;

/// Bounded retry settings for [`wait_for_database`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(3),
        }
    }
}

/// Blocks until `check` succeeds or the retry budget is exhausted.
///
/// Sleeps `policy.delay` between failed attempts, never after the last one.
/// Returns the number of attempts used.
pub fn wait_for_database<F, E>(mut check: F, policy: &RetryPolicy) -> Result<u32, StoreError>
where
    F: FnMut() -> Result<(), E>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        match check() {
            Ok(()) => {
                info!("Database ready!");
                return Ok(attempt);
            }
            Err(e) => {
                warn!("DB not ready, retry {}/{}: {}", attempt, max_attempts, e);
                last_error = e.to_string();
            }
        }
        if attempt < max_attempts {
            thread::sleep(policy.delay);
        }
    }

    Err(StoreError::Unavailable {
        attempts: max_attempts,
        last_error,
    })
}
