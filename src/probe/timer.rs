// src/probe/timer.rs
use std::time::Duration;
use tokio::time::sleep;

/// Completes with `()` once `delay` has elapsed. Never fails.
///
/// Meant to be raced against a check. The underlying timer is owned by the
/// returned future, so dropping the losing side of a race releases it.
pub async fn timeout(delay: Duration) {
    sleep(delay).await;
}
